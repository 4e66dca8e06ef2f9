//! # Request Adapter
//!
//! Translates conversation turns and AI tasks into xAI requests and relays
//! the answers back.
//!
//! Each call is independent: the adapter keeps no state between calls and
//! everything it needs arrives with the call (agent options, history, tools).
//! Capability checks happen before any network traffic, so a request the
//! selected model cannot serve fails without reaching the API.
//!
//! ## Key Types
//!
//! - [`RequestAdapter`] - the three operations, generic over a [`ChatBackend`]
//! - [`ConversationTurn`] - history plus tool declarations for one turn
//! - [`TurnOutput`] / [`Fragment`] - streamed or final turn results
//! - [`AdapterError`] - everything a call can fail with

mod error;
mod fragments;
mod request;

pub use error::AdapterError;
pub use fragments::{FinalResponse, Fragment, FragmentStream, TurnOutput, assemble};
pub use request::{build_chat_request, require_capability};

use crate::application::task::{GeneratedImage, StructuredTask, attachments, image, schema};
use crate::config::{AgentOptions, Capability};
use crate::domain::types::{Attachment, Content, ConversationInput, ToolSpec};
use crate::infrastructure::model::ChatBackend;
use crate::infrastructure::model::adapter::ImageUrls;
use crate::infrastructure::model::types::{ImageGenerationRequest, ResponseFormat};
use serde_json::Value;
use tracing::{debug, info, warn};

/// History and tool declarations for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationTurn {
    /// Sent as the `user` field so xAI can group requests
    pub conversation_id: Option<String>,
    pub messages: Vec<Content>,
    pub tools: Vec<ToolSpec>,
}

impl ConversationTurn {
    /// Prior exchanges followed by the user's new input
    pub fn new(history: Vec<Content>, input: &ConversationInput) -> Self {
        let mut messages = history;
        messages.push(Content::user_with_attachments(
            input.text.clone(),
            input.attachments.clone(),
        ));
        Self {
            conversation_id: input.conversation_id.clone(),
            messages,
            tools: Vec::new(),
        }
    }

    pub fn from_messages(messages: Vec<Content>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    fn attachments(&self) -> Vec<&Attachment> {
        self.messages.iter().flat_map(Content::attachments).collect()
    }
}

pub struct RequestAdapter<B: ChatBackend> {
    backend: B,
}

impl<B: ChatBackend> RequestAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send one conversation turn.
    ///
    /// Streams fragments when `options.stream` is set, otherwise returns the
    /// final response. Upstream failures are returned as they are.
    pub async fn send_conversation_turn(
        &self,
        options: &AgentOptions,
        turn: &ConversationTurn,
    ) -> Result<TurnOutput, AdapterError> {
        let model = require_capability(&options.chat_model, Capability::Chat)?;
        let images = load_attachments(&options.chat_model, turn.attachments()).await?;

        let request = build_chat_request(
            options,
            model,
            &turn.messages,
            &turn.tools,
            turn.conversation_id.as_deref(),
            &images,
        );
        info!(
            provider = self.backend.id(),
            model = model.id,
            messages = request.messages.len(),
            tools = turn.tools.len(),
            stream = options.stream,
            "Sending conversation turn"
        );

        if options.stream {
            let chunks = self.backend.stream(request).await?;
            Ok(TurnOutput::Streaming(assemble(chunks)))
        } else {
            let completion = self.backend.complete(request).await?;
            let response = FinalResponse::from_completion(completion)?;
            debug!(
                bytes = response.content.len(),
                tool_calls = response.tool_calls.len(),
                "Received final response"
            );
            Ok(TurnOutput::Final(response))
        }
    }

    /// Request output constrained to `task.schema` and check it.
    ///
    /// Without a schema the reply text comes back as a JSON string.
    pub async fn generate_structured_data(
        &self,
        options: &AgentOptions,
        task: &StructuredTask,
    ) -> Result<Value, AdapterError> {
        let model = require_capability(&options.chat_model, Capability::Chat)?;
        let images = load_attachments(&options.chat_model, task.attachments.iter()).await?;

        let messages = vec![Content::user_with_attachments(
            task.instructions.clone(),
            task.attachments.clone(),
        )];
        let mut request = build_chat_request(options, model, &messages, &[], None, &images);
        request.stream = false;
        if let Some(schema) = &task.schema {
            request.response_format = Some(ResponseFormat::json_schema(
                task.schema_name(),
                schema.clone(),
            ));
        }
        info!(
            provider = self.backend.id(),
            model = model.id,
            task = task.name.as_str(),
            structured = task.schema.is_some(),
            "Generating data"
        );

        let completion = self.backend.complete(request).await?;
        let response = FinalResponse::from_completion(completion)?;

        let Some(expected) = &task.schema else {
            return Ok(Value::String(response.content));
        };
        let text = response.content.trim();
        if text.is_empty() {
            return Err(AdapterError::EmptyResponse);
        }
        let value: Value = serde_json::from_str(text).map_err(|source| {
            warn!(task = task.name.as_str(), %source, "Structured output is not JSON");
            AdapterError::InvalidJson { source }
        })?;
        if let Err(violation) = schema::validate(&value, expected) {
            warn!(
                task = task.name.as_str(),
                path = violation.path.as_str(),
                reason = violation.reason.as_str(),
                "Structured output does not match the schema"
            );
            return Err(violation.into());
        }
        Ok(value)
    }

    /// Generate one image with `options.image_model`.
    pub async fn generate_image(
        &self,
        options: &AgentOptions,
        prompt: &str,
    ) -> Result<GeneratedImage, AdapterError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AdapterError::MissingPrompt);
        }
        let model = require_capability(&options.image_model, Capability::ImageGeneration)?;
        info!(provider = self.backend.id(), model = model.id, "Generating image");

        let response = self
            .backend
            .generate_image(ImageGenerationRequest::base64(model.id, prompt))
            .await?;
        let Some(generated) = response.data.into_iter().next() else {
            return Err(AdapterError::EmptyResponse);
        };
        let Some(payload) = generated.b64_json.filter(|payload| !payload.trim().is_empty()) else {
            return Err(AdapterError::EmptyResponse);
        };
        let (data, mime_type) = image::decode_payload(&payload)?;
        debug!(bytes = data.len(), mime = mime_type.as_str(), "Image decoded");

        Ok(GeneratedImage {
            data,
            mime_type,
            revised_prompt: generated.revised_prompt,
            model: model.id.to_string(),
        })
    }
}

/// Check and read image attachments for `model`
async fn load_attachments<'a>(
    model: &str,
    attachments: impl IntoIterator<Item = &'a Attachment>,
) -> Result<ImageUrls, AdapterError> {
    let files: Vec<&Attachment> = attachments.into_iter().collect();
    if files.is_empty() {
        return Ok(ImageUrls::new());
    }
    require_capability(model, Capability::Vision)?;
    attachments::ensure_images(files.iter().copied())?;
    Ok(attachments::load_image_urls(files).await?)
}

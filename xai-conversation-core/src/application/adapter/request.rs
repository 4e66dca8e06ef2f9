//! Agent options and chat log to `ChatCompletionRequest`

use super::error::AdapterError;
use crate::config::catalog::{self, Capability, ModelInfo};
use crate::config::AgentOptions;
use crate::domain::types::{Content, ToolSpec};
use crate::infrastructure::model::adapter::{ImageUrls, MessageAdapter};
use crate::infrastructure::model::types::{ChatCompletionRequest, SearchParameters};
use tracing::debug;

/// Catalog entry for `model`, failing when the model lacks `capability`
pub fn require_capability(
    model: &str,
    capability: Capability,
) -> Result<&'static ModelInfo, AdapterError> {
    let info = catalog::lookup(model).ok_or_else(|| AdapterError::UnknownModel {
        model: model.to_string(),
    })?;
    if !info.supports(capability) {
        return Err(AdapterError::capability_mismatch(info.id, capability));
    }
    Ok(info)
}

/// Build a chat request.
///
/// Reasoning effort and search parameters are only set for models that
/// accept them. Live search turned off sends `{"mode": "off"}` without a
/// result count.
pub fn build_chat_request(
    options: &AgentOptions,
    model: &ModelInfo,
    messages: &[Content],
    tools: &[ToolSpec],
    user: Option<&str>,
    images: &ImageUrls,
) -> ChatCompletionRequest {
    let needs_prompt = !matches!(messages.first(), Some(Content::System { .. }));
    let wire_messages = match options.system_prompt() {
        Some(prompt) if needs_prompt => {
            let mut with_prompt = Vec::with_capacity(messages.len() + 1);
            with_prompt.push(Content::system(prompt));
            with_prompt.extend_from_slice(messages);
            MessageAdapter::to_xai_format(&with_prompt, images)
        }
        _ => MessageAdapter::to_xai_format(messages, images),
    };

    let mut request = ChatCompletionRequest::new(model.id, wire_messages);
    request.max_tokens = Some(options.max_tokens);
    request.temperature = Some(options.temperature);
    request.top_p = Some(options.top_p);
    request.stream = options.stream;

    if let Some(effort) = options.reasoning_effort {
        if model.supports(Capability::ReasoningEffort) {
            request.reasoning_effort = Some(effort);
        } else {
            debug!(model = model.id, effort = effort.as_str(), "Model ignores reasoning effort");
        }
    }

    if model.supports(Capability::LiveSearch) {
        request.search_parameters = Some(if options.live_search {
            SearchParameters::on(options.max_search_results)
        } else {
            SearchParameters::off()
        });
    } else if options.live_search {
        debug!(model = model.id, "Model does not offer live search");
    }

    if !tools.is_empty() {
        request.tools = Some(MessageAdapter::tool_definitions(tools));
        request.parallel_tool_calls = Some(true);
    }

    request.user = user.map(str::to_string);
    request
}

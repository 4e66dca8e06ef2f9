use super::errors::AgentError;
use super::listener::{ChatDelta, DeltaListener};
use crate::application::adapter::{
    AdapterError, ConversationTurn, FinalResponse, Fragment, RequestAdapter, TurnOutput,
};
use crate::application::tooling::{ToolApi, ToolRegistry, ToolSet};
use crate::config::AgentOptions;
use crate::constants::{MAX_TOOL_ITERATIONS, PROGRESS_MESSAGE};
use crate::domain::types::{ChatLog, Content, ConversationInput, ConversationResult, ToolInput};
use crate::infrastructure::model::ChatBackend;
use futures::StreamExt;
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConversationAgent<B: ChatBackend> {
    adapter: Arc<RequestAdapter<B>>,
    options: AgentOptions,
    registry: ToolRegistry,
}

impl<B: ChatBackend> ConversationAgent<B> {
    pub fn new(adapter: Arc<RequestAdapter<B>>, options: AgentOptions, registry: ToolRegistry) -> Self {
        Self {
            adapter,
            options,
            registry,
        }
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn adapter(&self) -> &RequestAdapter<B> {
        &self.adapter
    }

    /// Handle one user message, appending everything that happens to `chat_log`.
    ///
    /// When the message fails the log entries are restored to what they were
    /// before the call. Token usage of completed round-trips stays recorded.
    pub async fn handle_message(
        &self,
        input: ConversationInput,
        chat_log: &mut ChatLog,
        listener: Option<&dyn DeltaListener>,
    ) -> Result<ConversationResult, AgentError> {
        let checkpoint = chat_log.content.clone();
        let result = self.run_message(input, chat_log, listener).await;
        if let Err(err) = &result {
            warn!(
                conversation_id = chat_log.conversation_id.as_str(),
                error = %err,
                "Message failed, chat log restored"
            );
            chat_log.content = checkpoint;
        }
        result
    }

    async fn run_message(
        &self,
        input: ConversationInput,
        chat_log: &mut ChatLog,
        listener: Option<&dyn DeltaListener>,
    ) -> Result<ConversationResult, AgentError> {
        let apis = self
            .registry
            .resolve(&self.options.llm_apis)
            .map_err(AgentError::UnknownToolApi)?;
        let tools = ToolSet::new(&apis);

        if let Some(prompt) = compose_system_prompt(&self.options, &apis, input.extra_system_prompt.as_deref()) {
            chat_log.set_system_prompt(prompt);
        }
        chat_log.push(Content::user_with_attachments(input.text, input.attachments));

        let conversation_id = chat_log.conversation_id.clone();
        info!(
            agent = self.options.name.as_str(),
            conversation_id = conversation_id.as_str(),
            tools = tools.specs().len(),
            "Handling conversation message"
        );

        for iteration in 0..MAX_TOOL_ITERATIONS {
            let turn = ConversationTurn {
                conversation_id: Some(conversation_id.clone()),
                messages: chat_log.content.clone(),
                tools: tools.specs().to_vec(),
            };
            let output = self.adapter.send_conversation_turn(&self.options, &turn).await?;
            let response = relay(output, &conversation_id, listener).await?;

            if let Some(usage) = &response.usage {
                debug!(
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    reasoning_tokens = usage.reasoning_tokens,
                    "Token usage"
                );
                chat_log.record_usage(usage);
            }
            chat_log.push(response.to_content());

            if !response.has_tool_calls() {
                let text = response.content.trim().to_string();
                return Ok(ConversationResult {
                    conversation_id,
                    continue_conversation: text.ends_with('?'),
                    response: text,
                });
            }

            debug!(
                iteration,
                calls = response.tool_calls.len(),
                "Running requested tools"
            );
            let results = join_all(
                response
                    .tool_calls
                    .iter()
                    .map(|call| run_tool(&tools, call)),
            )
            .await;
            for result in results {
                if let (Some(listener), Content::ToolResult { tool_call_id, tool_name, result }) =
                    (listener, &result)
                {
                    listener.on_delta(
                        &conversation_id,
                        &ChatDelta::ToolResult {
                            tool_call_id,
                            tool_name,
                            result,
                        },
                    );
                }
                chat_log.push(result);
            }
        }

        warn!(
            conversation_id = conversation_id.as_str(),
            limit = MAX_TOOL_ITERATIONS,
            "Agent exceeded max tool interactions"
        );
        Err(AgentError::TooManyToolIterations {
            limit: MAX_TOOL_ITERATIONS,
        })
    }
}

/// Options prompt, then each tool API's prompt, then the caller's extra prompt
fn compose_system_prompt(
    options: &AgentOptions,
    apis: &[Arc<dyn ToolApi>],
    extra: Option<&str>,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(prompt) = options.system_prompt() {
        parts.push(prompt.trim().to_string());
    }
    parts.extend(
        apis.iter()
            .filter_map(|api| api.prompt())
            .filter(|prompt| !prompt.trim().is_empty()),
    );
    if let Some(extra) = extra.map(str::trim).filter(|extra| !extra.is_empty()) {
        parts.push(extra.to_string());
    }
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

/// Forward a turn's output to the listener and return the final response
async fn relay(
    output: TurnOutput,
    conversation_id: &str,
    listener: Option<&dyn DeltaListener>,
) -> Result<FinalResponse, AgentError> {
    notify(listener, conversation_id, ChatDelta::AssistantStart);

    match output {
        TurnOutput::Final(response) => {
            if let Some(thinking) = &response.thinking {
                notify(listener, conversation_id, ChatDelta::Thinking(thinking));
            }
            if !response.content.is_empty() {
                notify(listener, conversation_id, ChatDelta::Content(&response.content));
            } else if response.has_tool_calls() {
                notify(listener, conversation_id, ChatDelta::Progress(PROGRESS_MESSAGE));
            }
            if response.has_tool_calls() {
                notify(listener, conversation_id, ChatDelta::ToolCalls(&response.tool_calls));
            }
            Ok(response)
        }
        TurnOutput::Streaming(mut fragments) => {
            let mut saw_text = false;
            while let Some(fragment) = fragments.next().await {
                match fragment? {
                    Fragment::Text { text, .. } => {
                        saw_text = true;
                        notify(listener, conversation_id, ChatDelta::Content(&text));
                    }
                    Fragment::Thinking { text } => notify(listener, conversation_id, ChatDelta::Thinking(&text)),
                    Fragment::ToolCalls(calls) => {
                        if !saw_text {
                            notify(listener, conversation_id, ChatDelta::Progress(PROGRESS_MESSAGE));
                        }
                        notify(listener, conversation_id, ChatDelta::ToolCalls(&calls));
                    }
                    Fragment::Done(response) => return Ok(response),
                }
            }
            Err(AdapterError::EmptyResponse.into())
        }
    }
}

fn notify(listener: Option<&dyn DeltaListener>, conversation_id: &str, delta: ChatDelta<'_>) {
    if let Some(listener) = listener {
        listener.on_delta(conversation_id, &delta);
    }
}

/// Run one tool call. Failures become an error result for the model.
async fn run_tool(tools: &ToolSet, call: &ToolInput) -> Content {
    info!(tool = call.tool_name.as_str(), id = call.id.as_str(), "Calling tool");
    let result = match tools.call(call).await {
        Ok(value) => value,
        Err(err) => {
            warn!(tool = call.tool_name.as_str(), error = %err, "Tool call failed");
            json!({"error": err.kind(), "error_text": err.to_string()})
        }
    };
    Content::ToolResult {
        tool_call_id: call.id.clone(),
        tool_name: call.tool_name.clone(),
        result,
    }
}

//! Response fragments relayed to the caller

use super::error::AdapterError;
use crate::domain::types::{Content, ToolInput, Usage};
use crate::infrastructure::model::ChunkStream;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::types::{
    ChatCompletion, ChatCompletionChunk, ToolCallDelta, WireFunctionCall, WireToolCall,
};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::collections::VecDeque;
use tracing::debug;

pub type FragmentStream = BoxStream<'static, Result<Fragment, AdapterError>>;

/// One element of a streamed response.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Answer text starting at byte `offset` of the full answer
    Text { offset: usize, text: String },
    Thinking { text: String },
    /// Every tool call of the response, sent once before `Done`
    ToolCalls(Vec<ToolInput>),
    Done(FinalResponse),
}

/// The complete assistant message of one turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub content: String,
    pub thinking: Option<String>,
    pub tool_calls: Vec<ToolInput>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl FinalResponse {
    pub fn from_completion(completion: ChatCompletion) -> Result<Self, AdapterError> {
        let ChatCompletion {
            id,
            model,
            choices,
            usage,
        } = completion;
        let choice = choices
            .into_iter()
            .next()
            .ok_or(AdapterError::EmptyResponse)?;
        let message = choice.message;
        Ok(Self {
            id,
            model,
            content: message.content.unwrap_or_default(),
            thinking: message.reasoning_content.filter(|text| !text.is_empty()),
            tool_calls: message
                .tool_calls
                .map(|calls| MessageAdapter::convert_tool_calls(&calls))
                .unwrap_or_default(),
            finish_reason: choice.finish_reason,
            usage: usage.map(Usage::from),
        })
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The response as a chat log entry
    pub fn to_content(&self) -> Content {
        Content::Assistant {
            content: (!self.content.is_empty()).then(|| self.content.clone()),
            thinking: self.thinking.clone(),
            tool_calls: self.tool_calls.clone(),
        }
    }
}

/// What a conversation turn produced
pub enum TurnOutput {
    Streaming(FragmentStream),
    Final(FinalResponse),
}

impl TurnOutput {
    /// Drain a streamed turn into its final response.
    pub async fn into_final(self) -> Result<FinalResponse, AdapterError> {
        match self {
            TurnOutput::Final(response) => Ok(response),
            TurnOutput::Streaming(mut fragments) => {
                while let Some(fragment) = fragments.next().await {
                    if let Fragment::Done(response) = fragment? {
                        return Ok(response);
                    }
                }
                Err(AdapterError::EmptyResponse)
            }
        }
    }
}

#[derive(Default)]
struct PartialToolCall {
    index: Option<usize>,
    id: Option<String>,
    name: String,
    arguments: String,
}

struct Assembler {
    chunks: ChunkStream,
    pending: VecDeque<Fragment>,
    response: FinalResponse,
    thinking: String,
    tool_calls: Vec<PartialToolCall>,
    chunk_count: usize,
    finished: bool,
}

impl Assembler {
    fn absorb(&mut self, chunk: ChatCompletionChunk) {
        self.chunk_count += 1;
        if chunk.id.is_some() {
            self.response.id = chunk.id;
        }
        if chunk.model.is_some() {
            self.response.model = chunk.model;
        }
        if let Some(usage) = chunk.usage {
            self.response.usage = Some(usage.into());
        }
        let Some(choice) = chunk.choices.into_iter().find(|choice| choice.index == 0) else {
            return;
        };
        if choice.finish_reason.is_some() {
            self.response.finish_reason = choice.finish_reason;
        }
        let delta = choice.delta;
        if let Some(thinking) = delta.reasoning_content.filter(|text| !text.is_empty()) {
            self.thinking.push_str(&thinking);
            self.pending.push_back(Fragment::Thinking { text: thinking });
        }
        if let Some(text) = delta.content.filter(|text| !text.is_empty()) {
            let offset = self.response.content.len();
            self.response.content.push_str(&text);
            self.pending.push_back(Fragment::Text { offset, text });
        }
        for call in delta.tool_calls.unwrap_or_default() {
            self.absorb_tool_call(call);
        }
    }

    /// Indexed deltas extend the call with the same index. Deltas without an
    /// index extend the last call unless they start a new named call. A
    /// different id always starts a new call.
    fn absorb_tool_call(&mut self, call: ToolCallDelta) {
        let id = call.id.filter(|id| !id.is_empty());
        let (name, arguments) = call
            .function
            .map(|function| {
                (
                    function.name.unwrap_or_default(),
                    function.arguments.unwrap_or_default(),
                )
            })
            .unwrap_or_default();

        let same_id = |entry: &PartialToolCall| match (&id, &entry.id) {
            (Some(new), Some(current)) => new == current,
            _ => true,
        };
        let target = match call.index {
            Some(index) => self
                .tool_calls
                .iter()
                .rposition(|entry| entry.index == Some(index))
                .filter(|&position| same_id(&self.tool_calls[position])),
            None => self.tool_calls.len().checked_sub(1).filter(|&position| {
                let entry = &self.tool_calls[position];
                same_id(entry) && (name.is_empty() || entry.name.is_empty())
            }),
        };
        let position = match target {
            Some(position) => position,
            None => {
                self.tool_calls.push(PartialToolCall {
                    index: call.index,
                    ..PartialToolCall::default()
                });
                self.tool_calls.len() - 1
            }
        };

        let entry = &mut self.tool_calls[position];
        if id.is_some() {
            entry.id = id;
        }
        entry.name.push_str(&name);
        entry.arguments.push_str(&arguments);
    }

    fn finish(&mut self) -> Result<(), AdapterError> {
        self.finished = true;
        if self.chunk_count == 0 {
            return Err(AdapterError::EmptyResponse);
        }
        let wire: Vec<WireToolCall> = std::mem::take(&mut self.tool_calls)
            .into_iter()
            .map(|call| WireToolCall {
                id: call.id,
                kind: Some("function".to_string()),
                function: WireFunctionCall {
                    name: call.name,
                    arguments: call.arguments,
                },
            })
            .collect();
        let tool_calls = MessageAdapter::convert_tool_calls(&wire);
        if !tool_calls.is_empty() {
            self.pending.push_back(Fragment::ToolCalls(tool_calls.clone()));
        }
        let mut response = std::mem::take(&mut self.response);
        response.tool_calls = tool_calls;
        response.thinking = (!self.thinking.is_empty()).then(|| std::mem::take(&mut self.thinking));
        debug!(
            chunks = self.chunk_count,
            bytes = response.content.len(),
            tool_calls = response.tool_calls.len(),
            "Streamed response complete"
        );
        self.pending.push_back(Fragment::Done(response));
        Ok(())
    }
}

/// Turn raw chunks into fragments ending with a single `Done`.
pub fn assemble(chunks: ChunkStream) -> FragmentStream {
    let assembler = Assembler {
        chunks,
        pending: VecDeque::new(),
        response: FinalResponse::default(),
        thinking: String::new(),
        tool_calls: Vec::new(),
        chunk_count: 0,
        finished: false,
    };
    stream::unfold(assembler, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.finished {
                return None;
            }
            match state.chunks.next().await {
                Some(Ok(chunk)) => state.absorb(chunk),
                Some(Err(err)) => {
                    state.finished = true;
                    return Some((Err(err.into()), state));
                }
                None => {
                    if let Err(err) = state.finish() {
                        return Some((Err(err), state));
                    }
                }
            }
        }
    })
    .boxed()
}

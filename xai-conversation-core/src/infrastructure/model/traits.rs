//! Model traits

use super::types::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, ImageGenerationRequest,
    ImageGenerationResponse, LanguageModel, XaiError,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Streamed chat completion chunks, in arrival order
pub type ChunkStream = BoxStream<'static, Result<ChatCompletionChunk, XaiError>>;

/// The calls the adapter needs from the xAI API.
///
/// Implementations must not retry on their own; every error is returned to
/// the caller as-is.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Identifier used in logs
    fn id(&self) -> &str;

    /// Non-streamed chat completion
    async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletion, XaiError>;

    /// Streamed chat completion. Errors known before the first chunk (bad
    /// key, throttling) are returned here rather than inside the stream.
    async fn stream(&self, request: ChatCompletionRequest) -> Result<ChunkStream, XaiError>;

    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, XaiError>;

    async fn list_language_models(&self) -> Result<Vec<LanguageModel>, XaiError>;
}

//! HTTP client for the xAI REST API

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::stream::{open_chunk_stream, parse_retry_after};
use super::traits::{ChatBackend, ChunkStream};
use super::types::{
    ChatCompletion, ChatCompletionRequest, ImageGenerationRequest, ImageGenerationResponse,
    LanguageModel, LanguageModelList, StreamOptions, XaiError,
};
use crate::config::AppConfig;
use crate::constants::{
    CHAT_COMPLETIONS_PATH, CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
    IMAGE_GENERATIONS_PATH, LANGUAGE_MODELS_PATH,
};

const CLIENT_ID: &str = "xai";

/// Authenticated client for `api.x.ai` (or a compatible endpoint)
#[derive(Clone)]
pub struct XaiClient {
    id: String,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    http: Client,
}

impl fmt::Debug for XaiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XaiClient")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl XaiClient {
    /// Client for the public endpoint with the default timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self, XaiError> {
        Self::with_endpoint(
            api_key,
            DEFAULT_ENDPOINT,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, XaiError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(XaiError::network)?;
        Ok(Self {
            id: CLIENT_ID.to_string(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout,
            http,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, XaiError> {
        Self::with_endpoint(config.api_key.clone(), config.endpoint.clone(), config.timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Check the API key by listing the models it can use.
    pub async fn validate(&self) -> Result<Vec<LanguageModel>, XaiError> {
        let models = self.list_language_models().await?;
        info!(
            provider = self.id.as_str(),
            models = models.len(),
            "xAI API key validated"
        );
        Ok(models)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn post_json<Req, Res>(&self, path: &str, body: &Req) -> Result<Res, XaiError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let url = self.build_url(path);
        let response = self
            .authorized(self.http.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(XaiError::network)?;
        read_json(response).await
    }

    async fn get_json<Res>(&self, path: &str) -> Result<Res, XaiError>
    where
        Res: DeserializeOwned,
    {
        let url = self.build_url(path);
        let response = self
            .authorized(self.http.get(&url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(XaiError::network)?;
        read_json(response).await
    }
}

async fn read_json<Res: DeserializeOwned>(response: Response) -> Result<Res, XaiError> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "xAI request failed");
        return Err(XaiError::from_status(status, retry_after, &body));
    }
    let bytes = response.bytes().await.map_err(XaiError::network)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| XaiError::invalid_response(format!("unexpected response body: {err}")))
}

#[async_trait]
impl ChatBackend for XaiClient {
    fn id(&self) -> &str {
        &self.id
    }

    async fn complete(&self, mut request: ChatCompletionRequest) -> Result<ChatCompletion, XaiError> {
        request.stream = false;
        request.stream_options = None;
        info!(
            provider = self.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending chat completion to xAI"
        );
        let completion: ChatCompletion = self.post_json(CHAT_COMPLETIONS_PATH, &request).await?;
        debug!(choices = completion.choices.len(), "Received chat completion from xAI");
        Ok(completion)
    }

    async fn stream(&self, mut request: ChatCompletionRequest) -> Result<ChunkStream, XaiError> {
        request.stream = true;
        request.stream_options = Some(StreamOptions { include_usage: true });
        info!(
            provider = self.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Streaming chat completion from xAI"
        );
        // Streamed responses only carry the connect timeout.
        let builder = self
            .authorized(self.http.post(self.build_url(CHAT_COMPLETIONS_PATH)))
            .json(&request);
        open_chunk_stream(builder).await
    }

    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, XaiError> {
        info!(
            provider = self.id.as_str(),
            model = request.model.as_str(),
            "Requesting image generation from xAI"
        );
        self.post_json(IMAGE_GENERATIONS_PATH, &request).await
    }

    async fn list_language_models(&self) -> Result<Vec<LanguageModel>, XaiError> {
        let list: LanguageModelList = self.get_json(LANGUAGE_MODELS_PATH).await?;
        debug!(models = list.models.len(), "Listed xAI language models");
        Ok(list.models)
    }
}

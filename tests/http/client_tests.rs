// HTTP client tests - XaiClient against a local stub of the xAI API

#[path = "../support/mod.rs"]
mod support;

use axum::Router;
use axum::extract::Json;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use support::options_for;
use xai_conversation_core::adapter::{ConversationTurn, Fragment, RequestAdapter, TurnOutput};
use xai_conversation_core::model::types::{ChatCompletionRequest, ImageGenerationRequest};
use xai_conversation_core::model::{ChatBackend, XaiClient, XaiError};
use xai_conversation_core::types::Content;

const API_KEY: &str = "test-key";

const SSE_BODY: &str = concat!(
    "data: {\"id\":\"s1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Hel\"}}]}\n\n",
    "data: {\"id\":\"s1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"},\"finish_reason\":\"stop\"}]}\n\n",
    "data: {\"id\":\"s1\",\"choices\":[],\"usage\":{\"prompt_tokens\":5,\"completion_tokens\":2,\"total_tokens\":7}}\n\n",
    "data: [DONE]\n\n",
);

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {API_KEY}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Incorrect API key provided"})),
    )
        .into_response()
}

async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["user"] == "rate-limit" {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "12")],
            Json(json!({"error": {"message": "Too many requests"}})),
        )
            .into_response();
    }
    if body["stream"] == true {
        if body["stream_options"]["include_usage"] != true {
            return (StatusCode::BAD_REQUEST, "usage not requested").into_response();
        }
        let events = if body["user"] == "keep-alive" {
            format!("data:  \n\n{SSE_BODY}")
        } else {
            SSE_BODY.to_string()
        };
        return ([(header::CONTENT_TYPE, "text/event-stream")], events).into_response();
    }
    Json(json!({
        "id": "c1",
        "model": body["model"],
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 4, "completion_tokens": 1, "total_tokens": 5}
    }))
    .into_response()
}

async fn image_generations(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["response_format"] != "b64_json" || body["n"] != 1 {
        return (StatusCode::BAD_REQUEST, "expected one base64 image").into_response();
    }
    Json(json!({"data": [{"b64_json": "iVBORw0KGgo=", "revised_prompt": "a cat"}]})).into_response()
}

async fn language_models(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"models": [
        {"id": "grok-4", "aliases": ["grok-4-latest"]},
        {"id": "grok-3-mini"}
    ]}))
    .into_response()
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/images/generations", post(image_generations))
        .route("/v1/language-models", get(language_models));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let address = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });
    format!("http://{address}")
}

async fn client(api_key: &str) -> XaiClient {
    let endpoint = spawn_stub().await;
    XaiClient::with_endpoint(api_key, endpoint, Duration::from_secs(5)).expect("client")
}

fn hello_request() -> ChatCompletionRequest {
    ChatCompletionRequest::new("grok-4", vec![json!({"role": "user", "content": "hi"})])
}

#[tokio::test]
async fn completion_round_trip() {
    let client = client(API_KEY).await;
    let completion = client.complete(hello_request()).await.expect("completion");
    assert_eq!(completion.id.as_deref(), Some("c1"));
    assert_eq!(completion.choices[0].message.content.as_deref(), Some("Hello"));
    assert_eq!(completion.usage.map(|usage| usage.total_tokens), Some(5));
}

#[tokio::test]
async fn rejected_key_is_an_auth_error() {
    let client = client("wrong-key").await;
    let err = client.complete(hello_request()).await.expect_err("auth error");
    assert!(err.is_auth(), "{err:?}");
    assert!(matches!(err, XaiError::Auth { status: 401, ref message } if message == "Incorrect API key provided"));
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let client = client(API_KEY).await;
    let mut request = hello_request();
    request.user = Some("rate-limit".into());

    let err = client.complete(request).await.expect_err("rate limited");
    assert!(matches!(
        err,
        XaiError::RateLimited {
            retry_after: Some(12),
            ..
        }
    ));
    assert!(err.user_message().contains("12 seconds"));
}

#[tokio::test]
async fn event_stream_is_read_until_done() {
    let client = client(API_KEY).await;
    let chunks: Vec<_> = client
        .stream(hello_request())
        .await
        .expect("stream")
        .collect()
        .await;

    assert_eq!(chunks.len(), 3);
    let chunks: Vec<_> = chunks.into_iter().map(|chunk| chunk.expect("chunk")).collect();
    assert_eq!(chunks[0].choices[0].delta.content.as_deref(), Some("Hel"));
    assert_eq!(chunks[1].choices[0].finish_reason.as_deref(), Some("stop"));
    assert_eq!(chunks[2].usage.map(|usage| usage.total_tokens), Some(7));
}

#[tokio::test]
async fn blank_leading_event_is_skipped() {
    let client = client(API_KEY).await;
    let mut request = hello_request();
    request.user = Some("keep-alive".into());

    let chunks: Vec<_> = client
        .stream(request)
        .await
        .expect("stream")
        .map(|chunk| chunk.expect("chunk"))
        .collect()
        .await;
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].choices[0].delta.content.as_deref(), Some("Hel"));
}

#[tokio::test]
async fn stream_with_rejected_key_fails_before_any_chunk() {
    let client = client("wrong-key").await;
    match client.stream(hello_request()).await {
        Err(err) => assert!(err.is_auth(), "{err:?}"),
        Ok(_) => panic!("expected an auth error"),
    }
}

#[tokio::test]
async fn adapter_streams_fragments_over_http() {
    let adapter = RequestAdapter::new(client(API_KEY).await);
    let mut options = options_for("grok-4");
    options.stream = true;
    let turn = ConversationTurn::from_messages(vec![Content::user("hi")]).with_conversation_id("conv-1");

    let output = adapter.send_conversation_turn(&options, &turn).await.expect("turn");
    let TurnOutput::Streaming(fragments) = output else {
        panic!("expected a fragment stream");
    };
    let fragments: Vec<Fragment> = fragments
        .map(|fragment| fragment.expect("fragment"))
        .collect()
        .await;

    assert_eq!(fragments[0], Fragment::Text { offset: 0, text: "Hel".into() });
    assert_eq!(fragments[1], Fragment::Text { offset: 3, text: "lo".into() });
    let Some(Fragment::Done(response)) = fragments.last() else {
        panic!("expected Done last");
    };
    assert_eq!(response.content, "Hello");
    assert_eq!(response.usage.map(|usage| usage.total_tokens), Some(7));
}

#[tokio::test]
async fn image_generation_returns_base64_payload() {
    let client = client(API_KEY).await;
    let response = client
        .generate_image(ImageGenerationRequest::base64("grok-2-image", "a cat"))
        .await
        .expect("image");
    assert_eq!(response.data[0].b64_json.as_deref(), Some("iVBORw0KGgo="));
    assert_eq!(response.data[0].revised_prompt.as_deref(), Some("a cat"));
}

#[tokio::test]
async fn validate_lists_available_models() {
    let client = client(API_KEY).await;
    let models = client.validate().await.expect("models");
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].aliases, vec!["grok-4-latest".to_string()]);
    assert!(models[1].aliases.is_empty());

    let rejected = client_with_key_for(&client, "wrong-key").validate().await;
    assert!(rejected.expect_err("auth error").is_auth());
}

fn client_with_key_for(client: &XaiClient, api_key: &str) -> XaiClient {
    XaiClient::with_endpoint(api_key, client.endpoint(), Duration::from_secs(5)).expect("client")
}

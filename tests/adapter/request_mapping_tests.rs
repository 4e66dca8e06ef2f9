// Request mapping tests - agent options and chat logs to xAI request bodies

#[path = "../support/mod.rs"]
mod support;

use serde_json::json;
use std::fs;
use support::{ScriptedBackend, options_for, request_json, text_completion};
use tempfile::tempdir;
use xai_conversation_core::adapter::{AdapterError, ConversationTurn, RequestAdapter};
use xai_conversation_core::config::{Capability, XAI_MODELS};
use xai_conversation_core::types::{Attachment, Content, ConversationInput, ToolSpec};

#[tokio::test]
async fn every_chat_model_gets_only_the_features_it_supports() {
    for model in XAI_MODELS.iter().filter(|model| model.supports(Capability::Chat)) {
        let backend = ScriptedBackend::new(vec![text_completion("ok")]);
        let adapter = RequestAdapter::new(backend.clone());
        let turn = ConversationTurn::from_messages(vec![Content::user("hello")]);

        adapter
            .send_conversation_turn(&options_for(model.id), &turn)
            .await
            .unwrap_or_else(|err| panic!("{}: {err}", model.id));

        let requests = backend.chat_requests().await;
        let body = request_json(&requests[0]);
        assert_eq!(body["model"], model.id);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["top_p"], 1.0);
        assert_eq!(body["stream"], false);

        if model.supports(Capability::ReasoningEffort) {
            assert_eq!(body["reasoning_effort"], "low", "{}", model.id);
        } else {
            assert!(body.get("reasoning_effort").is_none(), "{}", model.id);
        }
        if model.supports(Capability::LiveSearch) {
            assert_eq!(
                body["search_parameters"],
                json!({"mode": "on", "max_search_results": 5}),
                "{}",
                model.id
            );
        } else {
            assert!(body.get("search_parameters").is_none(), "{}", model.id);
        }
    }
}

#[tokio::test]
async fn image_model_cannot_chat_and_nothing_is_sent() {
    let backend = ScriptedBackend::new(Vec::new());
    let adapter = RequestAdapter::new(backend.clone());
    let turn = ConversationTurn::from_messages(vec![Content::user("hello")]);

    let err = adapter
        .send_conversation_turn(&options_for("grok-2-image"), &turn)
        .await
        .err()
        .expect("capability mismatch");
    assert!(matches!(
        err,
        AdapterError::CapabilityMismatch {
            capability: Capability::Chat,
            ..
        }
    ));
    assert_eq!(backend.call_count().await, 0);
}

#[tokio::test]
async fn live_search_off_sends_no_result_count() {
    let backend = ScriptedBackend::new(vec![text_completion("ok")]);
    let adapter = RequestAdapter::new(backend.clone());
    let mut options = options_for("grok-4");
    options.live_search = false;

    adapter
        .send_conversation_turn(&options, &ConversationTurn::from_messages(vec![Content::user("hi")]))
        .await
        .expect("turn");

    let body = request_json(&backend.chat_requests().await[0]);
    assert_eq!(body["search_parameters"], json!({"mode": "off"}));
}

#[tokio::test]
async fn history_tools_and_conversation_id_are_mapped() {
    let backend = ScriptedBackend::new(vec![text_completion("done")]);
    let adapter = RequestAdapter::new(backend.clone());
    let options = options_for("grok-3").with_prompt("You control a smart home.");
    let history = vec![Content::user("What time is it?"), Content::assistant("It is noon.")];
    let input = ConversationInput::new("Turn on the lights").with_conversation_id("conv-42");
    let tools = vec![ToolSpec {
        name: "HassTurnOn".into(),
        description: Some("Turn on a device".into()),
        parameters: json!({"type": "object", "properties": {"name": {"type": "string"}}}),
    }];
    let turn = ConversationTurn::new(history, &input).with_tools(tools);

    adapter.send_conversation_turn(&options, &turn).await.expect("turn");

    let body = request_json(&backend.chat_requests().await[0]);
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "You control a smart home."},
            {"role": "user", "content": "What time is it?"},
            {"role": "assistant", "content": "It is noon."},
            {"role": "user", "content": "Turn on the lights"}
        ])
    );
    assert_eq!(body["user"], "conv-42");
    assert_eq!(body["parallel_tool_calls"], true);
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "HassTurnOn");
}

#[tokio::test]
async fn attachments_need_a_vision_model() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("photo.png");
    fs::write(&path, [0x89, b'P', b'N', b'G']).expect("write image");

    let backend = ScriptedBackend::new(Vec::new());
    let adapter = RequestAdapter::new(backend.clone());
    let turn = ConversationTurn::from_messages(vec![Content::user_with_attachments(
        "What is this?",
        vec![Attachment::from_path(&path)],
    )]);

    let err = adapter
        .send_conversation_turn(&options_for("grok-3"), &turn)
        .await
        .err()
        .expect("capability mismatch");
    assert!(matches!(
        err,
        AdapterError::CapabilityMismatch {
            capability: Capability::Vision,
            ..
        }
    ));
    assert_eq!(backend.call_count().await, 0);
}

#[tokio::test]
async fn vision_model_receives_image_as_data_uri() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("photo.png");
    fs::write(&path, [0x89, b'P', b'N', b'G']).expect("write image");

    let backend = ScriptedBackend::new(vec![text_completion("A cat.")]);
    let adapter = RequestAdapter::new(backend.clone());
    let turn = ConversationTurn::from_messages(vec![Content::user_with_attachments(
        "What is this?",
        vec![Attachment::from_path(&path)],
    )]);

    adapter
        .send_conversation_turn(&options_for("grok-2-vision"), &turn)
        .await
        .expect("turn");

    let body = request_json(&backend.chat_requests().await[0]);
    let user = body["messages"]
        .as_array()
        .and_then(|messages| messages.iter().find(|message| message["role"] == "user"))
        .expect("user message")
        .clone();
    assert_eq!(
        user["content"],
        json!([
            {"type": "text", "text": "What is this?"},
            {"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBORw==", "detail": "auto"}}
        ])
    );
}

#[tokio::test]
async fn missing_and_non_image_attachments_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "hello").expect("write notes");

    let adapter = RequestAdapter::new(ScriptedBackend::new(Vec::new()));
    let options = options_for("grok-4");

    let not_image = ConversationTurn::from_messages(vec![Content::user_with_attachments(
        "Read this",
        vec![Attachment::from_path(&notes)],
    )]);
    let err = adapter.send_conversation_turn(&options, &not_image).await.err().expect("error");
    assert!(matches!(err, AdapterError::Attachment(_)));

    let missing = ConversationTurn::from_messages(vec![Content::user_with_attachments(
        "Look",
        vec![Attachment::from_path(dir.path().join("gone.png"))],
    )]);
    let err = adapter.send_conversation_turn(&options, &missing).await.err().expect("error");
    assert!(matches!(err, AdapterError::Attachment(_)));
}

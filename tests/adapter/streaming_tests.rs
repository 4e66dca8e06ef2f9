// Streaming tests - how turns are relayed in streamed and non-streamed mode

#[path = "../support/mod.rs"]
mod support;

use futures::StreamExt;
use serde_json::json;
use support::{Scripted, ScriptedBackend, options_for, request_json, text_chunks, text_completion};
use xai_conversation_core::adapter::{ConversationTurn, Fragment, RequestAdapter, TurnOutput};
use xai_conversation_core::types::{Content, ToolInput};

fn turn() -> ConversationTurn {
    ConversationTurn::from_messages(vec![Content::user("Tell me a story")])
}

#[tokio::test]
async fn non_streamed_turn_yields_one_final_response() {
    let backend = ScriptedBackend::new(vec![text_completion("Once upon a time.")]);
    let adapter = RequestAdapter::new(backend.clone());

    let output = adapter
        .send_conversation_turn(&options_for("grok-4"), &turn())
        .await
        .expect("turn");
    let TurnOutput::Final(response) = output else {
        panic!("expected a final response");
    };
    assert_eq!(response.content, "Once upon a time.");
    assert_eq!(response.usage.map(|usage| usage.total_tokens), Some(15));

    let body = request_json(&backend.chat_requests().await[0]);
    assert_eq!(body["stream"], false);
}

#[tokio::test]
async fn streamed_fragments_have_increasing_offsets_and_one_done() {
    let backend = ScriptedBackend::new(vec![text_chunks(&["Once ", "upon ", "a ", "time."])]);
    let adapter = RequestAdapter::new(backend.clone());
    let mut options = options_for("grok-4");
    options.stream = true;

    let output = adapter.send_conversation_turn(&options, &turn()).await.expect("turn");
    let TurnOutput::Streaming(fragments) = output else {
        panic!("expected a fragment stream");
    };
    let fragments: Vec<Fragment> = fragments
        .map(|fragment| fragment.expect("fragment"))
        .collect()
        .await;

    let mut next_offset = 0;
    let mut text = String::new();
    let mut done = 0;
    for fragment in &fragments {
        match fragment {
            Fragment::Text { offset, text: piece } => {
                assert_eq!(done, 0, "text after Done");
                assert_eq!(*offset, next_offset);
                next_offset += piece.len();
                text.push_str(piece);
            }
            Fragment::Done(response) => {
                done += 1;
                assert_eq!(response.content, text);
            }
            other => panic!("unexpected fragment {other:?}"),
        }
    }
    assert_eq!(done, 1);
    assert!(matches!(fragments.last(), Some(Fragment::Done(_))));
    assert_eq!(text, "Once upon a time.");

    let body = request_json(&backend.chat_requests().await[0]);
    assert_eq!(body["stream"], true);
}

#[tokio::test]
async fn streamed_tool_calls_arrive_before_done() {
    let chunks = vec![
        serde_json::from_value(json!({
            "id": "resp-2",
            "choices": [{"index": 0, "delta": {"tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "HassTurnOn", "arguments": "{\"name\":\"kitchen\"}"}
            }]}, "finish_reason": "tool_calls"}]
        }))
        .expect("chunk"),
    ];
    let backend = ScriptedBackend::new(vec![Scripted::Chunks(chunks)]);
    let adapter = RequestAdapter::new(backend);
    let mut options = options_for("grok-4");
    options.stream = true;

    let output = adapter.send_conversation_turn(&options, &turn()).await.expect("turn");
    let TurnOutput::Streaming(fragments) = output else {
        panic!("expected a fragment stream");
    };
    let fragments: Vec<Fragment> = fragments
        .map(|fragment| fragment.expect("fragment"))
        .collect()
        .await;

    let expected = vec![ToolInput::with_id("call_1", "HassTurnOn", json!({"name": "kitchen"}))];
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0], Fragment::ToolCalls(expected.clone()));
    let Fragment::Done(response) = &fragments[1] else {
        panic!("expected Done");
    };
    assert_eq!(response.tool_calls, expected);
    assert_eq!(response.finish_reason.as_deref(), Some("tool_calls"));
}

#[tokio::test]
async fn into_final_drains_a_stream() {
    let backend = ScriptedBackend::new(vec![text_chunks(&["Hi", " there"])]);
    let adapter = RequestAdapter::new(backend);
    let mut options = options_for("grok-3");
    options.stream = true;

    let response = adapter
        .send_conversation_turn(&options, &turn())
        .await
        .expect("turn")
        .into_final()
        .await
        .expect("final");
    assert_eq!(response.content, "Hi there");
    assert!(!response.has_tool_calls());
}

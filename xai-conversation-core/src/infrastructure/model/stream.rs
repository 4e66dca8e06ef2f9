//! Server-sent events to chunk stream

use futures::StreamExt;
use futures::stream;
use reqwest::RequestBuilder;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::{Error as EventSourceError, Event, EventSource};
use tracing::{debug, warn};

use super::traits::ChunkStream;
use super::types::{ChatCompletionChunk, XaiError};
use crate::constants::STREAM_DONE_MARKER;

struct EventChunks {
    source: EventSource,
    first: Option<ChatCompletionChunk>,
}

/// Send `builder` and return its events as parsed chunks.
///
/// Waits for the response head so that HTTP errors surface here. The
/// connection is never re-opened.
pub(crate) async fn open_chunk_stream(builder: RequestBuilder) -> Result<ChunkStream, XaiError> {
    let mut source = EventSource::new(builder)
        .map_err(|err| XaiError::invalid_response(format!("request cannot be streamed: {err}")))?;
    source.set_retry_policy(Box::new(Never));

    let mut first = None;
    loop {
        match source.next().await {
            Some(Ok(Event::Open)) => break,
            Some(Ok(Event::Message(message))) => {
                // reqwest-eventsource normally reports Open first.
                match parse_event_data(&message.data) {
                    Ok(EventData::Chunk(chunk)) => {
                        first = Some(chunk);
                        break;
                    }
                    Ok(EventData::Blank | EventData::Done) => continue,
                    Err(err) => {
                        source.close();
                        return Err(err);
                    }
                }
            }
            Some(Err(EventSourceError::StreamEnded)) | None => {
                source.close();
                return Err(XaiError::invalid_response("event stream closed before it opened"));
            }
            Some(Err(err)) => {
                source.close();
                return Err(into_xai_error(err).await);
            }
        }
    }
    debug!("Event stream opened");

    let chunks = stream::unfold(Some(EventChunks { source, first }), |state| async move {
        let mut state = state?;
        if let Some(chunk) = state.first.take() {
            return Some((Ok(chunk), Some(state)));
        }
        loop {
            match state.source.next().await {
                Some(Ok(Event::Open)) => continue,
                Some(Ok(Event::Message(message))) => {
                    match parse_event_data(&message.data) {
                        Ok(EventData::Chunk(chunk)) => return Some((Ok(chunk), Some(state))),
                        Ok(EventData::Blank) => continue,
                        Ok(EventData::Done) => {
                            state.source.close();
                            return None;
                        }
                        Err(err) => {
                            state.source.close();
                            return Some((Err(err), None));
                        }
                    }
                }
                Some(Err(EventSourceError::StreamEnded)) | None => {
                    state.source.close();
                    return None;
                }
                Some(Err(err)) => {
                    state.source.close();
                    return Some((Err(into_xai_error(err).await), None));
                }
            }
        }
    });

    Ok(chunks.boxed())
}

/// Payload of one server-sent event
#[derive(Debug)]
enum EventData {
    Chunk(ChatCompletionChunk),
    /// Keep-alive or empty event
    Blank,
    /// The end-of-stream marker
    Done,
}

fn parse_event_data(data: &str) -> Result<EventData, XaiError> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(EventData::Blank);
    }
    if data == STREAM_DONE_MARKER {
        return Ok(EventData::Done);
    }
    serde_json::from_str(data)
        .map(EventData::Chunk)
        .map_err(|err| XaiError::invalid_response(format!("malformed stream chunk: {err}")))
}

async fn into_xai_error(err: EventSourceError) -> XaiError {
    match err {
        EventSourceError::InvalidStatusCode(status, response) => {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "xAI refused the streaming request");
            XaiError::from_status(status, retry_after, &body)
        }
        EventSourceError::InvalidContentType(content_type, response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_success() {
                XaiError::invalid_response(format!(
                    "expected an event stream, got content type {content_type:?}"
                ))
            } else {
                XaiError::from_status(status, None, &body)
            }
        }
        EventSourceError::Transport(source) => XaiError::network(source),
        other => XaiError::invalid_response(other.to_string()),
    }
}

pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

//! SSE streaming endpoint for note events.
//!
//! GET /api/streams/community-notes
//!
//! Emits `connected` once, then one SSE event per note event, named after the
//! payload's `event` field (`noteSubmitted`, `noteUpdated`). A subscriber that
//! falls behind the hub's buffer gets a `lagged` event with the number of
//! events it missed and should refetch the pending list.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::domains::community_notes::events::NOTES_TOPIC;
use crate::server::app::AxumAppState;

pub async fn note_stream_handler(
    State(state): State<AxumAppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.deps.stream_hub.subscribe(NOTES_TOPIC).await;

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });

    let events = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(value) => {
                let event_name = value
                    .get("event")
                    .and_then(|name| name.as_str())
                    .unwrap_or("message");
                Event::default()
                    .event(event_name)
                    .json_data(&value)
                    .ok()
                    .map(Ok)
            }
            Err(BroadcastStreamRecvError::Lagged(missed)) => Event::default()
                .event("lagged")
                .json_data(serde_json::json!({ "missed": missed }))
                .ok()
                .map(Ok),
        }
    });

    Sse::new(connected.chain(events)).keep_alive(KeepAlive::default())
}

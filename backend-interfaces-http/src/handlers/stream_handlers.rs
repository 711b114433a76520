use std::convert::Infallible;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use backend_application::AppState;
use backend_domain::RealtimeMessage;

/// SSE frame named after the realtime event so browsers can `addEventListener` per kind.
pub fn sse_frame(message: &RealtimeMessage) -> Option<Event> {
    let data = serde_json::to_string(message)
        .map_err(|err| warn!("failed to serialize realtime message: {}", err))
        .ok()?;
    Some(
        Event::default()
            .event(message.event.as_str())
            .id(message.id.to_string())
            .data(data),
    )
}

pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.hub.subscribe();
    debug!(clients = state.hub.receiver_count(), "sse client connected");
    let stream = BroadcastStream::new(receiver).filter_map(|item| async move {
        match item {
            Ok(message) => sse_frame(&message).map(Ok),
            Err(err) => {
                warn!("sse client lagged: {}", err);
                None
            }
        }
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(state.config.keepalive_seconds.max(1))),
    )
}

pub async fn stream_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| relay_to_socket(socket, state))
}

/// Forwards hub messages as text frames until either side goes away.
async fn relay_to_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut incoming) = socket.split();
    let mut receiver = state.hub.subscribe();
    debug!(clients = state.hub.receiver_count(), "ws client connected");
    loop {
        tokio::select! {
            message = receiver.recv() => match message {
                Ok(message) => {
                    let text = match serde_json::to_string(&message) {
                        Ok(text) => text,
                        Err(err) => {
                            warn!("failed to serialize realtime message: {}", err);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "ws client lagged");
                }
                Err(RecvError::Closed) => break,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Ping(payload))) => {
                    if sender.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("ws client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::BroadcastKind;
    use serde_json::json;

    #[test]
    fn sse_frame_is_named_after_the_event() {
        let message = RealtimeMessage::new(BroadcastKind::PrizeDraw, json!({"prizeId": 1}));
        assert!(sse_frame(&message).is_some());
    }
}

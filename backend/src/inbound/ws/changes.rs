//! Advisory change feed over WebSocket.
//!
//! Domain services publish [`ChangeEvent`]s through the [`EventPublisher`]
//! port; this adapter fans them out to every connected client as JSON text
//! frames. Delivery is best-effort: a lagging subscriber skips events and
//! clients re-read authoritative state over HTTP.

use actix_web::{HttpRequest, HttpResponse, get, web};
use actix_ws::Message;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::domain::ChangeEvent;
use crate::domain::ports::EventPublisher;

/// Default capacity of the broadcast ring buffer.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out hub between domain services and WebSocket subscribers.
///
/// Cloning shares the underlying channel, so one instance can serve as the
/// services' publisher and the handlers' subscription source.
#[derive(Clone)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ChangeBroadcaster {
    /// Build a broadcaster retaining up to `capacity` undelivered events per
    /// subscriber before older ones are dropped.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Open a subscription receiving events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for ChangeBroadcaster {
    fn publish(&self, event: ChangeEvent) {
        // Send fails only when no subscriber is connected; that is fine.
        let _ = self.sender.send(event);
    }
}

fn frame(event: ChangeEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&event)
}

/// Upgrade to a WebSocket and stream change events until either side closes.
#[get("/ws/changes")]
pub async fn change_feed(
    req: HttpRequest,
    body: web::Payload,
    broadcaster: web::Data<ChangeBroadcaster>,
) -> actix_web::Result<HttpResponse> {
    let (response, mut session, mut message_stream) = actix_ws::handle(&req, body)?;
    let mut events = broadcaster.subscribe();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        let text = match frame(event) {
                            Ok(text) => text,
                            Err(err) => {
                                error!(error = %err, "failed to serialise change event");
                                continue;
                            }
                        };
                        if session.text(text).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "change feed subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                message = message_stream.next() => match message {
                    Some(Ok(Message::Ping(payload))) => {
                        if session.pong(&payload).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        let _ = session.close(reason).await;
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                },
            }
        }
        let _ = session.close(None).await;
    });

    Ok(response)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::ChangedTable;

    #[tokio::test]
    async fn delivers_published_events_to_subscribers() {
        let broadcaster = ChangeBroadcaster::default();
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        let event = ChangeEvent::new(ChangedTable::Offers, Uuid::new_v4());
        broadcaster.publish(event);

        assert_eq!(first.recv().await.expect("first delivery"), event);
        assert_eq!(second.recv().await.expect("second delivery"), event);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_a_no_op() {
        let broadcaster = ChangeBroadcaster::default();
        broadcaster.publish(ChangeEvent::new(ChangedTable::Orders, Uuid::new_v4()));
    }

    #[test]
    fn frames_carry_table_and_id() {
        let id = Uuid::new_v4();
        let text = frame(ChangeEvent::new(ChangedTable::VinylRecords, id)).expect("frame");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["table"], "vinyl_records");
        assert_eq!(value["id"], id.to_string());
    }
}

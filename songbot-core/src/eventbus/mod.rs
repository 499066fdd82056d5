//! src/eventbus/mod.rs
//!
//! In-process event bus with guaranteed delivery to subscribers via
//! bounded MPSC queues. The chat/pubsub transport publishes inbound
//! notifications here; the dispatcher subscribes.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};

use songbot_common::models::redeem::RedemptionEvent;

/// Everything the dispatcher can receive.
#[derive(Debug, Clone)]
pub enum BotEvent {
    RewardRedeemed(RedemptionEvent),
    ChatMessage(ChatMessageEvent),
}

#[derive(Debug, Clone)]
pub struct ChatMessageEvent {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub is_broadcaster: bool,
}

/// Each subscriber gets its own `mpsc::Sender<BotEvent>`.
///
/// - If a subscriber's buffer fills, `publish` awaits until there is
///   space (backpressure).
/// - If a subscriber dropped its receiver, the send error is ignored.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<BotEvent>>>>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    pub shutdown_rx: watch::Receiver<bool>,
}

const DEFAULT_BUFFER_SIZE: usize = 1024;

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: Arc::new(tx),
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<BotEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all subscribers.
    pub async fn publish(&self, event: BotEvent) {
        let senders = {
            let subs = self.subscribers.lock().await;
            subs.clone()
        };
        for sender in senders {
            let _ = sender.send(event.clone()).await;
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, sleep, timeout};

    fn chat_event(text: &str) -> BotEvent {
        BotEvent::ChatMessage(ChatMessageEvent {
            channel: "chan".into(),
            user: "user".into(),
            text: text.into(),
            is_broadcaster: false,
        })
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::new();

        let mut rx1 = bus.subscribe(Some(5)).await;
        let mut rx2 = bus.subscribe(Some(5)).await;

        bus.publish(chat_event("hello")).await;

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.expect("subscriber should get event") {
                BotEvent::ChatMessage(msg) => assert_eq!(msg.text, "hello"),
                other => panic!("wrong event type: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn full_queue_applies_backpressure_without_dropping() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Some(1)).await;

        bus.publish(chat_event("first")).await;

        // read both messages after a short delay so the second publish
        // has to wait for space
        let reader = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            let first = rx.recv().await.expect("expected first message");
            let second = rx.recv().await.expect("expected second message");
            (first, second)
        });

        let publish = bus.publish(chat_event("second"));
        let result = timeout(Duration::from_millis(500), publish).await;
        assert!(result.is_ok(), "publish should eventually unblock");

        let (first, second) = reader.await.unwrap();
        match (first, second) {
            (BotEvent::ChatMessage(a), BotEvent::ChatMessage(b)) => {
                assert_eq!(a.text, "first");
                assert_eq!(b.text, "second");
            }
            other => panic!("wrong event types: {other:?}"),
        }
    }
}

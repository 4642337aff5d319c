//! In-process pub/sub hub for real-time streaming.
//!
//! Topic-keyed broadcast channels that push JSON events to SSE endpoints.
//! The hub knows nothing about what is streamed; domains serialize their own
//! payloads (see `domains::community_notes::events`).
//!
//! # Usage
//!
//! Producers (domain activities):
//!   hub.publish("community_notes", json!({"event": "noteUpdated", ...})).await;
//!
//! Consumers (SSE endpoints):
//!   let rx = hub.subscribe("community_notes").await;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Generic in-process pub/sub hub.
///
/// Thread-safe, cloneable. Every clone shares the same channels, so the hub
/// is created once at startup and handed to whoever needs it.
#[derive(Clone)]
pub struct StreamHub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
    capacity: usize,
}

impl StreamHub {
    /// Create a new StreamHub with default capacity (256 messages per channel).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new StreamHub with the given channel capacity.
    ///
    /// A subscriber that falls more than `capacity` events behind skips ahead
    /// and observes a lag error instead of blocking producers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Publish a JSON value to a topic. No-op if no subscribers.
    pub async fn publish(&self, topic: &str, value: serde_json::Value) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(topic) {
            // Ignore send errors (no active receivers)
            let _ = tx.send(value);
        }
    }

    /// Subscribe to a topic. Creates the channel if it doesn't exist.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        let channels = self.channels.read().await;
        channels.get(topic).map_or(0, |tx| tx.receiver_count())
    }

    /// Remove channels with zero subscribers (housekeeping).
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscriber_receives_published_note_event() {
        let hub = StreamHub::new();
        let mut rx = hub.subscribe("community_notes").await;

        let value = json!({"event": "noteUpdated", "type": "approved", "note": {"id": "n1"}});
        hub.publish("community_notes", value.clone()).await;

        assert_eq!(rx.recv().await.unwrap(), value);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped() {
        let hub = StreamHub::new();
        hub.publish("community_notes", json!({"event": "noteSubmitted"}))
            .await;

        // A late subscriber does not see events published before it joined.
        let mut rx = hub.subscribe("community_notes").await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let hub = StreamHub::new();
        let mut notes = hub.subscribe("community_notes").await;
        let _other = hub.subscribe("other").await;

        hub.publish("other", json!({"event": "ignored"})).await;
        assert!(notes.try_recv().is_err());
    }

    #[tokio::test]
    async fn every_dashboard_gets_a_copy() {
        let hub = StreamHub::new();
        let mut first = hub.subscribe("community_notes").await;
        let mut second = hub.subscribe("community_notes").await;
        assert_eq!(hub.subscriber_count("community_notes").await, 2);

        let value = json!({"event": "noteUpdated", "type": "rejected"});
        hub.publish("community_notes", value.clone()).await;

        assert_eq!(first.recv().await.unwrap(), value);
        assert_eq!(second.recv().await.unwrap(), value);
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let hub = StreamHub::with_capacity(2);
        let mut rx = hub.subscribe("community_notes").await;

        for n in 0..5 {
            hub.publish("community_notes", json!({"n": n})).await;
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(rx.recv().await.unwrap(), json!({"n": 3}));
    }

    #[tokio::test]
    async fn cleanup_removes_abandoned_topics() {
        let hub = StreamHub::new();
        let rx = hub.subscribe("community_notes").await;
        assert_eq!(hub.channels.read().await.len(), 1);

        drop(rx);
        hub.cleanup().await;

        assert_eq!(hub.channels.read().await.len(), 0);
        assert_eq!(hub.subscriber_count("community_notes").await, 0);
    }
}

//! Event publisher trait and in-memory implementation.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::SagaError;

/// A message accepted by a publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub message_id: String,
    pub topic: String,
    pub message: Vec<u8>,
}

/// Trait for announcing saga progress on a topic.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `message` to `topic` and returns the assigned message ID.
    async fn publish(&self, topic: &str, message: &[u8]) -> Result<String, SagaError>;
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn publish(&self, topic: &str, message: &[u8]) -> Result<String, SagaError> {
        (**self).publish(topic, message).await
    }
}

const SUBSCRIBER_CAPACITY: usize = 256;

/// Number of published messages kept by default; older ones are dropped first.
pub const DEFAULT_RETAINED_MESSAGES: usize = 1024;

#[derive(Debug)]
struct InMemoryPublisherState {
    published: VecDeque<PublishedMessage>,
    retention: usize,
    failing: HashSet<String>,
}

impl Default for InMemoryPublisherState {
    fn default() -> Self {
        Self {
            published: VecDeque::new(),
            retention: DEFAULT_RETAINED_MESSAGES,
            failing: HashSet::new(),
        }
    }
}

/// In-memory event publisher.
///
/// Keeps the most recent published messages in order and fans each one
/// out to subscribers. Subscribers that fall behind by more than the
/// channel capacity miss messages.
#[derive(Debug, Clone)]
pub struct InMemoryEventPublisher {
    state: Arc<Mutex<InMemoryPublisherState>>,
    sender: broadcast::Sender<PublishedMessage>,
}

impl InMemoryEventPublisher {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(InMemoryPublisherState::default())),
            sender,
        }
    }

    /// Keeps at most `retention` published messages. Zero keeps none;
    /// subscribers still receive every message.
    pub fn with_retention(self, retention: usize) -> Self {
        {
            let mut state = self.lock();
            state.retention = retention;
            while state.published.len() > retention {
                state.published.pop_front();
            }
        }
        self
    }

    /// Subscribes to every message published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedMessage> {
        self.sender.subscribe()
    }

    /// Configures the publisher to reject messages for `topic`.
    pub fn set_fail_on_topic(&self, topic: &str, fail: bool) {
        let mut state = self.lock();
        if fail {
            state.failing.insert(topic.to_string());
        } else {
            state.failing.remove(topic);
        }
    }

    /// Returns the retained messages in order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.lock().published.iter().cloned().collect()
    }

    /// Returns the topics of published messages in order.
    pub fn topics(&self) -> Vec<String> {
        self.lock()
            .published
            .iter()
            .map(|m| m.topic.clone())
            .collect()
    }

    /// Returns the number of published messages.
    pub fn message_count(&self) -> usize {
        self.lock().published.len()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryPublisherState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, topic: &str, message: &[u8]) -> Result<String, SagaError> {
        let published = {
            let mut state = self.lock();
            if state.failing.contains(topic) {
                return Err(SagaError::Publish {
                    topic: topic.to_string(),
                    reason: "injected failure".to_string(),
                });
            }

            let published = PublishedMessage {
                message_id: Uuid::new_v4().to_string(),
                topic: topic.to_string(),
                message: message.to_vec(),
            };
            if state.retention > 0 {
                while state.published.len() >= state.retention {
                    state.published.pop_front();
                }
                state.published.push_back(published.clone());
            }
            published
        };

        // No subscribers is not an error.
        let _ = self.sender.send(published.clone());

        metrics::counter!("events_published_total", "topic" => topic.to_string()).increment(1);
        Ok(published.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_records_in_order() {
        let publisher = InMemoryEventPublisher::new();
        let first = publisher.publish("A", b"1").await.unwrap();
        let second = publisher.publish("B", b"2").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(publisher.topics(), vec!["A", "B"]);
        assert_eq!(publisher.published()[1].message, b"2");
    }

    #[tokio::test]
    async fn test_subscribers_receive_messages() {
        let publisher = InMemoryEventPublisher::new();
        let mut subscriber = publisher.subscribe();

        let id = publisher.publish("OrderCreation", b"{}").await.unwrap();
        let received = subscriber.recv().await.unwrap();

        assert_eq!(received.message_id, id);
        assert_eq!(received.topic, "OrderCreation");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let publisher = InMemoryEventPublisher::new();
        assert!(publisher.publish("OrderPayment", b"{}").await.is_ok());
        assert_eq!(publisher.message_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_on_topic() {
        let publisher = InMemoryEventPublisher::new();
        publisher.set_fail_on_topic("OrderPayment", true);

        let result = publisher.publish("OrderPayment", b"{}").await;
        assert!(matches!(result, Err(SagaError::Publish { .. })));
        assert_eq!(publisher.message_count(), 0);

        assert!(publisher.publish("OrderShipment", b"{}").await.is_ok());
    }

    #[tokio::test]
    async fn test_retention_drops_oldest() {
        let publisher = InMemoryEventPublisher::new().with_retention(2);
        let mut subscriber = publisher.subscribe();

        for topic in ["A", "B", "C"] {
            publisher.publish(topic, b"{}").await.unwrap();
        }

        assert_eq!(publisher.topics(), vec!["B", "C"]);
        assert_eq!(subscriber.recv().await.unwrap().topic, "A");
    }
}

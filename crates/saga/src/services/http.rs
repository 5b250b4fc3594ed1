//! Step invoker and event publisher that reach remote services over HTTP.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use super::invoker::{StepInvoker, StepOutput};
use super::publisher::EventPublisher;
use crate::error::SagaError;

/// Invokes steps by POSTing the payload to `{base_url}/{step}`.
///
/// The HTTP status becomes the step status code and the response body its
/// payload. One client is shared by every saga, so connections are pooled.
#[derive(Debug, Clone)]
pub struct HttpStepInvoker {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStepInvoker {
    /// Creates an invoker with a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates an invoker over an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Returns the URL a step is invoked at.
    pub fn step_url(&self, step: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), step)
    }
}

#[async_trait]
impl StepInvoker for HttpStepInvoker {
    #[tracing::instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn invoke(&self, step: &str, payload: Vec<u8>) -> Result<StepOutput, SagaError> {
        let invocation_error = |e: reqwest::Error| SagaError::StepInvocation {
            step: step.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .post(self.step_url(step))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(invocation_error)?;

        let status_code = i32::from(response.status().as_u16());
        let body = response.bytes().await.map_err(invocation_error)?;

        tracing::debug!(status_code, "step responded");
        Ok(StepOutput::with_status(status_code, body.to_vec()))
    }
}

/// Publishes events by POSTing the message to `{base_url}/{topic}`.
///
/// Any 2xx answer is an acceptance and must carry the assigned ID as
/// `{"MessageId": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpEventPublisher {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PublishReceipt {
    #[serde(rename = "MessageId", alias = "messageId")]
    message_id: String,
}

impl HttpEventPublisher {
    /// Creates a publisher with a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a publisher over an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Returns the URL a topic is published at.
    pub fn topic_url(&self, topic: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), topic)
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    #[tracing::instrument(skip(self, message), fields(bytes = message.len()))]
    async fn publish(&self, topic: &str, message: &[u8]) -> Result<String, SagaError> {
        let publish_error = |reason: String| SagaError::Publish {
            topic: topic.to_string(),
            reason,
        };

        let response = self
            .client
            .post(self.topic_url(topic))
            .header(CONTENT_TYPE, "application/json")
            .body(message.to_vec())
            .send()
            .await
            .map_err(|e| publish_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(publish_error(format!(
                "endpoint answered with status code {}",
                status.as_u16()
            )));
        }

        let receipt: PublishReceipt = response
            .json()
            .await
            .map_err(|e| publish_error(format!("unreadable receipt: {e}")))?;

        metrics::counter!("events_published_total", "topic" => topic.to_string()).increment(1);
        tracing::debug!(message_id = %receipt.message_id, "event published");
        Ok(receipt.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_url_joins_without_double_slash() {
        let invoker = HttpStepInvoker::new("http://steps.local/");
        assert_eq!(
            invoker.step_url("validateOrder"),
            "http://steps.local/validateOrder"
        );

        let invoker = HttpStepInvoker::new("http://steps.local/v1");
        assert_eq!(invoker.step_url("shipment"), "http://steps.local/v1/shipment");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_invocation_error() {
        let invoker = HttpStepInvoker::new("http://127.0.0.1:1");
        let result = invoker.invoke("validateOrder", b"{}".to_vec()).await;

        match result {
            Err(SagaError::StepInvocation { step, .. }) => assert_eq!(step, "validateOrder"),
            other => panic!("Expected StepInvocation, got {other:?}"),
        }
    }

    #[test]
    fn test_topic_url_joins_without_double_slash() {
        let publisher = HttpEventPublisher::new("http://events.local/");
        assert_eq!(
            publisher.topic_url("OrderCreation"),
            "http://events.local/OrderCreation"
        );
    }

    #[test]
    fn test_receipt_accepts_either_id_spelling() {
        let receipt: PublishReceipt = serde_json::from_str(r#"{"MessageId":"m-1"}"#).unwrap();
        assert_eq!(receipt.message_id, "m-1");

        let receipt: PublishReceipt = serde_json::from_str(r#"{"messageId":"m-2"}"#).unwrap();
        assert_eq!(receipt.message_id, "m-2");
    }

    #[tokio::test]
    async fn test_unreachable_publish_endpoint_is_publish_error() {
        let publisher = HttpEventPublisher::new("http://127.0.0.1:1");
        let result = publisher.publish("OrderPayment", b"{}").await;

        match result {
            Err(SagaError::Publish { topic, .. }) => assert_eq!(topic, "OrderPayment"),
            other => panic!("Expected Publish, got {other:?}"),
        }
    }
}

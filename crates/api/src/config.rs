//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use saga::{CompensationPolicy, PendingPolicy, SagaConfig, Topics};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `STEP_ENDPOINT`: base URL of the remote steps (simulated when unset)
/// - `PUBLISH_ENDPOINT`: base URL of the topic publisher (in-memory when unset)
/// - `DATABASE_URL`: PostgreSQL ledger (in-memory when unset)
/// - `ORDER_CREATION_TOPIC`, `ORDER_PAYMENT_TOPIC`, `ORDER_SHIPMENT_TOPIC`
/// - `SAGA_COMPENSATION`: `enabled` or `disabled` (default)
/// - `PAYMENT_PENDING_RECHECKS`: charge re-checks on pending (default: `0`)
/// - `PAYMENT_PENDING_DELAY_MS`: delay between re-checks (default: `1000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub step_endpoint: Option<String>,
    pub publish_endpoint: Option<String>,
    pub database_url: Option<String>,
    pub topics: Topics,
    pub compensation: CompensationPolicy,
    pub pending_rechecks: u32,
    pub pending_delay: Duration,
}

const DEFAULT_PENDING_DELAY_MS: u64 = 1000;

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| non_empty(&lookup, key);

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            step_endpoint: var("STEP_ENDPOINT"),
            publish_endpoint: var("PUBLISH_ENDPOINT"),
            database_url: var("DATABASE_URL"),
            topics: Topics {
                order_creation: var("ORDER_CREATION_TOPIC")
                    .unwrap_or(defaults.topics.order_creation),
                order_payment: var("ORDER_PAYMENT_TOPIC")
                    .unwrap_or(defaults.topics.order_payment),
                order_shipment: var("ORDER_SHIPMENT_TOPIC")
                    .unwrap_or(defaults.topics.order_shipment),
            },
            compensation: compensation(&lookup).unwrap_or(defaults.compensation),
            pending_rechecks: parsed(&lookup, "PAYMENT_PENDING_RECHECKS")
                .unwrap_or(defaults.pending_rechecks),
            pending_delay: parsed::<u64>(&lookup, "PAYMENT_PENDING_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.pending_delay),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the saga configuration.
    pub fn saga_config(&self) -> SagaConfig {
        SagaConfig {
            topics: self.topics.clone(),
            ..SagaConfig::default()
        }
        .with_compensation(self.compensation)
        .with_pending(PendingPolicy::recheck(
            self.pending_rechecks,
            self.pending_delay,
        ))
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    non_empty(lookup, key).and_then(|v| v.trim().parse().ok())
}

fn compensation(lookup: &impl Fn(&str) -> Option<String>) -> Option<CompensationPolicy> {
    let raw = non_empty(lookup, "SAGA_COMPENSATION")?;
    match raw.trim().parse() {
        Ok(policy) => Some(policy),
        Err(e) => {
            tracing::warn!(
                value = %raw,
                error = %e,
                "ignoring unparsable SAGA_COMPENSATION"
            );
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            step_endpoint: None,
            publish_endpoint: None,
            database_url: None,
            topics: Topics::default(),
            compensation: CompensationPolicy::default(),
            pending_rechecks: 0,
            pending_delay: Duration::from_millis(DEFAULT_PENDING_DELAY_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.step_endpoint.is_none());
        assert!(config.publish_endpoint.is_none());
        assert!(config.database_url.is_none());
        assert_eq!(config.compensation, CompensationPolicy::Disabled);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("STEP_ENDPOINT", "http://steps.local"),
            ("PUBLISH_ENDPOINT", "http://events.local"),
            ("ORDER_PAYMENT_TOPIC", "arn:payments"),
            ("SAGA_COMPENSATION", "enabled"),
            ("PAYMENT_PENDING_RECHECKS", "3"),
            ("PAYMENT_PENDING_DELAY_MS", "250"),
        ]));

        assert_eq!(config.port, 8080);
        assert_eq!(config.step_endpoint.as_deref(), Some("http://steps.local"));
        assert_eq!(
            config.publish_endpoint.as_deref(),
            Some("http://events.local")
        );

        let saga = config.saga_config();
        assert_eq!(saga.topics.order_payment, "arn:payments");
        assert_eq!(saga.topics.order_creation, "OrderCreation");
        assert!(saga.compensation.is_enabled());
        assert_eq!(saga.pending.max_rechecks, 3);
        assert_eq!(saga.pending.recheck_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("SAGA_COMPENSATION", "sometimes"),
            ("DATABASE_URL", "  "),
        ]));

        assert_eq!(config.port, 3000);
        assert_eq!(config.compensation, CompensationPolicy::Disabled);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_compensation_spelling_is_trimmed() {
        let config = Config::from_lookup(lookup(&[("SAGA_COMPENSATION", " enabled ")]));
        assert_eq!(config.compensation, CompensationPolicy::Enabled);
    }
}

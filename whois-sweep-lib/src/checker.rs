//! Single-domain checker.
//!
//! This module provides the `DomainChecker` that runs one WHOIS exchange for
//! a [`CheckTask`] and classifies the response. Every outcome, including
//! failure, comes back as a [`DomainCheckResult`]; errors are captured in the
//! result so one unreachable WHOIS server cannot abort a caller's batch.

use crate::classifier::is_available;
use crate::error::DomainCheckError;
use crate::protocols::WhoisClient;
use crate::retry::with_retry;
use crate::types::{CheckConfig, CheckTask, DomainCheckResult};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Anything that can turn a task into a result.
///
/// [`BatchChecker`](crate::BatchChecker) depends on this trait rather than on
/// [`DomainChecker`] directly, so scheduling can be exercised without sockets.
#[async_trait]
pub trait CheckDomain: Send + Sync {
    async fn check(&self, task: &CheckTask) -> DomainCheckResult;
}

/// Checks single domains against their TLD's WHOIS server.
///
/// # Example
///
/// ```rust,no_run
/// use whois_sweep_lib::{CheckTask, DomainChecker, TldRegistry};
///
/// #[tokio::main]
/// async fn main() {
///     let registry = TldRegistry::builtin();
///     let com = registry.lookup("com").expect("built-in TLD");
///
///     let checker = DomainChecker::new();
///     let result = checker.check_with_retry(&CheckTask::new("example", com)).await;
///     println!("{}: available={} error={:?}", result.domain, result.available, result.error);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DomainChecker {
    config: CheckConfig,
    whois_client: WhoisClient,
}

impl DomainChecker {
    /// Create a checker with default timeouts.
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    pub fn with_config(config: CheckConfig) -> Self {
        let whois_client = WhoisClient::with_config(&config);
        Self {
            config,
            whois_client,
        }
    }

    /// Replace the WHOIS client (e.g. one with a custom resolver).
    pub fn with_whois_client(mut self, whois_client: WhoisClient) -> Self {
        self.whois_client = whois_client;
        self
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check one domain with a single WHOIS exchange and no retry.
    ///
    /// This is the batch path.
    pub async fn check(&self, task: &CheckTask) -> DomainCheckResult {
        let response = self.whois_client.query(&task.server, &task.domain).await;
        self.settle(task, response)
    }

    /// Check one domain, retrying transient failures.
    ///
    /// Uses `retry_attempts` and `retry_delay` from the config (3 attempts,
    /// 1 second apart by default). Intended for single ad-hoc lookups.
    pub async fn check_with_retry(&self, task: &CheckTask) -> DomainCheckResult {
        let response = with_retry(
            || self.whois_client.query(&task.server, &task.domain),
            self.config.retry_attempts,
            self.config.retry_delay,
        )
        .await;
        self.settle(task, response)
    }

    fn settle(
        &self,
        task: &CheckTask,
        response: Result<String, DomainCheckError>,
    ) -> DomainCheckResult {
        match response {
            Ok(text) => {
                let available = is_available(&text, &task.pattern);
                debug!(domain = %task.domain, available, "domain classified");
                DomainCheckResult::completed(task, available)
            }
            Err(e) => {
                warn!(domain = %task.domain, server = %task.server, error = %e, "domain check failed");
                DomainCheckResult::failed(task, &e)
            }
        }
    }
}

impl Default for DomainChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckDomain for DomainChecker {
    async fn check(&self, task: &CheckTask) -> DomainCheckResult {
        DomainChecker::check(self, task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TldConfig;

    fn task_with_server(server: &str) -> CheckTask {
        CheckTask::new("example", &TldConfig::new("com", server, "No match for"))
    }

    #[tokio::test]
    async fn test_invalid_server_is_captured() {
        let checker = DomainChecker::new();
        let result = checker.check(&task_with_server("")).await;

        assert_eq!(result.domain, "example.com");
        assert!(!result.available);
        assert!(result.error.unwrap().contains("Invalid WHOIS server"));
    }

    #[tokio::test]
    async fn test_invalid_server_is_not_retried() {
        // A non-retryable failure must come back without waiting out the back-off.
        let checker = DomainChecker::with_config(
            CheckConfig::default().with_retry(3, std::time::Duration::from_secs(3600)),
        );
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            checker.check_with_retry(&task_with_server(" ")),
        )
        .await
        .expect("non-retryable error must not back off");

        assert!(result.is_error());
    }

    #[test]
    fn test_settle_classifies_response() {
        let checker = DomainChecker::new();
        let task = task_with_server("whois.verisign-grs.com");

        let available = checker.settle(&task, Ok("No match for \"EXAMPLE.COM\".".to_string()));
        assert!(available.available);
        assert!(available.error.is_none());

        let taken = checker.settle(&task, Ok("Domain Name: EXAMPLE.COM".to_string()));
        assert!(!taken.available);
        assert!(taken.error.is_none());
    }
}

//! Core data types for WHOIS availability checking.
//!
//! This module defines the TLD table entries, the per-domain check tasks and
//! results, and the tunables that drive a batch.

use crate::error::DomainCheckError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Standard WHOIS port (RFC 3912).
pub const WHOIS_PORT: u16 = 43;

/// One row of the TLD table: where to ask and what "available" looks like.
///
/// Entries are immutable once a [`TldRegistry`](crate::TldRegistry) is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldConfig {
    /// Bare, lowercase TLD without a leading dot (e.g. "com")
    pub name: String,

    /// WHOIS server host (e.g. "whois.verisign-grs.com")
    pub server: String,

    /// Literal substring whose presence marks the domain as unregistered
    pub available_pattern: String,

    /// Disabled entries are treated as unknown by batch checks
    pub enabled: bool,

    /// Human-facing label (e.g. ".com")
    pub display_name: String,
}

impl TldConfig {
    /// Create an enabled entry with the default ".<name>" display name.
    pub fn new<N, S, P>(name: N, server: S, available_pattern: P) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        P: Into<String>,
    {
        let name = name.into();
        let display_name = format!(".{}", name);
        Self {
            name,
            server: server.into(),
            available_pattern: available_pattern.into(),
            enabled: true,
            display_name,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_display_name<D: Into<String>>(mut self, display_name: D) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// A single domain to check, with everything needed to query and classify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTask {
    /// Full domain, "<keyword>.<tld>"
    pub domain: String,
    pub tld: String,
    pub server: String,
    pub pattern: String,
}

impl CheckTask {
    /// Build the task for `keyword` under the given TLD entry.
    pub fn new(keyword: &str, tld: &TldConfig) -> Self {
        Self {
            domain: format!("{}.{}", keyword, tld.name),
            tld: tld.name.clone(),
            server: tld.server.clone(),
            pattern: tld.available_pattern.clone(),
        }
    }
}

/// Outcome of checking one domain.
///
/// Exactly one result exists per [`CheckTask`]. When `error` is set the
/// domain is never reported as available; the two constructors are the only
/// way to build one so that rule always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCheckResult {
    /// The domain name that was checked (e.g., "example.com")
    pub domain: String,

    pub tld: String,

    /// Whether the WHOIS response matched the TLD's availability pattern
    pub available: bool,

    /// Completion time in milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Human-readable failure, if the WHOIS exchange did not complete
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl DomainCheckResult {
    /// A finished exchange, classified.
    pub fn completed(task: &CheckTask, available: bool) -> Self {
        Self {
            domain: task.domain.clone(),
            tld: task.tld.clone(),
            available,
            timestamp: now_millis(),
            error: None,
        }
    }

    /// A failed exchange; availability is unknown and reported as `false`.
    pub fn failed(task: &CheckTask, error: &DomainCheckError) -> Self {
        Self {
            domain: task.domain.clone(),
            tld: task.tld.clone(),
            available: false,
            timestamp: now_millis(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Results of a batch that may have been cut short by a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Settled results, in submission order
    pub results: Vec<DomainCheckResult>,

    /// Number of tasks the batch was built with
    pub total_tasks: usize,

    /// `false` when the deadline expired before every task settled
    pub complete: bool,
}

/// Tunables for WHOIS exchanges and batch scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Tasks dispatched concurrently per window.
    /// Default: 3, Range: 1-50
    pub window_size: usize,

    /// Pause between successive windows.
    /// Default: 500ms
    pub pacing_delay: Duration,

    /// Budget for resolving a WHOIS server hostname.
    /// Default: 5 seconds
    pub resolve_timeout: Duration,

    /// Budget for establishing the TCP connection.
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Silence after which a response is considered complete.
    /// Default: 1 second
    pub idle_timeout: Duration,

    /// Upper bound on bytes read from one WHOIS response.
    /// Default: 1 MiB
    pub max_response_bytes: usize,

    /// Attempts made by the ad-hoc retry path.
    /// Default: 3, Range: 1-10
    pub retry_attempts: u32,

    /// Pause between retry attempts.
    /// Default: 1 second
    pub retry_delay: Duration,

    /// Destination port for WHOIS connections.
    /// Default: 43
    pub whois_port: u16,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            window_size: 3,
            pacing_delay: Duration::from_millis(500),
            resolve_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(1),
            max_response_bytes: 1024 * 1024,
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            whois_port: WHOIS_PORT,
        }
    }
}

impl CheckConfig {
    /// Set the window size, clamped to 1-50.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.clamp(1, 50);
        self
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max.max(1);
        self
    }

    /// Set retry attempts, clamped to 1-10.
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts.clamp(1, 10);
        self.retry_delay = delay;
        self
    }

    pub fn with_whois_port(mut self, port: u16) -> Self {
        self.whois_port = port;
        self
    }
}

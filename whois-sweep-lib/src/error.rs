//! Error handling for WHOIS availability checking.
//!
//! Per-domain failures (resolution, connection, transport) are captured into
//! results by the checker and never abort a batch. `NoValidTlds` is the only
//! error that fails a whole `check_domains` call.

use std::time::Duration;
use thiserror::Error;

/// Main error type for availability checking operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainCheckError {
    /// DNS lookup of a WHOIS server failed or timed out
    #[error("Could not resolve '{host}': {message}")]
    Resolution { host: String, message: String },

    /// The WHOIS server name was empty
    #[error("Invalid WHOIS server '{server}'")]
    InvalidServer { server: String },

    /// TCP connection to the WHOIS server failed, was refused or timed out
    #[error("Connection to {server} failed: {message}")]
    Connection { server: String, message: String },

    /// The socket failed after the connection was established
    #[error("Transport error with {server}: {message}")]
    Transport { server: String, message: String },

    /// None of the requested TLDs is known and enabled
    #[error("No valid TLDs among: {}", requested.join(", "))]
    NoValidTlds { requested: Vec<String> },

    /// Invalid keyword or domain label
    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    /// Configuration errors (invalid settings, bad TOML, etc.)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File I/O errors when reading configuration
    #[error("File error at '{path}': {message}")]
    File { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainCheckError {
    pub fn resolution<H: Into<String>, M: Into<String>>(host: H, message: M) -> Self {
        Self::Resolution {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Resolution failure because the lookup exceeded its budget.
    pub fn resolution_timeout<H: Into<String>>(host: H, timeout: Duration) -> Self {
        Self::resolution(host, format!("lookup timed out after {:?}", timeout))
    }

    pub fn invalid_server<S: Into<String>>(server: S) -> Self {
        Self::InvalidServer {
            server: server.into(),
        }
    }

    pub fn connection<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::Connection {
            server: server.into(),
            message: message.into(),
        }
    }

    pub fn transport<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::Transport {
            server: server.into(),
            message: message.into(),
        }
    }

    pub fn no_valid_tlds(requested: &[String]) -> Self {
        Self::NoValidTlds {
            requested: requested.to_vec(),
        }
    }

    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error suggests the operation should be retried.
    ///
    /// Only network failures are transient; an empty server name or a
    /// configuration problem will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. } | Self::Connection { .. } | Self::Transport { .. }
        )
    }

    /// Whether this error came out of a single WHOIS exchange.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. }
                | Self::InvalidServer { .. }
                | Self::Connection { .. }
                | Self::Transport { .. }
        )
    }
}

impl From<std::io::Error> for DomainCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for DomainCheckError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DomainCheckError::resolution("whois.example", "nxdomain").is_retryable());
        assert!(DomainCheckError::connection("whois.example", "refused").is_retryable());
        assert!(DomainCheckError::transport("whois.example", "reset").is_retryable());

        assert!(!DomainCheckError::invalid_server("").is_retryable());
        assert!(!DomainCheckError::no_valid_tlds(&["zz".to_string()]).is_retryable());
        assert!(!DomainCheckError::config("bad").is_retryable());
    }

    #[test]
    fn test_connectivity_classification() {
        assert!(DomainCheckError::invalid_server("").is_connectivity());
        assert!(!DomainCheckError::file_error("a.toml", "missing").is_connectivity());
    }

    #[test]
    fn test_display_messages() {
        let err = DomainCheckError::no_valid_tlds(&["foo".to_string(), "bar".to_string()]);
        assert_eq!(err.to_string(), "No valid TLDs among: foo, bar");

        let err = DomainCheckError::resolution_timeout("whois.nic.io", Duration::from_secs(5));
        assert_eq!(
            err.to_string(),
            "Could not resolve 'whois.nic.io': lookup timed out after 5s"
        );

        let err = DomainCheckError::connection("whois.pir.org", "connection refused");
        assert_eq!(
            err.to_string(),
            "Connection to whois.pir.org failed: connection refused"
        );
    }
}

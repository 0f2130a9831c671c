//! # WHOIS Sweep Library
//!
//! Checks whether candidate domain names (keyword × TLD combinations) are
//! registered by querying WHOIS servers directly over raw TCP and matching
//! each response against a per-TLD "available" pattern.
//!
//! Batches run in small paced windows so registries are not flooded, and
//! every task produces exactly one result, in submission order, whether its
//! WHOIS exchange succeeded or not.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use whois_sweep_lib::{BatchChecker, CheckConfig, TldRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let batch = BatchChecker::new(Arc::new(TldRegistry::builtin()), CheckConfig::default());
//!
//!     let keywords = vec!["example".to_string()];
//!     let tlds = vec!["com".to_string(), "io".to_string()];
//!     for result in batch.check_domains(&keywords, &tlds).await? {
//!         println!("{} - available: {} {:?}", result.domain, result.available, result.error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Raw WHOIS**: one TCP exchange per domain, no third-party APIs
//! - **Windowed batches**: bounded concurrency with pacing between windows
//! - **Isolated failures**: a dead WHOIS server only affects its own results
//! - **Configurable TLD table**: built-in servers and patterns, overridable from TOML

// Re-export main public API types and functions
// This makes them available as whois_sweep_lib::TypeName
pub use checker::{CheckDomain, DomainChecker};
pub use classifier::is_available;
pub use concurrent::BatchChecker;
pub use config::{
    load_env_config, load_env_config_from, parse_duration_string, CheckSection, ConfigManager,
    EnvConfig, FileConfig, TldEntry,
};
pub use error::DomainCheckError;
pub use protocols::{
    builtin_tlds, discover_whois_server, HostLookup, Resolver, SystemLookup, TldRegistry,
    WhoisClient, IANA_WHOIS_SERVER,
};
pub use retry::with_retry;
pub use types::{BatchOutcome, CheckConfig, CheckTask, DomainCheckResult, TldConfig, WHOIS_PORT};
pub use utils::{is_valid_keyword, normalize_tld, split_list, validate_keyword, MAX_LABEL_LEN};

mod checker;
mod classifier;
mod concurrent;
mod config;
mod error;
mod protocols;
mod retry;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainCheckError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

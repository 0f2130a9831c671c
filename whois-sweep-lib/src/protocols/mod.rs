//! Protocol implementations for domain checking.
//!
//! This module contains the hostname resolver, the raw WHOIS client and the
//! TLD registry that maps each TLD to its WHOIS server.

/// Hostname resolution with a dedicated timeout
pub mod resolver;

/// WHOIS protocol implementation
pub mod whois;

/// TLD to WHOIS server/pattern mappings
pub mod registry;

pub use registry::{builtin_tlds, TldRegistry};
pub use resolver::{HostLookup, Resolver, SystemLookup};
pub use whois::{discover_whois_server, WhoisClient, IANA_WHOIS_SERVER};

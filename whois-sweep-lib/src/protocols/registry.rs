//! TLD registry: which WHOIS server answers for a TLD and how it says
//! "available".
//!
//! The registry is built once (from the built-in table, optionally merged
//! with entries from configuration files) and is read-only afterwards, so it
//! can be shared across concurrent checks behind an `Arc` without locking.

use crate::error::DomainCheckError;
use crate::types::TldConfig;
use crate::utils::normalize_tld;
use std::collections::HashMap;

/// Read-only table of TLD configurations keyed by bare TLD name.
///
/// Iteration order is insertion order: built-in entries first, then any
/// entries appended by configuration.
#[derive(Debug, Clone, Default)]
pub struct TldRegistry {
    entries: Vec<TldConfig>,
    index: HashMap<String, usize>,
}

impl TldRegistry {
    /// Build a registry from explicit entries.
    ///
    /// Names are normalized (trimmed, lowercased, leading dot removed).
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError::Config` if an entry is malformed or a TLD
    /// name appears twice.
    pub fn new(entries: Vec<TldConfig>) -> Result<Self, DomainCheckError> {
        let mut registry = Self::default();
        for entry in entries {
            let entry = validate_tld_config(entry)?;
            if registry.index.contains_key(&entry.name) {
                return Err(DomainCheckError::config(format!(
                    "Duplicate TLD '{}' in registry",
                    entry.name
                )));
            }
            registry.push(entry);
        }
        Ok(registry)
    }

    /// Registry populated with the built-in TLD table.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for entry in builtin_tlds() {
            registry.push(entry);
        }
        registry
    }

    /// Merge `overrides` into this registry.
    ///
    /// An entry whose name already exists replaces it in place; new names are
    /// appended.
    pub fn with_overrides(mut self, overrides: Vec<TldConfig>) -> Result<Self, DomainCheckError> {
        for entry in overrides {
            let entry = validate_tld_config(entry)?;
            match self.index.get(&entry.name) {
                Some(&position) => self.entries[position] = entry,
                None => self.push(entry),
            }
        }
        Ok(self)
    }

    /// Look up a TLD by name. Accepts ".com", "COM" and "com" alike.
    pub fn lookup(&self, name: &str) -> Option<&TldConfig> {
        self.index
            .get(&normalize_tld(name))
            .map(|&position| &self.entries[position])
    }

    /// All entries that batch checks may use.
    pub fn get_enabled_tlds(&self) -> Vec<&TldConfig> {
        self.entries.iter().filter(|tld| tld.enabled).collect()
    }

    /// Every entry, enabled or not.
    pub fn all_tlds(&self) -> &[TldConfig] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, entry: TldConfig) {
        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
    }
}

/// Normalize and check one TLD entry.
pub(crate) fn validate_tld_config(mut entry: TldConfig) -> Result<TldConfig, DomainCheckError> {
    entry.name = normalize_tld(&entry.name);
    entry.server = entry.server.trim().to_string();

    if entry.name.is_empty() || entry.name.contains('.') || entry.name.contains(char::is_whitespace)
    {
        return Err(DomainCheckError::config(format!(
            "Invalid TLD name '{}'",
            entry.name
        )));
    }
    if entry.server.is_empty() {
        return Err(DomainCheckError::config(format!(
            "TLD '{}' has an empty WHOIS server",
            entry.name
        )));
    }
    // An empty pattern would match every response and report everything available.
    if entry.available_pattern.is_empty() {
        return Err(DomainCheckError::config(format!(
            "TLD '{}' has an empty availability pattern",
            entry.name
        )));
    }
    if entry.display_name.trim().is_empty() {
        entry.display_name = format!(".{}", entry.name);
    }

    Ok(entry)
}

/// The built-in TLD table.
///
/// Patterns are the literal phrases each registry prints for an unregistered
/// name. They are provider-specific and change occasionally; override them
/// in a config file when a registry rewords its response.
pub fn builtin_tlds() -> Vec<TldConfig> {
    vec![
        // Verisign
        TldConfig::new("com", "whois.verisign-grs.com", "No match for"),
        TldConfig::new("net", "whois.verisign-grs.com", "No match for"),
        TldConfig::new("cc", "ccwhois.verisign-grs.com", "No match for"),
        TldConfig::new("tv", "whois.nic.tv", "No match for"),
        // Public Interest Registry / Identity Digital
        TldConfig::new("org", "whois.publicinterestregistry.org", "Domain not found"),
        TldConfig::new("info", "whois.nic.info", "Domain not found"),
        TldConfig::new("io", "whois.nic.io", "Domain not found"),
        TldConfig::new("ai", "whois.nic.ai", "Domain not found"),
        TldConfig::new("me", "whois.nic.me", "Domain not found"),
        // Google Registry
        TldConfig::new("dev", "whois.nic.google", "Domain not found"),
        TldConfig::new("app", "whois.nic.google", "Domain not found"),
        // Other gTLDs
        TldConfig::new("biz", "whois.nic.biz", "No Data Found"),
        TldConfig::new("co", "whois.nic.co", "No Data Found"),
        TldConfig::new("xyz", "whois.nic.xyz", "DOMAIN NOT FOUND"),
        // ccTLDs
        TldConfig::new("uk", "whois.nic.uk", "No match for"),
        TldConfig::new("de", "whois.denic.de", "Status: free"),
        TldConfig::new("fr", "whois.nic.fr", "No entries found"),
        TldConfig::new("nl", "whois.domain-registry.nl", "is free"),
        TldConfig::new("jp", "whois.jprs.jp", "No match!!"),
        TldConfig::new("cn", "whois.cnnic.cn", "No matching record"),
        // whois.nic.es only answers allow-listed client addresses
        TldConfig::new("es", "whois.nic.es", "no se encuentra registrado").with_enabled(false),
    ]
}

//! Utility functions for keyword and TLD handling.
//!
//! This module contains the name normalization and validation helpers shared
//! by the registry, the batch checker and the command-line front end.

use crate::error::DomainCheckError;

/// Longest label a DNS name may carry.
pub const MAX_LABEL_LEN: usize = 63;

/// Normalize a TLD name: trim, strip one leading dot, lowercase.
///
/// `" .COM "` and `"com"` both become `"com"`.
pub fn normalize_tld(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_prefix('.')
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

/// Validate a keyword (the label checked under each TLD).
///
/// Keywords are bare labels: 1 to 63 ASCII alphanumerics or hyphens, not
/// starting or ending with a hyphen. Dots are rejected since the TLD is
/// supplied separately.
///
/// # Errors
///
/// Returns `DomainCheckError::InvalidDomain` with the reason.
pub fn validate_keyword(keyword: &str) -> Result<(), DomainCheckError> {
    let keyword = keyword.trim();

    if keyword.is_empty() {
        return Err(DomainCheckError::invalid_domain(
            keyword,
            "Keyword cannot be empty",
        ));
    }

    if keyword.len() > MAX_LABEL_LEN {
        return Err(DomainCheckError::invalid_domain(
            keyword,
            format!("Keyword is longer than {} characters", MAX_LABEL_LEN),
        ));
    }

    if keyword.contains('.') {
        return Err(DomainCheckError::invalid_domain(
            keyword,
            "Keyword must not contain dots; pass TLDs with --tld",
        ));
    }

    if keyword.starts_with('-') || keyword.ends_with('-') {
        return Err(DomainCheckError::invalid_domain(
            keyword,
            "Keyword cannot start or end with a hyphen",
        ));
    }

    if !keyword.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(DomainCheckError::invalid_domain(
            keyword,
            "Keyword may only contain letters, digits and hyphens",
        ));
    }

    Ok(())
}

/// Whether `keyword` passes [`validate_keyword`].
pub fn is_valid_keyword(keyword: &str) -> bool {
    validate_keyword(keyword).is_ok()
}

/// Split comma-separated values, trimming and dropping empty items.
///
/// Used for `--tld com,net` style arguments and `WS_TLD`.
pub fn split_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.as_ref().split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tld() {
        assert_eq!(normalize_tld("com"), "com");
        assert_eq!(normalize_tld(".COM"), "com");
        assert_eq!(normalize_tld("  .Io "), "io");
        // Only one leading dot is stripped
        assert_eq!(normalize_tld("..net"), ".net");
    }

    #[test]
    fn test_valid_keywords() {
        assert!(is_valid_keyword("example"));
        assert!(is_valid_keyword("test-domain"));
        assert!(is_valid_keyword("abc123"));
        assert!(is_valid_keyword("x"));
        assert!(is_valid_keyword(&"a".repeat(63)));
    }

    #[test]
    fn test_invalid_keywords() {
        assert!(!is_valid_keyword(""));
        assert!(!is_valid_keyword("   "));
        assert!(!is_valid_keyword("-example"));
        assert!(!is_valid_keyword("example-"));
        assert!(!is_valid_keyword("test.com"));
        assert!(!is_valid_keyword("under_score"));
        assert!(!is_valid_keyword("bücher"));
        assert!(!is_valid_keyword(&"a".repeat(64)));
    }

    #[test]
    fn test_validate_keyword_reason() {
        match validate_keyword("bad.name") {
            Err(DomainCheckError::InvalidDomain { domain, reason }) => {
                assert_eq!(domain, "bad.name");
                assert!(reason.contains("dots"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_split_list() {
        let values = vec!["com, net".to_string(), "".to_string(), "org,,io ".to_string()];
        assert_eq!(split_list(&values), vec!["com", "net", "org", "io"]);
        assert!(split_list::<&str>(&[]).is_empty());
    }
}

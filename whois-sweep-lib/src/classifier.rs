//! Availability classification of WHOIS responses.
//!
//! WHOIS has no standard "not registered" grammar; every registry words it
//! differently. Classification therefore stays a literal, case-sensitive
//! substring test against the pattern configured for the TLD.

/// Whether `response` contains `pattern` verbatim.
///
/// ```rust
/// use whois_sweep_lib::is_available;
///
/// assert!(is_available("No match for \"EXAMPLE.COM\".", "No match for"));
/// assert!(!is_available("Domain Name: EXAMPLE.COM", "No match for"));
/// ```
pub fn is_available(response: &str, pattern: &str) -> bool {
    response.contains(pattern)
}

//! Validation helpers used by the input structs.

use std::sync::OnceLock;

/// Best-effort email validation.
///
/// This is intentionally not fully RFC-compliant.
pub fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| {
            regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid built-in email regex")
        })
        .is_match(s)
}

/// Phone numbers: digits with optional `+`, spaces, dashes and parentheses.
pub fn is_phone(s: &str) -> bool {
    static PHONE_RE: OnceLock<regex::Regex> = OnceLock::new();
    PHONE_RE
        .get_or_init(|| {
            regex::Regex::new(r"^\+?[0-9 ()\-]{7,20}$").expect("invalid built-in phone regex")
        })
        .is_match(s)
}

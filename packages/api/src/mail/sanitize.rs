//! Validation and sanitization of untrusted contact-form input.
//!
//! A value is valid when it is a JSON string that still has content after trimming.
//! Sanitizing trims first and then caps the length, counted in characters.

use serde_json::Value;

pub const MAX_SUBJECT_LENGTH: usize = 256;
pub const MAX_BODY_LENGTH: usize = 16384;

/// `true` for strings with non-whitespace content.
pub fn is_valid_string(input: Option<&Value>) -> bool {
    matches!(input, Some(Value::String(s)) if !s.trim().is_empty())
}

/// Trimmed content of a valid string, `None` otherwise.
pub fn sanitize_string(input: Option<&Value>) -> Option<String> {
    match input {
        Some(Value::String(s)) => sanitize_text(s, usize::MAX),
        _ => None,
    }
}

pub fn sanitize_subject(input: Option<&Value>) -> Option<String> {
    match input {
        Some(Value::String(s)) => sanitize_text(s, MAX_SUBJECT_LENGTH),
        _ => None,
    }
}

pub fn sanitize_body(input: Option<&Value>) -> Option<String> {
    match input {
        Some(Value::String(s)) => sanitize_text(s, MAX_BODY_LENGTH),
        _ => None,
    }
}

/// Trim `input` and keep at most `max` characters of what is left.
pub fn sanitize_text(input: &str, max: usize) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match trimmed.char_indices().nth(max) {
        Some((end, _)) => trimmed[..end].to_string(),
        None => trimmed.to_string(),
    })
}

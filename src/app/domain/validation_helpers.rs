use std::borrow::Cow;

use time::{macros::format_description, Date};
use validator::ValidationError;

/// Trim `value` and require it to be non-empty and at most `max_len` chars.
pub fn required_text(value: &str, field: &'static str, max_len: usize) -> Result<String, ValidationError> {
    let t = value.trim();
    if t.is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Owned(format!("{} is required", field))));
    }
    if t.chars().count() > max_len {
        return Err(ValidationError::new("too_long")
            .with_message(Cow::Owned(format!("{} must be at most {} characters", field, max_len))));
    }
    Ok(t.to_string())
}

/// Trim an optional value; blank becomes `None`.
pub fn optional_text(value: Option<&str>, field: &'static str, max_len: usize) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => required_text(t, field, max_len).map(Some),
    }
}

/// Require a calendar date in `YYYY-MM-DD` form.
pub fn iso_date(value: &str) -> Result<String, ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), &format)
        .map(|d| d.format(&format).unwrap_or_else(|_| value.trim().to_string()))
        .map_err(|_| {
            ValidationError::new("date").with_message(Cow::Borrowed("date must be YYYY-MM-DD"))
        })
}

/// Message of a validation error, for JSON error bodies.
pub fn message(err: &ValidationError) -> String {
    err.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string())
}

use validator::{ValidateEmail, ValidationError};

/// Email address, normalized to trimmed lowercase. Used as the login identity
/// and as the invite target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    const MAX_LEN: usize = 254;

    pub fn new(email: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized = email.as_ref().trim().to_lowercase();

        if normalized.len() > Self::MAX_LEN {
            return Err(ValidationError::new("email_too_long")
                .with_message("Email address is too long".into()));
        }
        if !normalized.validate_email() {
            return Err(ValidationError::new("invalid_email")
                .with_message("Invalid email address format".into()));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a stored address.
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other.trim().to_lowercase()
    }
}

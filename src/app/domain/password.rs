use argon2::{
    password_hash::SaltString,
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand_core::OsRng;
use validator::ValidationError;

const MIN_LEN: usize = 8;
const MAX_LEN: usize = 128;

/// Plaintext password. `new` enforces strength rules for signup and invite
/// acceptance; `for_verification` skips them for login.
#[derive(Clone)]
pub struct Password(String);

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

impl Password {
    pub fn for_verification(plaintext: String) -> Self {
        Self(plaintext)
    }

    pub fn new(password: String) -> Result<Self, ValidationError> {
        let len = password.chars().count();
        if len < MIN_LEN {
            return Err(ValidationError::new("password_too_short")
                .with_message("Password must be at least 8 characters".into()));
        }
        if len > MAX_LEN {
            return Err(ValidationError::new("password_too_long")
                .with_message("Password must be at most 128 characters".into()));
        }

        let classes = [
            password.chars().any(char::is_uppercase),
            password.chars().any(char::is_lowercase),
            password.chars().any(|c| c.is_ascii_digit()),
        ];
        if classes.contains(&false) {
            return Err(ValidationError::new("weak_password")
                .with_message("Password must contain uppercase, lowercase, and digit".into()));
        }

        Ok(Self(password))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Argon2id PHC string as stored in `users.password_hash`.
#[derive(Debug, Clone)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn from_password(password: &Password) -> Result<Self, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(Self(hash.to_string()))
    }

    pub fn verify(&self, password: &Password) -> Result<(), argon2::password_hash::Error> {
        let parsed = PasswordHash::new(&self.0)?;
        Argon2::default().verify_password(password.as_bytes(), &parsed)
    }

    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mixed_password() {
        assert!(Password::new("Condo2024".to_string()).is_ok());
    }

    #[test]
    fn rejects_short_and_weak_passwords() {
        assert!(Password::new("Ab1".to_string()).is_err());
        assert!(Password::new("alllowercase1".to_string()).is_err());
        assert!(Password::new("ALLUPPERCASE1".to_string()).is_err());
        assert!(Password::new("NoDigitsHere".to_string()).is_err());
        assert!(Password::new(format!("Aa1{}", "x".repeat(MAX_LEN))).is_err());
    }

    #[test]
    fn hash_verifies_only_the_original() {
        let password = Password::new("Condo2024".to_string()).unwrap();
        let hash = HashedPassword::from_password(&password).unwrap();
        assert!(hash.verify(&password).is_ok());
        assert!(hash
            .verify(&Password::for_verification("Condo2025".to_string()))
            .is_err());
    }

    #[test]
    fn debug_does_not_print_plaintext() {
        let password = Password::for_verification("Secret123".to_string());
        assert!(!format!("{:?}", password).contains("Secret123"));
    }
}

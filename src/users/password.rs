use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::PasswordPolicy;

/// Special characters accepted by the strength check.
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

impl PasswordPolicy {
    /// Validate password strength against the policy.
    ///
    /// Checks run in a fixed order (length, uppercase, digit, special char)
    /// and the first failure wins, so a password failing several rules
    /// reports the earliest one.
    pub fn validate_strength(&self, password: &str) -> Result<(), String> {
        if password.chars().count() < self.min_length {
            return Err(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err("Password must contain at least one uppercase letter".into());
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err("Password must contain at least one digit".into());
        }

        if self.require_special_char && !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
            return Err("Password must contain at least one special character (!@#$%^&* etc.)".into());
        }

        Ok(())
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

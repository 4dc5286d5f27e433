use super::errors::PasswordError;

/// Acceptance rules applied to a plaintext password before it is hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length, counted in characters
    pub min_length: usize,
}

impl PasswordPolicy {
    pub const DEFAULT_MIN_LENGTH: usize = 6;

    /// Create a policy with a custom minimum length.
    pub fn with_min_length(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Check a plaintext password against the policy.
    ///
    /// # Errors
    /// * `TooShort` - Password has fewer than `min_length` characters
    pub fn validate(&self, password: &str) -> Result<(), PasswordError> {
        let actual = password.chars().count();
        if actual < self.min_length {
            return Err(PasswordError::TooShort {
                min: self.min_length,
                actual,
            });
        }
        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::with_min_length(Self::DEFAULT_MIN_LENGTH)
    }
}

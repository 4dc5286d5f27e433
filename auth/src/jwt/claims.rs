use chrono::TimeDelta;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;
use crate::roles::Role;

/// Fixed `sub` marker carried by every identity token.
pub const TOKEN_SUBJECT: &str = "user_authentication";

/// Identity claims embedded in an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Authenticated user identifier
    pub user_id: i64,

    /// Role granted at issuance
    pub role: Role,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Subject marker
    pub sub: String,
}

impl Claims {
    /// Create claims for user authentication with automatic expiration.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `role` - Role of the user
    /// * `expiration_hours` - Hours until token expires
    ///
    /// # Returns
    /// Claims with `iat = now` and `exp = now + expiration_hours`
    ///
    /// # Errors
    /// * `SigningFailed` - `expiration_hours` pushes `exp` outside the representable range
    pub fn for_user(user_id: i64, role: Role, expiration_hours: i64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expiration = TimeDelta::try_hours(expiration_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::SigningFailed(format!(
                    "token lifetime of {} hours is out of range",
                    expiration_hours
                ))
            })?;

        Ok(Self {
            user_id,
            role,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            sub: TOKEN_SUBJECT.to_string(),
        })
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = iat;
        self
    }

    /// Seconds between issuance and expiry.
    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}

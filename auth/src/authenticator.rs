use crate::guard;
use crate::guard::AccessError;
use crate::guard::Principal;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::PasswordPolicy;
use crate::roles::Role;

/// Tunables shared by the hasher and the token handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    /// Lifetime of issued tokens
    pub token_ttl_hours: i64,

    /// Policy applied before hashing
    pub password_policy: PasswordPolicy,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl_hours: JwtHandler::DEFAULT_EXPIRATION_HOURS,
            password_policy: PasswordPolicy::default(),
        }
    }
}

/// Authentication coordinator combining password verification and JWT generation.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and JWT token handling. Safe to share across tasks
/// behind an `Arc`: every operation takes `&self`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator with default settings.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_settings(jwt_secret, AuthSettings::default())
    }

    /// Create a new authenticator with explicit settings.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `settings` - Token lifetime and password policy
    pub fn with_settings(jwt_secret: &[u8], settings: AuthSettings) -> Self {
        Self {
            password_hasher: PasswordHasher::new().with_policy(settings.password_policy),
            jwt_handler: JwtHandler::new(jwt_secret).with_expiration_hours(settings.token_ttl_hours),
        }
    }

    /// Replace the password hasher (e.g. to change the work factor).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn jwt_handler(&self) -> &JwtHandler {
        &self.jwt_handler
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `TooShort` - Password rejected by the policy
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Identifier to embed in the token
    /// * `role` - Role to embed in the token
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match (or the stored hash is unreadable)
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: i64,
        role: Role,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.issue(user_id, role)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Reject a login for an account that does not exist.
    ///
    /// Does the same Argon2 work as a failed [`Authenticator::authenticate`]
    /// so the two cases cannot be told apart by timing.
    pub fn reject_unknown_account(&self, password: &str) -> AuthenticationError {
        self.password_hasher.verify_unknown_account(password);
        AuthenticationError::InvalidCredentials
    }

    /// Generate JWT token without password verification.
    ///
    /// Used right after registration, when the credential was just set.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, user_id: i64, role: Role) -> Result<String, JwtError> {
        self.jwt_handler.issue(user_id, role)
    }

    /// Validate and decode JWT token.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.verify(token)
    }

    /// Authenticate a request from its raw `Authorization` header value.
    ///
    /// # Errors
    /// * `MissingCredential`, `MalformedCredential`, `InvalidOrExpiredToken`
    pub fn authenticate_request(&self, header: Option<&str>) -> Result<Principal, AccessError> {
        guard::authenticate_header(header, &self.jwt_handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Authenticator {
        Authenticator::new(SECRET).with_password_hasher(
            PasswordHasher::new()
                .with_params(1024, 1, 1)
                .expect("Failed to build hasher"),
        )
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        // Hash a password
        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        // Authenticate with correct password
        let result = authenticator
            .authenticate(password, &hash, 7, Role::User)
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        // Validate the token
        let claims = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        // Try with wrong password
        let result = authenticator.authenticate("wrong_password", &hash, 7, Role::User);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_reject_unknown_account() {
        let authenticator = authenticator();

        assert!(matches!(
            authenticator.reject_unknown_account("my_password"),
            AuthenticationError::InvalidCredentials
        ));
    }

    #[test]
    fn test_authenticate_corrupted_hash() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("my_password", "not-a-phc-string", 7, Role::User);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_settings_are_applied() {
        let authenticator = Authenticator::with_settings(
            SECRET,
            AuthSettings {
                token_ttl_hours: 1,
                password_policy: PasswordPolicy::with_min_length(8),
            },
        );

        assert!(matches!(
            authenticator.hash_password("seven77"),
            Err(PasswordError::TooShort { min: 8, actual: 7 })
        ));

        let token = authenticator.issue_token(1, Role::Admin).unwrap();
        let claims = authenticator.validate_token(&token).unwrap();
        assert_eq!(claims.lifetime_seconds(), 60 * 60);
    }

    #[test]
    fn test_authenticate_request() {
        let authenticator = authenticator();
        let token = authenticator.issue_token(3, Role::Admin).unwrap();
        let header = format!("Bearer {}", token);

        let principal = authenticator
            .authenticate_request(Some(header.as_str()))
            .expect("Request authentication failed");
        assert_eq!(principal.user_id, 3);
        assert!(principal.is_admin());

        assert_eq!(
            authenticator.authenticate_request(None),
            Err(AccessError::MissingCredential)
        );
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }
}

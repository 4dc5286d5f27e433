use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;
use super::policy::PasswordPolicy;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id).
/// The work factor is fixed per instance; the policy is checked before any hashing.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    policy: PasswordPolicy,
    params: Params,
    decoy_hash: OnceLock<Option<String>>,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    ///
    /// # Returns
    /// PasswordHasher with the default policy and Argon2id default cost
    pub fn new() -> Self {
        Self {
            policy: PasswordPolicy::default(),
            params: Params::default(),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Replace the password policy.
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the Argon2 work factor.
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Degree of parallelism
    ///
    /// # Errors
    /// * `InvalidParameters` - Argon2 rejected the cost parameters
    pub fn with_params(
        mut self,
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        self.params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;
        self.decoy_hash = OnceLock::new();
        Ok(self)
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses Argon2id with random salt generation, so two calls with the same
    /// input produce different strings.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `TooShort` - Password rejected by the policy
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        self.policy.validate(password)?;

        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Cost parameters and salt are read from the stored hash. A stored hash
    /// that cannot be parsed never matches.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed_hash) => parsed_hash,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Run a full verification for an account that does not exist.
    ///
    /// The password is checked against a decoy hash built with this hasher's
    /// own cost, so rejecting an unknown account takes as long as rejecting a
    /// wrong password. Always returns false.
    pub fn verify_unknown_account(&self, password: &str) -> bool {
        if let Some(decoy) = self.decoy_hash() {
            let _ = self.verify(password, decoy);
        }
        false
    }

    fn decoy_hash(&self) -> Option<&str> {
        self.decoy_hash
            .get_or_init(|| {
                let salt = SaltString::generate(&mut OsRng);
                self.argon2()
                    .hash_password(DECOY_PASSWORD.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| tracing::warn!(error = %e, "Failed to build decoy hash"))
                    .ok()
            })
            .as_deref()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

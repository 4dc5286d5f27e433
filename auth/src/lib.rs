//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure:
//! - Password hashing (Argon2id) behind a minimum-length policy
//! - JWT identity token issuance and verification (HS256)
//! - Bearer-token request authentication and role gating
//! - Authentication coordination
//!
//! The secret key is passed in at construction; nothing here reads the
//! environment or holds global state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{JwtHandler, Role};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = handler.issue(1, Role::User).unwrap();
//! let claims = handler.verify(&token).unwrap();
//! assert_eq!(claims.user_id, 1);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Role};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and generate token
//! let result = auth.authenticate("password123", &hash, 1, Role::User).unwrap();
//!
//! // Protected request: authenticate the header, then gate on role
//! let header = format!("Bearer {}", result.access_token);
//! let principal = auth.authenticate_request(Some(header.as_str())).unwrap();
//! assert!(auth::guard::authorize(Some(&principal), Role::Admin).is_err());
//! ```

pub mod authenticator;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod roles;

// Re-export commonly used items
pub use authenticator::AuthSettings;
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use guard::AccessError;
pub use guard::Principal;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
pub use roles::Role;

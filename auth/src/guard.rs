//! Request authentication and role gating, independent of any web framework.
//!
//! Stage A turns an `Authorization` header value into a [`Principal`];
//! stage B checks that principal against a required [`Role`]. The HTTP layer
//! runs them as ordered pre-handler checks and maps [`AccessError`] to a
//! status code with [`AccessError::status_code`].

use thiserror::Error;

use crate::jwt::Claims;
use crate::jwt::JwtHandler;
use crate::roles::Role;

pub const BEARER_SCHEME: &str = "Bearer";

/// Identity established for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this principal may act on resources owned by `owner_id`.
    pub fn can_act_for(&self, owner_id: i64) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

/// Access decision failures, one per caller-visible outcome.
///
/// Messages are generic: token verification sub-kinds are
/// collapsed into `InvalidOrExpiredToken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Authorization header required")]
    MissingCredential,

    #[error("Authorization header format must be 'Bearer TOKEN'")]
    MalformedCredential,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Access denied: insufficient permissions")]
    Forbidden,
}

impl AccessError {
    /// HTTP status the error maps to: 401 for authentication, 403 for authorization.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::MissingCredential
            | AccessError::MalformedCredential
            | AccessError::InvalidOrExpiredToken => 401,
            AccessError::Forbidden => 403,
        }
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; the token must be non-empty.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AccessError> {
    let header = header.ok_or(AccessError::MissingCredential)?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AccessError::MalformedCredential)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AccessError::MalformedCredential);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AccessError::MalformedCredential);
    }

    Ok(token)
}

/// Stage A: authenticate a request from its `Authorization` header.
pub fn authenticate_header(
    header: Option<&str>,
    handler: &JwtHandler,
) -> Result<Principal, AccessError> {
    let token = extract_bearer(header)?;

    let claims = handler.verify(token).map_err(|e| {
        if e.is_rejection() {
            tracing::debug!(error = %e, "Token rejected");
        } else {
            tracing::warn!(error = %e, "Token verification failed");
        }
        AccessError::InvalidOrExpiredToken
    })?;

    Ok(Principal::from(claims))
}

/// Stage B: require the authenticated principal to hold `required`.
///
/// A missing principal means stage A never ran and is treated as a denial.
pub fn authorize(principal: Option<&Principal>, required: Role) -> Result<(), AccessError> {
    match principal {
        Some(principal) if principal.role == required => Ok(()),
        _ => Err(AccessError::Forbidden),
    }
}

use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    #[error("Token declares an unexpected signing algorithm: {0}")]
    WrongAlgorithm(String),

    #[error("Token signature does not match")]
    SignatureMismatch,

    #[error("Token is expired")]
    Expired,
}

impl JwtError {
    /// Whether the error rejects a presented token, as opposed to a failure
    /// to produce one.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, JwtError::SigningFailed(_))
    }
}

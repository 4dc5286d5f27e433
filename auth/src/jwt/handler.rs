use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TOKEN_SUBJECT;
use super::errors::JwtError;
use crate::roles::Role;

/// JWT token handler for issuing and verifying identity tokens.
///
/// Uses HS256 (HMAC with SHA-256). The secret is fixed at construction and
/// shared read-only by every signing and verification call.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    expiration_hours: i64,
}

impl JwtHandler {
    pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm and 24 hour tokens
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            expiration_hours: Self::DEFAULT_EXPIRATION_HOURS,
        }
    }

    /// Override the lifetime of issued tokens.
    pub fn with_expiration_hours(mut self, expiration_hours: i64) -> Self {
        self.expiration_hours = expiration_hours;
        self
    }

    /// Issue a token asserting the given identity.
    ///
    /// # Arguments
    /// * `user_id` - Authenticated user identifier
    /// * `role` - Role to embed in the token
    ///
    /// # Returns
    /// Signed JWT valid for the configured number of hours
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed or the lifetime overflows the clock
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, JwtError> {
        let claims = Claims::for_user(user_id, role, self.expiration_hours)?;
        self.encode(&claims)
    }

    /// Sign the given claims as they are.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// The declared algorithm is checked against HS256 before the signature
    /// is computed, and the signature is checked before the expiry.
    ///
    /// # Errors
    /// * `MalformedToken` - Token is not a well-formed JWT carrying identity claims
    /// * `WrongAlgorithm` - Header declares an algorithm other than HS256
    /// * `SignatureMismatch` - Signature does not match header and claims
    /// * `Expired` - Current time is past the `exp` claim
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let declared = declared_algorithm(token)?;
        if declared != "HS256" {
            return Err(JwtError::WrongAlgorithm(declared));
        }

        let header = decode_header(token).map_err(|e| JwtError::MalformedToken(e.to_string()))?;

        if header.alg != self.algorithm {
            return Err(JwtError::WrongAlgorithm(format!("{:?}", header.alg)));
        }

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(TOKEN_SUBJECT.to_string());

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::SignatureMismatch,
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    JwtError::WrongAlgorithm(e.to_string())
                }
                _ => JwtError::MalformedToken(e.to_string()),
            })
    }
}

/// Read `alg` from the header segment as a plain string.
///
/// `decode_header` refuses algorithm names it does not know (such as `none`)
/// as a parse error, so the name is looked at before the header is typed.
fn declared_algorithm(token: &str) -> Result<String, JwtError> {
    let segment = token
        .split('.')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| JwtError::MalformedToken("missing header segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| JwtError::MalformedToken(e.to_string()))?;
    let header: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| JwtError::MalformedToken(e.to_string()))?;

    header
        .get("alg")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| JwtError::MalformedToken("header has no alg".to_string()))
}

//! Error types for NASPIP operations.
//!
//! Every failure surfaced by the library is a [`NaspipError`]. Each variant
//! maps to a stable [`NaspipErrorCode`] so bindings and wallets can branch on
//! a number instead of parsing messages.

use crate::validation::FieldError;

/// Error codes for FFI and mobile integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum NaspipErrorCode {
    /// Envelope is not `naspip;<kis>;<kid>;<token>`
    MalformedEnvelope = 1000,
    /// Token version is not `v4`
    UnsupportedTokenVersion = 2000,
    /// Token purpose is not supported for the operation
    UnsupportedTokenPurpose = 2001,
    /// Token body or footer could not be decoded
    MalformedToken = 2002,
    /// Expected footer differs from the token footer
    FooterMismatch = 2003,
    /// Signature did not verify
    SignatureInvalid = 2004,
    /// Key material could not be parsed
    InvalidKey = 3000,
    /// Embedded `kid` differs from the expected key id
    InvalidKeyId = 3001,
    /// Embedded `kis` differs from the expected key issuer
    InvalidKeyIssuer = 3002,
    /// Signing key is past its expiration
    KeyExpired = 3003,
    /// Key expiration is not a valid timestamp
    KeyExpirationUnparseable = 3004,
    /// A claim failed temporal or identity validation
    ClaimValidation = 4000,
    /// Required creation parameter missing
    MissingParameter = 5000,
    /// Duration string could not be parsed
    InvalidDuration = 5001,
    /// Timestamp string could not be parsed
    InvalidTimestamp = 5002,
    /// Payload failed structural validation
    PayloadValidation = 5003,
    /// Payload could not be encoded or decoded
    Encoding = 6000,
}

/// Reason a decoded claim set was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimViolation {
    #[error("issuer mismatch")]
    IssuerMismatch,
    #[error("subject mismatch")]
    SubjectMismatch,
    #[error("audience mismatch")]
    AudienceMismatch,
    #[error("iat claim is missing")]
    IssuedAtMissing,
    #[error("iat claim is not a valid timestamp")]
    IssuedAtInvalid,
    #[error("token issued in the future")]
    TokenIssuedInFuture,
    #[error("nbf claim is not a valid timestamp")]
    NotBeforeInvalid,
    #[error("token is not active yet")]
    TokenNotYetActive,
    #[error("exp claim is missing")]
    ExpirationMissing,
    #[error("exp claim is not a valid timestamp")]
    ExpirationInvalid,
    #[error("token is expired")]
    TokenExpired,
    #[error("maxTokenAge exceeded")]
    MaxAgeExceeded,
}

/// Comprehensive error type for NASPIP operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NaspipError {
    #[error("invalid naspip token prefix")]
    MalformedEnvelope,

    #[error("unsupported PASETO version: {0}")]
    UnsupportedTokenVersion(String),

    #[error("unsupported PASETO purpose: {0}")]
    UnsupportedTokenPurpose(String),

    #[error("token is not a PASETO formatted value: {0}")]
    MalformedToken(String),

    #[error("invalid PASETO footer")]
    FooterMismatch,

    #[error("invalid token signature")]
    SignatureInvalid,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Claim(#[from] ClaimViolation),

    #[error("invalid Key ID")]
    InvalidKeyId,

    #[error("invalid Key Issuer")]
    InvalidKeyIssuer,

    #[error("expired Key")]
    KeyExpired,

    #[error("invalid key expiration")]
    KeyExpirationUnparseable,

    #[error("{0} is required for token creation")]
    MissingParameter(&'static str),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("{0}")]
    PayloadValidation(FieldError),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl NaspipError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> NaspipErrorCode {
        match self {
            Self::MalformedEnvelope => NaspipErrorCode::MalformedEnvelope,
            Self::UnsupportedTokenVersion(_) => NaspipErrorCode::UnsupportedTokenVersion,
            Self::UnsupportedTokenPurpose(_) => NaspipErrorCode::UnsupportedTokenPurpose,
            Self::MalformedToken(_) => NaspipErrorCode::MalformedToken,
            Self::FooterMismatch => NaspipErrorCode::FooterMismatch,
            Self::SignatureInvalid => NaspipErrorCode::SignatureInvalid,
            Self::InvalidKey(_) => NaspipErrorCode::InvalidKey,
            Self::Claim(_) => NaspipErrorCode::ClaimValidation,
            Self::InvalidKeyId => NaspipErrorCode::InvalidKeyId,
            Self::InvalidKeyIssuer => NaspipErrorCode::InvalidKeyIssuer,
            Self::KeyExpired => NaspipErrorCode::KeyExpired,
            Self::KeyExpirationUnparseable => NaspipErrorCode::KeyExpirationUnparseable,
            Self::MissingParameter(_) => NaspipErrorCode::MissingParameter,
            Self::InvalidDuration(_) => NaspipErrorCode::InvalidDuration,
            Self::InvalidTimestamp(_) => NaspipErrorCode::InvalidTimestamp,
            Self::PayloadValidation(_) => NaspipErrorCode::PayloadValidation,
            Self::Encoding(_) => NaspipErrorCode::Encoding,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The claim violation behind this error, if any.
    pub fn claim_violation(&self) -> Option<&ClaimViolation> {
        match self {
            Self::Claim(violation) => Some(violation),
            _ => None,
        }
    }

    /// The failing payload field, if this is a structural validation error.
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            Self::PayloadValidation(err) => Some(err),
            _ => None,
        }
    }

    /// Create a malformed token error.
    pub fn malformed_token(reason: impl Into<String>) -> Self {
        Self::MalformedToken(reason.into())
    }

    /// Create an invalid key error.
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey(reason.into())
    }
}

impl From<FieldError> for NaspipError {
    fn from(err: FieldError) -> Self {
        Self::PayloadValidation(err)
    }
}

impl From<prost::DecodeError> for NaspipError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<serde_json::Error> for NaspipError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

//! NASPIP payment instruction tokens.
//!
//! A merchant signs a payment instruction (or a redirect to a service that
//! produces one) into a compact string suitable for a QR code. A wallet reads
//! it offline: it checks the envelope, verifies the PASETO v4.public
//! signature, decodes the protobuf claims and validates their temporal and
//! identity constraints together with the lifecycle of the signing key.
//!
//! ```text
//! naspip;<key_issuer>;<key_id>;v4.public.<base64url(claims || signature)>[.<footer>]
//! ```
//!
//! # Features
//!
//! - **Envelope**: routing metadata outside the signed token
//! - **PASETO v4.public**: Ed25519 signing with footer and implicit assertion
//! - **Payload validation**: field-level error codes before anything is signed
//! - **Pluggable signing**: route signatures through any [`TokenSigner`]
//!
//! # Example
//!
//! ```ignore
//! use naspip_lib::prelude::*;
//!
//! let builder = PaymentInstructionsBuilder::new();
//! let token = builder.create_payment_instruction(&payload, &secret_key, &create_options)?;
//! let read = builder.read(&token, &public_key, &ReadOptions::new().with_issuer("qrCrypto.com"))?;
//! ```

pub mod builder;
pub mod claims;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod duration;
pub mod envelope;
pub mod errors;
pub mod keys;
pub mod paseto;
pub mod payload;
pub mod prelude;
pub mod signer;
pub mod timestamp;
pub mod validation;

/// Test utilities for token testing.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::{InspectedToken, PaymentInstructionsBuilder, ReadResult};
pub use claims::ClaimSet;
pub use config::{CreateOptions, ProtocolConfig, ReadOptions, SignOptions, VerifyOptions};
pub use envelope::Envelope;
pub use errors::{ClaimViolation, NaspipError, NaspipErrorCode};
pub use payload::{
    InstructionItem, InstructionMerchant, InstructionOrder, InstructionPayload,
    PaymentInstruction, TokenData, UrlPayload,
};
pub use signer::{PasetoV4Signer, TokenSigner};
pub use validation::FieldError;

/// Common result alias for NASPIP operations.
pub type Result<T> = std::result::Result<T, NaspipError>;

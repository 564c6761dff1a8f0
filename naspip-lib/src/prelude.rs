//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use naspip_lib::prelude::*;
//! ```

// Facade
pub use crate::builder::{InspectedToken, PaymentInstructionsBuilder, ReadResult};

// Options
pub use crate::config::{CreateOptions, ProtocolConfig, ReadOptions};

// Payloads
pub use crate::payload::{
    InstructionItem, InstructionMerchant, InstructionOrder, InstructionPayload,
    PaymentInstruction, TokenData, UrlPayload,
};

// Error handling
pub use crate::errors::{ClaimViolation, NaspipError, NaspipErrorCode};
pub use crate::Result;

// Keys and signing
pub use crate::keys::{generate_key, KeyFormat, PublicKey, SecretKey};
pub use crate::signer::{PasetoV4Signer, TokenSigner};

// Diagnostics
pub use crate::diagnostics::{Diagnostic, Diagnostics};

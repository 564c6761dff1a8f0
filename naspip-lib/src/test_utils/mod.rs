//! Test utilities for NASPIP.
//!
//! Fixed key pairs, payloads that pass validation, and a diagnostics sink
//! that records what the builder reports.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use naspip_lib::test_utils::{sample_instruction, RecordingDiagnostics, SECRET_KEY};
//!
//! let diagnostics = Arc::new(RecordingDiagnostics::default());
//! let builder = PaymentInstructionsBuilder::new().with_diagnostics(diagnostics.clone());
//! ```

mod assertions;
mod fixtures;

pub use assertions::{assert_claim_violation, assert_error_code, RecordingDiagnostics};
pub use fixtures::{
    create_options, key_expiration_in, read_options, sample_instruction, sample_url_payload,
    OTHER_PUBLIC_KEY, OTHER_SECRET_KEY, PUBLIC_KEY, SAMPLE_EXPIRES_AT, SECRET_KEY, TEST_KEY_ID,
    TEST_KEY_ISSUER, TEST_TOKEN_ISSUER,
};

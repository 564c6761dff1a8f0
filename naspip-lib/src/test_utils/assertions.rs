//! Test assertions and recording helpers.

use std::sync::Mutex;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::errors::{ClaimViolation, NaspipErrorCode};
use crate::Result;

/// Keeps every diagnostic it receives.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    seen: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    /// Diagnostics received so far, oldest first.
    pub fn recorded(&self) -> Vec<Diagnostic> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, diagnostic: &Diagnostic) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(diagnostic.clone());
        }
    }
}

/// Assert that `result` failed with `code`.
///
/// # Panics
/// Panics if the result succeeded or failed with another code.
pub fn assert_error_code<T: std::fmt::Debug>(result: &Result<T>, code: NaspipErrorCode) {
    match result {
        Err(err) => assert_eq!(err.code(), code, "unexpected error: {err}"),
        Ok(value) => panic!("expected {code:?}, got Ok({value:?})"),
    }
}

/// Assert that `result` failed claim validation with `violation`.
///
/// # Panics
/// Panics if the result succeeded or failed for another reason.
pub fn assert_claim_violation<T: std::fmt::Debug>(result: &Result<T>, violation: ClaimViolation) {
    match result {
        Err(err) => assert_eq!(
            err.claim_violation(),
            Some(&violation),
            "unexpected error: {err}"
        ),
        Ok(value) => panic!("expected {violation:?}, got Ok({value:?})"),
    }
}

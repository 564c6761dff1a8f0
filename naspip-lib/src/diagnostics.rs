//! Non-fatal notices raised while creating tokens.

use std::fmt;

/// A notice the caller may want to surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// `expires_in` was not set and the fallback was applied.
    MissingExpiresIn { applied: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingExpiresIn { applied } => write!(
                f,
                "expires_in not provided for token creation, using default of {applied}; \
                 setting an explicit expiration is recommended"
            ),
        }
    }
}

/// Sink for [`Diagnostic`]s.
pub trait Diagnostics: Send + Sync {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Forwards diagnostics to `tracing` at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, diagnostic: &Diagnostic) {
        tracing::warn!(%diagnostic, "naspip diagnostic");
    }
}

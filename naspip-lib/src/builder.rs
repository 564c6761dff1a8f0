//! Protocol facade.
//!
//! [`PaymentInstructionsBuilder`] composes the envelope, signer, codec and
//! validators into the four operations a host needs: create a token from a
//! payload, read and verify one, and peek at one without verifying.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claims::ClaimSet;
use crate::codec::{decode_claims, encode_claims};
use crate::config::{CreateOptions, ProtocolConfig, ReadOptions};
use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::envelope::{self, Envelope};
use crate::paseto;
use crate::payload::{present, InstructionPayload, TokenData, UrlPayload};
use crate::signer::{PasetoV4Signer, TokenSigner};
use crate::timestamp::{now_millis, parse_rfc3339};
use crate::validation::{validate_payment_instruction, validate_url_payload};
use crate::{NaspipError, Result};

/// A verified token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResult {
    pub version: String,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer: Vec<u8>,
    pub claims: ClaimSet,
}

/// A token decoded without any verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectedToken {
    pub envelope: Envelope,
    pub version: String,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer: Vec<u8>,
    /// Claims as found in the message. `None` for encrypted tokens.
    pub claims: Option<ClaimSet>,
}

/// Creates and reads NASPIP payment instruction tokens.
///
/// Holds no per-call state; one builder can be shared across threads.
///
/// # Example
///
/// ```
/// use naspip_lib::{CreateOptions, PaymentInstructionsBuilder, ReadOptions};
/// use naspip_lib::keys::{generate_key, KeyFormat};
/// use naspip_lib::payload::{InstructionPayload, PaymentInstruction};
///
/// let keys = generate_key(KeyFormat::Paserk);
/// let builder = PaymentInstructionsBuilder::new();
///
/// let payload = InstructionPayload {
///     payment: PaymentInstruction {
///         id: "payment-id".into(),
///         address: "crypto-address".into(),
///         unique_asset_id: "bitcoin".into(),
///         amount: Some("100".into()),
///         ..Default::default()
///     },
///     order: None,
/// };
/// let options = CreateOptions::new("key-id-one", "payment-processor.com", "2999-01-01T00:00:00Z")
///     .with_issuer("qrCrypto.com")
///     .with_expires_in("5m");
///
/// let token = builder
///     .create_payment_instruction(&payload, &keys.secret_key, &options)
///     .unwrap();
/// let read = builder
///     .read(&token, &keys.public_key, &ReadOptions::new().with_issuer("qrCrypto.com"))
///     .unwrap();
/// assert_eq!(read.claims.kid, "key-id-one");
/// ```
#[derive(Clone)]
pub struct PaymentInstructionsBuilder {
    signer: Arc<dyn TokenSigner>,
    diagnostics: Arc<dyn Diagnostics>,
    config: ProtocolConfig,
}

impl Default for PaymentInstructionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PaymentInstructionsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentInstructionsBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PaymentInstructionsBuilder {
    /// Builder with the in-process PASETO signer and `tracing` diagnostics.
    pub fn new() -> Self {
        Self {
            signer: Arc::new(PasetoV4Signer),
            diagnostics: Arc::new(TracingDiagnostics),
            config: ProtocolConfig::default(),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn TokenSigner>) -> Self {
        self.signer = signer;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_config(mut self, config: ProtocolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Split an envelope without touching the token.
    pub fn decode(&self, text: &str) -> Result<Envelope> {
        envelope::unwrap(text)
    }

    /// Decode envelope, token and claims without verifying anything.
    ///
    /// Use it to pick a key; never trust its output.
    pub fn inspect(&self, text: &str) -> Result<InspectedToken> {
        let envelope = envelope::unwrap(text)?;
        let token = paseto::decode_unverified(&envelope.token)?;
        let claims = token.message.as_deref().map(decode_claims).transpose()?;
        Ok(InspectedToken {
            envelope,
            version: token.version,
            purpose: token.purpose,
            footer: token.footer,
            claims,
        })
    }

    /// Verify `text` with `public_key` and validate its claims.
    pub fn read(&self, text: &str, public_key: &str, options: &ReadOptions) -> Result<ReadResult> {
        self.read_at(text, public_key, options, Utc::now())
    }

    /// [`read`](Self::read) against a fixed `now`.
    #[tracing::instrument(skip(self, text, public_key, options))]
    pub fn read_at(
        &self,
        text: &str,
        public_key: &str,
        options: &ReadOptions,
        now: DateTime<Utc>,
    ) -> Result<ReadResult> {
        let envelope = envelope::unwrap(text)?;
        tracing::debug!(kis = %envelope.key_issuer, kid = %envelope.key_id, "reading token");

        // Expiry and issuance are mandatory on read, and the implicit
        // assertion is always the verifying key as given.
        let mut verify = options.verify.clone();
        verify.ignore_exp = false;
        verify.ignore_iat = false;

        let verified = self.signer.verify(
            &envelope.token,
            public_key,
            verify.footer.as_deref(),
            public_key.as_bytes(),
        )?;
        let claims = decode_claims(&verified.message)?;
        claims.validate_at(&verify, now)?;

        if let Some(key_id) = present(&options.key_id) {
            if claims.kid != key_id {
                return Err(NaspipError::InvalidKeyId);
            }
        }
        if let Some(key_issuer) = present(&options.key_issuer) {
            if claims.kis != key_issuer {
                return Err(NaspipError::InvalidKeyIssuer);
            }
        }
        if !options.ignore_key_expiration && now > claims.key_expiration()? {
            return Err(NaspipError::KeyExpired);
        }

        tracing::debug!(kid = %claims.kid, "token verified");
        Ok(ReadResult {
            version: verified.version,
            purpose: verified.purpose,
            footer: verified.footer,
            claims,
        })
    }

    /// Validate and sign a direct payment instruction.
    pub fn create_payment_instruction(
        &self,
        payload: &InstructionPayload,
        secret_key: &str,
        options: &CreateOptions,
    ) -> Result<String> {
        validate_payment_instruction(payload)?;
        self.create(payload.clone().into(), secret_key, options)
    }

    /// Validate and sign a URL redirect.
    pub fn create_url_payload(
        &self,
        payload: &UrlPayload,
        secret_key: &str,
        options: &CreateOptions,
    ) -> Result<String> {
        validate_url_payload(payload)?;
        self.create(payload.clone().into(), secret_key, options)
    }

    /// Sign `data` without structural validation.
    pub fn create(&self, data: TokenData, secret_key: &str, options: &CreateOptions) -> Result<String> {
        self.create_at(data, secret_key, options, now_millis())
    }

    /// [`create`](Self::create) against a fixed `now`.
    #[tracing::instrument(skip(self, data, secret_key, options), fields(kid = %options.key_id))]
    pub fn create_at(
        &self,
        data: TokenData,
        secret_key: &str,
        options: &CreateOptions,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if secret_key.is_empty() {
            return Err(NaspipError::MissingParameter("secretKey"));
        }
        if options.key_id.is_empty() {
            return Err(NaspipError::MissingParameter("kid"));
        }
        if options.key_issuer.is_empty() {
            return Err(NaspipError::MissingParameter("kis"));
        }
        let key_expiration = parse_rfc3339(&options.key_expiration)
            .map_err(|_| NaspipError::KeyExpirationUnparseable)?;
        if key_expiration < now {
            return Err(NaspipError::KeyExpired);
        }

        let mut options = options.clone();
        if present(&options.sign.expires_in).is_none() {
            let applied = self.config.default_expires_in.clone();
            self.diagnostics.emit(&Diagnostic::MissingExpiresIn {
                applied: applied.clone(),
            });
            options.sign.expires_in = Some(applied);
        }

        let claims = ClaimSet::issue(data, &options, now)?;
        let message = encode_claims(&claims);

        let assertion = match &options.sign.assertion {
            Some(assertion) => assertion.clone(),
            None => self.signer.public_key_for(secret_key)?.into_bytes(),
        };
        let footer = options.sign.footer.as_deref().unwrap_or_default();
        let token = self.signer.sign(&message, secret_key, footer, &assertion)?;

        tracing::debug!(kis = %options.key_issuer, "token created");
        Ok(envelope::wrap(&options.key_issuer, &options.key_id, &token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ClaimViolation, NaspipErrorCode};
    use crate::test_utils::{
        assert_claim_violation, assert_error_code, create_options, key_expiration_in,
        read_options, sample_instruction, sample_url_payload, RecordingDiagnostics,
        OTHER_PUBLIC_KEY, PUBLIC_KEY, SECRET_KEY,
    };
    use chrono::TimeDelta;

    fn builder() -> PaymentInstructionsBuilder {
        PaymentInstructionsBuilder::new()
    }

    #[test]
    fn create_then_read() {
        let builder = builder();
        let token = builder
            .create_payment_instruction(&sample_instruction(), SECRET_KEY, &create_options())
            .unwrap();
        assert!(token.starts_with("naspip;payment-processor.com;key-id-one;v4.public."));
        assert_eq!(token.split(';').count(), 4);

        let read = builder.read(&token, PUBLIC_KEY, &read_options()).unwrap();
        assert_eq!(read.version, "v4");
        assert_eq!(read.purpose, "public");
        assert!(read.footer.is_empty());
        assert_eq!(read.claims.iss.as_deref(), Some("qrCrypto.com"));
        assert_eq!(
            read.claims.data.as_ref().and_then(TokenData::as_instruction),
            Some(&sample_instruction())
        );
    }

    #[test]
    fn url_payload_round_trips() {
        let builder = builder();
        let token = builder
            .create_url_payload(&sample_url_payload(), SECRET_KEY, &create_options())
            .unwrap();
        let read = builder.read(&token, PUBLIC_KEY, &read_options()).unwrap();
        assert_eq!(
            read.claims.data.as_ref().and_then(TokenData::as_url),
            Some(&sample_url_payload())
        );
    }

    #[test]
    fn read_rejects_mismatches() {
        let builder = builder();
        let token = builder
            .create_payment_instruction(&sample_instruction(), SECRET_KEY, &create_options())
            .unwrap();

        let result = builder.read(&token, PUBLIC_KEY, &read_options().with_issuer("wrong"));
        assert_claim_violation(&result, ClaimViolation::IssuerMismatch);

        let result = builder.read(
            &token,
            PUBLIC_KEY,
            &read_options().with_key_issuer("other-issuer.com"),
        );
        assert_eq!(result, Err(NaspipError::InvalidKeyIssuer));

        let result = builder.read(&token, PUBLIC_KEY, &read_options().with_key_id("key-id-two"));
        assert_eq!(result, Err(NaspipError::InvalidKeyId));

        let result = builder.read(&token, OTHER_PUBLIC_KEY, &read_options());
        assert_eq!(result, Err(NaspipError::SignatureInvalid));
    }

    #[test]
    fn read_cannot_relax_expiry() {
        let builder = builder();
        let issued = Utc::now() - TimeDelta::hours(1);
        let token = builder
            .create_at(
                sample_instruction().into(),
                SECRET_KEY,
                &create_options(),
                issued,
            )
            .unwrap();

        let mut options = read_options();
        options.verify.ignore_exp = true;
        let result = builder.read(&token, PUBLIC_KEY, &options);
        assert_claim_violation(&result, ClaimViolation::TokenExpired);
    }

    #[test]
    fn read_checks_key_expiration() {
        let builder = builder();
        let now = Utc::now();
        let options = CreateOptions {
            key_expiration: key_expiration_in(1),
            ..create_options()
        }
        .with_expires_in("10d");
        let token = builder
            .create_at(sample_instruction().into(), SECRET_KEY, &options, now)
            .unwrap();

        let later = now + TimeDelta::days(2);
        let result = builder.read_at(&token, PUBLIC_KEY, &read_options(), later);
        assert_eq!(result, Err(NaspipError::KeyExpired));

        let relaxed = read_options().with_ignore_key_expiration(true);
        assert!(builder.read_at(&token, PUBLIC_KEY, &relaxed, later).is_ok());
    }

    #[test]
    fn create_validates_key_parameters() {
        let builder = builder();
        let data: TokenData = sample_instruction().into();

        assert_eq!(
            builder.create(data.clone(), "", &create_options()),
            Err(NaspipError::MissingParameter("secretKey"))
        );
        let options = CreateOptions {
            key_id: String::new(),
            ..create_options()
        };
        assert_eq!(
            builder.create(data.clone(), SECRET_KEY, &options),
            Err(NaspipError::MissingParameter("kid"))
        );
        let options = CreateOptions {
            key_issuer: String::new(),
            ..create_options()
        };
        assert_eq!(
            builder.create(data.clone(), SECRET_KEY, &options),
            Err(NaspipError::MissingParameter("kis"))
        );
        let options = CreateOptions {
            key_expiration: "next year".into(),
            ..create_options()
        };
        assert_eq!(
            builder.create(data.clone(), SECRET_KEY, &options),
            Err(NaspipError::KeyExpirationUnparseable)
        );
        let options = CreateOptions {
            key_expiration: key_expiration_in(-1),
            ..create_options()
        };
        assert_eq!(
            builder.create(data, SECRET_KEY, &options),
            Err(NaspipError::KeyExpired)
        );
    }

    #[test]
    fn create_rejects_invalid_payload_before_signing() {
        let mut payload = sample_instruction();
        payload.payment.amount = Some("0".into());
        let result = builder().create_payment_instruction(&payload, "not-a-key", &create_options());
        assert_error_code(&result, NaspipErrorCode::PayloadValidation);
    }

    #[test]
    fn missing_expires_in_applies_default_and_reports_it() {
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let builder = builder().with_diagnostics(diagnostics.clone());
        let options = CreateOptions::new("key-id-one", "payment-processor.com", key_expiration_in(30));
        let now = now_millis();

        let token = builder
            .create_at(sample_instruction().into(), SECRET_KEY, &options, now)
            .unwrap();
        assert_eq!(
            diagnostics.recorded(),
            vec![Diagnostic::MissingExpiresIn {
                applied: "10m".into()
            }]
        );

        let claims = builder.inspect(&token).unwrap().claims.unwrap();
        let exp = parse_rfc3339(claims.exp.as_deref().unwrap()).unwrap();
        assert_eq!(exp - now, TimeDelta::minutes(10));
    }

    #[test]
    fn configured_default_expiration() {
        let diagnostics = Arc::new(RecordingDiagnostics::default());
        let builder = builder()
            .with_diagnostics(diagnostics.clone())
            .with_config(ProtocolConfig::default().with_default_expires_in("1h"));
        let options = CreateOptions::new("key-id-one", "payment-processor.com", key_expiration_in(30));
        builder
            .create(sample_instruction().into(), SECRET_KEY, &options)
            .unwrap();
        assert_eq!(
            diagnostics.recorded(),
            vec![Diagnostic::MissingExpiresIn {
                applied: "1h".into()
            }]
        );
    }

    #[test]
    fn explicit_assertion_must_match_reading_key() {
        let builder = builder();
        let options = create_options().with_assertion(b"some-other-context".to_vec());
        let token = builder
            .create(sample_instruction().into(), SECRET_KEY, &options)
            .unwrap();
        assert_eq!(
            builder.read(&token, PUBLIC_KEY, &read_options()),
            Err(NaspipError::SignatureInvalid)
        );
    }

    #[test]
    fn footer_is_carried_and_checked() {
        let builder = builder();
        let options = create_options().with_footer(b"key-id-one".to_vec());
        let token = builder
            .create(sample_instruction().into(), SECRET_KEY, &options)
            .unwrap();

        let read = builder
            .read(&token, PUBLIC_KEY, &read_options().with_footer(b"key-id-one".to_vec()))
            .unwrap();
        assert_eq!(read.footer, b"key-id-one");

        assert_eq!(
            builder.read(&token, PUBLIC_KEY, &read_options().with_footer(b"other".to_vec())),
            Err(NaspipError::FooterMismatch)
        );
    }

    #[test]
    fn inspect_does_not_verify() {
        let builder = builder();
        let token = builder
            .create_payment_instruction(&sample_instruction(), SECRET_KEY, &create_options())
            .unwrap();
        let inspected = builder.inspect(&token).unwrap();
        assert_eq!(inspected.envelope.key_id, "key-id-one");
        assert_eq!(inspected.purpose, "public");
        assert_eq!(inspected.claims.unwrap().kis, "payment-processor.com");
    }

    #[test]
    fn decode_is_envelope_only() {
        let envelope = builder().decode("naspip;kis;kid;anything").unwrap();
        assert_eq!(envelope.token, "anything");
        assert_eq!(
            builder().decode("naspip;kis;kid"),
            Err(NaspipError::MalformedEnvelope)
        );
    }
}

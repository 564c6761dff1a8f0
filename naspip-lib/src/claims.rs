//! Claim set carried by every token.
//!
//! Besides the usual `iss`/`sub`/`aud`/`exp`/`nbf`/`iat`/`jti` claims, each
//! token carries the lifecycle of the key that signed it: `kid` (key id),
//! `kis` (key issuer) and `kep` (key expiration). A key can expire while
//! tokens it signed are still within their own `exp`.
//!
//! Validation takes one `now` instant so every check in a pass agrees on the
//! reference time.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CreateOptions, VerifyOptions};
use crate::duration::parse_duration;
use crate::errors::ClaimViolation;
use crate::payload::{present, TokenData};
use crate::timestamp::{format_rfc3339_millis, parse_rfc3339, truncate_millis};
use crate::{NaspipError, Result};

/// Decoded or freshly issued claims.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Signing key id.
    #[serde(default)]
    pub kid: String,
    /// Signing key issuer.
    #[serde(default)]
    pub kis: String,
    /// Signing key expiration (RFC3339).
    #[serde(default)]
    pub kep: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TokenData>,
}

fn offset(base: DateTime<Utc>, duration: &str) -> Result<DateTime<Utc>> {
    base.checked_add_signed(parse_duration(duration)?)
        .ok_or_else(|| NaspipError::InvalidDuration(duration.to_string()))
}

impl ClaimSet {
    /// Issue claims for `data` at `now`.
    ///
    /// `iat` is `now` unless `issued_at` overrides it; `exp` and `nbf` are
    /// offsets from `iat`. All timestamps have millisecond precision.
    pub fn issue(data: TokenData, options: &CreateOptions, now: DateTime<Utc>) -> Result<Self> {
        let sign = &options.sign;
        let issued_at = match present(&sign.issued_at) {
            Some(text) => truncate_millis(parse_rfc3339(text)?),
            None => truncate_millis(now),
        };
        let exp = present(&sign.expires_in)
            .map(|duration| offset(issued_at, duration))
            .transpose()?;
        let nbf = present(&sign.not_before)
            .map(|duration| offset(issued_at, duration))
            .transpose()?;

        Ok(Self {
            iss: present(&sign.issuer).map(String::from),
            sub: present(&sign.subject).map(String::from),
            aud: present(&sign.audience).map(String::from),
            exp: exp.map(format_rfc3339_millis),
            nbf: nbf.map(format_rfc3339_millis),
            iat: Some(format_rfc3339_millis(issued_at)),
            jti: present(&sign.jti).map(String::from),
            kid: options.key_id.clone(),
            kis: options.key_issuer.clone(),
            kep: options.key_expiration.clone(),
            data: Some(data),
        })
    }

    /// Check identity and temporal claims against `options` at `now`.
    ///
    /// Checks run in a fixed order and stop at the first failure: issuer,
    /// subject, audience, `iat`, `nbf`, `exp`, then maximum age. `nbf` is
    /// governed only by `ignore_nbf`; maximum age is skipped when `iat` is
    /// ignored.
    pub fn validate_at(&self, options: &VerifyOptions, now: DateTime<Utc>) -> Result<()> {
        expect_match(&options.issuer, &self.iss, ClaimViolation::IssuerMismatch)?;
        expect_match(&options.subject, &self.sub, ClaimViolation::SubjectMismatch)?;
        expect_match(&options.audience, &self.aud, ClaimViolation::AudienceMismatch)?;

        let issued_at = if options.ignore_iat {
            None
        } else {
            let text = present(&self.iat).ok_or(ClaimViolation::IssuedAtMissing)?;
            let issued_at = parse_rfc3339(text).map_err(|_| ClaimViolation::IssuedAtInvalid)?;
            if issued_at > now {
                return Err(ClaimViolation::TokenIssuedInFuture.into());
            }
            Some(issued_at)
        };

        if !options.ignore_nbf {
            if let Some(text) = present(&self.nbf) {
                let not_before =
                    parse_rfc3339(text).map_err(|_| ClaimViolation::NotBeforeInvalid)?;
                if not_before > now {
                    return Err(ClaimViolation::TokenNotYetActive.into());
                }
            }
        }

        if !options.ignore_exp {
            let text = present(&self.exp).ok_or(ClaimViolation::ExpirationMissing)?;
            let expires_at = parse_rfc3339(text).map_err(|_| ClaimViolation::ExpirationInvalid)?;
            if expires_at <= now {
                return Err(ClaimViolation::TokenExpired.into());
            }
        }

        if let (Some(issued_at), Some(max_age)) = (issued_at, present(&options.max_token_age)) {
            let max_age: TimeDelta = parse_duration(max_age)?;
            let oldest = issued_at
                .checked_add_signed(max_age)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            if now > oldest {
                return Err(ClaimViolation::MaxAgeExceeded.into());
            }
        }

        Ok(())
    }

    /// Key expiration as an instant.
    pub fn key_expiration(&self) -> Result<DateTime<Utc>> {
        parse_rfc3339(&self.kep).map_err(|_| NaspipError::KeyExpirationUnparseable)
    }
}

fn expect_match(
    expected: &Option<String>,
    actual: &Option<String>,
    violation: ClaimViolation,
) -> std::result::Result<(), ClaimViolation> {
    match present(expected) {
        Some(expected) if present(actual) != Some(expected) => Err(violation),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_instruction;
    use chrono::TimeZone;

    fn at(text: &str) -> DateTime<Utc> {
        parse_rfc3339(text).unwrap()
    }

    fn options() -> CreateOptions {
        CreateOptions::new("key-id-one", "payment-processor.com", "2030-01-01T00:00:00Z")
    }

    fn violation(result: Result<()>) -> ClaimViolation {
        match result {
            Err(NaspipError::Claim(violation)) => violation,
            other => panic!("expected a claim violation, got {other:?}"),
        }
    }

    #[test]
    fn issue_offsets_from_issued_at() {
        let options = options()
            .with_issued_at("2024-12-11T15:11:11Z")
            .with_expires_in("10h")
            .with_not_before("1h");
        let claims = ClaimSet::issue(sample_instruction().into(), &options, Utc::now()).unwrap();
        assert_eq!(claims.iat.as_deref(), Some("2024-12-11T15:11:11Z"));
        assert_eq!(claims.nbf.as_deref(), Some("2024-12-11T16:11:11Z"));
        assert_eq!(claims.exp.as_deref(), Some("2024-12-12T01:11:11Z"));
    }

    #[test]
    fn issue_stamps_key_lifecycle_and_identity() {
        let options = options().with_issuer("qrCrypto.com").with_jti("token-1");
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let claims = ClaimSet::issue(sample_instruction().into(), &options, now).unwrap();
        assert_eq!(claims.iat.as_deref(), Some("2025-03-01T12:00:00Z"));
        assert_eq!(claims.iss.as_deref(), Some("qrCrypto.com"));
        assert_eq!(claims.jti.as_deref(), Some("token-1"));
        assert_eq!(claims.kid, "key-id-one");
        assert_eq!(claims.kis, "payment-processor.com");
        assert_eq!(claims.kep, "2030-01-01T00:00:00Z");
        assert!(claims.exp.is_none());
        assert!(claims.nbf.is_none());
    }

    #[test]
    fn issue_rejects_bad_inputs() {
        let bad_duration = options().with_expires_in("forever");
        assert!(matches!(
            ClaimSet::issue(sample_instruction().into(), &bad_duration, Utc::now()),
            Err(NaspipError::InvalidDuration(_))
        ));

        let bad_iat = options().with_issued_at("yesterday");
        assert!(matches!(
            ClaimSet::issue(sample_instruction().into(), &bad_iat, Utc::now()),
            Err(NaspipError::InvalidTimestamp(_))
        ));
    }

    fn claims() -> ClaimSet {
        ClaimSet {
            iss: Some("qrCrypto.com".into()),
            sub: Some("checkout".into()),
            aud: Some("wallets".into()),
            iat: Some("2024-12-11T15:00:00Z".into()),
            nbf: Some("2024-12-11T15:00:00Z".into()),
            exp: Some("2024-12-11T16:00:00Z".into()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_valid_window() {
        let now = at("2024-12-11T15:30:00Z");
        assert!(claims().validate_at(&VerifyOptions::default(), now).is_ok());

        let expected = VerifyOptions {
            issuer: Some("qrCrypto.com".into()),
            subject: Some("checkout".into()),
            audience: Some("wallets".into()),
            ..Default::default()
        };
        assert!(claims().validate_at(&expected, now).is_ok());
    }

    #[test]
    fn identity_mismatches() {
        let now = at("2024-12-11T15:30:00Z");
        let check = |options: VerifyOptions| violation(claims().validate_at(&options, now));

        assert_eq!(
            check(VerifyOptions {
                issuer: Some("wrong".into()),
                ..Default::default()
            }),
            ClaimViolation::IssuerMismatch
        );
        assert_eq!(
            check(VerifyOptions {
                subject: Some("wrong".into()),
                ..Default::default()
            }),
            ClaimViolation::SubjectMismatch
        );
        assert_eq!(
            check(VerifyOptions {
                audience: Some("wrong".into()),
                ..Default::default()
            }),
            ClaimViolation::AudienceMismatch
        );
    }

    #[test]
    fn issuer_checked_before_expiry() {
        let options = VerifyOptions {
            issuer: Some("wrong".into()),
            ..Default::default()
        };
        let now = at("2030-01-01T00:00:00Z");
        assert_eq!(
            violation(claims().validate_at(&options, now)),
            ClaimViolation::IssuerMismatch
        );
    }

    #[test]
    fn temporal_checks() {
        let options = VerifyOptions::default();
        assert_eq!(
            violation(claims().validate_at(&options, at("2024-12-11T16:00:00Z"))),
            ClaimViolation::TokenExpired
        );

        let mut future = claims();
        future.nbf = Some("2024-12-11T15:45:00Z".into());
        assert_eq!(
            violation(future.validate_at(&options, at("2024-12-11T15:30:00Z"))),
            ClaimViolation::TokenNotYetActive
        );

        let mut issued_later = claims();
        issued_later.iat = Some("2024-12-11T15:45:00Z".into());
        assert_eq!(
            violation(issued_later.validate_at(&options, at("2024-12-11T15:30:00Z"))),
            ClaimViolation::TokenIssuedInFuture
        );
    }

    #[test]
    fn missing_and_malformed_claims() {
        let options = VerifyOptions::default();
        let now = at("2024-12-11T15:30:00Z");

        let mut no_iat = claims();
        no_iat.iat = None;
        assert_eq!(
            violation(no_iat.validate_at(&options, now)),
            ClaimViolation::IssuedAtMissing
        );

        let mut no_exp = claims();
        no_exp.exp = None;
        assert_eq!(
            violation(no_exp.validate_at(&options, now)),
            ClaimViolation::ExpirationMissing
        );

        let mut bad_exp = claims();
        bad_exp.exp = Some("soon".into());
        assert_eq!(
            violation(bad_exp.validate_at(&options, now)),
            ClaimViolation::ExpirationInvalid
        );

        let mut bad_nbf = claims();
        bad_nbf.nbf = Some("later".into());
        assert_eq!(
            violation(bad_nbf.validate_at(&options, now)),
            ClaimViolation::NotBeforeInvalid
        );
    }

    #[test]
    fn relaxations() {
        let now = at("2031-01-01T00:00:00Z");
        let mut stale = claims();
        stale.iat = None;
        let options = VerifyOptions {
            ignore_exp: true,
            ignore_iat: true,
            ..Default::default()
        };
        assert!(stale.validate_at(&options, now).is_ok());

        let mut pending = claims();
        pending.nbf = Some("2032-01-01T00:00:00Z".into());
        let options = VerifyOptions {
            ignore_exp: true,
            ignore_nbf: true,
            ..Default::default()
        };
        assert!(pending.validate_at(&options, now).is_ok());
    }

    #[test]
    fn max_token_age() {
        let mut old = claims();
        old.iat = Some("2000-11-11T15:15:15Z".into());
        let now = at("2024-12-11T15:30:00Z");
        let options = VerifyOptions {
            max_token_age: Some("10000h".into()),
            ..Default::default()
        };
        assert_eq!(
            violation(old.validate_at(&options, now)),
            ClaimViolation::MaxAgeExceeded
        );

        // Skipped entirely when iat is ignored.
        let options = VerifyOptions {
            ignore_iat: true,
            ..options
        };
        assert!(old.validate_at(&options, now).is_ok());

        let options = VerifyOptions {
            max_token_age: Some("1h".into()),
            ..Default::default()
        };
        assert!(claims().validate_at(&options, now).is_ok());
    }

    #[test]
    fn malformed_max_age_is_a_duration_error() {
        let options = VerifyOptions {
            max_token_age: Some("ages".into()),
            ..Default::default()
        };
        assert!(matches!(
            claims().validate_at(&options, at("2024-12-11T15:30:00Z")),
            Err(NaspipError::InvalidDuration(_))
        ));
    }

    #[test]
    fn key_expiration_parsing() {
        let mut claims = claims();
        claims.kep = "2030-01-01T00:00:00Z".into();
        assert_eq!(
            claims.key_expiration().unwrap(),
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
        );
        claims.kep = "never".into();
        assert_eq!(
            claims.key_expiration(),
            Err(NaspipError::KeyExpirationUnparseable)
        );
    }
}

//! Options for creating and reading tokens.
//!
//! All option types are plain serde structs so hosts can load them from JSON
//! alongside their own configuration. Byte fields (`footer`, `assertion`)
//! serialize as unpadded base64url strings.

use serde::{Deserialize, Serialize};

/// Expiration applied when a caller does not set `expires_in`.
pub const DEFAULT_EXPIRES_IN: &str = "10m";

/// Library-wide settings held by the builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Duration used when a token is created without `expires_in`.
    #[serde(default = "default_expires_in")]
    pub default_expires_in: String,
}

fn default_expires_in() -> String {
    DEFAULT_EXPIRES_IN.to_string()
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            default_expires_in: default_expires_in(),
        }
    }
}

impl ProtocolConfig {
    /// Set the fallback expiration.
    pub fn with_default_expires_in(mut self, duration: impl Into<String>) -> Self {
        self.default_expires_in = duration.into();
        self
    }
}

/// Claims and token extras applied when signing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignOptions {
    /// Token lifetime as a duration string, e.g. `"5m"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Override for `iat` (RFC3339). Only meant for tests and backdating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    /// Delay before the token becomes valid, as a duration string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    #[serde(with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub footer: Option<Vec<u8>>,
    /// Implicit assertion bound into the signature. Defaults to the public
    /// key, encoded the same way as the secret key.
    #[serde(with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Vec<u8>>,
}

/// Expected claims and relaxations applied when verifying.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    pub ignore_exp: bool,
    pub ignore_iat: bool,
    pub ignore_nbf: bool,
    /// Maximum age measured from `iat`, as a duration string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_token_age: Option<String>,
    /// Expected footer. When unset any footer is accepted.
    #[serde(with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub footer: Option<Vec<u8>>,
    #[serde(with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Vec<u8>>,
}

/// Options for [`crate::PaymentInstructionsBuilder::create`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOptions {
    /// Identifier of the signing key, stamped as `kid`.
    pub key_id: String,
    /// Entity that issued the signing key, stamped as `kis`.
    pub key_issuer: String,
    /// Expiration of the signing key (RFC3339), stamped as `kep`.
    pub key_expiration: String,
    pub sign: SignOptions,
}

impl CreateOptions {
    /// Create options for the given signing key.
    pub fn new(
        key_id: impl Into<String>,
        key_issuer: impl Into<String>,
        key_expiration: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_issuer: key_issuer.into(),
            key_expiration: key_expiration.into(),
            sign: SignOptions::default(),
        }
    }

    pub fn with_expires_in(mut self, duration: impl Into<String>) -> Self {
        self.sign.expires_in = Some(duration.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.sign.issuer = Some(issuer.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.sign.subject = Some(subject.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.sign.audience = Some(audience.into());
        self
    }

    pub fn with_jti(mut self, jti: impl Into<String>) -> Self {
        self.sign.jti = Some(jti.into());
        self
    }

    pub fn with_issued_at(mut self, issued_at: impl Into<String>) -> Self {
        self.sign.issued_at = Some(issued_at.into());
        self
    }

    pub fn with_not_before(mut self, duration: impl Into<String>) -> Self {
        self.sign.not_before = Some(duration.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<Vec<u8>>) -> Self {
        self.sign.footer = Some(footer.into());
        self
    }

    pub fn with_assertion(mut self, assertion: impl Into<Vec<u8>>) -> Self {
        self.sign.assertion = Some(assertion.into());
        self
    }
}

/// Options for [`crate::PaymentInstructionsBuilder::read`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Expected `kid`. Unchecked when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Expected `kis`. Unchecked when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_issuer: Option<String>,
    /// Skip the signing-key expiration check.
    pub ignore_key_expiration: bool,
    pub verify: VerifyOptions,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn with_key_issuer(mut self, key_issuer: impl Into<String>) -> Self {
        self.key_issuer = Some(key_issuer.into());
        self
    }

    pub fn with_ignore_key_expiration(mut self, ignore: bool) -> Self {
        self.ignore_key_expiration = ignore;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.verify.issuer = Some(issuer.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.verify.subject = Some(subject.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.verify.audience = Some(audience.into());
        self
    }

    pub fn with_ignore_nbf(mut self, ignore: bool) -> Self {
        self.verify.ignore_nbf = ignore;
        self
    }

    pub fn with_max_token_age(mut self, duration: impl Into<String>) -> Self {
        self.verify.max_token_age = Some(duration.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<Vec<u8>>) -> Self {
        self.verify.footer = Some(footer.into());
        self
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_str(&URL_SAFE_NO_PAD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|text| URL_SAFE_NO_PAD.decode(text).map_err(serde::de::Error::custom))
            .transpose()
    }
}

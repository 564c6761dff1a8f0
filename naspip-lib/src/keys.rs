//! Ed25519 keys in PASERK form.
//!
//! Keys are exchanged as `k4.secret.<base64url>` (64-byte seed || public key)
//! and `k4.public.<base64url>` (32-byte public key). The bare base64url body
//! is accepted as well; for secret keys either the 64-byte keypair or the
//! 32-byte seed.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey, KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{NaspipError, Result};

/// PASERK prefix of v4 secret keys.
pub const SECRET_KEY_PREFIX: &str = "k4.secret.";
/// PASERK prefix of v4 public keys.
pub const PUBLIC_KEY_PREFIX: &str = "k4.public.";

/// Output encoding for generated keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// `k4.secret.` / `k4.public.` prefixed.
    #[default]
    Paserk,
    /// Bare base64url.
    #[serde(rename = "keyobject")]
    Raw,
}

impl FromStr for KeyFormat {
    type Err = NaspipError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "paserk" => Ok(Self::Paserk),
            "keyobject" | "raw" => Ok(Self::Raw),
            other => Err(NaspipError::invalid_key(format!("unknown key format: {other}"))),
        }
    }
}

/// Ed25519 signing key.
#[derive(Clone)]
pub struct SecretKey {
    signing: SigningKey,
}

impl SecretKey {
    /// Generate a fresh key from the OS random source.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Parse a PASERK `k4.secret.` key or a bare base64url key.
    pub fn parse(text: &str) -> Result<Self> {
        let body = text.strip_prefix(SECRET_KEY_PREFIX).unwrap_or(text);
        let bytes = Zeroizing::new(
            URL_SAFE_NO_PAD
                .decode(body)
                .map_err(|_| NaspipError::invalid_key("secret key is not base64url"))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Build from a 64-byte keypair or a 32-byte seed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let signing = match bytes.len() {
            KEYPAIR_LENGTH => {
                let mut keypair = Zeroizing::new([0u8; KEYPAIR_LENGTH]);
                keypair.copy_from_slice(bytes);
                SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|_| NaspipError::invalid_key("secret key does not match its public half"))?
            }
            SECRET_KEY_LENGTH => {
                let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
                seed.copy_from_slice(bytes);
                SigningKey::from_bytes(&seed)
            }
            other => {
                return Err(NaspipError::invalid_key(format!(
                    "secret key must be {KEYPAIR_LENGTH} or {SECRET_KEY_LENGTH} bytes, got {other}"
                )))
            }
        };
        Ok(Self { signing })
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying: self.signing.verifying_key(),
        }
    }

    /// `k4.secret.` encoding.
    pub fn to_paserk(&self) -> String {
        format!("{SECRET_KEY_PREFIX}{}", self.to_raw())
    }

    /// Bare base64url encoding of the 64-byte keypair.
    pub fn to_raw(&self) -> String {
        let keypair = Zeroizing::new(self.signing.to_keypair_bytes());
        URL_SAFE_NO_PAD.encode(keypair.as_slice())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("public_key", &self.public_key().to_paserk())
            .finish_non_exhaustive()
    }
}

impl FromStr for SecretKey {
    type Err = NaspipError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Ed25519 verification key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    verifying: VerifyingKey,
}

impl PublicKey {
    /// Parse a PASERK `k4.public.` key or a bare base64url key.
    pub fn parse(text: &str) -> Result<Self> {
        let body = text.strip_prefix(PUBLIC_KEY_PREFIX).unwrap_or(text);
        let bytes = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| NaspipError::invalid_key("public key is not base64url"))?;
        Self::from_bytes(&bytes)
    }

    /// Build from the 32-byte compressed point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            NaspipError::invalid_key(format!(
                "public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        let verifying = VerifyingKey::from_bytes(&bytes)
            .map_err(|_| NaspipError::invalid_key("public key is not a valid curve point"))?;
        Ok(Self { verifying })
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.verifying.as_bytes()
    }

    /// `k4.public.` encoding.
    pub fn to_paserk(&self) -> String {
        format!("{PUBLIC_KEY_PREFIX}{}", self.to_raw())
    }

    /// Bare base64url encoding.
    pub fn to_raw(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.as_bytes())
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_paserk()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_paserk())
    }
}

impl FromStr for PublicKey {
    type Err = NaspipError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Encoded keypair as handed to callers.
#[derive(Clone, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct GeneratedKeys {
    #[serde(rename = "secretKey")]
    pub secret_key: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

impl fmt::Debug for GeneratedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedKeys")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Generate a new Ed25519 keypair in the requested encoding.
///
/// ```
/// use naspip_lib::keys::{generate_key, KeyFormat, PublicKey, SecretKey};
///
/// let keys = generate_key(KeyFormat::Paserk);
/// assert!(keys.secret_key.starts_with("k4.secret."));
/// let secret = SecretKey::parse(&keys.secret_key).unwrap();
/// assert_eq!(secret.public_key(), PublicKey::parse(&keys.public_key).unwrap());
/// ```
pub fn generate_key(format: KeyFormat) -> GeneratedKeys {
    let secret = SecretKey::generate();
    let public = secret.public_key();
    match format {
        KeyFormat::Paserk => GeneratedKeys {
            secret_key: secret.to_paserk(),
            public_key: public.to_paserk(),
        },
        KeyFormat::Raw => GeneratedKeys {
            secret_key: secret.to_raw(),
            public_key: public.to_raw(),
        },
    }
}

//! Envelope codec.
//!
//! A NASPIP string is four `;`-separated fields:
//!
//! ```text
//! naspip;<key_issuer>;<key_id>;<token>
//! ```
//!
//! Key issuer and key id travel outside the signed token so a reader can pick
//! the right public key before verifying anything.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{NaspipError, Result};

/// Literal first field of every envelope.
pub const PREFIX: &str = "naspip";

const SEPARATOR: char = ';';

/// Routing metadata plus the signed token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub prefix: String,
    #[serde(rename = "kis")]
    pub key_issuer: String,
    #[serde(rename = "kid")]
    pub key_id: String,
    pub token: String,
}

impl Envelope {
    pub fn new(
        key_issuer: impl Into<String>,
        key_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            prefix: PREFIX.to_string(),
            key_issuer: key_issuer.into(),
            key_id: key_id.into(),
            token: token.into(),
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.prefix, self.key_issuer, self.key_id, self.token
        )
    }
}

impl FromStr for Envelope {
    type Err = NaspipError;

    fn from_str(s: &str) -> Result<Self> {
        unwrap(s)
    }
}

/// Join key issuer, key id and token behind the fixed prefix.
pub fn wrap(key_issuer: &str, key_id: &str, token: &str) -> String {
    Envelope::new(key_issuer, key_id, token).to_string()
}

/// Split an envelope, rejecting anything but four fields led by `naspip`.
///
/// ```
/// use naspip_lib::envelope::unwrap;
///
/// let envelope = unwrap("naspip;payment-processor.com;key-id-one;v4.public.abc").unwrap();
/// assert_eq!(envelope.key_id, "key-id-one");
/// assert!(unwrap("qr-crypto;a;b;c").is_err());
/// ```
pub fn unwrap(text: &str) -> Result<Envelope> {
    let fields: Vec<&str> = text.split(SEPARATOR).collect();
    match fields[..] {
        [prefix, key_issuer, key_id, token] if prefix == PREFIX => Ok(Envelope {
            prefix: prefix.to_string(),
            key_issuer: key_issuer.to_string(),
            key_id: key_id.to_string(),
            token: token.to_string(),
        }),
        _ => Err(NaspipError::MalformedEnvelope),
    }
}

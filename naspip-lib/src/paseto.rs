//! # PASETO v4.public
//!
//! Ed25519 signatures over a pre-authentication encoding (PAE) of the
//! header, message, footer and implicit assertion:
//!
//! ```text
//! sig   = Ed25519.Sign(sk, PAE("v4.public.", m, f, i))
//! token = "v4.public." || b64(m || sig) [ || "." || b64(f) ]
//! ```
//!
//! The footer travels with the token in the clear but is authenticated. The
//! implicit assertion is never transmitted; the verifier must supply the same
//! bytes the signer used.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SIGNATURE_LENGTH};
use subtle::ConstantTimeEq;

use crate::keys::{PublicKey, SecretKey};
use crate::{NaspipError, Result};

/// Protocol version handled by this module.
pub const VERSION: &str = "v4";
/// Signed purpose.
pub const PURPOSE_PUBLIC: &str = "public";
/// Encrypted purpose. Recognised when inspecting, never verified here.
pub const PURPOSE_LOCAL: &str = "local";

const HEADER: &str = "v4.public.";

/// Pre-authentication encoding.
///
/// Each piece is prefixed by its length as a little-endian u64 with the top
/// bit cleared, and the whole is prefixed by the piece count.
pub fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    let capacity = 8 + pieces.iter().map(|piece| 8 + piece.len()).sum::<usize>();
    let mut out = Vec::with_capacity(capacity);
    out.extend_from_slice(&le64(pieces.len() as u64));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len() as u64));
        out.extend_from_slice(piece);
    }
    out
}

fn le64(n: u64) -> [u8; 8] {
    (n & (u64::MAX >> 1)).to_le_bytes()
}

/// Sign `message` into a `v4.public` token.
pub fn sign(message: &[u8], key: &SecretKey, footer: &[u8], assertion: &[u8]) -> String {
    let pre_auth = pae(&[HEADER.as_bytes(), message, footer, assertion]);
    let signature = key.signing_key().sign(&pre_auth);

    let mut body = Vec::with_capacity(message.len() + SIGNATURE_LENGTH);
    body.extend_from_slice(message);
    body.extend_from_slice(&signature.to_bytes());

    let mut token = format!("{HEADER}{}", URL_SAFE_NO_PAD.encode(body));
    if !footer.is_empty() {
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(footer));
    }
    token
}

/// A token whose signature has been checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedToken {
    pub version: String,
    pub purpose: String,
    pub footer: Vec<u8>,
    /// Signed message with the signature stripped.
    pub message: Vec<u8>,
}

/// Verify a `v4.public` token and return its authenticated parts.
///
/// When `expected_footer` is set it must equal the token footer; otherwise
/// whatever footer the token carries is authenticated as-is.
pub fn verify(
    token: &str,
    key: &PublicKey,
    expected_footer: Option<&[u8]>,
    assertion: &[u8],
) -> Result<VerifiedToken> {
    let parts = TokenParts::split(token)?;
    if parts.version != VERSION {
        return Err(NaspipError::UnsupportedTokenVersion(parts.version.to_string()));
    }
    if parts.purpose != PURPOSE_PUBLIC {
        return Err(NaspipError::UnsupportedTokenPurpose(parts.purpose.to_string()));
    }

    let footer = parts.footer()?;
    if let Some(expected) = expected_footer {
        if !bool::from(expected.ct_eq(&footer)) {
            return Err(NaspipError::FooterMismatch);
        }
    }

    let raw = parts.body()?;
    let (message, signature) = split_signature(&raw)?;
    let signature =
        Signature::from_slice(signature).map_err(|_| NaspipError::SignatureInvalid)?;

    let pre_auth = pae(&[HEADER.as_bytes(), message, footer.as_slice(), assertion]);
    key.verifying_key()
        .verify_strict(&pre_auth, &signature)
        .map_err(|_| NaspipError::SignatureInvalid)?;

    Ok(VerifiedToken {
        version: parts.version.to_string(),
        purpose: parts.purpose.to_string(),
        message: message.to_vec(),
        footer,
    })
}

/// Token pieces recovered without checking the signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnverifiedToken {
    pub version: String,
    pub purpose: String,
    pub footer: Vec<u8>,
    /// Signed message with the signature stripped. `None` for `local` tokens,
    /// whose body is ciphertext.
    pub message: Option<Vec<u8>>,
}

/// Split a v4 token without verifying it.
///
/// Nothing returned here is authenticated; use it only to decide which key
/// to verify with.
pub fn decode_unverified(token: &str) -> Result<UnverifiedToken> {
    let parts = TokenParts::split(token)?;
    if parts.version != VERSION {
        return Err(NaspipError::UnsupportedTokenVersion(parts.version.to_string()));
    }
    if parts.purpose != PURPOSE_PUBLIC && parts.purpose != PURPOSE_LOCAL {
        return Err(NaspipError::UnsupportedTokenPurpose(parts.purpose.to_string()));
    }

    let footer = parts.footer()?;
    let message = if parts.purpose == PURPOSE_PUBLIC {
        let raw = parts.body()?;
        let (message, _) = split_signature(&raw)?;
        Some(message.to_vec())
    } else {
        None
    };

    Ok(UnverifiedToken {
        version: parts.version.to_string(),
        purpose: parts.purpose.to_string(),
        footer,
        message,
    })
}

struct TokenParts<'a> {
    version: &'a str,
    purpose: &'a str,
    body: &'a str,
    footer: Option<&'a str>,
}

impl<'a> TokenParts<'a> {
    fn split(token: &'a str) -> Result<Self> {
        let pieces: Vec<&str> = token.split('.').collect();
        match pieces[..] {
            [version, purpose, body] => Ok(Self {
                version,
                purpose,
                body,
                footer: None,
            }),
            [version, purpose, body, footer] => Ok(Self {
                version,
                purpose,
                body,
                footer: Some(footer),
            }),
            _ => Err(NaspipError::malformed_token("expected 3 or 4 dot-separated parts")),
        }
    }

    fn body(&self) -> Result<Vec<u8>> {
        URL_SAFE_NO_PAD
            .decode(self.body)
            .map_err(|_| NaspipError::malformed_token("body is not base64url"))
    }

    fn footer(&self) -> Result<Vec<u8>> {
        match self.footer {
            Some(encoded) => URL_SAFE_NO_PAD
                .decode(encoded)
                .map_err(|_| NaspipError::malformed_token("footer is not base64url")),
            None => Ok(Vec::new()),
        }
    }
}

fn split_signature(raw: &[u8]) -> Result<(&[u8], &[u8])> {
    if raw.len() < SIGNATURE_LENGTH {
        return Err(NaspipError::malformed_token("body is shorter than a signature"));
    }
    Ok(raw.split_at(raw.len() - SIGNATURE_LENGTH))
}

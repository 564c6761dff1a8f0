//! Token signer trait.
//!
//! The builder never touches signature bytes itself. It hands opaque payload
//! bytes and key strings to a [`TokenSigner`], so hosts can route signing
//! through an HSM or a remote signer while keeping the protocol logic.

use crate::keys::{PublicKey, SecretKey, SECRET_KEY_PREFIX};
use crate::paseto::{self, VerifiedToken};
use crate::Result;

/// Produces and checks signed tokens over opaque payload bytes.
pub trait TokenSigner: Send + Sync {
    /// Sign `payload` with `secret_key` (PASERK or bare base64url).
    fn sign(&self, payload: &[u8], secret_key: &str, footer: &[u8], assertion: &[u8])
        -> Result<String>;

    /// Verify `token` with `public_key` and return its authenticated parts.
    fn verify(
        &self,
        token: &str,
        public_key: &str,
        footer: Option<&[u8]>,
        assertion: &[u8],
    ) -> Result<VerifiedToken>;

    /// Public key matching `secret_key`, encoded the same way (PASERK or
    /// bare base64url). Used as the default implicit assertion when the
    /// caller supplies none, so it must equal what readers pass as the key.
    fn public_key_for(&self, secret_key: &str) -> Result<String>;
}

/// In-process PASETO v4.public signer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PasetoV4Signer;

impl TokenSigner for PasetoV4Signer {
    fn sign(
        &self,
        payload: &[u8],
        secret_key: &str,
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<String> {
        let key = SecretKey::parse(secret_key)?;
        Ok(paseto::sign(payload, &key, footer, assertion))
    }

    fn verify(
        &self,
        token: &str,
        public_key: &str,
        footer: Option<&[u8]>,
        assertion: &[u8],
    ) -> Result<VerifiedToken> {
        let key = PublicKey::parse(public_key)?;
        paseto::verify(token, &key, footer, assertion)
    }

    fn public_key_for(&self, secret_key: &str) -> Result<String> {
        let public = SecretKey::parse(secret_key)?.public_key();
        if secret_key.starts_with(SECRET_KEY_PREFIX) {
            Ok(public.to_paserk())
        } else {
            Ok(public.to_raw())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PUBLIC_KEY, SECRET_KEY};
    use crate::NaspipError;

    #[test]
    fn signs_with_string_keys() {
        let signer = PasetoV4Signer;
        let token = signer
            .sign(b"payload", SECRET_KEY, b"", PUBLIC_KEY.as_bytes())
            .unwrap();
        let verified = signer
            .verify(&token, PUBLIC_KEY, None, PUBLIC_KEY.as_bytes())
            .unwrap();
        assert_eq!(verified.message, b"payload");
    }

    #[test]
    fn derives_public_key_in_matching_encoding() {
        assert_eq!(PasetoV4Signer.public_key_for(SECRET_KEY).unwrap(), PUBLIC_KEY);

        let raw_secret = SecretKey::parse(SECRET_KEY).unwrap().to_raw();
        let raw_public = PublicKey::parse(PUBLIC_KEY).unwrap().to_raw();
        assert_eq!(PasetoV4Signer.public_key_for(&raw_secret).unwrap(), raw_public);
    }

    #[test]
    fn bad_keys_surface_as_invalid_key() {
        let signer = PasetoV4Signer;
        assert!(matches!(
            signer.sign(b"payload", "not-a-key", b"", b""),
            Err(NaspipError::InvalidKey(_))
        ));
        assert!(matches!(
            signer.verify("v4.public.AAAA", "k4.public.AAAA", None, b""),
            Err(NaspipError::InvalidKey(_))
        ));
    }
}

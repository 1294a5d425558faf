//! Topic-scoped payload encryption.
//!
//! XChaCha20-Poly1305 with a 256-bit key negotiated at pairing. The 24-byte
//! nonce is random per message and travels prefixed to the ciphertext.

use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

const NONCE_LEN: usize = 24;

/// A 256-bit symmetric key scoped to one relay topic.
#[derive(Clone)]
pub struct TopicKey([u8; 32]);

impl TopicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes: [u8; 32] = hex::decode(hex_str)
            .map_err(|e| Error::Malformed(e.to_string()))?
            .try_into()
            .map_err(|_| Error::Malformed("topic key must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for TopicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TopicKey(..)")
    }
}

/// Seals and opens envelope payloads for one topic.
#[derive(Debug, Clone)]
pub struct TopicCipher {
    key: TopicKey,
}

impl TopicCipher {
    pub fn new(key: TopicKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext`; returns base64 over `nonce || ciphertext`.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let cipher = XChaCha20Poly1305::new(self.key.as_bytes().into());
        let mut nonce = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|e| Error::Cipher(e.to_string()))?;

        let mut wire = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        wire.extend_from_slice(&nonce);
        wire.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(wire))
    }

    /// Decrypt a sealed payload produced by [`seal`](Self::seal).
    pub fn open(&self, data: &str) -> Result<Vec<u8>> {
        let wire = BASE64
            .decode(data)
            .map_err(|e| Error::Malformed(e.to_string()))?;
        if wire.len() < NONCE_LEN {
            return Err(Error::Malformed("payload shorter than nonce".into()));
        }
        let (nonce, ciphertext) = wire.split_at(NONCE_LEN);

        let cipher = XChaCha20Poly1305::new(self.key.as_bytes().into());
        cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|e| Error::Cipher(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let cipher = TopicCipher::new(TopicKey::generate());
        let sealed = cipher.seal(b"pending transaction").unwrap();
        assert_eq!(cipher.open(&sealed).unwrap(), b"pending transaction");
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = TopicCipher::new(TopicKey::generate())
            .seal(b"secret")
            .unwrap();
        assert!(TopicCipher::new(TopicKey::generate()).open(&sealed).is_err());
    }

    #[test]
    fn tampered_payload_fails() {
        let cipher = TopicCipher::new(TopicKey::generate());
        let sealed = cipher.seal(b"secret").unwrap();
        let mut wire = BASE64.decode(&sealed).unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0xff;
        assert!(cipher.open(&BASE64.encode(wire)).is_err());
    }

    #[test]
    fn key_hex_roundtrip() {
        let key = TopicKey::generate();
        let hex_str = hex::encode(key.as_bytes());
        assert_eq!(TopicKey::from_hex(&hex_str).unwrap().as_bytes(), key.as_bytes());
        assert!(TopicKey::from_hex("abcd").is_err());
    }
}

//! Credential encryption for transit to the rendering backend.
//!
//! The backend holds the same secret and decrypts on its side; this
//! component only ever encrypts. The secret itself never appears in any
//! encoded output, log line, or error message.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::config::ConfigError;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

const IV_LEN: usize = 16;

/// Symmetric cipher for access tokens.
///
/// Key material is the SHA-256 digest of the configured secret. Every
/// call draws a fresh random initialization vector, so encrypting the
/// same credential twice yields two different encodings.
pub struct TokenCipher {
    key: [u8; 32],
}

impl TokenCipher {
    /// Derive the cipher from the configured secret.
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self {
            key: Sha256::digest(secret.as_bytes()).into(),
        })
    }

    /// Encrypt a credential as `hex(iv):hex(ciphertext)`.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        let mut buf = plaintext.as_bytes().to_vec();
        let mut cipher = Aes256Ctr::new(&self.key.into(), &iv.into());
        cipher.apply_keystream(&mut buf);

        format!("{}:{}", hex::encode(iv), hex::encode(buf))
    }

    /// Test-side inverse of `encrypt`. Production decryption belongs to
    /// the rendering backend.
    #[cfg(test)]
    fn decrypt(&self, encoded: &str) -> Option<String> {
        let (iv_hex, ct_hex) = encoded.split_once(':')?;
        let iv: [u8; IV_LEN] = hex::decode(iv_hex).ok()?.try_into().ok()?;
        let mut buf = hex::decode(ct_hex).ok()?;

        let mut cipher = Aes256Ctr::new(&self.key.into(), &iv.into());
        cipher.apply_keystream(&mut buf);

        String::from_utf8(buf).ok()
    }
}

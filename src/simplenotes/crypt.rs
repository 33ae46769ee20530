use argon2::Argon2;
use base64::{Engine as _, engine::general_purpose};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;

use crate::errors::{Error, Result};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;

#[derive(Clone)]
pub struct SlotCipher {
    password: String,
}

impl SlotCipher {
    pub fn new<S: Into<String>>(password: S) -> SlotCipher {
        SlotCipher { password: password.into() }
    }

    fn cipher(&self, salt: &[u8]) -> Result<XChaCha20Poly1305> {
        let mut key = [0u8; 32];
        Argon2::default()
            .hash_password_into(self.password.as_bytes(), salt, &mut key)
            .map_err(|_| Error::crypt("Key derivation failed"))?;
        Ok(XChaCha20Poly1305::new(Key::from_slice(&key)))
    }

    pub fn seal(&self, plain: &[u8]) -> Result<Vec<u8>> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

        let ciphertext = self.cipher(&salt)?
            .encrypt(&nonce, plain)
            .map_err(|_| Error::crypt("Encryption failed"))?;

        let mut envelope = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        envelope.extend_from_slice(&salt);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&envelope).into_bytes())
    }

    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        let text = std::str::from_utf8(sealed)
            .map_err(|_| Error::crypt("Sealed slot is not base64 text"))?;
        let envelope = general_purpose::STANDARD.decode(text.trim())
            .map_err(|e| Error::crypt(format!("Base64 decode error: {}", e)))?;
        if envelope.len() < SALT_LEN + NONCE_LEN {
            return Err(Error::crypt("Sealed slot is truncated"));
        }

        let (salt, rest) = envelope.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
        self.cipher(salt)?
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::crypt("Decryption failed. Wrong key?"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_what_it_sealed() {
        let cipher = SlotCipher::new("hunter2");
        let sealed = cipher.seal(b"[]").unwrap();
        assert_ne!(sealed, b"[]".to_vec());
        assert_eq!(cipher.open(&sealed).unwrap(), b"[]".to_vec());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let sealed = SlotCipher::new("right").seal(b"secret").unwrap();
        let err = SlotCipher::new("wrong").open(&sealed).unwrap_err();
        assert_eq!(err.desc, "Decryption failed. Wrong key?");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(SlotCipher::new("k").open(b"not base64 !!").is_err());
        assert!(SlotCipher::new("k").open(b"AAAA").is_err());
    }
}

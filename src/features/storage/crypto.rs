//! At-rest encryption for the reminder artifact
//!
//! AES-256-CBC with a constant all-zero IV, matching the artifact format
//! this bot has always written. Encryption is therefore deterministic:
//! the same plaintext yields the same ciphertext. Acceptable for a
//! single-writer store that never replays, and a documented weakness.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use anyhow::{anyhow, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV: [u8; 16] = [0u8; 16];

pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.into(), &IV.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

pub fn decrypt(key: &[u8; 32], ciphertext: &[u8]) -> Result<Vec<u8>> {
    Aes256CbcDec::new(key.into(), &IV.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| anyhow!("decryption failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_round_trip() {
        let plaintext = b"[{\"id\":1}]";
        let ciphertext = encrypt(KEY, plaintext);
        assert_ne!(&ciphertext[..], &plaintext[..]);
        assert_eq!(decrypt(KEY, &ciphertext).expect("decrypts"), plaintext);
    }

    #[test]
    fn test_encryption_is_deterministic() {
        // Constant IV: identical plaintext, identical ciphertext.
        let plaintext = b"same input";
        assert_eq!(encrypt(KEY, plaintext), encrypt(KEY, plaintext));
    }

    #[test]
    fn test_wrong_key_never_recovers_plaintext() {
        // Padding may or may not reject garbage, but the plaintext must
        // not come back.
        let ciphertext = encrypt(KEY, b"secret");
        let other = b"ffffffffffffffffffffffffffffffff";
        match decrypt(other, &ciphertext) {
            Ok(bytes) => assert_ne!(bytes, b"secret"),
            Err(_) => {}
        }
    }

    #[test]
    fn test_garbage_fails() {
        assert!(decrypt(KEY, b"not a block multiple").is_err());
    }
}

//! # Balance Cipher
//!
//! Symmetric encryption of the per-account balance string.
//!
//! The persisted format is fixed and must not change without a migration
//! plan for already-stored ciphertexts:
//!
//! - the plaintext is the decimal balance left-padded with zeros to a fixed
//!   width of 16 characters — exactly one AES block;
//! - the key is the 32 ASCII bytes of the account's hex-encoded secret key
//!   (AES-256);
//! - the cipher runs in single-block mode (no chaining, no nonce) and the
//!   ciphertext is hex-encoded.
//!
//! Single-block mode is a known-weak construction for anything beyond this
//! narrow fixed-width use; it is kept solely for compatibility with the
//! persisted ciphertexts.

use aes::Aes256;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use rand::RngCore;
use thiserror::Error;

/// Fixed plaintext width: one AES block of zero-padded decimal digits.
pub const BALANCE_WIDTH: usize = 16;

/// Largest balance representable in the padded width (16 decimal digits).
pub const MAX_BALANCE: i64 = 9_999_999_999_999_999;

/// Errors raised by the balance cipher.
///
/// A failure on read means the stored ciphertext is corrupt for that
/// account; a failure on write means the mutation must abort — a balance is
/// never committed without a valid ciphertext.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The secret key is not a 32-byte AES-256 key.
    #[error("WL_ERR_400: invalid secret key length: {0} bytes, expected 32")]
    InvalidKey(usize),

    /// The ciphertext is not valid hex or not exactly one block.
    #[error("WL_ERR_401: invalid ciphertext: {reason}")]
    InvalidCiphertext { reason: String },

    /// The balance does not fit the padded plaintext width, or the
    /// decrypted block is not a zero-padded decimal string.
    #[error("WL_ERR_402: malformed balance plaintext: {reason}")]
    MalformedPlaintext { reason: String },
}

fn new_cipher(key: &str) -> Result<Aes256, CipherError> {
    Aes256::new_from_slice(key.as_bytes()).map_err(|_| CipherError::InvalidKey(key.len()))
}

/// Generate a fresh per-account secret key: 16 random bytes, hex-encoded.
///
/// The 32-character hex string itself (not the decoded bytes) is the AES
/// key material, matching the persisted format.
#[must_use]
pub fn generate_secret_key() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Encrypt a balance amount under the account's secret key.
///
/// Pads the decimal amount to [`BALANCE_WIDTH`], encrypts the single block,
/// and returns the hex-encoded ciphertext.
///
/// # Errors
/// - [`CipherError::InvalidKey`] if the key is not 32 bytes.
/// - [`CipherError::MalformedPlaintext`] if the amount is negative or wider
///   than [`BALANCE_WIDTH`] digits.
pub fn encrypt_balance(key: &str, amount: i64) -> Result<String, CipherError> {
    if amount < 0 {
        return Err(CipherError::MalformedPlaintext {
            reason: format!("negative balance {amount}"),
        });
    }
    let digits = amount.to_string();
    if digits.len() > BALANCE_WIDTH {
        return Err(CipherError::MalformedPlaintext {
            reason: format!("{amount} exceeds {BALANCE_WIDTH} digits"),
        });
    }

    let cipher = new_cipher(key)?;
    let padded = format!("{digits:0>width$}", width = BALANCE_WIDTH);
    let mut block = aes::Block::clone_from_slice(padded.as_bytes());
    cipher.encrypt_block(&mut block);
    Ok(hex::encode(block))
}

/// Decrypt a stored balance ciphertext back to the numeric amount.
///
/// Strips the zero padding and parses the remainder as an integer. An
/// all-zero plaintext decodes to 0.
///
/// # Errors
/// - [`CipherError::InvalidKey`] if the key is not 32 bytes.
/// - [`CipherError::InvalidCiphertext`] if the ciphertext is not hex or not
///   exactly one block.
/// - [`CipherError::MalformedPlaintext`] if the decrypted block is not a
///   zero-padded decimal string (wrong key or corrupt data).
pub fn decrypt_balance(key: &str, ciphertext: &str) -> Result<i64, CipherError> {
    let bytes = hex::decode(ciphertext).map_err(|e| CipherError::InvalidCiphertext {
        reason: e.to_string(),
    })?;
    if bytes.len() != BALANCE_WIDTH {
        return Err(CipherError::InvalidCiphertext {
            reason: format!("{} bytes, expected {BALANCE_WIDTH}", bytes.len()),
        });
    }

    let cipher = new_cipher(key)?;
    let mut block = aes::Block::clone_from_slice(&bytes);
    cipher.decrypt_block(&mut block);

    let plain = std::str::from_utf8(&block).map_err(|_| CipherError::MalformedPlaintext {
        reason: "decrypted block is not UTF-8".into(),
    })?;
    let trimmed = plain.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| CipherError::MalformedPlaintext {
            reason: format!("not a decimal balance: {plain:?}"),
        })
}

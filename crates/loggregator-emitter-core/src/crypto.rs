//! Message signing for Loggregator envelopes.
//!
//! Loggregator does not authenticate envelopes with a MAC. The signature is
//! the SHA-256 digest of the message body, padded with a home-grown scheme
//! and encrypted with AES-128-CBC under a key derived from the shared
//! secret:
//!
//! ```text
//! key       = SHA-256(secret)[..16]
//! signature = IV || AES-128-CBC(key, IV, pad(SHA-256(body)))
//! ```
//!
//! Receivers reproduce this byte for byte, so the padding must not be
//! replaced with PKCS#7.

use aes::cipher::KeyInit;
use aes::Aes128;
use cbc::cipher::{block_padding::NoPadding, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CoreError, Result};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Length of the initialization vector prepended to every signature.
pub const IV_LEN: usize = BLOCK_SIZE;

/// Length of the derived AES-128 key.
pub const KEY_LEN: usize = 16;

/// First byte of the padding; the rest is zeros.
pub const PADDING_MARKER: u8 = 0x80;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Compute the SHA-256 digest of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The AES-128 key derived from a shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey([u8; KEY_LEN]);

impl SigningKey {
    /// Derive a key from the shared secret.
    ///
    /// The key is the first 16 bytes of the SHA-256 digest of the secret's
    /// UTF-8 bytes. Deterministic: the same secret always yields the same key.
    pub fn derive(secret: &str) -> Self {
        let digest = Sha256Digest::hash(secret.as_bytes());
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&digest.0[..KEY_LEN]);
        Self(key)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Pad `text` to a multiple of [`BLOCK_SIZE`].
///
/// Appends `0x80` and then zeros. At least one byte is always added, so an
/// already aligned input grows by a full block.
pub fn pad(text: &[u8]) -> Vec<u8> {
    let bytes_to_pad = BLOCK_SIZE - text.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(text.len() + bytes_to_pad);
    padded.extend_from_slice(text);
    padded.push(PADDING_MARKER);
    padded.resize(text.len() + bytes_to_pad, 0);
    padded
}

/// Strip padding added by [`pad`].
///
/// Trailing zeros are skipped; the last non-zero byte must be `0x80`.
pub fn unpad(text: &[u8]) -> Result<&[u8]> {
    let marker = text
        .iter()
        .rposition(|&b| b != 0)
        .ok_or(CoreError::BadPadding)?;

    if text[marker] != PADDING_MARKER {
        return Err(CoreError::BadPadding);
    }
    Ok(&text[..marker])
}

/// Signs message bodies with a key derived from the shared secret.
///
/// The key is derived once and never changes. Signing holds no mutable
/// state, so a signer can be shared across threads.
#[derive(Clone)]
pub struct MessageSigner {
    key: SigningKey,
}

impl MessageSigner {
    /// Derive the signing key from the shared secret.
    pub fn new(secret: &str) -> Result<Self> {
        Self::from_key(SigningKey::derive(secret))
    }

    /// Create a signer from an already derived key.
    pub fn from_key(key: SigningKey) -> Result<Self> {
        Aes128::new_from_slice(key.as_bytes())
            .map_err(|e| CoreError::CryptoInit(e.to_string()))?;
        Ok(Self { key })
    }

    /// Get the derived key.
    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    /// Sign a message body with a fresh random IV.
    ///
    /// Returns `IV || ciphertext`, 64 bytes for a SHA-256 digest. Two calls
    /// over the same body produce different signatures.
    pub fn sign(&self, body: &[u8]) -> Result<Vec<u8>> {
        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);
        self.sign_with_iv(body, &iv)
    }

    /// Sign a message body with a caller-chosen IV.
    ///
    /// Never reuse an IV on the wire; this exists to pin exact signature
    /// bytes in test vectors.
    pub fn sign_with_iv(&self, body: &[u8], iv: &[u8; IV_LEN]) -> Result<Vec<u8>> {
        let digest = Sha256Digest::hash(body);
        let padded = pad(digest.as_bytes());

        let cipher = Aes128CbcEnc::new_from_slices(self.key.as_bytes(), iv)
            .map_err(|e| CoreError::CryptoOperation(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<NoPadding>(&padded);

        let mut signature = Vec::with_capacity(IV_LEN + ciphertext.len());
        signature.extend_from_slice(iv);
        signature.extend_from_slice(&ciphertext);
        Ok(signature)
    }
}

impl fmt::Debug for MessageSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageSigner").field("key", &self.key).finish()
    }
}

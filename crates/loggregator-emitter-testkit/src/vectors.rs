//! Golden test vectors for the signing scheme.
//!
//! These vectors were computed independently of this crate. Any receiver
//! that verifies Loggregator signatures must agree with them byte for byte.

use aes::Aes128;
use cbc::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};

use loggregator_emitter_core::{
    build_message, LogEnvelope, MessageSigner, MessageType, SigningKey, IV_LEN,
};

/// Input text of a golden vector.
#[derive(Debug, Clone, Copy)]
pub enum VectorText {
    /// Text used as is.
    Literal(&'static str),
    /// A character repeated `n` times.
    Repeated(char, usize),
}

impl VectorText {
    /// Materialize the text.
    pub fn to_text(self) -> String {
        match self {
            VectorText::Literal(s) => s.to_owned(),
            VectorText::Repeated(c, n) => std::iter::repeat(c).take(n).collect(),
        }
    }
}

/// A golden signing vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Shared secret.
    pub secret: &'static str,
    /// Log text, truncated by the normal message rules.
    pub text: VectorText,
    /// Initialization vector.
    pub iv: [u8; IV_LEN],
    /// Expected derived key (hex).
    pub expected_key: &'static str,
    /// Expected `IV || ciphertext` (hex).
    pub expected_signature: &'static str,
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "hello world under hunter2",
            secret: "hunter2",
            text: VectorText::Literal("hello world"),
            iv: [
                0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
                0x0d, 0x0e, 0x0f,
            ],
            expected_key: "f52fbd32b2b3b86ff88ef6c490628285",
            expected_signature: "000102030405060708090a0b0c0d0e0f\
                                 ec3172deac163707728bf377b4f30579\
                                 ea1ae67047d7c1dad8281fb85dbab9fe\
                                 5bd5903790b4100adfbecc46593afa12",
        },
        GoldenVector {
            name: "empty body",
            secret: "hunter2",
            text: VectorText::Literal(""),
            iv: [0xaa; IV_LEN],
            expected_key: "f52fbd32b2b3b86ff88ef6c490628285",
            expected_signature: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\
                                 ac0c687eed097c4a7dbeb9ac9806ae3b\
                                 b451465225f080cf1e08050faee3fd22\
                                 8b2af384e141bc7ebd342b5927b436a1",
        },
        GoldenVector {
            name: "multi-byte secret and body",
            secret: "pässwörd",
            text: VectorText::Literal("café ☕"),
            iv: [0x00; IV_LEN],
            expected_key: "46970bef70aced8123f0d5d094717e2a",
            expected_signature: "00000000000000000000000000000000\
                                 0f81299d2e12faab781144598fa58bb5\
                                 1db4de7d42232f5d19bd349dcad746f2\
                                 c410d99daa9cc3d0830dfe73a8f471cf",
        },
        GoldenVector {
            name: "truncated body",
            secret: "loggregator-secret",
            text: VectorText::Repeated('x', 10_000),
            iv: [0xff; IV_LEN],
            expected_key: "f3d3600985dee7169281bb71e58e7601",
            expected_signature: "ffffffffffffffffffffffffffffffff\
                                 50e14f9dec23bc05aa6c6ff5ed40b024\
                                 019946d8a19ef5c5bd5557b5808c749b\
                                 45e86e814ad201a97d7ae1df560f1b32",
        },
    ]
}

/// Compute the key and signature for a vector.
///
/// Returns `(key_hex, signature_hex)`.
pub fn compute_vector(vector: &GoldenVector) -> (String, String) {
    let signer = MessageSigner::new(vector.secret).expect("signer setup");
    let message = build_message("golden", &vector.text.to_text(), MessageType::Out, None, None);
    let signature = signer
        .sign_with_iv(&message.body, &vector.iv)
        .expect("signing");
    (signer.key().to_hex(), hex::encode(signature))
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, computed_signature_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let (key, signature) = compute_vector(v);
            let matches = key == v.expected_key && signature == v.expected_signature;
            (v.name.to_string(), matches, signature)
        })
        .collect()
}

/// Decrypt a signature back to the padded digest.
///
/// Test-only inverse of signing; panics on malformed input.
pub fn decrypt_signature(key: &SigningKey, signature: &[u8]) -> Vec<u8> {
    let (iv, ciphertext) = signature.split_at(IV_LEN);
    cbc::Decryptor::<Aes128>::new_from_slices(key.as_bytes(), iv)
        .expect("key and iv lengths")
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .expect("block-aligned ciphertext")
}

/// Decrypt the signature of an envelope with the key derived from `secret`.
pub fn envelope_plaintext(envelope: &LogEnvelope, secret: &str) -> Vec<u8> {
    decrypt_signature(&SigningKey::derive(secret), &envelope.signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loggregator_emitter_core::{unpad, Sha256Digest, MAX_MESSAGE_BYTES};

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, computed) in verify_all_vectors() {
            assert!(matches, "vector '{}' mismatch, computed {}", name, computed);
        }
    }

    #[test]
    fn test_vector_signatures_are_64_bytes() {
        for vector in all_vectors() {
            assert_eq!(vector.expected_signature.len(), 128, "{}", vector.name);
        }
    }

    #[test]
    fn test_truncated_vector_uses_full_ceiling() {
        let vector = all_vectors()
            .into_iter()
            .find(|v| v.name == "truncated body")
            .unwrap();
        let message = build_message("golden", &vector.text.to_text(), MessageType::Out, None, None);
        assert_eq!(message.body.len(), MAX_MESSAGE_BYTES);
    }

    #[test]
    fn test_decrypt_signature_recovers_digest() {
        let vector = &all_vectors()[0];
        let signature = hex::decode(vector.expected_signature).unwrap();
        let plaintext = decrypt_signature(&SigningKey::derive(vector.secret), &signature);
        assert_eq!(
            unpad(&plaintext).unwrap(),
            Sha256Digest::hash(b"hello world").as_bytes()
        );
    }
}

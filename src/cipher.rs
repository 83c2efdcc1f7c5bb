//! Symmetric layer: XOR-fold key derivation + AES-256-OFB.
//!
//! key        = XOR-fold(shared_secret) into 32 bytes
//! ciphertext = iv[16] || AES-256-OFB(key, iv, plaintext)
//!
//! The fold is not a KDF and OFB carries no integrity tag. Both are kept
//! bit-exact for compatibility with existing responses: a wrong key or a
//! flipped byte decrypts to garbage instead of failing.

use aes::Aes256;
use getrandom::getrandom;
use ofb::cipher::{KeyIvInit, StreamCipher};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

pub const KEY_BYTES: usize = 32;
pub const BLOCK_BYTES: usize = 16;

type Aes256Ofb = ofb::Ofb<Aes256>;

/// A 32-byte AES-256 key derived from an ECDH shared secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    bytes: [u8; KEY_BYTES],
}

impl CipherKey {
    /// Fold `secret` into a key.
    ///
    /// The secret is doubled until it is at least 32 bytes long, then every
    /// byte `i` is XORed into position `i mod 32`.
    pub fn from_shared_secret(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::KeyAgreement("empty shared secret".into()));
        }
        let mut bytes = [0u8; KEY_BYTES];
        let mut copies = 1;
        while secret.len() * copies < KEY_BYTES {
            copies *= 2;
        }
        for (i, b) in secret.iter().cycle().take(secret.len() * copies).enumerate() {
            bytes[i % KEY_BYTES] ^= b;
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.bytes
    }

    /// Encrypt under a fresh random IV. Output is `iv || ciphertext`,
    /// exactly `BLOCK_BYTES` longer than the input.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let iv = iv()?;
        let mut out = Vec::with_capacity(BLOCK_BYTES + plaintext.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(plaintext);
        apply_keystream(&self.bytes, &iv, &mut out[BLOCK_BYTES..])?;
        Ok(out)
    }

    /// Decrypt `iv || ciphertext`. Fails only when the input cannot hold an IV.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() < BLOCK_BYTES {
            return Err(Error::Decryption(format!(
                "ciphertext is {} bytes, shorter than the {BLOCK_BYTES}-byte IV",
                data.len()
            )));
        }
        let (iv, ciphertext) = data.split_at(BLOCK_BYTES);
        let mut out = ciphertext.to_vec();
        apply_keystream(&self.bytes, iv, &mut out).map_err(|e| Error::Decryption(e.to_string()))?;
        Ok(out)
    }
}

/// Generate a random 16-byte IV. Used during encryption only.
fn iv() -> Result<[u8; BLOCK_BYTES]> {
    let mut n = [0u8; BLOCK_BYTES];
    getrandom(&mut n).map_err(|e| Error::Encryption(format!("could not create random IV: {e}")))?;
    Ok(n)
}

/// OFB is symmetric: the same call encrypts and decrypts in place.
fn apply_keystream(key: &[u8; KEY_BYTES], iv: &[u8], buf: &mut [u8]) -> Result<()> {
    let mut stream = Aes256Ofb::new_from_slices(key, iv)
        .map_err(|_| Error::Encryption("invalid key or IV length".into()))?;
    stream.apply_keystream(buf);
    Ok(())
}

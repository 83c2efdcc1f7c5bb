//! Ephemeral EC key pairs: P-256, P-384 or P-521.
//!
//! Key serialization:
//!   PrivateKey = PKCS#8 DER (ECPrivateKey with curve OID)
//!   PublicKey  = PKIX SubjectPublicKeyInfo DER
//!
//! The text form of either key is standard base64 of its DER encoding.
//! Serde picks the DER bytes for binary formats and the base64 text for
//! human-readable ones.
//!
//! Shared secret (fed to the XOR-fold in `cipher`):
//!   x-coordinate of the ECDH point, big-endian, field-size bytes

use core::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand_core::{OsRng, RngCore};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::curve::Curve;
use crate::error::{Error, Result};

/// Upper bound on scalar rejection sampling. Each draw succeeds with
/// probability above 1/2 on every supported curve.
const MAX_SAMPLE_ATTEMPTS: usize = 64;

/// Bytes of the SHA-256 digest shown as a key fingerprint.
const FINGERPRINT_BYTES: usize = 8;

// ---------------------------------------------------------------------------
// Private key
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq)]
enum SecretInner {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
    P521(p521::SecretKey),
}

/// A private scalar on one of the supported curves.
///
/// Scalar material is zeroized when the key is dropped. Equality compares
/// the underlying scalar (constant time), not the encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    inner: SecretInner,
}

impl PrivateKey {
    /// Sample a fresh private key on `curve`.
    pub fn generate(curve: Curve) -> Result<Self> {
        let inner = match curve {
            Curve::P256 => SecretInner::P256(sample(curve, |b| p256::SecretKey::from_slice(b).ok())?),
            Curve::P384 => SecretInner::P384(sample(curve, |b| p384::SecretKey::from_slice(b).ok())?),
            Curve::P521 => SecretInner::P521(sample(curve, |b| p521::SecretKey::from_slice(b).ok())?),
        };
        tracing::trace!(%curve, "generated private key");
        Ok(Self { inner })
    }

    pub fn curve(&self) -> Curve {
        match &self.inner {
            SecretInner::P256(_) => Curve::P256,
            SecretInner::P384(_) => Curve::P384,
            SecretInner::P521(_) => Curve::P521,
        }
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        let inner = match &self.inner {
            SecretInner::P256(k) => PublicInner::P256(k.public_key()),
            SecretInner::P384(k) => PublicInner::P384(k.public_key()),
            SecretInner::P521(k) => PublicInner::P521(k.public_key()),
        };
        PublicKey { inner }
    }

    /// ECDH with `peer`. Both keys must be on the same curve.
    pub fn shared_secret(&self, peer: &PublicKey) -> Result<Zeroizing<Vec<u8>>> {
        let secret = match (&self.inner, &peer.inner) {
            (SecretInner::P256(sk), PublicInner::P256(pk)) => {
                let ss = p256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
                ss.raw_secret_bytes().to_vec()
            }
            (SecretInner::P384(sk), PublicInner::P384(pk)) => {
                let ss = p384::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
                ss.raw_secret_bytes().to_vec()
            }
            (SecretInner::P521(sk), PublicInner::P521(pk)) => {
                let ss = p521::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
                ss.raw_secret_bytes().to_vec()
            }
            _ => {
                return Err(Error::KeyAgreement(format!(
                    "curve mismatch: private key on {}, public key on {}",
                    self.curve(),
                    peer.curve()
                )))
            }
        };
        Ok(Zeroizing::new(secret))
    }

    /// Serialize as PKCS#8 DER.
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let doc = match &self.inner {
            SecretInner::P256(k) => k.to_pkcs8_der(),
            SecretInner::P384(k) => k.to_pkcs8_der(),
            SecretInner::P521(k) => k.to_pkcs8_der(),
        }
        .map_err(|e| Error::KeyFormat(format!("unable to marshal private key: {e}")))?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    /// Parse PKCS#8 DER. The curve is taken from the algorithm parameters.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = if let Ok(k) = p256::SecretKey::from_pkcs8_der(der) {
            SecretInner::P256(k)
        } else if let Ok(k) = p384::SecretKey::from_pkcs8_der(der) {
            SecretInner::P384(k)
        } else if let Ok(k) = p521::SecretKey::from_pkcs8_der(der) {
            SecretInner::P521(k)
        } else {
            return Err(Error::KeyFormat(
                "not a PKCS#8 EC private key on a supported curve".into(),
            ));
        };
        Ok(Self { inner })
    }

    /// Base64 of the PKCS#8 DER.
    pub fn to_base64(&self) -> Result<Zeroizing<String>> {
        let der = self.to_der()?;
        Ok(Zeroizing::new(STANDARD.encode(der.as_slice())))
    }

    pub fn from_base64(text: &str) -> Result<Self> {
        let der = Zeroizing::new(
            STANDARD
                .decode(text.trim())
                .map_err(|e| Error::KeyFormat(format!("could not decode key text: {e}")))?,
        );
        Self::from_der(&der)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Public key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum PublicInner {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    P521(p521::PublicKey),
}

/// A public point on one of the supported curves.
///
/// Parsing guarantees the point is on its curve and is not the identity, so
/// every `PublicKey` is usable for ECDH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: PublicInner,
}

impl PublicKey {
    /// Curve of this key; a responder generates its own key on the same one.
    pub fn curve(&self) -> Curve {
        match &self.inner {
            PublicInner::P256(_) => Curve::P256,
            PublicInner::P384(_) => Curve::P384,
            PublicInner::P521(_) => Curve::P521,
        }
    }

    /// Serialize as PKIX SubjectPublicKeyInfo DER.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let doc = match &self.inner {
            PublicInner::P256(k) => k.to_public_key_der(),
            PublicInner::P384(k) => k.to_public_key_der(),
            PublicInner::P521(k) => k.to_public_key_der(),
        }
        .map_err(|e| Error::KeyFormat(format!("unable to marshal public key: {e}")))?;
        Ok(doc.into_vec())
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = if let Ok(k) = p256::PublicKey::from_public_key_der(der) {
            PublicInner::P256(k)
        } else if let Ok(k) = p384::PublicKey::from_public_key_der(der) {
            PublicInner::P384(k)
        } else if let Ok(k) = p521::PublicKey::from_public_key_der(der) {
            PublicInner::P521(k)
        } else {
            return Err(Error::KeyFormat(
                "not a PKIX EC public key on a supported curve".into(),
            ));
        };
        Ok(Self { inner })
    }

    pub fn to_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_der()?))
    }

    pub fn from_base64(text: &str) -> Result<Self> {
        let der = STANDARD
            .decode(text.trim())
            .map_err(|e| Error::KeyFormat(format!("could not decode key text: {e}")))?;
        Self::from_der(&der)
    }

    /// Short hex digest of the PKIX encoding, for humans comparing keys.
    pub fn fingerprint(&self) -> String {
        match self.to_der() {
            Ok(der) => hex::encode(&Sha256::digest(&der)[..FINGERPRINT_BYTES]),
            Err(_) => String::from("unencodable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Draw field-sized random strings until one parses as a valid scalar.
///
/// P-521 scalars are 521 bits in 66 bytes, so the top 7 bits are cleared
/// before parsing; otherwise nearly every draw would exceed the order.
fn sample<K>(curve: Curve, parse: impl Fn(&[u8]) -> Option<K>) -> Result<K> {
    // Scalars share the field-element width with the ECDH output.
    let mut buf = Zeroizing::new(vec![0u8; curve.shared_secret_len()]);
    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| Error::KeyGeneration(format!("random source failed: {e}")))?;
        if curve == Curve::P521 {
            buf[0] &= 0x01;
        }
        if let Some(key) = parse(&buf) {
            return Ok(key);
        }
    }
    Err(Error::KeyGeneration(format!(
        "no valid {curve} scalar after {MAX_SAMPLE_ATTEMPTS} draws"
    )))
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            let text = self.to_base64().map_err(ser::Error::custom)?;
            serializer.serialize_str(&text)
        } else {
            let der = self.to_der().map_err(ser::Error::custom)?;
            serializer.serialize_bytes(&der)
        }
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = Zeroizing::new(String::deserialize(deserializer)?);
            Self::from_base64(&text).map_err(de::Error::custom)
        } else {
            let der = Zeroizing::new(Vec::<u8>::deserialize(deserializer)?);
            Self::from_der(&der).map_err(de::Error::custom)
        }
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            let text = self.to_base64().map_err(ser::Error::custom)?;
            serializer.serialize_str(&text)
        } else {
            let der = self.to_der().map_err(ser::Error::custom)?;
            serializer.serialize_bytes(&der)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            Self::from_base64(&text).map_err(de::Error::custom)
        } else {
            let der = Vec::<u8>::deserialize(deserializer)?;
            Self::from_der(&der).map_err(de::Error::custom)
        }
    }
}

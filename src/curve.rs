//! Curve selection.
//!
//! Every new request picks one of the supported NIST curves uniformly at
//! random. The responder never chooses: it reuses the curve implied by the
//! request's public key.

use core::fmt;

use rand_core::{OsRng, RngCore};

use crate::error::{Error, Result};

/// Supported elliptic curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    /// All supported curves, in selection order.
    pub const ALL: [Curve; 3] = [Curve::P256, Curve::P384, Curve::P521];

    /// Pick a curve uniformly at random.
    ///
    /// One random byte is reduced modulo the number of curves. Bytes at or
    /// above the largest multiple of that count are rejected and redrawn, so
    /// the result carries no modulo bias.
    pub fn random() -> Result<Self> {
        let n = Self::ALL.len() as u8;
        let limit = u8::MAX - (u8::MAX % n);
        let mut b = [0u8; 1];
        loop {
            OsRng
                .try_fill_bytes(&mut b)
                .map_err(|e| Error::KeyGeneration(format!("unable to read a random byte: {e}")))?;
            if b[0] < limit {
                let curve = Self::ALL[(b[0] % n) as usize];
                tracing::trace!(%curve, "selected random curve");
                return Ok(curve);
            }
        }
    }

    /// Standard curve name.
    pub fn name(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }

    /// Length of the raw ECDH output (the x-coordinate) on this curve.
    pub fn shared_secret_len(&self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_curve_is_supported() {
        for _ in 0..32 {
            let c = Curve::random().unwrap();
            assert!(Curve::ALL.contains(&c));
        }
    }

    #[test]
    fn random_curve_reaches_every_curve() {
        let seen: HashSet<Curve> = (0..600).map(|_| Curve::random().unwrap()).collect();
        assert_eq!(seen.len(), Curve::ALL.len());
    }

    #[test]
    fn names() {
        assert_eq!(Curve::P256.to_string(), "P-256");
        assert_eq!(Curve::P384.name(), "P-384");
        assert_eq!(Curve::P521.shared_secret_len(), 66);
    }
}

//! # Ephemeral
//!
//! Ask for a secret over a public channel without a pre-shared key.
//!
//! ## Quick Start
//!
//! ```rust
//! use ephemeral::{Envelope, PrivateRequest, PublicRequest, Response};
//!
//! // A: create a request, keep the private half, post the public half
//! let request = PrivateRequest::new("database password").unwrap();
//! let posted = Envelope::sealed(&request.public(), request.description.clone())
//!     .unwrap()
//!     .marshal()
//!     .unwrap();
//!
//! // B: answer it
//! let public: PublicRequest = Envelope::unmarshal(&posted).unwrap().open().unwrap();
//! let reply = Envelope::sealed(&public.encode(b"swordfish").unwrap(), "")
//!     .unwrap()
//!     .marshal()
//!     .unwrap();
//!
//! // A: read the answer
//! let response: Response = Envelope::unmarshal(&reply).unwrap().open().unwrap();
//! assert_eq!(request.decode(&response).unwrap(), b"swordfish");
//! ```
//!
//! ## Protocol
//!
//! - **Key exchange**: ECDH on a randomly chosen curve (P-256, P-384, P-521)
//! - **Key derivation**: XOR-fold of the shared secret into 32 bytes
//! - **Encryption**: AES-256-OFB with a random IV prepended
//! - **Transport**: zlib + base64 armor between `-----` markers
//!
//! ## What's NOT Provided
//!
//! - Authentication of either party (a man-in-the-middle can swap keys)
//! - Ciphertext integrity (tampering decrypts to garbage, not an error)
//! - Request/response ID matching inside `decode`
//!   (see [`PrivateRequest::answered_by`])

#![deny(unsafe_code)]

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

pub mod cipher;
pub mod curve;
pub mod envelope;
mod error;
pub mod keys;
pub mod request;
pub mod wire;

#[cfg(feature = "cli")]
pub mod cli;

// ---------------------------------------------------------------------------
// Public interface
// ---------------------------------------------------------------------------

pub use cipher::CipherKey;
pub use curve::Curve;
pub use envelope::{Envelope, Payload};
pub use error::{Error, Result};
pub use keys::{PrivateKey, PublicKey};
pub use request::{PrivateRequest, PublicRequest, Response};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

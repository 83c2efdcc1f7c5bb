//! The three protocol messages and the moves between them.
//!
//! ```text
//! requester                          responder
//! PrivateRequest --public()--> PublicRequest
//!                                    | encode(secret)
//! PrivateRequest <--decode()-- Response
//! ```
//!
//! Only `PublicRequest` and `Response` travel over the public channel.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cipher::CipherKey;
use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};

/// Requester-held half of a request. Never transmitted publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateRequest {
    pub id: Uuid,
    pub key: PrivateKey,
    pub description: String,
}

/// Shareable half of a request: same ID and description, public key only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicRequest {
    pub id: Uuid,
    pub key: PublicKey,
    pub description: String,
}

/// Encrypted reply to a `PublicRequest`.
///
/// `key` is the responder's ephemeral public key; `data` is `iv || ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    pub key: PublicKey,
    pub data: Vec<u8>,
}

impl PrivateRequest {
    /// Fresh request: random ID, random curve, fresh private key.
    pub fn new(description: impl Into<String>) -> Result<Self> {
        let curve = Curve::random()?;
        let key = PrivateKey::generate(curve)?;
        let request = Self {
            id: Uuid::new_v4(),
            key,
            description: description.into(),
        };
        tracing::debug!(
            id = %request.id,
            %curve,
            fingerprint = %request.key.public_key().fingerprint(),
            "created request"
        );
        Ok(request)
    }

    /// Project to the shareable half.
    pub fn public(&self) -> PublicRequest {
        PublicRequest {
            id: self.id,
            key: self.key.public_key(),
            description: self.description.clone(),
        }
    }

    pub fn curve(&self) -> Curve {
        self.key.curve()
    }

    /// Whether `response` carries this request's ID.
    ///
    /// `decode` does not check this; callers that need request matching
    /// must call it themselves.
    pub fn answered_by(&self, response: &Response) -> bool {
        self.id == response.id
    }

    /// Recover the plaintext of `response`.
    ///
    /// There is no integrity check: a response made for another request
    /// decodes to unrelated bytes rather than an error.
    pub fn decode(&self, response: &Response) -> Result<Vec<u8>> {
        let secret = self
            .key
            .shared_secret(&response.key)
            .map_err(|e| Error::Decryption(format!("unable to create shared secret: {e}")))?;
        let cipher = CipherKey::from_shared_secret(&secret)
            .map_err(|e| Error::Decryption(format!("unable to create cipher: {e}")))?;
        let plaintext = cipher.decrypt(&response.data)?;
        tracing::debug!(
            id = %self.id,
            response_id = %response.id,
            bytes = plaintext.len(),
            "decoded response"
        );
        Ok(plaintext)
    }
}

impl PublicRequest {
    pub fn curve(&self) -> Curve {
        self.key.curve()
    }

    /// Encrypt `plaintext` for the holder of the matching `PrivateRequest`.
    ///
    /// Every call uses a new ephemeral key and IV, so repeated calls with the
    /// same input produce different responses.
    pub fn encode(&self, plaintext: &[u8]) -> Result<Response> {
        let ephemeral = PrivateKey::generate(self.key.curve())?;
        let secret = ephemeral.shared_secret(&self.key)?;
        let cipher = CipherKey::from_shared_secret(&secret)?;
        let data = cipher.encrypt(plaintext)?;
        let response = Response {
            id: self.id,
            key: ephemeral.public_key(),
            data,
        };
        tracing::debug!(
            id = %self.id,
            curve = %self.key.curve(),
            fingerprint = %response.key.fingerprint(),
            bytes = plaintext.len(),
            "encoded response"
        );
        Ok(response)
    }
}

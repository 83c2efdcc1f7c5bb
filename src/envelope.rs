//! Text envelope for carrying protocol messages over chat and email.
//!
//! An envelope is a transport wrapper, not a protocol object: it holds raw
//! bytes in memory and the compressed, base64-armored form on the wire (see
//! [`crate::wire`]). Protocol messages go in and out of the byte buffer via
//! [`Envelope::stuff`] and [`Envelope::open`].

use core::fmt;
use core::str::FromStr;
use std::io::{Read, Write};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::request::{PrivateRequest, PublicRequest, Response};
use crate::wire;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::request::PrivateRequest {}
    impl Sealed for crate::request::PublicRequest {}
    impl Sealed for crate::request::Response {}
}

/// A protocol message that can travel inside an envelope.
///
/// Closed set: `PrivateRequest`, `PublicRequest`, `Response`.
pub trait Payload: Serialize + DeserializeOwned + sealed::Sealed {
    /// Envelope name used by [`Envelope::sealed`].
    const LABEL: &'static str;
}

impl Payload for PrivateRequest {
    const LABEL: &'static str = "PRIVATE REQUEST";
}

impl Payload for PublicRequest {
    const LABEL: &'static str = "PUBLIC REQUEST";
}

impl Payload for Response {
    const LABEL: &'static str = "RESPONSE";
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Delimited, line-wrapped text block around an opaque byte payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Label shown in the BEGIN/END markers; upper-cased on marshal.
    pub name: String,
    /// Free text before the armored block.
    pub prelude: String,
    /// Raw payload bytes.
    pub data: Vec<u8>,
    /// Free text after the armored block.
    pub postlude: String,
}

impl Envelope {
    pub fn new(name: impl Into<String>, prelude: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prelude: prelude.into(),
            ..Self::default()
        }
    }

    /// Fresh envelope named after `P` with `payload` stuffed in.
    pub fn sealed<P: Payload>(payload: &P, prelude: impl Into<String>) -> Result<Self> {
        let mut envelope = Self::new(P::LABEL, prelude);
        envelope.stuff(payload)?;
        Ok(envelope)
    }

    /// Serialize `value` and append it to the data buffer.
    ///
    /// Appends rather than replaces: use one envelope per message.
    pub fn stuff<P: Payload>(&mut self, value: &P) -> Result<()> {
        let before = self.data.len();
        bincode::serialize_into(&mut self.data, value)
            .map_err(|e| Error::Format(format!("could not stuff {}: {e}", P::LABEL)))?;
        tracing::trace!(label = P::LABEL, bytes = self.data.len() - before, "stuffed payload");
        Ok(())
    }

    /// Deserialize a `P` from the start of the data buffer.
    pub fn open<P: Payload>(&self) -> Result<P> {
        bincode::deserialize(&self.data)
            .map_err(|e| Error::Format(format!("could not open {}: {e}", P::LABEL)))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Raw buffer access for callers writing their own payload bytes.
    pub fn data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Render the armored text form.
    pub fn marshal(&self) -> Result<String> {
        let compressed = wire::compress(&self.data)?;
        let body = wire::encode_body(&compressed);
        let name = self.name.to_uppercase();

        let mut out = String::with_capacity(
            self.prelude.len() + self.postlude.len() + 2 * name.len() + body.len() + 48,
        );
        out.push_str(&self.prelude);
        out.push('\n');
        out.push_str(&wire::begin_line(&name));
        out.push('\n');
        out.push_str(&body);
        out.push_str(&wire::end_line(&name));
        out.push('\n');
        out.push_str(&self.postlude);
        out.push('\n');

        tracing::trace!(
            name = %name,
            data_bytes = self.data.len(),
            compressed_bytes = compressed.len(),
            "marshaled envelope"
        );
        Ok(out)
    }

    /// Parse the armored text form.
    ///
    /// The END name is not compared with the BEGIN name.
    pub fn unmarshal(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(wire::DELIMITER).collect();
        if parts.len() != wire::PART_COUNT {
            return Err(Error::Format(format!(
                "expected {} dash-delimited parts, found {}",
                wire::PART_COUNT,
                parts.len()
            )));
        }

        let begin = parts[1].trim();
        let name = begin
            .strip_prefix(wire::BEGIN_MARKER)
            .unwrap_or(begin)
            .trim()
            .to_string();

        let compressed = wire::decode_body(parts[2])?;
        let data = wire::decompress(&compressed)?;

        tracing::trace!(name = %name, data_bytes = data.len(), "unmarshaled envelope");
        Ok(Self {
            name,
            prelude: parts[0].trim().to_string(),
            data,
            postlude: parts[4].trim().to_string(),
        })
    }

    /// Read and parse a whole envelope from `reader`.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::unmarshal(&text)
    }

    /// Marshal into `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.marshal()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl FromStr for Envelope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::unmarshal(s)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.marshal().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

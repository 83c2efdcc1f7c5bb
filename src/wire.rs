//! Armor wire format
//!
//! ```text
//! {prelude}
//! ----- BEGIN {NAME} -----
//! base64(zlib_best(data)), 64 chars per line, every line '\n'-terminated
//! ----- END {NAME} -----
//! {postlude}
//! ```
//!
//! Parsing splits on the delimiter and expects exactly five parts.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::error::{Error, Result};

/// Separator around the BEGIN/END markers.
pub const DELIMITER: &str = "-----";

/// Number of delimiter-separated parts in a well-formed envelope.
pub const PART_COUNT: usize = 5;

/// Base64 characters per body line.
pub const WRAP_WIDTH: usize = 64;

pub const BEGIN_MARKER: &str = "BEGIN";
pub const END_MARKER: &str = "END";

/// `----- BEGIN {name} -----` (no trailing newline).
pub fn begin_line(name: &str) -> String {
    format!("{DELIMITER} {BEGIN_MARKER} {name} {DELIMITER}")
}

/// `----- END {name} -----` (no trailing newline).
pub fn end_line(name: &str) -> String {
    format!("{DELIMITER} {END_MARKER} {name} {DELIMITER}")
}

/// zlib at maximum compression.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
    enc.write_all(data)
        .map_err(|e| Error::Format(format!("could not compress data: {e}")))?;
    enc.finish()
        .map_err(|e| Error::Format(format!("could not finalize compressed data: {e}")))
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Format(format!("could not decompress data: {e}")))?;
    Ok(out)
}

/// Standard base64, hard-wrapped. A final partial line is still terminated.
pub fn encode_body(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / WRAP_WIDTH + 1);
    for line in encoded.as_bytes().chunks(WRAP_WIDTH) {
        // base64 output is ASCII, so byte chunks are valid str slices
        out.push_str(core::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    out
}

/// Inverse of [`encode_body`]. ASCII whitespace (line breaks) is ignored.
pub fn decode_body(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| Error::Format(format!("could not decode data: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers() {
        assert_eq!(begin_line("RESPONSE"), "----- BEGIN RESPONSE -----");
        assert_eq!(end_line("PUBLIC REQUEST"), "----- END PUBLIC REQUEST -----");
    }

    #[test]
    fn wraps_at_width() {
        let body = encode_body(&[0xffu8; 100]);
        let lines: Vec<&str> = body.split_terminator('\n').collect();
        // 100 bytes -> 136 base64 chars -> 64 + 64 + 8
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), WRAP_WIDTH);
        assert_eq!(lines[1].len(), WRAP_WIDTH);
        assert_eq!(lines[2].len(), 8);
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn exact_multiple_has_no_empty_line() {
        // 48 bytes -> exactly 64 base64 chars
        let body = encode_body(&[1u8; 48]);
        assert_eq!(body.len(), WRAP_WIDTH + 1);
        assert_eq!(body.matches('\n').count(), 1);
    }

    #[test]
    fn empty_body_is_empty() {
        assert_eq!(encode_body(&[]), "");
    }

    #[test]
    fn body_roundtrip_ignores_layout() {
        let data: Vec<u8> = (0..=255).collect();
        let body = encode_body(&data);
        let messy = format!("\r\n  {}\n\n", body.replace('\n', "\r\n"));
        assert_eq!(decode_body(&messy).unwrap(), data);
    }

    #[test]
    fn compression_roundtrip() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let z = compress(data).unwrap();
        assert!(z.len() < data.len());
        // zlib CMF: deflate, 32K window
        assert_eq!(z[0], 0x78);
        assert_eq!(decompress(&z).unwrap(), data);
    }

    #[test]
    fn bad_inputs_are_format_errors() {
        assert!(matches!(decode_body("!!!!"), Err(Error::Format(_))));
        assert!(matches!(decompress(b"not zlib"), Err(Error::Format(_))));
    }
}

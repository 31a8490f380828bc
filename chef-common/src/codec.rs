//! Order notification body codec
//!
//! Producers write notification bodies as UTF-16 little-endian text, two bytes
//! per code unit. No byte order mark is written and none is stripped on read.

use crate::{Error, Result};

/// Decode a queue message body into text
///
/// Fails on an odd byte count or an unpaired surrogate rather than
/// substituting replacement characters.
pub fn decode_message_body(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Decode(format!(
            "message body has odd length {} for UTF-16 text",
            bytes.len()
        )));
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|e| Error::Decode(format!("invalid UTF-16 message body: {}", e)))
}

/// Encode text as a queue message body
pub fn encode_message_body(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

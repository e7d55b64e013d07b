//! Compact text encoding for watched-episode sets.
//!
//! Episode index `i` is bit `0x80 >> (i % 8)` of byte `i / 8`. The byte
//! buffer is base64 encoded with the trailing `=` padding removed; decoding
//! pads on the right again before handing the token to the base64 engine.

use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CodecError {
    #[error("watched token has invalid length {0}")]
    InvalidLength(usize),
    #[error("watched token is not valid base64: {0}")]
    InvalidBase64(String),
}

pub(crate) fn encode_watched(watched: &BTreeSet<u32>) -> String {
    let Some(&highest) = watched.last() else {
        return String::new();
    };

    let needed = highest as usize / 8 + 1;
    let mut len = 1usize;
    while len < needed {
        len *= 2;
    }

    let mut bytes = vec![0u8; len];
    for &index in watched {
        bytes[index as usize / 8] |= 0x80 >> (index % 8);
    }

    STANDARD.encode(&bytes).trim_end_matches('=').to_string()
}

pub(crate) fn decode_watched(token: &str) -> Result<BTreeSet<u32>, CodecError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Ok(BTreeSet::new());
    }
    // One leftover character can never come from a whole number of bytes.
    if trimmed.len() % 4 == 1 {
        return Err(CodecError::InvalidLength(trimmed.len()));
    }

    let mut padded = trimmed.trim_end_matches('=').to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    let bytes = STANDARD
        .decode(padded.as_bytes())
        .map_err(|err| CodecError::InvalidBase64(err.to_string()))?;

    let mut watched = BTreeSet::new();
    for (byte_idx, byte) in bytes.iter().enumerate() {
        if *byte == 0 {
            continue;
        }
        for bit in 0..8u32 {
            if byte & (0x80 >> bit) != 0 {
                watched.insert(byte_idx as u32 * 8 + bit);
            }
        }
    }
    Ok(watched)
}

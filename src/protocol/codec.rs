//! Newline-delimited JSON framing.
//!
//! Every message is one JSON object followed by `\n`. Blank lines are
//! skipped. Lines longer than [`MAX_LINE_LEN`] are rejected.

use std::io::{BufRead, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ProtocolError;

/// Maximum length of one framed message, newline included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Serialize a message into one framed line.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

/// Parse one line (without its newline).
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(line)?)
}

/// Write one framed message and flush.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), ProtocolError> {
    writer.write_all(&encode(message)?)?;
    writer.flush()?;
    Ok(())
}

/// Read the next framed message.
///
/// Returns [`ProtocolError::Closed`] at end of stream.
pub fn read_message<R: BufRead, T: DeserializeOwned>(reader: &mut R) -> Result<T, ProtocolError> {
    loop {
        let line = read_line(reader)?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return decode(trimmed);
        }
    }
}

/// Read one raw line, enforcing the length limit.
fn read_line<R: BufRead>(reader: &mut R) -> Result<String, ProtocolError> {
    let mut buf = Vec::new();
    let limit = u64::try_from(MAX_LINE_LEN).unwrap_or(u64::MAX);
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Err(ProtocolError::Closed);
    }
    if buf.last() != Some(&b'\n') && read == MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong {
            limit: MAX_LINE_LEN,
        });
    }

    String::from_utf8(buf).map_err(|_| ProtocolError::InvalidUtf8)
}

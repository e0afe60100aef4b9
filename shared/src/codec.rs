//! Newline-delimited framing for the phone link
//!
//! The phone writes one message per line:
//! ```text
//! display::speed::heart_rate\n
//! speed><12.5><km/h\r\n
//! ```
//!
//! `\n`, `\r\n` and a lone `\r` each terminate a line. Bytes are buffered until a
//! terminator arrives, so lines may be split across reads.

use bytes::BytesMut;
use thiserror::Error;

/// Maximum length of a single unterminated line (64 KB)
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Errors that can occur while framing lines
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Line too long: {0} bytes without a terminator (max: {MAX_LINE_LENGTH})")]
    LineTooLong(usize),
}

/// Decoder state machine for streaming line extraction
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Bytes received but not yet returned as a line
    buffer: BytesMut,
}

impl LineDecoder {
    /// Create a new line decoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to take the next complete line from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete lines.
    /// The terminator is stripped; invalid UTF-8 is replaced rather than rejected.
    pub fn next_line(&mut self) -> Result<Option<String>, CodecError> {
        let Some(pos) = self.buffer.iter().position(|&b| b == b'\n' || b == b'\r') else {
            if self.buffer.len() > MAX_LINE_LENGTH {
                return Err(CodecError::LineTooLong(self.buffer.len()));
            }
            return Ok(None);
        };

        let terminator_len = match (self.buffer[pos], self.buffer.get(pos + 1)) {
            (b'\r', Some(&b'\n')) => 2,
            // A trailing '\r' may be the first half of "\r\n"
            (b'\r', None) => return Ok(None),
            _ => 1,
        };

        let mut line = self.buffer.split_to(pos + terminator_len);
        line.truncate(pos);
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Flush the trailing unterminated line at end of stream
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let mut rest = self.buffer.split();
        if rest.last() == Some(&b'\r') {
            rest.truncate(rest.len() - 1);
        }
        Some(String::from_utf8_lossy(&rest).into_owned())
    }

    /// Get the current buffer length (for debugging)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

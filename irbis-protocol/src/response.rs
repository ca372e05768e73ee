//! Response decoder.
//!
//! A response is read to EOF and wrapped in a cursor. Lines end with the
//! two-byte sequence `\r\n`; a lone `\r` is ordinary data. Bytes after the
//! last terminator form a final line.
//!
//! Preamble:
//!
//! ```text
//! <command>\r\n<client id>\r\n<query id>\r\n<declared length>\r\n
//! <server version>\r\n<5 reserved lines>
//! ```

use crate::error::ProtocolError;
use crate::text::TextEncoding;
use crate::{BINARY_DATA_MARKER, RESERVED_RESPONSE_LINES};
use bytes::Bytes;

/// Fixed fields at the start of every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeader {
    pub command: String,
    pub client_id: i64,
    pub query_id: i64,
    /// Advisory only; never used for framing.
    pub declared_length: i64,
    pub version: String,
}

/// A fully received response with a read cursor.
#[derive(Debug, Clone)]
pub struct ServerResponse {
    buffer: Bytes,
    position: usize,
    header: ResponseHeader,
    return_code: i32,
}

impl ServerResponse {
    /// Wraps a raw buffer without interpreting it.
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
            position: 0,
            header: ResponseHeader::default(),
            return_code: 0,
        }
    }

    /// Wraps a raw buffer and consumes the preamble.
    pub fn parse(buffer: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        let mut response = Self::new(buffer);
        response.read_header()?;
        Ok(response)
    }

    /// Reads the preamble fields and skips the reserved lines.
    pub fn read_header(&mut self) -> Result<&ResponseHeader, ProtocolError> {
        let command = self.read_narrow_line()?;
        let client_id = self.read_long()?;
        let query_id = self.read_long()?;
        let declared_length = parse_long(&self.read_narrow_line()?).unwrap_or(0);
        let version = self.read_narrow_line()?;
        for _ in 0..RESERVED_RESPONSE_LINES {
            self.read_line();
        }

        self.header = ResponseHeader {
            command,
            client_id,
            query_id,
            declared_length,
            version,
        };
        Ok(&self.header)
    }

    pub fn header(&self) -> &ResponseHeader {
        &self.header
    }

    /// Return code read by the last `read_return_code` call.
    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    pub fn raw(&self) -> &Bytes {
        &self.buffer
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Returns the raw bytes of the next line and advances past its
    /// terminator. At the end of the buffer returns an empty slice.
    pub fn read_line(&mut self) -> Bytes {
        let len = self.buffer.len();
        if self.position >= len {
            return Bytes::new();
        }

        let start = self.position;
        let found = self.buffer[start..]
            .windows(2)
            .position(|pair| pair == b"\r\n");

        match found {
            Some(offset) => {
                self.position = start + offset + 2;
                self.buffer.slice(start..start + offset)
            }
            None => {
                self.position = len;
                self.buffer.slice(start..)
            }
        }
    }

    pub fn read_narrow_line(&mut self) -> Result<String, ProtocolError> {
        let line = self.read_line();
        TextEncoding::Ansi.decode(&line)
    }

    pub fn read_wide_line(&mut self) -> Result<String, ProtocolError> {
        let line = self.read_line();
        TextEncoding::Utf8.decode(&line)
    }

    /// Reads a line that must hold a signed decimal integer.
    pub fn read_int(&mut self) -> Result<i32, ProtocolError> {
        let line = self.read_narrow_line()?;
        line.trim()
            .parse()
            .map_err(|_| ProtocolError::InvalidInteger(line))
    }

    /// Like `read_int`, but a non-numeric line yields 0.
    pub fn read_int_lenient(&mut self) -> Result<i32, ProtocolError> {
        let line = self.read_narrow_line()?;
        Ok(line.trim().parse().unwrap_or(0))
    }

    fn read_long(&mut self) -> Result<i64, ProtocolError> {
        let line = self.read_narrow_line()?;
        parse_long(&line).ok_or(ProtocolError::InvalidInteger(line))
    }

    /// Decodes everything after the cursor as Windows-1251 text. The cursor
    /// does not move.
    pub fn remaining_narrow_text(&self) -> Result<String, ProtocolError> {
        TextEncoding::Ansi.decode(self.remaining())
    }

    /// Decodes everything after the cursor as UTF-8 text. The cursor does
    /// not move.
    pub fn remaining_wide_text(&self) -> Result<String, ProtocolError> {
        TextEncoding::Utf8.decode(self.remaining())
    }

    /// Reads Windows-1251 lines up to (and consuming) the first empty one.
    pub fn remaining_narrow_lines(&mut self) -> Result<Vec<String>, ProtocolError> {
        self.remaining_lines(TextEncoding::Ansi)
    }

    /// Reads UTF-8 lines up to (and consuming) the first empty one.
    pub fn remaining_wide_lines(&mut self) -> Result<Vec<String>, ProtocolError> {
        self.remaining_lines(TextEncoding::Utf8)
    }

    fn remaining_lines(&mut self, encoding: TextEncoding) -> Result<Vec<String>, ProtocolError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line();
            if line.is_empty() {
                break;
            }
            lines.push(encoding.decode(&line)?);
        }
        Ok(lines)
    }

    /// Reads exactly `count` Windows-1251 lines. Returns an empty list if
    /// any of them is empty.
    pub fn read_narrow_lines(&mut self, count: usize) -> Result<Vec<String>, ProtocolError> {
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            let line = self.read_narrow_line()?;
            if line.is_empty() {
                return Ok(Vec::new());
            }
            lines.push(line);
        }
        Ok(lines)
    }

    fn remaining(&self) -> &[u8] {
        &self.buffer[self.position.min(self.buffer.len())..]
    }

    /// Reads the return code.
    ///
    /// A negative code not listed in `accepted` becomes
    /// `ProtocolError::Server`; accepted negatives are returned as-is.
    pub fn read_return_code(&mut self, accepted: &[i32]) -> Result<i32, ProtocolError> {
        let code = self.read_int()?;
        self.return_code = code;
        if code < 0 && !accepted.contains(&code) {
            return Err(ProtocolError::server(code));
        }
        Ok(code)
    }

    /// Returns everything after the binary data marker, if present.
    pub fn binary_payload(&self) -> Option<Bytes> {
        let marker = BINARY_DATA_MARKER;
        let index = self
            .buffer
            .windows(marker.len())
            .position(|window| window == marker)?;
        Some(self.buffer.slice(index + marker.len()..))
    }
}

fn parse_long(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

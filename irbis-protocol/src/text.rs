//! Text encodings and protocol text helpers.
//!
//! Control fields travel in Windows-1251 ("narrow"), content fields in
//! UTF-8 ("wide"). CP866 is only met in legacy document content.

use crate::error::ProtocolError;
use bytes::BufMut;
use encoding_rs::{Encoding, IBM866, WINDOWS_1251};

/// Line delimiter inside multi-line values sent in one protocol line.
pub const IRBIS_DELIMITER: &str = "\x1F\x1E";

/// Delimiter between record lines in an `UPDATE_RECORD` reply and between
/// MFNs in a database info reply.
pub const SHORT_DELIMITER: &str = "\x1E";

/// Delimiter between the parts of a formatted record.
pub const OTHER_DELIMITER: &str = "\x1F";

/// Text encoding of a protocol line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Windows-1251, used for control fields.
    Ansi,
    /// UTF-8, used for search expressions, formats and record content.
    Utf8,
    /// CP866, legacy document content only.
    Oem,
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Ansi => "windows-1251",
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Oem => "IBM866",
        }
    }

    fn single_byte(&self) -> Option<&'static Encoding> {
        match self {
            TextEncoding::Ansi => Some(WINDOWS_1251),
            TextEncoding::Oem => Some(IBM866),
            TextEncoding::Utf8 => None,
        }
    }

    /// Appends the encoded form of `text` to `out`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Encoding` when a character has no
    /// representation in a single-byte code page.
    pub fn encode_into(&self, text: &str, out: &mut impl BufMut) -> Result<(), ProtocolError> {
        match self.single_byte() {
            None => {
                out.put_slice(text.as_bytes());
                Ok(())
            }
            Some(encoding) => {
                let (bytes, _, had_errors) = encoding.encode(text);
                if had_errors {
                    return Err(ProtocolError::Encoding {
                        encoding: self.name(),
                        text: text.to_string(),
                    });
                }
                out.put_slice(&bytes);
                Ok(())
            }
        }
    }

    /// Encodes `text` into a fresh buffer.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::with_capacity(text.len());
        self.encode_into(text, &mut out)?;
        Ok(out)
    }

    /// Decodes `bytes` strictly; malformed input is an error, never replaced.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, ProtocolError> {
        let decoded = match self.single_byte() {
            None => std::str::from_utf8(bytes).ok().map(str::to_string),
            Some(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        };
        decoded.ok_or(ProtocolError::Decoding {
            encoding: self.name(),
        })
    }
}

/// Replaces IRBIS line delimiters with `\n`.
pub fn irbis_to_dos(text: &str) -> String {
    text.replace(IRBIS_DELIMITER, "\n")
}

/// Replaces `\n` (and `\r\n`) with IRBIS line delimiters.
pub fn dos_to_irbis(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', IRBIS_DELIMITER)
}

/// Splits text on IRBIS line delimiters.
pub fn irbis_to_lines(text: &str) -> Vec<&str> {
    text.split(IRBIS_DELIMITER).collect()
}

/// Splits text on the short delimiter.
pub fn short_irbis_to_lines(text: &str) -> Vec<&str> {
    text.split(SHORT_DELIMITER).collect()
}

/// Strips `/* ... ` comments from a format script.
///
/// A comment runs to the end of its line; the line terminator itself is
/// kept. Text inside `'...'`, `"..."` or `|...|` is never treated as a
/// comment.
pub fn remove_comments(text: &str) -> String {
    if !text.contains("/*") {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            result.push(c);
            continue;
        }

        match c {
            '\'' | '"' | '|' => {
                quote = Some(c);
                result.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                for skipped in chars.by_ref() {
                    if skipped == '\r' || skipped == '\n' {
                        result.push(skipped);
                        break;
                    }
                }
            }
            _ => result.push(c),
        }
    }

    result
}

/// Prepares a format script for sending: strips comments, then every
/// control character below U+0020.
pub fn prepare_format(text: &str) -> String {
    let text = remove_comments(text);
    if !text.chars().any(|c| c < ' ') {
        return text;
    }
    text.chars().filter(|&c| c >= ' ').collect()
}

//! OPT files: which worksheet to open for a record, chosen by the value of
//! one field.
//!
//! Layout: the field tag, the key length, then `pattern worksheet` lines
//! until `*****`. In a pattern `+` stands for any single character, and
//! trailing `+` may also stand for nothing.

use crate::error::ProtocolError;
use crate::menu::STOP_MARKER;
use std::fmt;

/// Pattern character matching any character.
pub const WILDCARD: char = '+';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptLine {
    pub pattern: String,
    pub worksheet: String,
}

impl OptLine {
    pub fn new(pattern: impl Into<String>, worksheet: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            worksheet: worksheet.into(),
        }
    }

    /// Case-insensitive match of a field value against the pattern.
    pub fn matches(&self, value: &str) -> bool {
        let pattern: Vec<char> = self.pattern.chars().collect();
        let value: Vec<char> = value.chars().collect();
        if pattern.is_empty() || value.len() > pattern.len() {
            return false;
        }
        let head_matches = pattern.iter().zip(&value).all(|(&p, &v)| {
            p == WILDCARD || p.to_lowercase().eq(v.to_lowercase())
        });
        head_matches && pattern[value.len()..].iter().all(|&p| p == WILDCARD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptFile {
    /// Field whose value selects the worksheet.
    pub tag: u32,
    /// Significant length of the field value.
    pub length: usize,
    pub lines: Vec<OptLine>,
}

impl Default for OptFile {
    fn default() -> Self {
        Self {
            tag: 920,
            length: 5,
            lines: Vec::new(),
        }
    }
}

impl OptFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, ProtocolError> {
        let tag = header_number(lines, 0)?;
        let length = header_number(lines, 1)?;

        let mut opt = OptFile {
            tag,
            length,
            lines: Vec::new(),
        };
        for line in lines.iter().skip(2) {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('*') {
                continue;
            }
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(pattern), Some(worksheet)) => {
                    opt.lines.push(OptLine::new(pattern, worksheet))
                }
                _ => {
                    return Err(ProtocolError::Malformed {
                        what: "OPT line",
                        line: line.to_string(),
                    })
                }
            }
        }
        Ok(opt)
    }

    /// Worksheet of the first line whose pattern matches `value`.
    pub fn resolve_worksheet(&self, value: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.matches(value))
            .map(|line| line.worksheet.as_str())
    }
}

fn header_number<S: AsRef<str>, N: std::str::FromStr>(
    lines: &[S],
    index: usize,
) -> Result<N, ProtocolError> {
    let line = lines
        .get(index)
        .map(|l| l.as_ref().trim())
        .ok_or_else(|| ProtocolError::Malformed {
            what: "OPT file header",
            line: String::new(),
        })?;
    line.parse()
        .map_err(|_| ProtocolError::InvalidInteger(line.to_string()))
}

impl fmt::Display for OptFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tag)?;
        writeln!(f, "{}", self.length)?;
        for line in &self.lines {
            writeln!(f, "{:<6}{}", line.pattern, line.worksheet)?;
        }
        writeln!(f, "{STOP_MARKER}")
    }
}

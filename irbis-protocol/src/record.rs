//! Bibliographic record payload.
//!
//! Server text form, one line per element:
//!
//! ```text
//! <mfn>#<status>
//! 0#<version>
//! <tag>#<value>^<code><value>^<code><value>...
//! ```

use crate::error::ProtocolError;
use crate::text::IRBIS_DELIMITER;
use crate::Mfn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record status bitfield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStatus(u32);

impl RecordStatus {
    pub const LOGICALLY_DELETED: u32 = 1;
    pub const PHYSICALLY_DELETED: u32 = 2;
    /// Record does not exist.
    pub const ABSENT: u32 = 4;
    /// Record is not actualized in the dictionary.
    pub const NON_ACTUALIZED: u32 = 8;
    /// First version of the record.
    pub const NEW_RECORD: u32 = 16;
    /// Last version of the record.
    pub const LAST: u32 = 32;
    pub const LOCKED: u32 = 64;
    pub const AUTOIN_ERROR: u32 = 128;
    pub const FULL_TEXT_NOT_ACTUALIZED: u32 = 256;

    const DELETED_MASK: u32 = Self::LOGICALLY_DELETED | Self::PHYSICALLY_DELETED;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn with(mut self, flag: u32) -> Self {
        self.0 |= flag;
        self
    }

    pub fn without(mut self, flag: u32) -> Self {
        self.0 &= !flag;
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.0 & Self::DELETED_MASK != 0
    }

    pub fn is_locked(&self) -> bool {
        self.contains(Self::LOCKED)
    }
}

/// Subfield: one-character code plus value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubField {
    pub code: char,
    pub value: String,
}

impl SubField {
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }
}

impl fmt::Display for SubField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^{}{}", self.code, self.value)
    }
}

/// Field: numeric tag, optional value before the first subfield, subfields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub tag: u32,
    pub value: Option<String>,
    pub subfields: Vec<SubField>,
}

impl Field {
    pub fn new(tag: u32) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn with_value(tag: u32, value: impl Into<String>) -> Self {
        Self {
            tag,
            value: Some(value.into()),
            subfields: Vec::new(),
        }
    }

    /// Appends a subfield.
    pub fn add(mut self, code: char, value: impl Into<String>) -> Self {
        self.subfields.push(SubField::new(code, value));
        self
    }

    /// First subfield with the given code (case-insensitive).
    pub fn first(&self, code: char) -> Option<&SubField> {
        self.subfields
            .iter()
            .find(|sf| sf.code.eq_ignore_ascii_case(&code))
    }

    pub fn first_value(&self, code: char) -> Option<&str> {
        self.first(code).map(|sf| sf.value.as_str())
    }

    /// Parses `tag#value^a...`.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::Malformed {
            what: "field",
            line: line.to_string(),
        };
        let (tag, body) = line.split_once('#').ok_or_else(malformed)?;
        let tag = tag.trim().parse().map_err(|_| malformed())?;

        let mut field = Field::new(tag);
        let mut parts = body.split('^');
        if let Some(head) = parts.next() {
            if !head.is_empty() {
                field.value = Some(head.to_string());
            }
        }
        for part in parts {
            let mut chars = part.chars();
            if let Some(code) = chars.next() {
                field.subfields.push(SubField::new(code, chars.as_str()));
            }
        }
        Ok(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tag, self.value.as_deref().unwrap_or(""))?;
        for subfield in &self.subfields {
            write!(f, "{subfield}")?;
        }
        Ok(())
    }
}

/// A bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub database: Option<String>,
    pub mfn: Mfn,
    pub status: RecordStatus,
    pub version: u32,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn add(&mut self, field: Field) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.status.is_deleted()
    }

    /// First field with the given tag.
    pub fn first(&self, tag: u32) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Value of the first field with the tag, or of its first subfield
    /// with the code.
    pub fn fm(&self, tag: u32, code: Option<char>) -> Option<&str> {
        let field = self.first(tag)?;
        match code {
            Some(code) => field.first_value(code),
            None => field.value.as_deref(),
        }
    }

    /// Non-empty values of every field with the tag.
    pub fn fma(&self, tag: u32, code: Option<char>) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.tag == tag)
            .filter_map(|f| match code {
                Some(code) => f.first_value(code),
                None => f.value.as_deref(),
            })
            .filter(|v| !v.is_empty())
            .collect()
    }

    /// Encodes the record into server text lines.
    pub fn encode(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.fields.len() + 2);
        lines.push(format!("{}#{}", self.mfn, self.status.bits()));
        lines.push(format!("0#{}", self.version));
        lines.extend(self.fields.iter().map(Field::to_string));
        lines
    }

    /// Encodes the record as a single protocol line.
    pub fn to_protocol_text(&self) -> String {
        self.encode().join(IRBIS_DELIMITER)
    }

    /// Parses server text lines. An empty slice yields an empty record.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, ProtocolError> {
        let mut record = Record::new();
        let Some(first) = lines.first() else {
            return Ok(record);
        };

        let first = first.as_ref();
        let malformed = |line: &str| ProtocolError::Malformed {
            what: "record header",
            line: line.to_string(),
        };

        let mut parts = first.split('#');
        record.mfn = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .ok_or_else(|| malformed(first))?;
        if let Some(status) = parts.next().filter(|s| !s.is_empty()) {
            let bits = status.trim().parse().map_err(|_| malformed(first))?;
            record.status = RecordStatus::from_bits(bits);
        }

        if let Some(second) = lines.get(1) {
            let second = second.as_ref();
            record.version = second
                .split('#')
                .nth(1)
                .and_then(|v| v.trim().parse().ok())
                .ok_or_else(|| malformed(second))?;
        }

        for line in lines.iter().skip(2) {
            record.fields.push(Field::parse(line.as_ref())?);
        }
        Ok(record)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.encode() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::new();
        record
            .add(Field::new(700).add('a', "Иванов").add('b', "И. И."))
            .add(Field::new(200).add('a', "Заглавие").add('e', "подзаголовок"))
            .add(Field::with_value(920, "PAZK"));
        record
    }

    #[test]
    fn test_status_flags() {
        let status = RecordStatus::new().with(RecordStatus::LOGICALLY_DELETED);
        assert!(status.is_deleted());
        assert!(!status.is_locked());
        let status = status.without(RecordStatus::LOGICALLY_DELETED).with(RecordStatus::LAST);
        assert!(!status.is_deleted());
        assert_eq!(status.bits(), 32);
        assert!(RecordStatus::from_bits(2).is_deleted());
        assert!(RecordStatus::from_bits(64 | 32).is_locked());
    }

    #[test]
    fn test_field_parse() {
        let field = Field::parse("200#^aTitle^eSub").unwrap();
        assert_eq!(field.tag, 200);
        assert_eq!(field.value, None);
        assert_eq!(field.first_value('a'), Some("Title"));
        assert_eq!(field.first_value('E'), Some("Sub"));

        let field = Field::parse("920#PAZK").unwrap();
        assert_eq!(field.value.as_deref(), Some("PAZK"));
        assert!(field.subfields.is_empty());

        let field = Field::parse("10#head^aX").unwrap();
        assert_eq!(field.value.as_deref(), Some("head"));
        assert_eq!(field.subfields, vec![SubField::new('a', "X")]);
    }

    #[test]
    fn test_field_parse_malformed() {
        assert!(Field::parse("no tag here").is_err());
        assert!(Field::parse("abc#value").is_err());
    }

    #[test]
    fn test_record_encode() {
        let mut record = sample();
        record.mfn = 12;
        record.version = 3;
        let lines = record.encode();
        assert_eq!(lines[0], "12#0");
        assert_eq!(lines[1], "0#3");
        assert_eq!(lines[2], "700#^aИванов^bИ. И.");
        assert_eq!(lines[4], "920#PAZK");
        assert_eq!(record.to_protocol_text(), lines.join("\x1F\x1E"));
    }

    #[test]
    fn test_record_parse_round_trip() {
        let mut record = sample();
        record.mfn = 5;
        record.version = 7;
        record.status = RecordStatus::from_bits(RecordStatus::LAST);
        let parsed = Record::parse(&record.encode()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_parse_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(Record::parse(&empty).unwrap(), Record::default());
    }

    #[test]
    fn test_record_parse_without_status() {
        let record = Record::parse(&["33#", "0#1", "920#X"]).unwrap();
        assert_eq!(record.mfn, 33);
        assert_eq!(record.status.bits(), 0);
        assert_eq!(record.version, 1);
        assert_eq!(record.fm(920, None), Some("X"));
    }

    #[test]
    fn test_record_parse_bad_header() {
        assert!(Record::parse(&["x#0", "0#1"]).is_err());
        assert!(Record::parse(&["1#0", "garbage"]).is_err());
    }

    #[test]
    fn test_fm_and_fma() {
        let mut record = sample();
        record.add(Field::new(700).add('a', "Петров"));
        assert_eq!(record.fm(700, Some('a')), Some("Иванов"));
        assert_eq!(record.fma(700, Some('a')), vec!["Иванов", "Петров"]);
        assert_eq!(record.fm(920, None), Some("PAZK"));
        assert!(record.fm(999, None).is_none());
        assert!(record.fma(999, None).is_empty());
    }

    #[test]
    fn test_record_serializes() {
        let record = Record::parse(&["1#32", "0#1", "920#PAZK"]).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["mfn"], 1);
        assert_eq!(json["status"], 32);
        assert_eq!(json["fields"][0]["tag"], 920);
    }
}

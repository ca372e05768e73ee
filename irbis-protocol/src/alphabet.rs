//! Character tables used by the server to split and normalise dictionary
//! terms: the alphabet table (`isisacw.tab`) and the upper-case table
//! (`isisucw.tab`).
//!
//! Both files list Windows-1251 byte values as decimal numbers separated by
//! whitespace.

use crate::error::ProtocolError;
use crate::text::TextEncoding;
use std::collections::HashMap;

/// Default name of the alphabet table in the system directory.
pub const ALPHABET_TABLE_FILE: &str = "isisacw.tab";

/// Default name of the upper-case table in the system directory.
pub const UPPERCASE_TABLE_FILE: &str = "isisucw.tab";

/// Byte left undefined by Windows-1251.
const UNMAPPED_BYTE: u8 = 0x98;

const DEFAULT_ALPHABET: &str = concat!(
    "&@ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz",
    "\u{98}\u{A0}\u{A4}\u{A6}\u{A7}\u{A9}\u{AB}\u{AC}\u{AD}\u{AE}\u{B0}\u{B1}\u{B5}\u{B6}\u{B7}\u{BB}",
    "ЁЂЃЄЅІЇЈЉЊЋЌЎЏ",
    "АБВГДЕЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ",
    "абвгдежзийклмнопрстуфхцчшщъыьэюя",
    "ёђѓєѕіїјљњћќўџҐґ",
    "\u{2013}\u{2014}\u{2018}\u{2019}\u{201A}\u{201C}\u{201D}\u{201E}",
    "\u{2020}\u{2021}\u{2022}\u{2026}\u{2030}\u{2039}\u{203A}\u{20AC}\u{2116}\u{2122}",
);

/// Lower-case letters outside the contiguous ranges, with their upper-case
/// forms as the server folds them.
const EXTRA_UPPERCASE: &[(char, char)] = &[
    ('ё', 'Ё'),
    ('є', 'Є'),
    ('ѕ', 'Ѕ'),
    ('і', 'І'),
    ('ї', 'Ї'),
    ('ј', 'Ј'),
    ('ў', 'Ў'),
    ('ґ', 'Ґ'),
];

/// Reads whitespace-separated decimal byte values.
fn parse_bytes(text: &str) -> Result<Vec<u8>, ProtocolError> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>()
                .map_err(|_| ProtocolError::InvalidInteger(part.to_string()))
        })
        .collect()
}

/// Characters that make up words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphabetTable {
    pub characters: Vec<char>,
}

impl Default for AlphabetTable {
    fn default() -> Self {
        Self {
            characters: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl AlphabetTable {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let mut bytes = parse_bytes(text)?;
        if let Some(position) = bytes.iter().position(|&b| b == UNMAPPED_BYTE) {
            bytes.remove(position);
        }
        Ok(Self {
            characters: TextEncoding::Ansi.decode(&bytes)?.chars().collect(),
        })
    }

    pub fn is_alpha(&self, c: char) -> bool {
        self.characters.contains(&c)
    }

    /// Splits text into runs of alphabet characters.
    pub fn split_words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(|c| !self.is_alpha(c))
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Strips non-alphabet characters from both ends.
    pub fn trim<'a>(&self, text: &'a str) -> &'a str {
        text.trim_matches(|c| !self.is_alpha(c))
    }
}

/// Mapping from each character to its upper-case form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpperCaseTable {
    pub mapping: HashMap<char, char>,
}

impl Default for UpperCaseTable {
    fn default() -> Self {
        let ascii = ('a'..='z').zip('A'..='Z');
        let cyrillic = ('а'..='я').zip('А'..='Я');
        Self {
            mapping: ascii
                .chain(cyrillic)
                .chain(EXTRA_UPPERCASE.iter().copied())
                .collect(),
        }
    }
}

impl UpperCaseTable {
    /// Parses a table of 256 byte values, the upper-case form of each byte
    /// in order. Empty text yields an empty table.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let upper = parse_bytes(text)?;
        if upper.is_empty() {
            return Ok(Self {
                mapping: HashMap::new(),
            });
        }
        if upper.len() != 256 {
            return Err(ProtocolError::Malformed {
                what: "upper-case table",
                line: format!("{} entries", upper.len()),
            });
        }

        let printable = |b: u8| if b == UNMAPPED_BYTE { b' ' } else { b };
        let upper: Vec<u8> = upper.into_iter().map(printable).collect();
        let lower: Vec<u8> = (0..=255u8).map(printable).collect();
        let upper = TextEncoding::Ansi.decode(&upper)?;
        let lower = TextEncoding::Ansi.decode(&lower)?;
        Ok(Self {
            mapping: lower.chars().zip(upper.chars()).collect(),
        })
    }

    pub fn upper(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.mapping.get(&c).copied().unwrap_or(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_alphabet() {
        let table = AlphabetTable::default();
        assert_eq!(table.characters.len(), 182);
        assert!(table.is_alpha('Ж'));
        assert!(table.is_alpha('q'));
        assert!(!table.is_alpha('1'));
        assert!(!table.is_alpha(' '));
    }

    #[test]
    fn test_parse_alphabet() {
        // 'A', 'b', 0x98 (dropped), 0xC0 'А', 0xFF 'я'
        let table = AlphabetTable::parse("065 098\n152 192 255").unwrap();
        assert_eq!(table.characters, vec!['A', 'b', 'А', 'я']);
    }

    #[test]
    fn test_parse_alphabet_rejects_large_values() {
        assert!(matches!(
            AlphabetTable::parse("65 300"),
            Err(ProtocolError::InvalidInteger(_))
        ));
    }

    #[test]
    fn test_split_and_trim() {
        let table = AlphabetTable::default();
        assert_eq!(
            table.split_words("Война и мир, 1869!"),
            vec!["Война", "и", "мир"]
        );
        assert_eq!(table.trim("«...Hello...»"), "«...Hello...»");
        assert_eq!(table.trim("(Hello)"), "Hello");
        assert!(table.split_words("123 456").is_empty());
    }

    #[test]
    fn test_default_upper() {
        let table = UpperCaseTable::default();
        assert_eq!(table.upper("ёлка and Ґанок 42"), "ЁЛКА AND ҐАНОК 42");
    }

    #[test]
    fn test_parse_upper() {
        // Identity except 'a' (97) -> 'A' and 'а' (224) -> 'А'.
        let mut values: Vec<u32> = (0..256).collect();
        values[97] = 65;
        values[224] = 192;
        let text = values
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let table = UpperCaseTable::parse(&text).unwrap();
        assert_eq!(table.upper("ab аб"), "Ab Аб");
        assert!(UpperCaseTable::parse("").unwrap().mapping.is_empty());
        assert!(matches!(
            UpperCaseTable::parse("1 2 3"),
            Err(ProtocolError::Malformed { .. })
        ));
    }
}

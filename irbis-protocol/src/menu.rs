//! MNU files: pairs of `code` / `comment` lines ending with `*****`.

use std::fmt;

/// Terminates the entry list of a menu file.
pub const STOP_MARKER: &str = "*****";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub code: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFile {
    pub entries: Vec<MenuEntry>,
}

impl MenuFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, code: impl Into<String>, comment: impl Into<String>) -> &mut Self {
        self.entries.push(MenuEntry {
            code: code.into(),
            comment: comment.into(),
        });
        self
    }

    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut menu = MenuFile::new();
        for pair in lines.chunks_exact(2) {
            let code = pair[0].as_ref();
            if code.starts_with(STOP_MARKER) {
                break;
            }
            menu.add(code, pair[1].as_ref());
        }
        menu
    }

    /// Looks up an entry by code: exact (case-insensitive), then trimmed,
    /// then with `' -=:'` stripped from both ends.
    pub fn entry(&self, code: &str) -> Option<&MenuEntry> {
        let find = |wanted: &str| {
            self.entries
                .iter()
                .find(|e| e.code.to_lowercase() == wanted)
        };
        let code = code.to_lowercase();
        find(code.as_str())
            .or_else(|| find(code.trim()))
            .or_else(|| find(trim_code(&code)))
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entry(code).map(|e| e.comment.as_str())
    }
}

fn trim_code(code: &str) -> &str {
    code.trim_matches(|c| matches!(c, ' ' | '-' | '=' | ':'))
}

impl fmt::Display for MenuFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}\n{}", entry.code, entry.comment)?;
        }
        writeln!(f, "{STOP_MARKER}")
    }
}

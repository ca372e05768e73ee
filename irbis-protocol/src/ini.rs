//! INI files as served by IRBIS64 (registration reply, `irbisX.ini`).

use std::fmt;

/// One `key=value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniLine {
    pub key: String,
    pub value: Option<String>,
}

/// A named (or anonymous leading) section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    pub name: Option<String>,
    pub lines: Vec<IniLine>,
}

impl IniSection {
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            lines: Vec::new(),
        }
    }

    /// Case-insensitive key lookup.
    pub fn find(&self, key: &str) -> Option<&IniLine> {
        self.lines.iter().find(|l| l.key.eq_ignore_ascii_case(key))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key).and_then(|l| l.value.as_deref())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self.lines.iter_mut().find(|l| l.key.eq_ignore_ascii_case(key)) {
            Some(line) => line.value = value,
            None => self.lines.push(IniLine {
                key: key.to_string(),
                value,
            }),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.lines.retain(|l| !l.key.eq_ignore_ascii_case(key));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for IniSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "[{name}]")?;
        }
        for line in &self.lines {
            writeln!(f, "{}={}", line.key, line.value.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniFile {
    pub sections: Vec<IniSection>,
}

impl IniFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses INI text lines. Lines before the first `[section]` land in an
    /// anonymous section.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut file = IniFile::new();
        let mut current: Option<usize> = None;

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let name = name.strip_suffix(']').unwrap_or(name);
                current = Some(file.section_index(Some(name)));
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key, Some(value.to_string())),
                None => (line, None),
            };
            let index = match current {
                Some(index) => index,
                None => {
                    file.sections.push(IniSection::new(None));
                    let index = file.sections.len() - 1;
                    current = Some(index);
                    index
                }
            };
            file.sections[index].lines.push(IniLine {
                key: key.to_string(),
                value,
            });
        }

        file
    }

    fn section_index(&mut self, name: Option<&str>) -> usize {
        if let Some(index) = self.sections.iter().position(|s| same_name(s, name)) {
            return index;
        }
        self.sections.push(IniSection::new(name));
        self.sections.len() - 1
    }

    /// Case-insensitive section lookup; `None` finds the anonymous section.
    pub fn section(&self, name: Option<&str>) -> Option<&IniSection> {
        self.sections.iter().find(|s| same_name(s, name))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(Some(section)).and_then(|s| s.get(key))
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let index = self.section_index(Some(section));
        self.sections[index].set(key, value);
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn same_name(section: &IniSection, name: Option<&str>) -> bool {
    match (section.name.as_deref(), name) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        Ok(())
    }
}

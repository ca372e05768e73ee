//! Server file specifications: `path.database.filename`.

use crate::error::ProtocolError;
use crate::text::dos_to_irbis;
use std::fmt;

/// Server-side path code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrbisPath {
    System,
    Data,
    MasterFile,
    InvertedFile,
    ParameterFile,
    FullText,
    InternalResource,
}

impl IrbisPath {
    pub fn code(&self) -> u8 {
        match self {
            IrbisPath::System => 0,
            IrbisPath::Data => 1,
            IrbisPath::MasterFile => 2,
            IrbisPath::InvertedFile => 3,
            IrbisPath::ParameterFile => 10,
            IrbisPath::FullText => 11,
            IrbisPath::InternalResource => 12,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(IrbisPath::System),
            1 => Some(IrbisPath::Data),
            2 => Some(IrbisPath::MasterFile),
            3 => Some(IrbisPath::InvertedFile),
            10 => Some(IrbisPath::ParameterFile),
            11 => Some(IrbisPath::FullText),
            12 => Some(IrbisPath::InternalResource),
            _ => None,
        }
    }

    /// System-wide paths carry no database name.
    pub fn is_system_wide(&self) -> bool {
        matches!(self, IrbisPath::System | IrbisPath::Data)
    }
}

/// Address of a file on the server, optionally with content to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpecification {
    pub path: IrbisPath,
    pub database: Option<String>,
    pub filename: String,
    pub binary: bool,
    pub content: Option<String>,
}

impl FileSpecification {
    pub fn new(path: IrbisPath, database: Option<&str>, filename: impl Into<String>) -> Self {
        Self {
            path,
            database: database.map(str::to_string),
            filename: filename.into(),
            binary: false,
            content: None,
        }
    }

    /// File in the system directory.
    pub fn system(filename: impl Into<String>) -> Self {
        Self::new(IrbisPath::System, None, filename)
    }

    /// File in the shared data directory (PAR files live here).
    pub fn data(filename: impl Into<String>) -> Self {
        Self::new(IrbisPath::Data, None, filename)
    }

    /// File next to the master file of `database`.
    pub fn master(database: &str, filename: impl Into<String>) -> Self {
        Self::new(IrbisPath::MasterFile, Some(database), filename)
    }

    pub fn with_binary(mut self) -> Self {
        self.binary = true;
        self
    }

    /// Attaches content for a write request.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Parses `path.database.filename`.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::Malformed {
            what: "file specification",
            line: text.to_string(),
        };
        let mut parts = text.splitn(3, '.');
        let path = parts
            .next()
            .and_then(|p| p.trim().parse::<u8>().ok())
            .and_then(IrbisPath::from_code)
            .ok_or_else(malformed)?;
        let database = parts.next().ok_or_else(malformed)?;
        let filename = parts.next().ok_or_else(malformed)?;
        let database = (!database.is_empty()).then_some(database);
        Ok(Self::new(path, database, filename))
    }
}

impl fmt::Display for FileSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.binary {
            "@"
        } else if self.content.is_some() {
            "&"
        } else {
            ""
        };

        if self.path.is_system_wide() {
            write!(f, "{}..{}{}", self.path.code(), prefix, self.filename)?;
        } else {
            write!(
                f,
                "{}.{}.{}{}",
                self.path.code(),
                self.database.as_deref().unwrap_or(""),
                prefix,
                self.filename
            )?;
        }

        if let Some(content) = &self.content {
            write!(f, "&{}", dos_to_irbis(content))?;
        }
        Ok(())
    }
}

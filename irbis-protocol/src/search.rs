//! Search request parameters and found-record lines.

use crate::error::ProtocolError;
use crate::Mfn;
use serde::Serialize;

/// Parameters of a `SEARCH` request.
///
/// The expression is passed to the server verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub database: Option<String>,
    pub expression: String,
    /// Maximum number of MFNs to return; 0 lets the server decide.
    pub number: u32,
    /// 1-based index of the first MFN to return.
    pub first: u32,
    pub format: Option<String>,
    pub min_mfn: Mfn,
    pub max_mfn: Mfn,
    /// Sequential search expression applied after the dictionary search.
    pub sequential: Option<String>,
}

impl SearchParameters {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            database: None,
            expression: expression.into(),
            number: 0,
            first: 1,
            format: None,
            min_mfn: 0,
            max_mfn: 0,
            sequential: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    pub fn with_first(mut self, first: u32) -> Self {
        self.first = first;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_mfn_range(mut self, min_mfn: Mfn, max_mfn: Mfn) -> Self {
        self.min_mfn = min_mfn;
        self.max_mfn = max_mfn;
        self
    }

    pub fn with_sequential(mut self, sequential: impl Into<String>) -> Self {
        self.sequential = Some(sequential.into());
        self
    }
}

impl From<&str> for SearchParameters {
    fn from(expression: &str) -> Self {
        Self::new(expression)
    }
}

impl From<String> for SearchParameters {
    fn from(expression: String) -> Self {
        Self::new(expression)
    }
}

/// One line of a search reply: `mfn` or `mfn#description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundLine {
    pub mfn: Mfn,
    pub description: Option<String>,
}

impl FoundLine {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let (mfn, description) = match line.split_once('#') {
            Some((mfn, rest)) => (mfn, Some(rest.to_string())),
            None => (line, None),
        };
        let mfn = mfn.trim().parse().map_err(|_| ProtocolError::Malformed {
            what: "found line",
            line: line.to_string(),
        })?;
        Ok(Self { mfn, description })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = SearchParameters::new("K=ALG$");
        assert_eq!(params.first, 1);
        assert_eq!(params.number, 0);
        assert!(params.format.is_none());
        assert!(params.database.is_none());
    }

    #[test]
    fn test_builder() {
        let params = SearchParameters::from("A=Пушкин$")
            .with_database("RDR")
            .with_number(10)
            .with_first(21)
            .with_format("@brief")
            .with_mfn_range(5, 500)
            .with_sequential("v200:'X'");
        assert_eq!(params.database.as_deref(), Some("RDR"));
        assert_eq!(params.number, 10);
        assert_eq!(params.first, 21);
        assert_eq!(params.format.as_deref(), Some("@brief"));
        assert_eq!((params.min_mfn, params.max_mfn), (5, 500));
        assert_eq!(params.sequential.as_deref(), Some("v200:'X'"));
    }

    #[test]
    fn test_found_line() {
        let line = FoundLine::parse("17#Пушкин А. С. Стихи").unwrap();
        assert_eq!(line.mfn, 17);
        assert_eq!(line.description.as_deref(), Some("Пушкин А. С. Стихи"));

        let line = FoundLine::parse("42").unwrap();
        assert_eq!(line.mfn, 42);
        assert!(line.description.is_none());

        let line = FoundLine::parse("3#a#b").unwrap();
        assert_eq!(line.description.as_deref(), Some("a#b"));

        assert!(FoundLine::parse("x#desc").is_err());
    }
}

//! Dictionary (term) and posting requests.

use crate::error::ProtocolError;
use crate::Mfn;
use serde::Serialize;

/// Default number of terms returned by a dictionary read.
pub const DEFAULT_TERM_COUNT: u32 = 10;

/// Parameters of a `READ_TERMS` / `READ_TERMS_REVERSE` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermParameters {
    pub database: Option<String>,
    pub start: String,
    pub number: u32,
    pub reverse: bool,
    pub format: Option<String>,
}

impl TermParameters {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            database: None,
            start: start.into(),
            number: DEFAULT_TERM_COUNT,
            reverse: false,
            format: None,
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

    pub fn with_reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Accepted shapes of a dictionary read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermQuery {
    /// Start term, default count.
    Start(String),
    /// Start term and count.
    StartCount(String, u32),
    /// Full parameter set.
    Parameters(TermParameters),
}

impl TermQuery {
    /// Resolves the query into its canonical form.
    pub fn into_parameters(self) -> TermParameters {
        match self {
            TermQuery::Start(start) => TermParameters::new(start),
            TermQuery::StartCount(start, number) => TermParameters::new(start).with_number(number),
            TermQuery::Parameters(parameters) => parameters,
        }
    }
}

impl From<&str> for TermQuery {
    fn from(start: &str) -> Self {
        TermQuery::Start(start.to_string())
    }
}

impl From<String> for TermQuery {
    fn from(start: String) -> Self {
        TermQuery::Start(start)
    }
}

impl From<(&str, u32)> for TermQuery {
    fn from((start, number): (&str, u32)) -> Self {
        TermQuery::StartCount(start.to_string(), number)
    }
}

impl From<TermParameters> for TermQuery {
    fn from(parameters: TermParameters) -> Self {
        TermQuery::Parameters(parameters)
    }
}

/// A dictionary entry: `count#text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermInfo {
    pub count: u32,
    pub text: String,
}

impl TermInfo {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::Malformed {
            what: "term",
            line: line.to_string(),
        };
        let (count, text) = line.split_once('#').ok_or_else(malformed)?;
        let count = count.trim().parse().map_err(|_| malformed())?;
        Ok(Self {
            count,
            text: text.to_string(),
        })
    }
}

/// Parameters of a `READ_POSTINGS` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingParameters {
    pub database: Option<String>,
    pub first: u32,
    pub number: u32,
    pub format: Option<String>,
    pub terms: Vec<String>,
}

impl PostingParameters {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            database: None,
            first: 1,
            number: 0,
            format: None,
            terms: vec![term.into()],
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.terms.push(term.into());
        self
    }

    pub fn with_first(mut self, first: u32) -> Self {
        self.first = first;
        self
    }

    pub fn with_number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// A posting: `mfn#tag#occurrence#count[#text]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermPosting {
    pub mfn: Mfn,
    pub tag: u32,
    pub occurrence: u32,
    pub count: u32,
    pub text: Option<String>,
}

impl TermPosting {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::Malformed {
            what: "posting",
            line: line.to_string(),
        };
        let parts: Vec<&str> = line.splitn(5, '#').collect();
        if parts.len() < 4 {
            return Err(malformed());
        }
        let number = |i: usize| parts[i].trim().parse::<u32>().map_err(|_| malformed());
        Ok(Self {
            mfn: number(0)?,
            tag: number(1)?,
            occurrence: number(2)?,
            count: number(3)?,
            text: parts.get(4).map(|t| t.to_string()),
        })
    }
}

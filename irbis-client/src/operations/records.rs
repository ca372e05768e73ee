use super::{check, Operation};
use crate::outcome::Outcome;
use irbis_protocol::text::{OTHER_DELIMITER, SHORT_DELIMITER};
use irbis_protocol::{
    ClientQuery, Command, Mfn, ProtocolError, Record, ServerResponse, READ_RECORD_CODES,
};

/// Reads one record (`C`).
///
/// Record-level negative codes (absent, locked, deleted) are accepted and
/// reported through [`Outcome::Ignored`].
#[derive(Debug, Clone)]
pub struct ReadRecord {
    pub database: String,
    pub mfn: Mfn,
    pub version: Option<u32>,
    pub accepted: Vec<i32>,
}

impl ReadRecord {
    pub fn new(database: impl Into<String>, mfn: Mfn) -> Self {
        Self {
            database: database.into(),
            mfn,
            version: None,
            accepted: READ_RECORD_CODES.to_vec(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_accepted_codes(mut self, codes: &[i32]) -> Self {
        self.accepted = codes.to_vec();
        self
    }
}

impl Operation for ReadRecord {
    type Output = Outcome<Record>;

    fn command(&self) -> Command {
        Command::ReadRecord
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?.append_int(self.mfn);
        if let Some(version) = self.version {
            query.append_int(version);
        }
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Self::Output, ProtocolError> {
        let code = response.read_return_code(&self.accepted)?;
        let lines = response.remaining_wide_lines()?;
        let mut record = Record::parse(&lines)?;
        record.database = Some(self.database.clone());
        Ok(Outcome::from_code(code, record))
    }
}

/// Creates or updates a record (`D`).
#[derive(Debug, Clone)]
pub struct WriteRecord<'a> {
    pub database: String,
    pub record: &'a Record,
    pub lock: bool,
    pub actualize: bool,
    /// Re-parse the record echoed by the server.
    pub parse_back: bool,
}

/// Reply to [`WriteRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenRecord {
    /// New maximum MFN of the database.
    pub max_mfn: i32,
    /// The record as stored by the server, when requested.
    pub record: Option<Record>,
}

impl<'a> WriteRecord<'a> {
    pub fn new(database: impl Into<String>, record: &'a Record) -> Self {
        Self {
            database: database.into(),
            record,
            lock: false,
            actualize: true,
            parse_back: true,
        }
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn with_actualize(mut self, actualize: bool) -> Self {
        self.actualize = actualize;
        self
    }

    pub fn with_parse_back(mut self, parse_back: bool) -> Self {
        self.parse_back = parse_back;
        self
    }
}

impl Operation for WriteRecord<'_> {
    type Output = WrittenRecord;

    fn command(&self) -> Command {
        Command::UpdateRecord
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query
            .append_narrow(self.database.as_str())?
            .append_flag(self.lock)
            .append_flag(self.actualize)
            .append_wide(self.record.to_protocol_text().as_str());
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<WrittenRecord, ProtocolError> {
        let max_mfn = check(&mut response)?;
        if !self.parse_back {
            return Ok(WrittenRecord {
                max_mfn,
                record: None,
            });
        }

        // First line is the header, the rest of the record comes on one
        // line split by the short delimiter.
        let mut lines = vec![response.read_wide_line()?];
        let rest = response.read_wide_line()?;
        lines.extend(
            rest.split(SHORT_DELIMITER)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
        let mut record = Record::parse(&lines)?;
        record.database = Some(self.database.clone());
        Ok(WrittenRecord {
            max_mfn,
            record: Some(record),
        })
    }
}

/// Actualizes a record in the dictionary (`F`).
#[derive(Debug, Clone)]
pub struct ActualizeRecord {
    pub database: String,
    pub mfn: Mfn,
}

impl ActualizeRecord {
    pub fn new(database: impl Into<String>, mfn: Mfn) -> Self {
        Self {
            database: database.into(),
            mfn,
        }
    }
}

impl Operation for ActualizeRecord {
    type Output = ();

    fn command(&self) -> Command {
        Command::ActualizeRecord
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?.append_int(self.mfn);
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<(), ProtocolError> {
        check(&mut response)?;
        Ok(())
    }
}

/// Unlocks a set of records (`Q`).
#[derive(Debug, Clone)]
pub struct UnlockRecords {
    pub database: String,
    pub mfns: Vec<Mfn>,
}

impl UnlockRecords {
    pub fn new(database: impl Into<String>, mfns: &[Mfn]) -> Self {
        Self {
            database: database.into(),
            mfns: mfns.to_vec(),
        }
    }
}

impl Operation for UnlockRecords {
    type Output = ();

    fn command(&self) -> Command {
        Command::UnlockRecords
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?;
        for &mfn in &self.mfns {
            query.append_int(mfn);
        }
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<(), ProtocolError> {
        check(&mut response)?;
        Ok(())
    }
}

/// Maximum MFN of a database (`O`). The return code carries the value.
#[derive(Debug, Clone)]
pub struct GetMaxMfn {
    pub database: String,
}

impl GetMaxMfn {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }
}

impl Operation for GetMaxMfn {
    type Output = i32;

    fn command(&self) -> Command {
        Command::GetMaxMfn
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?;
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<i32, ProtocolError> {
        check(&mut response)
    }
}

/// What a single-record format request applies to.
#[derive(Debug, Clone, Copy)]
pub enum FormatSource<'a> {
    /// A record stored on the server.
    Mfn(Mfn),
    /// A record sent along with the request.
    Record(&'a Record),
}

impl From<Mfn> for FormatSource<'_> {
    fn from(mfn: Mfn) -> Self {
        FormatSource::Mfn(mfn)
    }
}

impl<'a> From<&'a Record> for FormatSource<'a> {
    fn from(record: &'a Record) -> Self {
        FormatSource::Record(record)
    }
}

/// Formats one record (`G`).
#[derive(Debug, Clone)]
pub struct FormatRecord<'a> {
    pub database: String,
    pub script: String,
    pub source: FormatSource<'a>,
}

impl<'a> FormatRecord<'a> {
    pub fn new(
        database: impl Into<String>,
        script: impl Into<String>,
        source: FormatSource<'a>,
    ) -> Self {
        Self {
            database: database.into(),
            script: script.into(),
            source,
        }
    }
}

impl Operation for FormatRecord<'_> {
    type Output = String;

    fn command(&self) -> Command {
        Command::FormatRecord
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?;
        query.append_format(Some(self.script.as_str()))?;
        match self.source {
            FormatSource::Mfn(mfn) => {
                query.append_int(1).append_int(mfn);
            }
            FormatSource::Record(record) => {
                query
                    .append_int(-2)
                    .append_wide(record.to_protocol_text().as_str());
            }
        }
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<String, ProtocolError> {
        check(&mut response)?;
        let text = response.remaining_wide_text()?;
        Ok(text.trim_matches(['\r', '\n']).to_string())
    }
}

/// Formats several stored records in one request (`G`).
#[derive(Debug, Clone)]
pub struct FormatRecords {
    pub database: String,
    pub script: String,
    pub mfns: Vec<Mfn>,
}

impl FormatRecords {
    pub fn new(database: impl Into<String>, script: impl Into<String>, mfns: &[Mfn]) -> Self {
        Self {
            database: database.into(),
            script: script.into(),
            mfns: mfns.to_vec(),
        }
    }
}

impl Operation for FormatRecords {
    type Output = Vec<String>;

    fn command(&self) -> Command {
        Command::FormatRecord
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?;
        query.append_format(Some(self.script.as_str()))?;
        query.append_int(self.mfns.len() as i64);
        for &mfn in &self.mfns {
            query.append_int(mfn);
        }
        Ok(())
    }

    /// Each reply line is `mfn#text`; only the text is kept.
    fn decode(&self, mut response: ServerResponse) -> Result<Vec<String>, ProtocolError> {
        check(&mut response)?;
        response
            .remaining_wide_lines()?
            .into_iter()
            .map(|line| {
                let text = line.split_once('#').map(|(_, text)| text.to_string());
                text.ok_or(ProtocolError::Malformed {
                    what: "formatted record",
                    line,
                })
            })
            .collect()
    }
}

/// Parses a record rendered with [`ALL_FORMAT`](irbis_protocol::ALL_FORMAT):
/// `\x1F`-separated record lines after a leading piece that is dropped.
pub(crate) fn parse_all_format(text: &str) -> Result<Record, ProtocolError> {
    let lines: Vec<&str> = text
        .split(OTHER_DELIMITER)
        .skip(1)
        .filter(|line| !line.is_empty())
        .collect();
    Record::parse(&lines)
}

//! Command vocabulary and workstation codes.
//!
//! Every request starts with a command code: a single ASCII character, or
//! `+` followed by a digit for the administrative extensions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Negative codes a record read treats as valid outcomes (previous version
/// absent, logically deleted, locked for input).
pub const READ_RECORD_CODES: &[i32] = &[-201, -600, -602, -603];

/// Negative codes a dictionary or postings read treats as valid outcomes
/// (term not found, last term, first term).
pub const READ_TERMS_CODES: &[i32] = &[-202, -203, -204];

/// Server command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ExclusiveDatabaseLock,
    RecordList,
    ServerInfo,
    DatabaseStat,
    GlobalCorrection,
    SaveRecordGroup,
    Print,
    UpdateIniFile,
    ImportIso,
    RegisterClient,
    UnregisterClient,
    ReadRecord,
    UpdateRecord,
    UnlockRecord,
    ActualizeRecord,
    FormatRecord,
    ReadTerms,
    ReadPostings,
    CorrectVirtualRecord,
    Search,
    ReadDocument,
    Backup,
    Nop,
    GetMaxMfn,
    ReadTermsReverse,
    UnlockRecords,
    FullTextSearch,
    EmptyDatabase,
    CreateDatabase,
    UnlockDatabase,
    GetRecordPostings,
    DeleteDatabase,
    ReloadMasterFile,
    ReloadDictionary,
    CreateDictionary,
    GetServerStat,
    GetProcessList,
    SetUserList,
    RestartServer,
    GetUserList,
    ListFiles,
}

impl Command {
    /// Every command in the vocabulary.
    pub const ALL: &'static [Command] = &[
        Command::ExclusiveDatabaseLock,
        Command::RecordList,
        Command::ServerInfo,
        Command::DatabaseStat,
        Command::GlobalCorrection,
        Command::SaveRecordGroup,
        Command::Print,
        Command::UpdateIniFile,
        Command::ImportIso,
        Command::RegisterClient,
        Command::UnregisterClient,
        Command::ReadRecord,
        Command::UpdateRecord,
        Command::UnlockRecord,
        Command::ActualizeRecord,
        Command::FormatRecord,
        Command::ReadTerms,
        Command::ReadPostings,
        Command::CorrectVirtualRecord,
        Command::Search,
        Command::ReadDocument,
        Command::Backup,
        Command::Nop,
        Command::GetMaxMfn,
        Command::ReadTermsReverse,
        Command::UnlockRecords,
        Command::FullTextSearch,
        Command::EmptyDatabase,
        Command::CreateDatabase,
        Command::UnlockDatabase,
        Command::GetRecordPostings,
        Command::DeleteDatabase,
        Command::ReloadMasterFile,
        Command::ReloadDictionary,
        Command::CreateDictionary,
        Command::GetServerStat,
        Command::GetProcessList,
        Command::SetUserList,
        Command::RestartServer,
        Command::GetUserList,
        Command::ListFiles,
    ];

    /// Returns the wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Command::ExclusiveDatabaseLock => "#",
            Command::RecordList => "0",
            Command::ServerInfo => "1",
            Command::DatabaseStat => "2",
            Command::GlobalCorrection => "5",
            Command::SaveRecordGroup => "6",
            Command::Print => "7",
            Command::UpdateIniFile => "8",
            Command::ImportIso => "9",
            Command::RegisterClient => "A",
            Command::UnregisterClient => "B",
            Command::ReadRecord => "C",
            Command::UpdateRecord => "D",
            Command::UnlockRecord => "E",
            Command::ActualizeRecord => "F",
            Command::FormatRecord => "G",
            Command::ReadTerms => "H",
            Command::ReadPostings => "I",
            Command::CorrectVirtualRecord => "J",
            Command::Search => "K",
            Command::ReadDocument => "L",
            Command::Backup => "M",
            Command::Nop => "N",
            Command::GetMaxMfn => "O",
            Command::ReadTermsReverse => "P",
            Command::UnlockRecords => "Q",
            Command::FullTextSearch => "R",
            Command::EmptyDatabase => "S",
            Command::CreateDatabase => "T",
            Command::UnlockDatabase => "U",
            Command::GetRecordPostings => "V",
            Command::DeleteDatabase => "W",
            Command::ReloadMasterFile => "X",
            Command::ReloadDictionary => "Y",
            Command::CreateDictionary => "Z",
            Command::GetServerStat => "+1",
            Command::GetProcessList => "+3",
            Command::SetUserList => "+7",
            Command::RestartServer => "+8",
            Command::GetUserList => "+9",
            Command::ListFiles => "!",
        }
    }

    /// Looks a command up by its wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Client application class, sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Workstation {
    #[serde(rename = "A")]
    Administrator,
    #[default]
    #[serde(rename = "C")]
    Cataloger,
    #[serde(rename = "M")]
    Acquisitions,
    #[serde(rename = "R")]
    Reader,
    #[serde(rename = "B")]
    Circulation,
    #[serde(rename = "K")]
    Provision,
    #[serde(rename = "J")]
    JavaApplet,
}

impl Workstation {
    pub fn code(&self) -> char {
        match self {
            Workstation::Administrator => 'A',
            Workstation::Cataloger => 'C',
            Workstation::Acquisitions => 'M',
            Workstation::Reader => 'R',
            Workstation::Circulation => 'B',
            Workstation::Provision => 'K',
            Workstation::JavaApplet => 'J',
        }
    }

    /// Parses a workstation code, case-insensitively.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'A' => Some(Workstation::Administrator),
            'C' => Some(Workstation::Cataloger),
            'M' => Some(Workstation::Acquisitions),
            'R' => Some(Workstation::Reader),
            'B' => Some(Workstation::Circulation),
            'K' => Some(Workstation::Provision),
            'J' => Some(Workstation::JavaApplet),
            _ => None,
        }
    }

    /// Parses the first character of `text` as a workstation code.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.trim().chars();
        let code = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Self::from_code(code)
    }
}

impl fmt::Display for Workstation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_command_codes() {
        assert_eq!(Command::RegisterClient.code(), "A");
        assert_eq!(Command::UnregisterClient.code(), "B");
        assert_eq!(Command::Search.code(), "K");
        assert_eq!(Command::GetProcessList.code(), "+3");
        assert_eq!(Command::ListFiles.code(), "!");
        assert_eq!(Command::ExclusiveDatabaseLock.code(), "#");
    }

    #[test]
    fn test_command_codes_unique() {
        let codes: HashSet<_> = Command::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), Command::ALL.len());
    }

    #[test]
    fn test_command_from_code() {
        for command in Command::ALL {
            assert_eq!(Command::from_code(command.code()), Some(*command));
        }
        assert_eq!(Command::from_code("+2"), None);
        assert_eq!(Command::from_code(""), None);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::GetUserList.to_string(), "+9");
        assert_eq!(format!("{}", Command::ReadRecord), "C");
    }

    #[test]
    fn test_workstation_codes() {
        assert_eq!(Workstation::default(), Workstation::Cataloger);
        assert_eq!(Workstation::Administrator.code(), 'A');
        assert_eq!(Workstation::from_code('r'), Some(Workstation::Reader));
        assert_eq!(Workstation::from_code('X'), None);
        assert_eq!(Workstation::parse(" K "), Some(Workstation::Provision));
        assert_eq!(Workstation::parse("CC"), None);
        assert_eq!(Workstation::parse(""), None);
    }

    #[test]
    fn test_workstation_serde() {
        let json = serde_json::to_string(&Workstation::Circulation).unwrap();
        assert_eq!(json, "\"B\"");
        let parsed: Workstation = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(parsed, Workstation::Administrator);
    }

    #[test]
    fn test_accepted_code_lists() {
        assert!(READ_RECORD_CODES.contains(&-602));
        assert!(!READ_RECORD_CODES.contains(&-601));
        assert_eq!(READ_TERMS_CODES, &[-202, -203, -204]);
    }
}

//! # irbis-protocol
//!
//! Wire protocol implementation for the IRBIS64 client protocol.
//!
//! This crate provides:
//! - Request encoding: length-prefixed, `\n`-terminated text lines in
//!   Windows-1251 or UTF-8
//! - Response decoding: a cursor over the raw reply with `\r\n` line framing
//! - The command vocabulary and the server return-code table
//! - Typed payloads exchanged with the server (records, file
//!   specifications, search and dictionary parameters, server info)
//! - Parsers for the server's text resources (INI, MNU, PAR, OPT, TRE,
//!   character tables, search scenarios)
//!
//! Nothing in this crate touches a socket.

pub mod alphabet;
pub mod command;
pub mod error;
pub mod file;
pub mod info;
pub mod ini;
pub mod menu;
pub mod opt;
pub mod par;
pub mod query;
pub mod record;
pub mod response;
pub mod scenario;
pub mod search;
pub mod session;
pub mod terms;
pub mod text;
pub mod tree;

pub use alphabet::{AlphabetTable, UpperCaseTable};
pub use command::{Command, Workstation, READ_RECORD_CODES, READ_TERMS_CODES};
pub use error::{describe_return_code, ProtocolError};
pub use file::{FileSpecification, IrbisPath};
pub use ini::{IniFile, IniSection};
pub use menu::MenuFile;
pub use opt::{OptFile, OptLine};
pub use par::ParFile;
pub use query::ClientQuery;
pub use record::{Field, Record, RecordStatus, SubField};
pub use response::{ResponseHeader, ServerResponse};
pub use scenario::SearchScenario;
pub use search::{FoundLine, SearchParameters};
pub use session::Session;
pub use terms::{PostingParameters, TermInfo, TermParameters, TermPosting, TermQuery};
pub use text::TextEncoding;
pub use tree::{TreeFile, TreeNode};

/// Record number within a database (1-based).
pub type Mfn = u32;

/// Default port of an IRBIS64 server.
pub const DEFAULT_PORT: u16 = 6666;

/// Default host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default database name.
pub const DEFAULT_DATABASE: &str = "IBIS";

/// Maximum number of postings (and MFNs per format request) the server
/// accepts in one request.
pub const MAX_POSTINGS: usize = 32758;

/// Marker preceding the payload of a binary file in a `READ_DOCUMENT` reply.
pub const BINARY_DATA_MARKER: &[u8] = b"IRBIS_BINARY_DATA";

/// Number of reserved lines at the end of the response preamble.
pub const RESERVED_RESPONSE_LINES: usize = 5;

/// Format that dumps a whole record in the server's native text form.
pub const ALL_FORMAT: &str = "&uf('+0')";

/// Brief bibliographic description format.
pub const BRIEF_FORMAT: &str = "@brief";

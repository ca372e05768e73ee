//! Operation catalogue.
//!
//! An operation is a value that knows its command code, writes the
//! command-specific request lines, and interprets the reply. The blocking
//! and async connections run the same values; neither duplicates protocol
//! logic.

mod admin;
mod files;
mod records;
mod search;
mod session;
mod terms;

pub use admin::{
    CreateDatabase, DatabaseCommand, GetDatabaseInfo, GetServerStat, GetUserList, ListProcesses,
    PrintTable, RestartServer, SetUserList, UpdateIniFile,
};
pub use files::{ListFiles, ReadBinaryFile, ReadTextStream, WriteTextFile};
pub(crate) use records::parse_all_format;
pub use records::{
    ActualizeRecord, FormatRecord, FormatRecords, FormatSource, GetMaxMfn, ReadRecord,
    UnlockRecords, WriteRecord, WrittenRecord,
};
pub use search::{Search, SearchCount, SearchHits};
pub use session::{
    GetServerVersion, Nop, Register, Registration, Unregister, ALREADY_REGISTERED,
};
pub use terms::{GetRecordPostings, ReadPostings, ReadTerms};

use bytes::Bytes;
use irbis_protocol::{ClientQuery, Command, ProtocolError, ServerResponse, Session};

/// One request/response exchange with the server.
pub trait Operation {
    type Output;

    fn command(&self) -> Command;

    /// Writes the lines that follow the preamble.
    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError>;

    /// Interprets a reply whose preamble has been consumed.
    fn decode(&self, response: ServerResponse) -> Result<Self::Output, ProtocolError>;

    /// Builds the full request, advancing the session's query id. A request
    /// that fails to encode leaves the query id untouched.
    fn build(&self, session: &mut Session) -> Result<ClientQuery, ProtocolError> {
        let query_id = session.query_id;
        let mut query = ClientQuery::new(session, self.command())?;
        if let Err(err) = self.encode(&mut query) {
            session.query_id = query_id;
            return Err(err);
        }
        Ok(query)
    }

    /// Interprets the raw reply bytes.
    fn parse(&self, reply: Bytes) -> Result<Self::Output, ProtocolError> {
        self.decode(ServerResponse::parse(reply)?)
    }
}

/// Reads the return code, failing on any negative value.
fn check(response: &mut ServerResponse) -> Result<i32, ProtocolError> {
    response.read_return_code(&[])
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use irbis_protocol::Workstation;

    pub fn session() -> Session {
        let mut session = Session::from_connection_string(
            "host=127.0.0.1;port=6666;database=IBIS;user=librarian;password=secret;",
        );
        session.client_id = 123456;
        session.workstation = Workstation::Cataloger;
        session
    }

    /// Encodes the operation and returns the lines after the preamble.
    pub fn params<O: Operation>(op: &O) -> Vec<String> {
        let mut session = session();
        let packet = op.build(&mut session).unwrap().finalize();
        let newline = packet.iter().position(|&b| b == b'\n').unwrap();
        let body = String::from_utf8_lossy(&packet[newline + 1..]).into_owned();
        let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
        lines.pop();
        lines.split_off(10)
    }
}

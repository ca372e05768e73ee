//! Async connection.
//!
//! Mirrors [`Connection`](crate::Connection) over an [`AsyncTransport`].
//! Request building and reply interpretation go through the same
//! operations and state; only the exchange is awaited. Anything without a
//! convenience method here runs through [`AsyncConnection::run`].

use crate::connection::{ClientState, ConnectionConfig, ConnectionState, MAX_REGISTRATION_ATTEMPTS};
use crate::error::ClientError;
use crate::files::document_text;
use crate::operations::{
    FormatRecord, FormatSource, GetDatabaseInfo, GetMaxMfn, GetServerStat, GetServerVersion,
    GetUserList, ListFiles, ListProcesses, Nop, Operation, ReadRecord, ReadTerms,
    ReadTextStream, Search, SearchCount, Unregister, WriteRecord,
};
use crate::outcome::Outcome;
use crate::transport::{AsyncTransport, TokioTransport};
use irbis_protocol::info::{DatabaseInfo, ServerProcess, ServerStat, ServerVersion, UserInfo};
use irbis_protocol::{
    FileSpecification, FoundLine, IniFile, Mfn, Record, SearchParameters, ServerResponse,
    Session, TermInfo, TermQuery,
};

/// An async connection to an IRBIS64 server.
pub struct AsyncConnection<T: AsyncTransport = TokioTransport> {
    transport: T,
    state: ClientState,
}

impl AsyncConnection<TokioTransport> {
    pub fn new(session: Session) -> Self {
        Self::with_transport(session, TokioTransport::default())
    }

    pub fn with_config(session: Session, config: ConnectionConfig) -> Self {
        Self::with_transport(session, TokioTransport::new(config))
    }

    pub fn from_connection_string(text: &str) -> Self {
        Self::new(Session::from_connection_string(text))
    }
}

impl<T: AsyncTransport> AsyncConnection<T> {
    pub fn with_transport(session: Session, transport: T) -> Self {
        Self {
            transport,
            state: ClientState::new(session),
        }
    }

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.state
    }

    pub fn ini_file(&self) -> &IniFile {
        &self.state.ini
    }

    pub fn server_version(&self) -> Option<&str> {
        self.state.server_version.as_deref()
    }

    pub fn last_error(&self) -> i32 {
        self.state.last_error
    }

    pub fn database(&self) -> &str {
        &self.state.session.database
    }

    pub fn push_database(&mut self, database: &str) -> String {
        self.state.push_database(database)
    }

    pub fn pop_database(&mut self) -> Option<String> {
        self.state.pop_database()
    }

    /// Registers with the server. Does nothing when already connected.
    pub async fn connect(&mut self) -> Result<&IniFile, ClientError> {
        if self.state.is_connected() {
            return Ok(&self.state.ini);
        }

        for attempt in 1..=MAX_REGISTRATION_ATTEMPTS {
            let op = self.state.begin_registration()?;
            let outcome = self.execute(&op).await?;
            if self.state.finish_registration(outcome, attempt)? {
                break;
            }
        }
        Ok(&self.state.ini)
    }

    /// Unregisters from the server.
    ///
    /// The connection is `Disconnected` when this returns, whatever the
    /// outcome. An error only reports that the server may not have seen the
    /// unregistration; there is nothing left to retry, so callers may ignore
    /// it.
    pub async fn disconnect(&mut self) -> Result<(), ClientError> {
        if !self.state.is_connected() {
            return Ok(());
        }
        let op = Unregister::new(self.state.session.username.as_str());
        let result = self.execute(&op).await;
        self.state.finish_disconnect();
        result
    }

    /// Runs an operation on a registered connection.
    pub async fn run<O: Operation>(&mut self, op: &O) -> Result<O::Output, ClientError> {
        self.state.require_connected()?;
        self.execute(op).await
    }

    async fn execute<O: Operation>(&mut self, op: &O) -> Result<O::Output, ClientError> {
        let packet = self.state.prepare(op)?;
        let session = &self.state.session;
        let reply = self
            .transport
            .exchange(&session.host, session.port, &packet)
            .await?;
        self.state.complete(op, reply)
    }

    pub async fn nop(&mut self) -> Result<(), ClientError> {
        self.run(&Nop).await
    }

    pub async fn get_server_version(&mut self) -> Result<ServerVersion, ClientError> {
        let version = self.run(&GetServerVersion).await?;
        if self.state.server_version.is_none() {
            self.state.server_version = Some(version.version.clone());
        }
        Ok(version)
    }

    pub async fn get_max_mfn(&mut self, database: Option<&str>) -> Result<i32, ClientError> {
        let op = GetMaxMfn::new(self.state.database(database));
        self.run(&op).await
    }

    pub async fn read_record(&mut self, mfn: Mfn) -> Result<Outcome<Record>, ClientError> {
        let op = ReadRecord::new(self.state.database(None), mfn);
        let outcome = self.run(&op).await?;
        self.state.note(&outcome);
        Ok(outcome)
    }

    pub async fn write_record(
        &mut self,
        record: &mut Record,
        lock: bool,
        actualize: bool,
        parse_back: bool,
    ) -> Result<i32, ClientError> {
        if record.fields.is_empty() {
            return Err(ClientError::InvalidArgument(
                "record has no fields".to_string(),
            ));
        }
        let database = self.state.database(record.database.as_deref());
        let op = WriteRecord::new(database, record)
            .with_lock(lock)
            .with_actualize(actualize)
            .with_parse_back(parse_back);
        let written = self.run(&op).await?;
        if let Some(echoed) = written.record {
            *record = echoed;
        }
        Ok(written.max_mfn)
    }

    pub async fn format_record<'a>(
        &mut self,
        script: &str,
        source: impl Into<FormatSource<'a>>,
    ) -> Result<String, ClientError> {
        if script.is_empty() {
            return Ok(String::new());
        }
        let op = FormatRecord::new(self.state.database(None), script, source.into());
        self.run(&op).await
    }

    pub async fn search(
        &mut self,
        parameters: impl Into<SearchParameters>,
    ) -> Result<Vec<Mfn>, ClientError> {
        let parameters = parameters.into();
        let database = self.state.database(parameters.database.as_deref());
        let hits = self.run(&Search::new(database, parameters)).await?;
        Ok(hits.found.into_iter().map(|f| f.mfn).collect())
    }

    pub async fn search_ex(
        &mut self,
        parameters: impl Into<SearchParameters>,
    ) -> Result<Vec<FoundLine>, ClientError> {
        let parameters = parameters.into();
        let database = self.state.database(parameters.database.as_deref());
        let op = Search::new(database, parameters).with_descriptions();
        Ok(self.run(&op).await?.found)
    }

    pub async fn search_count(&mut self, expression: &str) -> Result<u32, ClientError> {
        let op = SearchCount::new(self.state.database(None), expression);
        self.run(&op).await
    }

    pub async fn read_terms(
        &mut self,
        query: impl Into<TermQuery>,
    ) -> Result<Outcome<Vec<TermInfo>>, ClientError> {
        let parameters = query.into().into_parameters();
        let database = self.state.database(parameters.database.as_deref());
        let outcome = self.run(&ReadTerms::new(database, parameters)).await?;
        self.state.note(&outcome);
        Ok(outcome)
    }

    pub async fn read_text_stream(
        &mut self,
        specification: &FileSpecification,
    ) -> Result<ServerResponse, ClientError> {
        self.run(&ReadTextStream::new(specification.clone())).await
    }

    pub async fn read_text_file(
        &mut self,
        specification: &FileSpecification,
    ) -> Result<String, ClientError> {
        let mut response = self.read_text_stream(specification).await?;
        document_text(&mut response)
    }

    pub async fn list_files<S: ToString>(
        &mut self,
        specifications: &[S],
    ) -> Result<Vec<String>, ClientError> {
        if specifications.is_empty() {
            return Ok(Vec::new());
        }
        self.run(&ListFiles::new(specifications)).await
    }

    pub async fn list_processes(&mut self) -> Result<Vec<ServerProcess>, ClientError> {
        self.run(&ListProcesses).await
    }

    pub async fn get_server_stat(&mut self) -> Result<ServerStat, ClientError> {
        self.run(&GetServerStat).await
    }

    pub async fn get_database_info(
        &mut self,
        database: Option<&str>,
    ) -> Result<DatabaseInfo, ClientError> {
        let op = GetDatabaseInfo::new(self.state.database(database));
        self.run(&op).await
    }

    pub async fn get_user_list(&mut self) -> Result<Vec<UserInfo>, ClientError> {
        self.run(&GetUserList).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::scripted::{reply, ScriptedTransport};
    use crate::ErrorKind;
    use std::io;

    fn connection() -> AsyncConnection<ScriptedTransport> {
        AsyncConnection::with_transport(
            Session::from_connection_string(
                "host=127.0.0.1;port=6666;database=IBIS;user=librarian;password=secret;",
            ),
            ScriptedTransport::new(),
        )
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let mut conn = connection();
        conn.transport
            .push(reply("A", &["0", "245", "[Main]", "Db=IBIS"]))
            .push(reply("B", &["0"]));

        let ini = conn.connect().await.unwrap();
        assert_eq!(ini.get("Main", "Db"), Some("IBIS"));
        assert!(conn.is_connected());

        conn.disconnect().await.unwrap();
        assert_eq!(conn.connection_state(), ConnectionState::Disconnected);
        assert_eq!(conn.transport.lines(1)[0], "B");
    }

    #[tokio::test]
    async fn test_failed_disconnect_still_disconnects() {
        let mut conn = connection();
        conn.transport
            .push(reply("A", &["0", "245"]))
            .push_error(io::ErrorKind::BrokenPipe);
        conn.connect().await.unwrap();

        assert!(conn.disconnect().await.is_err());
        assert_eq!(conn.connection_state(), ConnectionState::Disconnected);
        conn.disconnect().await.unwrap();
        assert_eq!(conn.transport.requests.len(), 2);
    }

    #[tokio::test]
    async fn test_connect_retry() {
        let mut conn = connection();
        conn.transport
            .push(reply("A", &["-3337"]))
            .push(reply("A", &["-3337"]))
            .push(reply("A", &["0", "245"]));
        conn.connect().await.unwrap();
        assert_eq!(conn.transport.requests.len(), 3);
        assert_eq!(conn.session().query_id, 1);
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let mut conn = connection();
        let err = conn.search_count("K=A$").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(conn.transport.requests.is_empty());
    }

    #[tokio::test]
    async fn test_operations() {
        let mut conn = connection();
        conn.transport
            .push(reply("A", &["0", "245"]))
            .push(reply("O", &["42"]))
            .push(reply("K", &["0", "2", "3", "5"]))
            .push(reply("C", &["-602", "3#64", "0#4", "920#PAZK"]));
        conn.connect().await.unwrap();

        assert_eq!(conn.get_max_mfn(None).await.unwrap(), 42);
        assert_eq!(conn.search("K=ALG$").await.unwrap(), vec![3, 5]);

        let outcome = conn.read_record(3).await.unwrap();
        assert_eq!(outcome.code(), Some(-602));
        assert!(outcome.value().status.is_locked());
        assert_eq!(conn.last_error(), -602);
        assert_eq!(conn.transport.lines(3)[4], "3");
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut conn = connection();
        conn.transport
            .push(reply("A", &["0", "245"]))
            .push(reply("K", &["-1"]));
        conn.connect().await.unwrap();
        let err = conn.search_count("(").await.unwrap_err();
        assert_eq!(err.server_code(), Some(-1));
        assert_eq!(conn.last_error(), -1);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let mut conn = connection();
        conn.transport
            .push(reply("A", &["0", "245"]))
            .push_error(io::ErrorKind::TimedOut);
        conn.connect().await.unwrap();
        let err = conn.nop().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(conn.is_connected());
    }
}

//! Connection management.
//!
//! A connection owns the [`Session`] and moves between two states:
//! disconnected (initial) and connected (after a successful registration).
//! Every operation is one exchange through the transport; no socket stays
//! open between operations.

use crate::error::ClientError;
use crate::files::document_text;
use crate::operations::{
    parse_all_format, ActualizeRecord, CreateDatabase, DatabaseCommand, FormatRecord,
    FormatRecords, FormatSource, GetDatabaseInfo, GetMaxMfn, GetRecordPostings, GetServerStat,
    GetServerVersion, GetUserList, ListFiles, ListProcesses, Nop, Operation, PrintTable,
    ReadBinaryFile, ReadPostings, ReadRecord, ReadTerms, ReadTextStream, Register, Registration,
    RestartServer, Search, SearchCount, SetUserList, UnlockRecords, Unregister,
    UpdateIniFile, WriteRecord, WriteTextFile, ALREADY_REGISTERED,
};
use crate::outcome::Outcome;
use crate::transport::{TcpTransport, Transport};
use bytes::Bytes;
use irbis_protocol::info::{
    DatabaseInfo, ServerProcess, ServerStat, ServerVersion, TableDefinition, UserInfo,
};
use irbis_protocol::{
    describe_return_code, FileSpecification, FoundLine, IniFile, Mfn, PostingParameters,
    ProtocolError, Record, RecordStatus, SearchParameters, ServerResponse, Session, TermInfo,
    TermPosting, TermQuery, ALL_FORMAT, MAX_POSTINGS,
};
use rand::Rng;
use std::time::Duration;

/// Default read buffer size (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Minimum read buffer size (1 KiB).
pub const MIN_READ_BUFFER_SIZE: usize = 1024;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Registration attempts before giving up on client id collisions.
pub const MAX_REGISTRATION_ATTEMPTS: usize = 10;

/// Page size used by [`Connection::search_all`].
pub const SEARCH_PAGE_SIZE: u32 = 10_000;

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Timeout for sending the request and reading the reply.
    pub read_timeout: Duration,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Protocol state shared by the blocking and async connections.
#[derive(Debug)]
pub(crate) struct ClientState {
    pub(crate) session: Session,
    pub(crate) state: ConnectionState,
    pub(crate) ini: IniFile,
    pub(crate) server_version: Option<String>,
    pub(crate) database_stack: Vec<String>,
    pub(crate) last_error: i32,
}

impl ClientState {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            state: ConnectionState::Disconnected,
            ini: IniFile::default(),
            server_version: None,
            database_stack: Vec::new(),
            last_error: 0,
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub(crate) fn require_connected(&self) -> Result<(), ClientError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(ClientError::NotConnected)
        }
    }

    /// Explicit database name, or the current one.
    pub(crate) fn database(&self, database: Option<&str>) -> String {
        database
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.session.database)
            .to_string()
    }

    /// Validates the parameters and draws a fresh client id.
    pub(crate) fn begin_registration(&mut self) -> Result<Register, ClientError> {
        let session = &self.session;
        let missing = if session.host.is_empty() {
            Some("host")
        } else if session.port == 0 {
            Some("port")
        } else if session.username.is_empty() {
            Some("username")
        } else if session.password.is_empty() {
            Some("password")
        } else if session.database.is_empty() {
            Some("database")
        } else {
            None
        };
        if let Some(parameter) = missing {
            return Err(ClientError::Config { parameter });
        }

        self.session.query_id = 0;
        self.session.client_id = rand::thread_rng().gen_range(100_000..=999_999);
        Ok(Register::new(
            self.session.username.as_str(),
            self.session.password.as_str(),
        ))
    }

    /// Applies a registration reply. Returns `false` when the client id was
    /// already taken and another attempt is needed.
    pub(crate) fn finish_registration(
        &mut self,
        outcome: Outcome<Registration>,
        attempt: usize,
    ) -> Result<bool, ClientError> {
        match outcome {
            Outcome::Ok(registration) => {
                self.server_version = Some(registration.version);
                self.ini = registration.ini;
                self.state = ConnectionState::Connected;
                tracing::info!(
                    "Connected to {}:{} as {} (client id {})",
                    self.session.host,
                    self.session.port,
                    self.session.username,
                    self.session.client_id
                );
                Ok(true)
            }
            Outcome::Ignored { code, .. } => {
                tracing::warn!(
                    "Client id {} already registered (attempt {}/{})",
                    self.session.client_id,
                    attempt,
                    MAX_REGISTRATION_ATTEMPTS
                );
                self.last_error = code;
                if attempt >= MAX_REGISTRATION_ATTEMPTS {
                    return Err(ProtocolError::server(ALREADY_REGISTERED).into());
                }
                Ok(false)
            }
        }
    }

    pub(crate) fn finish_disconnect(&mut self) {
        self.state = ConnectionState::Disconnected;
        tracing::info!("Disconnected from {}:{}", self.session.host, self.session.port);
    }

    /// Builds the wire form of the request.
    pub(crate) fn prepare<O: Operation>(&mut self, op: &O) -> Result<Bytes, ClientError> {
        let query_id = self.session.query_id;
        let packet = op.build(&mut self.session)?.finalize();
        tracing::debug!(
            "Sending {} (query {}, {} bytes)",
            op.command(),
            query_id,
            packet.len()
        );
        Ok(packet)
    }

    /// Interprets the reply and records server error codes.
    pub(crate) fn complete<O: Operation>(
        &mut self,
        op: &O,
        reply: Bytes,
    ) -> Result<O::Output, ClientError> {
        tracing::debug!("Received {} bytes for {}", reply.len(), op.command());
        op.parse(reply).map_err(|e| {
            if let Some(code) = e.server_code() {
                self.last_error = code;
                tracing::debug!("{} failed with {}: {}", op.command(), code, describe_return_code(code));
            }
            ClientError::from(e)
        })
    }

    /// Records an accepted negative code.
    pub(crate) fn note<T>(&mut self, outcome: &Outcome<T>) {
        if let Some(code) = outcome.code() {
            self.last_error = code;
            tracing::debug!("Ignored return code {}: {}", code, outcome.message());
        }
    }

    pub(crate) fn push_database(&mut self, database: &str) -> String {
        let previous = std::mem::replace(&mut self.session.database, database.to_string());
        self.database_stack.push(previous.clone());
        previous
    }

    pub(crate) fn pop_database(&mut self) -> Option<String> {
        let previous = self.database_stack.pop()?;
        Some(std::mem::replace(&mut self.session.database, previous))
    }
}

/// A blocking connection to an IRBIS64 server.
pub struct Connection<T: Transport = TcpTransport> {
    transport: T,
    state: ClientState,
}

impl Connection<TcpTransport> {
    /// Creates a connection (not yet registered) over TCP sockets.
    pub fn new(session: Session) -> Self {
        Self::with_transport(session, TcpTransport::default())
    }

    pub fn with_config(session: Session, config: ConnectionConfig) -> Self {
        Self::with_transport(session, TcpTransport::new(config))
    }

    pub fn from_connection_string(text: &str) -> Self {
        Self::new(Session::from_connection_string(text))
    }
}

impl<T: Transport> Connection<T> {
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

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.state
    }

    /// INI file received at registration.
    pub fn ini_file(&self) -> &IniFile {
        &self.state.ini
    }

    pub fn server_version(&self) -> Option<&str> {
        self.state.server_version.as_deref()
    }

    /// Last negative return code seen, 0 if none.
    pub fn last_error(&self) -> i32 {
        self.state.last_error
    }

    pub fn database(&self) -> &str {
        &self.state.session.database
    }

    // ===== Session =====

    /// Applies `key=value;` pairs to the session parameters.
    pub fn parse_connection_string(&mut self, text: &str) {
        self.state.session.apply_connection_string(text);
    }

    pub fn to_connection_string(&self) -> String {
        self.state.session.to_connection_string()
    }

    /// Registers with the server. Does nothing when already connected.
    pub fn connect(&mut self) -> Result<&IniFile, ClientError> {
        if self.state.is_connected() {
            return Ok(&self.state.ini);
        }

        for attempt in 1..=MAX_REGISTRATION_ATTEMPTS {
            let op = self.state.begin_registration()?;
            let outcome = self.execute(&op)?;
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
    pub fn disconnect(&mut self) -> Result<(), ClientError> {
        if !self.state.is_connected() {
            return Ok(());
        }
        let op = Unregister::new(self.state.session.username.as_str());
        let result = self.execute(&op);
        self.state.finish_disconnect();
        result
    }

    /// Runs an operation on a registered connection.
    pub fn run<O: Operation>(&mut self, op: &O) -> Result<O::Output, ClientError> {
        self.state.require_connected()?;
        self.execute(op)
    }

    fn execute<O: Operation>(&mut self, op: &O) -> Result<O::Output, ClientError> {
        let packet = self.state.prepare(op)?;
        let session = &self.state.session;
        let reply = self
            .transport
            .exchange(&session.host, session.port, &packet)?;
        self.state.complete(op, reply)
    }

    pub fn nop(&mut self) -> Result<(), ClientError> {
        self.run(&Nop)
    }

    /// Makes `database` current; returns the previous one.
    pub fn push_database(&mut self, database: &str) -> String {
        self.state.push_database(database)
    }

    /// Restores the database saved by the matching `push_database`;
    /// returns the one being left.
    pub fn pop_database(&mut self) -> Option<String> {
        self.state.pop_database()
    }

    pub fn get_server_version(&mut self) -> Result<ServerVersion, ClientError> {
        let version = self.run(&GetServerVersion)?;
        if self.state.server_version.is_none() {
            self.state.server_version = Some(version.version.clone());
        }
        Ok(version)
    }

    // ===== Records =====

    pub fn read_record(&mut self, mfn: Mfn) -> Result<Outcome<Record>, ClientError> {
        let op = ReadRecord::new(self.state.database(None), mfn);
        let outcome = self.run(&op)?;
        self.state.note(&outcome);
        Ok(outcome)
    }

    /// Reads a specific version of a record, then unlocks the record.
    pub fn read_record_version(
        &mut self,
        mfn: Mfn,
        version: u32,
    ) -> Result<Outcome<Record>, ClientError> {
        let op = ReadRecord::new(self.state.database(None), mfn).with_version(version);
        let outcome = self.run(&op)?;
        self.state.note(&outcome);
        self.unlock_records(&[mfn])?;
        Ok(outcome)
    }

    /// Reads several records; more than one goes through a single format
    /// request.
    pub fn read_records(&mut self, mfns: &[Mfn]) -> Result<Vec<Record>, ClientError> {
        match mfns {
            [] => Ok(Vec::new()),
            [mfn] => Ok(vec![self.read_record(*mfn)?.into_value()]),
            _ => {
                let database = self.state.database(None);
                self.format_records(ALL_FORMAT, mfns)?
                    .iter()
                    .map(|text| -> Result<Record, ClientError> {
                        let mut record = parse_all_format(text)?;
                        record.database = Some(database.clone());
                        Ok(record)
                    })
                    .collect()
            }
        }
    }

    /// Stores a record and returns the new maximum MFN. With `parse_back`
    /// the record is replaced by the server's copy.
    pub fn write_record(
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
        let written = self.run(&op)?;
        if let Some(echoed) = written.record {
            *record = echoed;
        }
        Ok(written.max_mfn)
    }

    /// Marks a record logically deleted.
    pub fn delete_record(&mut self, mfn: Mfn) -> Result<Record, ClientError> {
        self.set_deleted(mfn, true)
    }

    /// Clears the logically deleted mark.
    pub fn undelete_record(&mut self, mfn: Mfn) -> Result<Record, ClientError> {
        self.set_deleted(mfn, false)
    }

    fn set_deleted(&mut self, mfn: Mfn, deleted: bool) -> Result<Record, ClientError> {
        let mut record = self.read_record(mfn)?.into_value();
        let marked = record.status.contains(RecordStatus::LOGICALLY_DELETED);
        if marked != deleted {
            record.status = if deleted {
                record.status.with(RecordStatus::LOGICALLY_DELETED)
            } else {
                record.status.without(RecordStatus::LOGICALLY_DELETED)
            };
            self.write_record(&mut record, false, true, false)?;
        }
        Ok(record)
    }

    pub fn actualize_record(&mut self, mfn: Mfn) -> Result<(), ClientError> {
        let op = ActualizeRecord::new(self.state.database(None), mfn);
        self.run(&op)
    }

    pub fn unlock_records(&mut self, mfns: &[Mfn]) -> Result<(), ClientError> {
        if mfns.is_empty() {
            return Ok(());
        }
        let op = UnlockRecords::new(self.state.database(None), mfns);
        self.run(&op)
    }

    pub fn get_max_mfn(&mut self, database: Option<&str>) -> Result<i32, ClientError> {
        let op = GetMaxMfn::new(self.state.database(database));
        self.run(&op)
    }

    /// Formats a stored record or one passed inline.
    pub fn format_record<'a>(
        &mut self,
        script: &str,
        source: impl Into<FormatSource<'a>>,
    ) -> Result<String, ClientError> {
        if script.is_empty() {
            return Ok(String::new());
        }
        let op = FormatRecord::new(self.state.database(None), script, source.into());
        self.run(&op)
    }

    pub fn format_records(
        &mut self,
        script: &str,
        mfns: &[Mfn],
    ) -> Result<Vec<String>, ClientError> {
        if mfns.is_empty() || script.is_empty() {
            return Ok(Vec::new());
        }
        if mfns.len() > MAX_POSTINGS {
            return Err(ClientError::InvalidArgument(format!(
                "too many records to format: {} (at most {})",
                mfns.len(),
                MAX_POSTINGS
            )));
        }
        let op = FormatRecords::new(self.state.database(None), script, mfns);
        self.run(&op)
    }

    // ===== Search =====

    fn search_op(&self, parameters: SearchParameters) -> Search {
        let database = self.state.database(parameters.database.as_deref());
        Search::new(database, parameters)
    }

    /// Searches and returns the found MFNs.
    pub fn search(
        &mut self,
        parameters: impl Into<SearchParameters>,
    ) -> Result<Vec<Mfn>, ClientError> {
        let op = self.search_op(parameters.into());
        let hits = self.run(&op)?;
        Ok(hits.found.into_iter().map(|f| f.mfn).collect())
    }

    /// Searches and returns `mfn#description` lines.
    pub fn search_ex(
        &mut self,
        parameters: impl Into<SearchParameters>,
    ) -> Result<Vec<FoundLine>, ClientError> {
        let op = self.search_op(parameters.into()).with_descriptions();
        Ok(self.run(&op)?.found)
    }

    pub fn search_count(&mut self, expression: &str) -> Result<u32, ClientError> {
        let op = SearchCount::new(self.state.database(None), expression);
        self.run(&op)
    }

    /// Collects every matching MFN, paging past the per-request limit.
    pub fn search_all(&mut self, expression: &str) -> Result<Vec<Mfn>, ClientError> {
        let mut result = Vec::new();
        let mut expected = 0;
        loop {
            let first = result.len() as u32 + 1;
            let parameters = SearchParameters::new(expression)
                .with_number(SEARCH_PAGE_SIZE)
                .with_first(first);
            let hits = self.run(&self.search_op(parameters))?;
            if first == 1 {
                expected = hits.total;
            }
            if hits.found.is_empty() {
                break;
            }
            result.extend(hits.found.iter().map(|f| f.mfn));
            if result.len() as u32 >= expected {
                break;
            }
        }
        Ok(result)
    }

    /// Searches and formats the found records; `limit` 0 means no limit.
    pub fn search_format(
        &mut self,
        expression: &str,
        format: &str,
        limit: usize,
    ) -> Result<Vec<String>, ClientError> {
        let parameters = SearchParameters::new(expression).with_format(format);
        let op = self.search_op(parameters).with_descriptions();
        let found = self.run(&op)?.found;
        Ok(limited(
            found
                .into_iter()
                .filter_map(|f| f.description)
                .filter(|d| !d.is_empty()),
            limit,
        ))
    }

    /// Searches and reads the found records in one request; `limit` 0 means
    /// no limit.
    pub fn search_read(
        &mut self,
        expression: &str,
        limit: usize,
    ) -> Result<Vec<Record>, ClientError> {
        let database = self.state.database(None);
        let parameters = SearchParameters::new(expression).with_format(ALL_FORMAT);
        let op = self.search_op(parameters).with_descriptions();
        let found = self.run(&op)?.found;
        limited(found.into_iter(), limit)
            .into_iter()
            .map(|f| -> Result<Record, ClientError> {
                let mut record = parse_all_format(f.description.as_deref().unwrap_or(""))?;
                record.mfn = f.mfn;
                record.database = Some(database.clone());
                Ok(record)
            })
            .collect()
    }

    // ===== Dictionary =====

    pub fn read_terms(
        &mut self,
        query: impl Into<TermQuery>,
    ) -> Result<Outcome<Vec<TermInfo>>, ClientError> {
        let parameters = query.into().into_parameters();
        let database = self.state.database(parameters.database.as_deref());
        let outcome = self.run(&ReadTerms::new(database, parameters))?;
        self.state.note(&outcome);
        Ok(outcome)
    }

    pub fn read_postings(
        &mut self,
        parameters: PostingParameters,
    ) -> Result<Outcome<Vec<TermPosting>>, ClientError> {
        let database = self.state.database(parameters.database.as_deref());
        let outcome = self.run(&ReadPostings::new(database, parameters))?;
        self.state.note(&outcome);
        Ok(outcome)
    }

    pub fn get_record_postings(
        &mut self,
        mfn: Mfn,
        prefix: &str,
    ) -> Result<Vec<TermPosting>, ClientError> {
        let op = GetRecordPostings::new(self.state.database(None), mfn, prefix);
        self.run(&op)
    }

    // ===== Files =====

    /// Reads a text document and returns the reply positioned at its
    /// payload.
    pub fn read_text_stream(
        &mut self,
        specification: &FileSpecification,
    ) -> Result<ServerResponse, ClientError> {
        self.run(&ReadTextStream::new(specification.clone()))
    }

    /// Reads a text document with IRBIS delimiters turned into `\n`.
    pub fn read_text_file(
        &mut self,
        specification: &FileSpecification,
    ) -> Result<String, ClientError> {
        let mut response = self.read_text_stream(specification)?;
        document_text(&mut response)
    }

    pub fn read_binary_file(
        &mut self,
        specification: &FileSpecification,
    ) -> Result<Option<Bytes>, ClientError> {
        self.run(&ReadBinaryFile::new(specification.clone()))
    }

    /// Writes documents; each specification must carry content.
    pub fn write_text_file(
        &mut self,
        specifications: &[FileSpecification],
    ) -> Result<(), ClientError> {
        if specifications.is_empty() {
            return Ok(());
        }
        self.run(&WriteTextFile::new(specifications.to_vec()))
    }

    pub fn list_files<S: ToString>(
        &mut self,
        specifications: &[S],
    ) -> Result<Vec<String>, ClientError> {
        if specifications.is_empty() {
            return Ok(Vec::new());
        }
        self.run(&ListFiles::new(specifications))
    }

    // ===== Administration =====

    pub fn list_processes(&mut self) -> Result<Vec<ServerProcess>, ClientError> {
        self.run(&ListProcesses)
    }

    pub fn get_server_stat(&mut self) -> Result<ServerStat, ClientError> {
        self.run(&GetServerStat)
    }

    pub fn get_database_info(
        &mut self,
        database: Option<&str>,
    ) -> Result<DatabaseInfo, ClientError> {
        let op = GetDatabaseInfo::new(self.state.database(database));
        self.run(&op)
    }

    pub fn get_user_list(&mut self) -> Result<Vec<UserInfo>, ClientError> {
        self.run(&GetUserList)
    }

    pub fn set_user_list(&mut self, users: Vec<UserInfo>) -> Result<(), ClientError> {
        self.run(&SetUserList::new(users))
    }

    pub fn restart_server(&mut self) -> Result<(), ClientError> {
        self.run(&RestartServer)
    }

    pub fn reload_dictionary(&mut self, database: Option<&str>) -> Result<(), ClientError> {
        let op = DatabaseCommand::reload_dictionary(self.state.database(database));
        self.run(&op)
    }

    pub fn reload_master_file(&mut self, database: Option<&str>) -> Result<(), ClientError> {
        let op = DatabaseCommand::reload_master_file(self.state.database(database));
        self.run(&op)
    }

    /// Removes every record of the database.
    pub fn truncate_database(&mut self, database: Option<&str>) -> Result<(), ClientError> {
        let op = DatabaseCommand::truncate_database(self.state.database(database));
        self.run(&op)
    }

    pub fn unlock_database(&mut self, database: Option<&str>) -> Result<(), ClientError> {
        let op = DatabaseCommand::unlock_database(self.state.database(database));
        self.run(&op)
    }

    pub fn create_database(
        &mut self,
        database: &str,
        description: &str,
        reader_access: bool,
    ) -> Result<(), ClientError> {
        let op = CreateDatabase::new(database, description).with_reader_access(reader_access);
        self.run(&op)
    }

    pub fn delete_database(&mut self, database: &str) -> Result<(), ClientError> {
        self.run(&DatabaseCommand::delete_database(database))
    }

    pub fn create_dictionary(&mut self, database: Option<&str>) -> Result<(), ClientError> {
        let op = DatabaseCommand::create_dictionary(self.state.database(database));
        self.run(&op)
    }

    pub fn update_ini_file<S: ToString>(&mut self, lines: &[S]) -> Result<(), ClientError> {
        if lines.is_empty() {
            return Ok(());
        }
        self.run(&UpdateIniFile::new(lines))
    }

    pub fn print_table(&mut self, definition: TableDefinition) -> Result<String, ClientError> {
        let database = self.state.database(definition.database.as_deref());
        self.run(&PrintTable::new(database, definition))
    }
}

fn limited<I: Iterator>(items: I, limit: usize) -> Vec<I::Item> {
    if limit == 0 {
        items.collect()
    } else {
        items.take(limit).collect()
    }
}

use super::{check, Operation};
use bytes::Bytes;
use irbis_protocol::info::{DatabaseInfo, ServerProcess, ServerStat, TableDefinition, UserInfo};
use irbis_protocol::{ClientQuery, Command, ProtocolError, ServerResponse};

/// Running server processes (`+3`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ListProcesses;

impl Operation for ListProcesses {
    type Output = Vec<ServerProcess>;

    fn command(&self) -> Command {
        Command::GetProcessList
    }

    fn encode(&self, _query: &mut ClientQuery) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Vec<ServerProcess>, ProtocolError> {
        check(&mut response)?;
        ServerProcess::parse_list(&mut response)
    }
}

/// Registered users (`+9`).
#[derive(Debug, Clone, Copy, Default)]
pub struct GetUserList;

impl Operation for GetUserList {
    type Output = Vec<UserInfo>;

    fn command(&self) -> Command {
        Command::GetUserList
    }

    fn encode(&self, _query: &mut ClientQuery) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Vec<UserInfo>, ProtocolError> {
        check(&mut response)?;
        UserInfo::parse_list(&mut response)
    }
}

/// Replaces the server's user list (`+7`). The reply is not interpreted.
#[derive(Debug, Clone)]
pub struct SetUserList {
    pub users: Vec<UserInfo>,
}

impl SetUserList {
    pub fn new(users: Vec<UserInfo>) -> Self {
        Self { users }
    }
}

impl Operation for SetUserList {
    type Output = ();

    fn command(&self) -> Command {
        Command::SetUserList
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        for user in &self.users {
            query.append_narrow(user.encode().as_str())?;
        }
        Ok(())
    }

    fn decode(&self, _response: ServerResponse) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn parse(&self, _reply: Bytes) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// Server statistics and connected clients (`+1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct GetServerStat;

impl Operation for GetServerStat {
    type Output = ServerStat;

    fn command(&self) -> Command {
        Command::GetServerStat
    }

    fn encode(&self, _query: &mut ClientQuery) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<ServerStat, ProtocolError> {
        check(&mut response)?;
        ServerStat::parse(&mut response)
    }
}

/// Deleted, locked and non-actualized records of a database (`0`).
#[derive(Debug, Clone)]
pub struct GetDatabaseInfo {
    pub database: String,
}

impl GetDatabaseInfo {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }
}

impl Operation for GetDatabaseInfo {
    type Output = DatabaseInfo;

    fn command(&self) -> Command {
        Command::RecordList
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?;
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<DatabaseInfo, ProtocolError> {
        check(&mut response)?;
        DatabaseInfo::parse(&self.database, &mut response)
    }
}

/// Renders a table (`7`).
#[derive(Debug, Clone)]
pub struct PrintTable {
    pub database: String,
    pub definition: TableDefinition,
}

impl PrintTable {
    pub fn new(database: impl Into<String>, definition: TableDefinition) -> Self {
        Self {
            database: database.into(),
            definition,
        }
    }
}

impl Operation for PrintTable {
    type Output = String;

    fn command(&self) -> Command {
        Command::Print
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        let d = &self.definition;
        // Headers and the MFN list are sent empty.
        query
            .append_narrow(self.database.as_str())?
            .append_narrow(d.table.as_str())?
            .append_narrow("")?
            .append_narrow(d.mode.as_str())?
            .append_wide(d.search.as_str())
            .append_int(d.min_mfn)
            .append_int(d.max_mfn)
            .append_wide(d.sequential.as_str())
            .append_narrow("")?;
        Ok(())
    }

    fn decode(&self, response: ServerResponse) -> Result<String, ProtocolError> {
        response.remaining_wide_text()
    }
}

/// Restarts the server (`+8`). The reply is not interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestartServer;

impl Operation for RestartServer {
    type Output = ();

    fn command(&self) -> Command {
        Command::RestartServer
    }

    fn encode(&self, _query: &mut ClientQuery) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn decode(&self, _response: ServerResponse) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn parse(&self, _reply: Bytes) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// A command whose only parameter is the database name.
///
/// Unchecked commands do not interpret the reply at all.
#[derive(Debug, Clone)]
pub struct DatabaseCommand {
    pub command: Command,
    pub database: String,
    pub checked: bool,
}

impl DatabaseCommand {
    fn new(command: Command, database: impl Into<String>, checked: bool) -> Self {
        Self {
            command,
            database: database.into(),
            checked,
        }
    }

    pub fn reload_dictionary(database: impl Into<String>) -> Self {
        Self::new(Command::ReloadDictionary, database, false)
    }

    pub fn reload_master_file(database: impl Into<String>) -> Self {
        Self::new(Command::ReloadMasterFile, database, false)
    }

    pub fn truncate_database(database: impl Into<String>) -> Self {
        Self::new(Command::EmptyDatabase, database, false)
    }

    pub fn unlock_database(database: impl Into<String>) -> Self {
        Self::new(Command::UnlockDatabase, database, false)
    }

    pub fn delete_database(database: impl Into<String>) -> Self {
        Self::new(Command::DeleteDatabase, database, true)
    }

    pub fn create_dictionary(database: impl Into<String>) -> Self {
        Self::new(Command::CreateDictionary, database, true)
    }
}

impl Operation for DatabaseCommand {
    type Output = ();

    fn command(&self) -> Command {
        self.command
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.database.as_str())?;
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<(), ProtocolError> {
        check(&mut response)?;
        Ok(())
    }

    fn parse(&self, reply: Bytes) -> Result<(), ProtocolError> {
        if !self.checked {
            return Ok(());
        }
        self.decode(ServerResponse::parse(reply)?)
    }
}

/// Creates a database (`T`).
#[derive(Debug, Clone)]
pub struct CreateDatabase {
    pub database: String,
    pub description: String,
    pub reader_access: bool,
}

impl CreateDatabase {
    pub fn new(database: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            description: description.into(),
            reader_access: true,
        }
    }

    pub fn with_reader_access(mut self, reader_access: bool) -> Self {
        self.reader_access = reader_access;
        self
    }
}

impl Operation for CreateDatabase {
    type Output = ();

    fn command(&self) -> Command {
        Command::CreateDatabase
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query
            .append_narrow(self.database.as_str())?
            .append_narrow(self.description.as_str())?
            .append_flag(self.reader_access);
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<(), ProtocolError> {
        check(&mut response)?;
        Ok(())
    }
}

/// Replaces lines of the server INI file (`8`). The reply is not
/// interpreted.
#[derive(Debug, Clone)]
pub struct UpdateIniFile {
    pub lines: Vec<String>,
}

impl UpdateIniFile {
    pub fn new<S: ToString>(lines: &[S]) -> Self {
        Self {
            lines: lines.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Operation for UpdateIniFile {
    type Output = ();

    fn command(&self) -> Command {
        Command::UpdateIniFile
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        for line in &self.lines {
            query.append_narrow(line.as_str())?;
        }
        Ok(())
    }

    fn decode(&self, _response: ServerResponse) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn parse(&self, _reply: Bytes) -> Result<(), ProtocolError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::params;
    use crate::transport::scripted::reply;

    #[test]
    fn test_list_processes() {
        let data = reply(
            "+3",
            &[
                "0", "1", "10", "1", "127.0.0.1", "librarian", "123456", "C", "10:00", "K",
                "15", "4312", "idle",
            ],
        );
        let processes = ListProcesses.parse(data).unwrap();
        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].name, "librarian");
        assert_eq!(processes[0].state, "idle");
    }

    #[test]
    fn test_get_user_list() {
        let data = reply(
            "+9",
            &[
                "0", "1", "9", "1", "librarian", "secret", "irbisc.ini", "", "", "", "", "",
            ],
        );
        let users = GetUserList.parse(data).unwrap();
        assert_eq!(users[0].name, "librarian");
        assert_eq!(users[0].cataloger, "irbisc.ini");
    }

    #[test]
    fn test_set_user_list() {
        let mut user = UserInfo::new("reader", "pw");
        user.cataloger = "irbisc.ini".into();
        user.reader = "my.ini".into();
        let op = SetUserList::new(vec![user]);
        let lines = params(&op);
        assert_eq!(lines[0], "reader");
        assert_eq!(lines[1], "pw");
        assert!(lines[2].contains("R=my.ini;"));
        assert!(!lines[2].contains("C=irbisc.ini"));
        assert!(op.parse(Bytes::new()).is_ok());
    }

    #[test]
    fn test_server_stat() {
        let data = reply("+1", &["0", "1024", "0", "10"]);
        let stat = GetServerStat.parse(data).unwrap();
        assert_eq!(stat.total_command_count, 1024);
        assert!(stat.running_clients.is_empty());
    }

    #[test]
    fn test_database_info() {
        let op = GetDatabaseInfo::new("IBIS");
        assert_eq!(params(&op), vec!["IBIS"]);
        let data = reply("0", &["0", "3\x1E5", "", "7", "", "318", "0"]);
        let info = op.parse(data).unwrap();
        assert_eq!(info.name, "IBIS");
        assert_eq!(info.logically_deleted, vec![3, 5]);
        assert_eq!(info.nonactualized, vec![7]);
        assert_eq!(info.max_mfn, 318);
        assert!(!info.database_locked);
    }

    #[test]
    fn test_print_table() {
        let mut definition = TableDefinition::new("@tab1.tab");
        definition.search = "T=A$".into();
        definition.mode = "0".into();
        let op = PrintTable::new("IBIS", definition);
        assert_eq!(
            params(&op),
            vec!["IBIS", "@tab1.tab", "", "0", "T=A$", "0", "0", "", ""]
        );
        assert_eq!(op.parse(reply("7", &["<table/>"])).unwrap(), "<table/>\r\n");
    }

    #[test]
    fn test_database_commands() {
        let op = DatabaseCommand::reload_dictionary("IBIS");
        assert_eq!(op.command(), Command::ReloadDictionary);
        assert_eq!(params(&op), vec!["IBIS"]);
        assert!(op.parse(Bytes::new()).is_ok());

        let op = DatabaseCommand::delete_database("TMP");
        assert_eq!(op.command(), Command::DeleteDatabase);
        assert_eq!(op.parse(reply("W", &["-2"])).unwrap_err().server_code(), Some(-2));
        assert!(op.parse(reply("W", &["0"])).is_ok());
    }

    #[test]
    fn test_create_database() {
        let op = CreateDatabase::new("TMP", "Temporary").with_reader_access(false);
        assert_eq!(params(&op), vec!["TMP", "Temporary", "0"]);
    }

    #[test]
    fn test_update_ini_file() {
        let op = UpdateIniFile::new(&["[MAIN]", "STTFNT=8"]);
        assert_eq!(params(&op), vec!["[MAIN]", "STTFNT=8"]);
    }
}

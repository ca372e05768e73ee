use super::{check, Operation};
use crate::outcome::Outcome;
use irbis_protocol::info::ServerVersion;
use irbis_protocol::text::irbis_to_lines;
use irbis_protocol::{ClientQuery, Command, IniFile, ProtocolError, ServerResponse};

/// Return code of a registration attempt with a client id already in use.
pub const ALREADY_REGISTERED: i32 = -3337;

/// Client registration (`A`).
#[derive(Debug, Clone)]
pub struct Register {
    pub username: String,
    pub password: String,
}

/// Reply to a successful registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Server version from the reply preamble.
    pub version: String,
    /// Client INI file assigned to the user.
    pub ini: IniFile,
}

impl Register {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Operation for Register {
    type Output = Outcome<Registration>;

    fn command(&self) -> Command {
        Command::RegisterClient
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query
            .append_narrow(self.username.as_str())?
            .append_narrow(self.password.as_str())?;
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Self::Output, ProtocolError> {
        let code = response.read_return_code(&[ALREADY_REGISTERED])?;
        let version = response.header().version.clone();
        if code < 0 {
            return Ok(Outcome::Ignored {
                code,
                value: Registration {
                    version,
                    ini: IniFile::default(),
                },
            });
        }

        // The INI text ends at the first IRBIS delimiter; its first line is
        // not part of the file.
        let text = response.remaining_narrow_text()?;
        let head = irbis_to_lines(&text).into_iter().next().unwrap_or_default();
        let lines: Vec<&str> = head.lines().skip(1).collect();
        Ok(Outcome::Ok(Registration {
            version,
            ini: IniFile::parse(&lines),
        }))
    }
}

/// Client unregistration (`B`). The reply is not interpreted.
#[derive(Debug, Clone)]
pub struct Unregister {
    pub username: String,
}

impl Unregister {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

impl Operation for Unregister {
    type Output = ();

    fn command(&self) -> Command {
        Command::UnregisterClient
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.username.as_str())?;
        Ok(())
    }

    fn decode(&self, _response: ServerResponse) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn parse(&self, _reply: bytes::Bytes) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// Empty request (`N`), keeps the registration alive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nop;

impl Operation for Nop {
    type Output = ();

    fn command(&self) -> Command {
        Command::Nop
    }

    fn encode(&self, _query: &mut ClientQuery) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn decode(&self, _response: ServerResponse) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn parse(&self, _reply: bytes::Bytes) -> Result<(), ProtocolError> {
        Ok(())
    }
}

/// Server version and client counters (`1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct GetServerVersion;

impl Operation for GetServerVersion {
    type Output = ServerVersion;

    fn command(&self) -> Command {
        Command::ServerInfo
    }

    fn encode(&self, _query: &mut ClientQuery) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<ServerVersion, ProtocolError> {
        check(&mut response)?;
        let lines = response.remaining_narrow_lines()?;
        ServerVersion::parse(&lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::testing::params;
    use crate::transport::scripted::reply;

    #[test]
    fn test_register_request() {
        let op = Register::new("librarian", "secret");
        assert_eq!(params(&op), vec!["librarian", "secret"]);
    }

    #[test]
    fn test_register_parses_ini() {
        let op = Register::new("u", "p");
        let data = reply(
            "A",
            &["0", "245", "[Main]", "User=librarian", "[Private]", "Name=X\x1F\x1Etail"],
        );
        let outcome = op.parse(data).unwrap();
        let registration = outcome.ok().unwrap();
        assert_eq!(registration.version, "64.2018.1");
        assert_eq!(registration.ini.get("main", "user"), Some("librarian"));
        assert_eq!(registration.ini.get("Private", "Name"), Some("X"));
        assert!(registration.ini.section(Some("tail")).is_none());
    }

    #[test]
    fn test_register_already_registered() {
        let outcome = Register::new("u", "p").parse(reply("A", &["-3337"])).unwrap();
        assert_eq!(outcome.code(), Some(ALREADY_REGISTERED));
    }

    #[test]
    fn test_register_other_error_is_fatal() {
        let err = Register::new("u", "p").parse(reply("A", &["-3333"])).unwrap_err();
        assert_eq!(err.server_code(), Some(-3333));
    }

    #[test]
    fn test_unregister_ignores_reply() {
        let op = Unregister::new("librarian");
        assert_eq!(params(&op), vec!["librarian"]);
        assert!(op.parse(bytes::Bytes::new()).is_ok());
    }

    #[test]
    fn test_server_version() {
        let version = GetServerVersion
            .parse(reply("1", &["0", "Library", "64.2018.1", "3", "100"]))
            .unwrap();
        assert_eq!(version.organization, "Library");
        assert_eq!(version.max_clients, 100);
        assert!(params(&GetServerVersion).is_empty());
    }
}

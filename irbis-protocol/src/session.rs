//! Session identity carried in every request preamble.

use crate::command::Workstation;
use crate::{DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PORT};

/// Connection parameters and the logical identifiers of a registered client.
///
/// `client_id` is assigned at registration and stays stable until
/// disconnect; `query_id` increases by exactly one per request built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub workstation: Workstation,
    pub client_id: u32,
    pub query_id: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            database: DEFAULT_DATABASE.to_string(),
            workstation: Workstation::default(),
            client_id: 0,
            query_id: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a session from a connection string on top of the defaults.
    pub fn from_connection_string(text: &str) -> Self {
        let mut session = Self::default();
        session.apply_connection_string(text);
        session
    }

    /// Applies `key=value;` pairs to the session.
    ///
    /// Keys are case-insensitive and accept the usual synonyms. Unknown
    /// keys, entries without `=` and ports that do not parse are ignored.
    pub fn apply_connection_string(&mut self, text: &str) {
        for item in text.split(';') {
            let Some((name, value)) = item.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match name.trim().to_ascii_lowercase().as_str() {
                "host" | "server" | "address" => self.host = value.to_string(),
                "port" => {
                    if let Ok(port) = value.parse::<u16>() {
                        if port > 0 {
                            self.port = port;
                        }
                    }
                }
                "user" | "username" | "name" | "login" => self.username = value.to_string(),
                "pwd" | "password" => self.password = value.to_string(),
                "db" | "database" | "catalog" => self.database = value.to_string(),
                "arm" | "workstation" => {
                    if let Some(workstation) = Workstation::parse(value) {
                        self.workstation = workstation;
                    }
                }
                _ => {}
            }
        }
    }

    /// Renders the session as a connection string.
    pub fn to_connection_string(&self) -> String {
        format!(
            "host={};port={};username={};password={};database={};workstation={};",
            self.host, self.port, self.username, self.password, self.database, self.workstation
        )
    }
}

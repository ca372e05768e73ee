//! Server, database and user information payloads.

use crate::error::ProtocolError;
use crate::response::ServerResponse;
use crate::text::SHORT_DELIMITER;
use crate::Mfn;
use serde::Serialize;

/// Reply to `SERVER_INFO`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerVersion {
    pub organization: String,
    pub version: String,
    pub connected_clients: u32,
    pub max_clients: u32,
}

impl ServerVersion {
    /// Parses the 3-line (`version`, `connected`, `max`) or 4-line
    /// (`organization` first) form.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, ProtocolError> {
        let number = |s: &S| {
            s.as_ref()
                .trim()
                .parse::<u32>()
                .map_err(|_| ProtocolError::InvalidInteger(s.as_ref().to_string()))
        };
        match lines {
            [version, connected, max] => Ok(Self {
                organization: String::new(),
                version: version.as_ref().to_string(),
                connected_clients: number(connected)?,
                max_clients: number(max)?,
            }),
            [organization, version, connected, max, ..] => Ok(Self {
                organization: organization.as_ref().to_string(),
                version: version.as_ref().to_string(),
                connected_clients: number(connected)?,
                max_clients: number(max)?,
            }),
            _ => Err(ProtocolError::Malformed {
                what: "server version",
                line: lines
                    .iter()
                    .map(|l| l.as_ref())
                    .collect::<Vec<_>>()
                    .join("|"),
            }),
        }
    }
}

/// Reads `count`, `lines_per_item`, then `count` blocks of
/// `lines_per_item` narrow lines.
fn read_blocks(
    response: &mut ServerResponse,
    count: i32,
    lines_per_item: i32,
) -> Result<Vec<Vec<String>>, ProtocolError> {
    if count <= 0 || lines_per_item <= 0 {
        return Ok(Vec::new());
    }
    let mut blocks = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut block = Vec::with_capacity(lines_per_item as usize);
        for _ in 0..lines_per_item {
            block.push(response.read_narrow_line()?);
        }
        blocks.push(block);
    }
    Ok(blocks)
}

fn take(block: &mut [String], index: usize) -> String {
    block.get_mut(index).map(std::mem::take).unwrap_or_default()
}

/// A process running on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerProcess {
    pub number: String,
    pub ip_address: String,
    pub name: String,
    pub client_id: String,
    pub workstation: String,
    pub started: String,
    pub last_command: String,
    pub command_number: String,
    pub process_id: String,
    pub state: String,
}

impl ServerProcess {
    /// Parses a `GET_PROCESS_LIST` reply body.
    pub fn parse_list(response: &mut ServerResponse) -> Result<Vec<Self>, ProtocolError> {
        let count = response.read_int()?;
        let lines_per_process = response.read_int()?;
        let blocks = read_blocks(response, count, lines_per_process)?;
        Ok(blocks
            .into_iter()
            .map(|mut b| ServerProcess {
                number: take(&mut b, 0),
                ip_address: take(&mut b, 1),
                name: take(&mut b, 2),
                client_id: take(&mut b, 3),
                workstation: take(&mut b, 4),
                started: take(&mut b, 5),
                last_command: take(&mut b, 6),
                command_number: take(&mut b, 7),
                process_id: take(&mut b, 8),
                state: take(&mut b, 9),
            })
            .collect())
    }
}

/// A registered user and the INI file assigned per workstation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub number: String,
    pub name: String,
    pub password: String,
    pub cataloger: String,
    pub reader: String,
    pub circulation: String,
    pub acquisitions: String,
    pub provision: String,
    pub administrator: String,
}

impl UserInfo {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Parses a `GET_USER_LIST` reply body.
    pub fn parse_list(response: &mut ServerResponse) -> Result<Vec<Self>, ProtocolError> {
        let count = response.read_int()?;
        let lines_per_user = response.read_int()?;
        let blocks = read_blocks(response, count, lines_per_user)?;
        Ok(blocks
            .into_iter()
            .map(|mut b| UserInfo {
                number: take(&mut b, 0),
                name: take(&mut b, 1),
                password: take(&mut b, 2),
                cataloger: take(&mut b, 3),
                reader: take(&mut b, 4),
                circulation: take(&mut b, 5),
                acquisitions: take(&mut b, 6),
                provision: take(&mut b, 7),
                administrator: take(&mut b, 8),
            })
            .collect())
    }

    /// Encodes the user for `SET_USER_LIST`:
    /// `name\npassword\nC=...;R=...;`. Workstations using the default
    /// `irbisX.ini` are omitted.
    pub fn encode(&self) -> String {
        let pairs = [
            ('C', &self.cataloger, "irbisc.ini"),
            ('R', &self.reader, "irbisr.ini"),
            ('B', &self.circulation, "irbisb.ini"),
            ('M', &self.acquisitions, "irbism.ini"),
            ('K', &self.provision, "irbisk.ini"),
            ('A', &self.administrator, "irbisa.ini"),
        ];
        let mut out = format!("{}\n{}\n", self.name, self.password);
        for (prefix, value, default) in pairs {
            if !value.eq_ignore_ascii_case(default) {
                out.push_str(&format!("{prefix}={value};"));
            }
        }
        out
    }
}

/// A client connected to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub number: String,
    pub ip_address: String,
    pub port: String,
    pub name: String,
    pub client_id: String,
    pub workstation: String,
    pub registered: String,
    pub acknowledged: String,
    pub last_command: String,
    pub command_number: String,
}

/// Reply to `GET_SERVER_STAT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerStat {
    pub total_command_count: i32,
    pub client_count: i32,
    pub running_clients: Vec<ClientInfo>,
}

impl ServerStat {
    pub fn parse(response: &mut ServerResponse) -> Result<Self, ProtocolError> {
        let total_command_count = response.read_int()?;
        let client_count = response.read_int()?;
        let lines_per_client = response.read_int()?;
        let blocks = read_blocks(response, client_count, lines_per_client)?;
        let running_clients = blocks
            .into_iter()
            .map(|mut b| ClientInfo {
                number: take(&mut b, 0),
                ip_address: take(&mut b, 1),
                port: take(&mut b, 2),
                name: take(&mut b, 3),
                client_id: take(&mut b, 4),
                workstation: take(&mut b, 5),
                registered: take(&mut b, 6),
                acknowledged: take(&mut b, 7),
                last_command: take(&mut b, 8),
                command_number: take(&mut b, 9),
            })
            .collect();
        Ok(Self {
            total_command_count,
            client_count,
            running_clients,
        })
    }
}

/// Reply to `RECORD_LIST`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub max_mfn: i32,
    pub logically_deleted: Vec<Mfn>,
    pub physically_deleted: Vec<Mfn>,
    pub nonactualized: Vec<Mfn>,
    pub locked_records: Vec<Mfn>,
    pub database_locked: bool,
}

impl DatabaseInfo {
    pub fn parse(name: &str, response: &mut ServerResponse) -> Result<Self, ProtocolError> {
        let logically_deleted = parse_mfn_list(&response.read_narrow_line()?)?;
        let physically_deleted = parse_mfn_list(&response.read_narrow_line()?)?;
        let nonactualized = parse_mfn_list(&response.read_narrow_line()?)?;
        let locked_records = parse_mfn_list(&response.read_narrow_line()?)?;
        let max_mfn = response.read_int()?;
        let database_locked = response.read_int()? != 0;
        Ok(Self {
            name: name.to_string(),
            max_mfn,
            logically_deleted,
            physically_deleted,
            nonactualized,
            locked_records,
            database_locked,
        })
    }
}

fn parse_mfn_list(line: &str) -> Result<Vec<Mfn>, ProtocolError> {
    line.split(SHORT_DELIMITER)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|_| ProtocolError::InvalidInteger(s.to_string()))
        })
        .collect()
}

/// Input of a `PRINT` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDefinition {
    pub database: Option<String>,
    pub table: String,
    pub mode: String,
    pub search: String,
    pub min_mfn: Mfn,
    pub max_mfn: Mfn,
    pub sequential: String,
}

impl TableDefinition {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }
}

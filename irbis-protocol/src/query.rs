//! Request encoder.
//!
//! Wire layout:
//!
//! ```text
//! <body length>\n
//! <command>\n<workstation>\n<command>\n<client id>\n<query id>\n
//! <password>\n<username>\n\n\n\n
//! <command-specific lines, each \n-terminated>
//! ```
//!
//! The length prefix counts body bytes only.

use crate::command::Command;
use crate::error::ProtocolError;
use crate::session::Session;
use crate::text::{prepare_format, TextEncoding};
use bytes::{BufMut, Bytes, BytesMut};

/// An outgoing request under construction.
#[derive(Debug, Clone)]
pub struct ClientQuery {
    command: Command,
    body: BytesMut,
}

impl ClientQuery {
    /// Starts a request and writes the mandatory preamble.
    ///
    /// Increments `session.query_id` exactly once, and only when the
    /// preamble encodes.
    pub fn new(session: &mut Session, command: Command) -> Result<Self, ProtocolError> {
        let mut query = Self {
            command,
            body: BytesMut::with_capacity(256),
        };
        query.append_narrow(command.code())?;
        query.append_narrow(session.workstation.code().to_string().as_str())?;
        query.append_narrow(command.code())?;
        query.append_int(session.client_id);
        query.append_int(session.query_id);
        query.append_narrow(session.password.as_str())?;
        query.append_narrow(session.username.as_str())?;
        query.new_line();
        query.new_line();
        query.new_line();

        session.query_id = session.query_id.wrapping_add(1);
        Ok(query)
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Appends one line in the given encoding; `None` appends an empty line.
    pub fn append_encoded<'a>(
        &mut self,
        text: impl Into<Option<&'a str>>,
        encoding: TextEncoding,
    ) -> Result<&mut Self, ProtocolError> {
        if let Some(text) = text.into() {
            encoding.encode_into(text, &mut self.body)?;
        }
        Ok(self.new_line())
    }

    /// Appends one Windows-1251 line.
    pub fn append_narrow<'a>(
        &mut self,
        text: impl Into<Option<&'a str>>,
    ) -> Result<&mut Self, ProtocolError> {
        self.append_encoded(text, TextEncoding::Ansi)
    }

    /// Appends one UTF-8 line.
    pub fn append_wide<'a>(&mut self, text: impl Into<Option<&'a str>>) -> &mut Self {
        if let Some(text) = text.into() {
            self.body.put_slice(text.as_bytes());
        }
        self.new_line()
    }

    /// Appends the decimal form of an integer.
    pub fn append_int(&mut self, value: impl Into<i64>) -> &mut Self {
        self.body.put_slice(value.into().to_string().as_bytes());
        self.new_line()
    }

    /// Appends a boolean flag as `1` or `0`.
    pub fn append_flag(&mut self, value: bool) -> &mut Self {
        self.append_int(i64::from(value))
    }

    /// Appends a format script.
    ///
    /// The script is stripped of comments and control characters. A script
    /// starting with `@` is sent in Windows-1251, one starting with `!` in
    /// UTF-8, anything else in UTF-8 behind a `!` prefix. `None` or an empty
    /// script appends an empty line and returns `false`.
    pub fn append_format(&mut self, format: Option<&str>) -> Result<bool, ProtocolError> {
        let Some(format) = format.filter(|f| !f.is_empty()) else {
            self.new_line();
            return Ok(false);
        };

        let prepared = prepare_format(format);
        if format.starts_with('@') {
            self.append_narrow(prepared.as_str())?;
        } else if format.starts_with('!') {
            self.append_wide(prepared.as_str());
        } else {
            self.body.put_u8(b'!');
            self.append_wide(prepared.as_str());
        }
        Ok(true)
    }

    /// Terminates the current line.
    pub fn new_line(&mut self) -> &mut Self {
        self.body.put_u8(b'\n');
        self
    }

    /// Body length in bytes, excluding the length prefix.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Produces the wire form: decimal body length, `\n`, body.
    pub fn finalize(&self) -> Bytes {
        let prefix = format!("{}\n", self.body.len());
        let mut out = BytesMut::with_capacity(prefix.len() + self.body.len());
        out.put_slice(prefix.as_bytes());
        out.put_slice(&self.body);
        out.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Workstation;
    use crate::response::ServerResponse;
    use proptest::prelude::*;

    fn session() -> Session {
        Session::from_connection_string("host=127.0.0.1;port=6666;database=IBIS;user=1;password=1;")
    }

    fn split(packet: &[u8]) -> (usize, &[u8]) {
        let newline = packet.iter().position(|&b| b == b'\n').unwrap();
        let declared: usize = std::str::from_utf8(&packet[..newline])
            .unwrap()
            .parse()
            .unwrap();
        (declared, &packet[newline + 1..])
    }

    fn body_lines(packet: &[u8]) -> Vec<Vec<u8>> {
        let (_, body) = split(packet);
        let mut lines: Vec<Vec<u8>> = body.split(|&b| b == b'\n').map(|l| l.to_vec()).collect();
        // Trailing terminator produces one empty tail.
        assert_eq!(lines.pop(), Some(Vec::new()));
        lines
    }

    #[test]
    fn test_preamble_for_registration() {
        let mut session = session();
        let mut query = ClientQuery::new(&mut session, Command::RegisterClient).unwrap();
        query.append_narrow("1").unwrap().append_narrow("1").unwrap();
        let packet = query.finalize();

        let lines = body_lines(&packet);
        assert_eq!(lines[0], b"A");
        assert_eq!(lines[1], b"C");
        assert_eq!(lines[2], b"A");
        assert_eq!(lines[3], b"0");
        assert_eq!(lines[4], b"0");
        assert_eq!(lines[5], b"1");
        assert_eq!(lines[6], b"1");
        assert!(lines[7].is_empty() && lines[8].is_empty() && lines[9].is_empty());
        assert_eq!(lines[10], b"1");
        assert_eq!(lines[11], b"1");
        assert_eq!(lines.len(), 12);
        assert_eq!(session.query_id, 1);
    }

    #[test]
    fn test_query_id_increments_once_per_request() {
        let mut session = session();
        session.client_id = 123456;
        session.query_id = 41;
        let mut query = ClientQuery::new(&mut session, Command::Search).unwrap();
        for _ in 0..10 {
            query.append_int(1);
        }
        assert_eq!(session.query_id, 42);

        let lines = body_lines(&query.finalize());
        assert_eq!(lines[3], b"123456");
        assert_eq!(lines[4], b"41");
    }

    #[test]
    fn test_no_carriage_returns_in_request() {
        let mut session = session();
        let mut query = ClientQuery::new(&mut session, Command::Nop).unwrap();
        query.append_wide("text");
        assert!(!query.finalize().contains(&b'\r'));
    }

    #[test]
    fn test_workstation_in_preamble() {
        let mut session = session();
        session.workstation = Workstation::Administrator;
        let query = ClientQuery::new(&mut session, Command::GetProcessList).unwrap();
        let lines = body_lines(&query.finalize());
        assert_eq!(lines[0], b"+3");
        assert_eq!(lines[1], b"A");
        assert_eq!(lines[2], b"+3");
    }

    #[test]
    fn test_none_appends_empty_line() {
        let mut session = session();
        let mut query = ClientQuery::new(&mut session, Command::Search).unwrap();
        let before = query.body_len();
        query.append_narrow(None).unwrap();
        query.append_wide(None);
        assert_eq!(query.body_len(), before + 2);
    }

    #[test]
    fn test_narrow_and_wide_cyrillic() {
        let mut session = session();
        let mut query = ClientQuery::new(&mut session, Command::Search).unwrap();
        query.append_narrow("Жук").unwrap();
        query.append_wide("Жук");
        let lines = body_lines(&query.finalize());
        let n = lines.len();
        assert_eq!(lines[n - 2], vec![0xC6, 0xF3, 0xEA]);
        assert_eq!(lines[n - 1], "Жук".as_bytes());
    }

    #[test]
    fn test_narrow_unrepresentable_fails() {
        let mut session = session();
        let mut query = ClientQuery::new(&mut session, Command::Search).unwrap();
        assert!(query.append_narrow("\u{1F600}").is_err());
    }

    #[test]
    fn test_unrepresentable_credentials_fail() {
        let mut session = session();
        session.password = "\u{4e2d}".into();
        session.query_id = 5;
        assert!(ClientQuery::new(&mut session, Command::Nop).is_err());
        assert_eq!(session.query_id, 5);

        session.password = "1".into();
        let lines = body_lines(&ClientQuery::new(&mut session, Command::Nop).unwrap().finalize());
        assert_eq!(lines[4], b"5");
        assert_eq!(session.query_id, 6);
    }

    #[test]
    fn test_append_format_prefixes() {
        let mut session = session();

        let mut query = ClientQuery::new(&mut session, Command::FormatRecord).unwrap();
        assert!(query.append_format(Some("@brief")).unwrap());
        assert_eq!(body_lines(&query.finalize()).last().unwrap(), b"@brief");

        let mut query = ClientQuery::new(&mut session, Command::FormatRecord).unwrap();
        assert!(query.append_format(Some("!v200")).unwrap());
        assert_eq!(body_lines(&query.finalize()).last().unwrap(), b"!v200");

        let mut query = ClientQuery::new(&mut session, Command::FormatRecord).unwrap();
        assert!(query.append_format(Some("v200^a/* comment\r\nv300")).unwrap());
        assert_eq!(body_lines(&query.finalize()).last().unwrap(), b"!v200^av300");
    }

    #[test]
    fn test_append_format_none() {
        let mut session = session();
        let mut query = ClientQuery::new(&mut session, Command::FormatRecord).unwrap();
        let before = query.body_len();
        assert!(!query.append_format(None).unwrap());
        assert!(!query.append_format(Some("")).unwrap());
        assert_eq!(query.body_len(), before + 2);
    }

    #[test]
    fn test_trailing_preamble_blank_lines() {
        let mut session = session();
        let query = ClientQuery::new(&mut session, Command::Nop).unwrap();
        assert!(query.finalize().ends_with(b"\n\n\n\n"));
    }

    proptest! {
        #[test]
        fn prop_declared_length_matches_body(
            lines in proptest::collection::vec("[a-zA-Zа-яА-Я0-9 #^]{0,40}", 0..20),
            wide in any::<bool>(),
        ) {
            let mut session = session();
            let mut query = ClientQuery::new(&mut session, Command::Search).unwrap();
            for line in &lines {
                if wide {
                    query.append_wide(line.as_str());
                } else {
                    query.append_narrow(line.as_str()).unwrap();
                }
            }
            let packet = query.finalize();
            let (declared, body) = split(&packet);
            prop_assert_eq!(declared, body.len());
            prop_assert_eq!(declared, query.body_len());
            prop_assert_eq!(session.query_id, 1);
        }

        #[test]
        fn prop_lines_read_back_through_response(
            lines in proptest::collection::vec(("[a-zA-Zа-яА-ЯёЁ0-9 .,]{0,30}", any::<bool>()), 0..20),
        ) {
            let mut session = session();
            let mut query = ClientQuery::new(&mut session, Command::Search).unwrap();
            for (line, wide) in &lines {
                if *wide {
                    query.append_wide(line.as_str());
                } else {
                    query.append_narrow(line.as_str()).unwrap();
                }
            }
            let packet = query.finalize();
            let (_, body) = split(&packet);

            let mut framed = Vec::with_capacity(body.len() * 2);
            for &byte in body {
                if byte == b'\n' {
                    framed.extend_from_slice(b"\r\n");
                } else {
                    framed.push(byte);
                }
            }
            let mut response = ServerResponse::new(framed);
            for _ in 0..10 {
                response.read_line();
            }
            for (line, wide) in &lines {
                let read = if *wide {
                    response.read_wide_line().unwrap()
                } else {
                    response.read_narrow_line().unwrap()
                };
                prop_assert_eq!(&read, line);
            }
            prop_assert!(response.is_eof());
        }
    }
}

//! # irbis-client
//!
//! Client library for IRBIS64.
//!
//! This crate provides:
//! - Blocking and async connections sharing one protocol state machine
//! - Operation values for every supported server command
//! - Transports over `std::net` and tokio sockets
//! - YAML and environment based configuration
//!
//! ```no_run
//! use irbis_client::Connection;
//!
//! # fn main() -> Result<(), irbis_client::ClientError> {
//! let mut conn = Connection::from_connection_string(
//!     "host=127.0.0.1;port=6666;database=IBIS;user=librarian;password=secret;",
//! );
//! conn.connect()?;
//! let found = conn.search("K=ALGEBRA$")?;
//! println!("{} records", found.len());
//! conn.disconnect()?;
//! # Ok(())
//! # }
//! ```

pub mod async_connection;
pub mod config;
pub mod connection;
pub mod error;
pub mod files;
pub mod operations;
pub mod outcome;
pub mod transport;

pub use async_connection::AsyncConnection;
pub use config::{ClientConfig, ConfigError};
pub use connection::{Connection, ConnectionConfig, ConnectionState};
pub use error::{ClientError, ErrorKind};
pub use files::{
    read_alphabet_table, read_ini_file, read_menu_file, read_opt_file, read_par_file,
    read_search_scenario, read_tree_file, read_uppercase_table, require_alphabet_table,
    require_menu_file, require_opt_file, require_par_file, require_text_file,
};
pub use operations::Operation;
pub use outcome::Outcome;
pub use transport::{AsyncTransport, TcpTransport, TokioTransport, Transport};

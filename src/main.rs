//! irbis-ping - IRBIS64 health probe
//!
//! Registers with the server, reports the maximum MFN of the configured
//! database and the server version, then unregisters.

use irbis_client::{ClientConfig, Connection};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (file from IRBIS_CONFIG, env overrides, then a
    // connection string from IRBIS_CONNECTION_STRING or the first argument)
    let mut config = match ClientConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    if let Some(text) = std::env::args().nth(1) {
        config.apply_connection_string(&text);
    }

    let session = config.to_session();
    tracing::info!(
        "Pinging {}:{} (database {}, user {})",
        session.host,
        session.port,
        session.database,
        session.username
    );

    let mut conn = Connection::with_config(session, config.connection_config());
    conn.connect()?;

    let result = probe(&mut conn);
    if let Err(e) = conn.disconnect() {
        tracing::warn!("Disconnect failed: {}", e);
    }
    let (max_mfn, version) = result?;

    println!("database: {}", conn.database());
    println!("max_mfn: {}", max_mfn);
    println!(
        "server: {} ({} of {} clients)",
        version.version, version.connected_clients, version.max_clients
    );
    Ok(())
}

fn probe(
    conn: &mut Connection,
) -> Result<(i32, irbis_protocol::info::ServerVersion), irbis_client::ClientError> {
    let max_mfn = conn.get_max_mfn(None)?;
    let version = conn.get_server_version()?;
    Ok((max_mfn, version))
}

//! Command execution.

use crate::Commands;
use colored::Colorize;
use irbis_client::{AsyncConnection, Outcome};
use irbis_protocol::{FileSpecification, SearchParameters, TermParameters};
use serde::Serialize;
use serde_json::json;

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// Executes a command and returns the formatted output.
pub async fn execute(conn: &mut AsyncConnection, cmd: Commands, json: bool) -> CommandResult {
    match cmd {
        Commands::Repl => Ok("Already in the REPL".yellow().to_string()),

        Commands::Ping => {
            conn.nop().await?;
            Ok("PONG".green().to_string())
        }

        Commands::Version => {
            let version = conn.get_server_version().await?;
            if json {
                return format_json(&version);
            }
            let mut output = format!("{} {}", "IRBIS64".bold(), version.version.cyan());
            if !version.organization.is_empty() {
                output.push_str(&format!("\n  Organization: {}", version.organization));
            }
            output.push_str(&format!(
                "\n  Clients: {} of {}",
                version.connected_clients, version.max_clients
            ));
            Ok(output)
        }

        Commands::MaxMfn { database } => {
            let max_mfn = conn.get_max_mfn(database.as_deref()).await?;
            let database = database.unwrap_or_else(|| conn.database().to_string());
            if json {
                return format_json(&json!({ "database": database, "max_mfn": max_mfn }));
            }
            Ok(format!("{}: {}", database.cyan(), max_mfn))
        }

        Commands::Search {
            expression,
            format,
            limit,
        } => match format {
            Some(format) => {
                let parameters = SearchParameters::new(expression).with_format(format);
                let mut found = conn.search_ex(parameters).await?;
                truncate(&mut found, limit);
                if json {
                    return format_json(&found);
                }
                if found.is_empty() {
                    return Ok("Nothing found".yellow().to_string());
                }
                let mut output = String::new();
                for line in &found {
                    output.push_str(&format!(
                        "[{:>6}] {}\n",
                        line.mfn.to_string().cyan(),
                        line.description.as_deref().unwrap_or("")
                    ));
                }
                Ok(output)
            }
            None => {
                let mut mfns = conn.search(expression.as_str()).await?;
                truncate(&mut mfns, limit);
                if json {
                    return format_json(&mfns);
                }
                if mfns.is_empty() {
                    return Ok("Nothing found".yellow().to_string());
                }
                Ok(mfns
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "))
            }
        },

        Commands::Count { expression } => {
            let count = conn.search_count(&expression).await?;
            if json {
                return format_json(&json!({ "expression": expression, "count": count }));
            }
            Ok(count.to_string())
        }

        Commands::Read { mfn } => {
            let outcome = conn.read_record(mfn).await?;
            if json {
                return format_json(&json!({
                    "code": outcome.code().unwrap_or(0),
                    "record": outcome.value(),
                }));
            }
            let mut output = String::new();
            if let Outcome::Ignored { code, .. } = &outcome {
                output.push_str(&format!(
                    "{}: {} ({})\n",
                    "Warning".yellow(),
                    code,
                    outcome.message()
                ));
            }
            output.push_str(&outcome.value().to_string());
            Ok(output)
        }

        Commands::Format { mfn, script } => {
            let text = conn.format_record(&script, mfn).await?;
            if json {
                return format_json(&json!({ "mfn": mfn, "text": text }));
            }
            Ok(text)
        }

        Commands::Terms {
            start,
            count,
            reverse,
        } => {
            let mut parameters = TermParameters::new(start).with_number(count);
            if reverse {
                parameters = parameters.with_reverse();
            }
            let terms = conn.read_terms(parameters).await?.into_value();
            if json {
                return format_json(&terms);
            }
            if terms.is_empty() {
                return Ok("No terms".yellow().to_string());
            }
            let mut output = String::new();
            for term in &terms {
                output.push_str(&format!("{:>8}  {}\n", term.count, term.text.cyan()));
            }
            Ok(output)
        }

        Commands::Processes => {
            let processes = conn.list_processes().await?;
            if json {
                return format_json(&processes);
            }
            let mut output = String::new();
            for p in &processes {
                output.push_str(&format!(
                    "{:>4} {:<16} {:<16} {} {:<8} {}\n",
                    p.number,
                    p.ip_address,
                    p.name.cyan(),
                    p.workstation,
                    p.last_command.yellow(),
                    p.state
                ));
            }
            Ok(output)
        }

        Commands::Users => {
            let users = conn.get_user_list().await?;
            if json {
                return format_json(&users);
            }
            let mut output = String::new();
            for user in &users {
                let access: Vec<&str> = [
                    ("C", &user.cataloger),
                    ("R", &user.reader),
                    ("B", &user.circulation),
                    ("M", &user.acquisitions),
                    ("K", &user.provision),
                    ("A", &user.administrator),
                ]
                .into_iter()
                .filter(|(_, ini)| !ini.is_empty())
                .map(|(code, _)| code)
                .collect();
                output.push_str(&format!(
                    "{:>4} {} [{}]\n",
                    user.number,
                    user.name.cyan(),
                    access.join(" ")
                ));
            }
            Ok(output)
        }

        Commands::Stat => {
            let stat = conn.get_server_stat().await?;
            if json {
                return format_json(&stat);
            }
            let mut output = format!(
                "{}\n  Commands executed: {}\n  Clients: {}\n",
                "Server statistics".bold(),
                stat.total_command_count,
                stat.client_count
            );
            for client in &stat.running_clients {
                output.push_str(&format!(
                    "  {} {} {} {}\n",
                    client.number,
                    client.ip_address,
                    client.name.cyan(),
                    client.workstation
                ));
            }
            Ok(output)
        }

        Commands::DbInfo { database } => {
            let info = conn.get_database_info(database.as_deref()).await?;
            if json {
                return format_json(&info);
            }
            Ok(format!(
                "{}\n  Max MFN: {}\n  Logically deleted: {}\n  Physically deleted: {}\n  Non-actualized: {}\n  Locked records: {}\n  Database locked: {}",
                format!("Database {}", info.name.cyan()).bold(),
                info.max_mfn,
                info.logically_deleted.len(),
                info.physically_deleted.len(),
                info.nonactualized.len(),
                info.locked_records.len(),
                info.database_locked
            ))
        }

        Commands::File { specification } => {
            let specification = FileSpecification::parse(&specification)?;
            let text = conn.read_text_file(&specification).await?;
            if json {
                return format_json(&json!({
                    "file": specification.to_string(),
                    "text": text,
                }));
            }
            Ok(text)
        }

        Commands::ListFiles { specifications } => {
            let files = conn.list_files(&specifications).await?;
            if json {
                return format_json(&files);
            }
            if files.is_empty() {
                return Ok("No files".yellow().to_string());
            }
            Ok(files.join("\n"))
        }
    }
}

fn truncate<T>(items: &mut Vec<T>, limit: usize) {
    if limit > 0 {
        items.truncate(limit);
    }
}

/// Formats a value as pretty JSON.
fn format_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    Ok(serde_json::to_string_pretty(value)?)
}

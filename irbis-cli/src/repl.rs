//! Interactive REPL.

use crate::{commands, Commands};
use clap::Parser;
use colored::Colorize;
use irbis_client::AsyncConnection;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;

const HELP_TEXT: &str = r#"
Available commands:
  help                            Show this help
  ping                            Check that the server answers
  version                         Server version and client counts
  use <database>                  Switch the current database
  back                            Return to the previous database

  max-mfn [database]              Maximum MFN
  search <expr> [-f fmt] [-n N]   Search, optionally formatting results
  count <expr>                    Count matching records
  read <mfn>                      Read a record
  format <mfn> [script]           Format a record (default @brief)
  terms <start> [-n N] [-r]       List dictionary terms

  processes                       List server processes
  users                           List registered users
  stat                            Server statistics
  db-info [database]              Database information
  file <path.db.name>             Print a text file
  list-files <spec>...            List server files

  Quote arguments containing spaces: format 5 "v200^a, ' / 'v200^f"

  quit, exit                      Exit the REPL
"#;

/// A REPL line parsed with the one-shot command grammar.
#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: Commands,
}

pub async fn run(mut conn: AsyncConnection, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "IRBIS64 CLI".bold().cyan());
    println!(
        "Connecting to {}:{}...",
        conn.session().host,
        conn.session().port
    );

    conn.connect().await?;
    println!(
        "{} (server {})",
        "Connected!".green(),
        conn.server_version().unwrap_or("?")
    );

    // Create readline editor
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    let history_path = home::home_dir()
        .map(|h| h.join(".irbis_history"))
        .unwrap_or_else(|| PathBuf::from(".irbis_history"));
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for available commands.\n");

    loop {
        let prompt = format!("{} ", format!("irbis:{}>", conn.database()).cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_repl_command(&mut conn, line, json).await {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break,
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);

    let _ = conn.disconnect().await;
    println!("{}", "Disconnected.".dimmed());

    Ok(())
}

async fn execute_repl_command(
    conn: &mut AsyncConnection,
    line: &str,
    json: bool,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let words = split_words(line);
    let Some(first) = words.first() else {
        return Ok(Some(String::new()));
    };

    match first.to_lowercase().as_str() {
        "help" | "?" => Ok(Some(HELP_TEXT.to_string())),

        "quit" | "exit" | "q" => Ok(None),

        "use" => match words.get(1) {
            Some(database) => {
                conn.push_database(database);
                Ok(Some(format!("Using {}", database.cyan())))
            }
            None => Ok(Some("Usage: use <database>".to_string())),
        },

        "back" => match conn.pop_database() {
            Some(_) => Ok(Some(format!("Using {}", conn.database().cyan()))),
            None => Ok(Some("No previous database".yellow().to_string())),
        },

        "repl" => Ok(Some("Already in the REPL".yellow().to_string())),

        _ => match ReplLine::try_parse_from(&words) {
            Ok(parsed) => commands::execute(conn, parsed.command, json).await.map(Some),
            Err(e) => Ok(Some(format!(
                "{}Type 'help' for help.",
                e.render().to_string().trim_start_matches("error: ")
            ))),
        },
    }
}

/// Splits a line into words; double quotes group words and are removed.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("read  5"), vec!["read", "5"]);
        assert_eq!(
            split_words(r#"format 5 "v200^a, ' / ' v700""#),
            vec!["format", "5", "v200^a, ' / ' v700"]
        );
        assert_eq!(split_words(r#"search """#), vec!["search", ""]);
        assert!(split_words("   ").is_empty());
    }

    #[test]
    fn test_parse_repl_line() {
        let parsed = ReplLine::try_parse_from(["search", "K=ALG$", "-n", "5"]).unwrap();
        assert!(matches!(
            parsed.command,
            Commands::Search { limit: 5, format: None, .. }
        ));

        let parsed = ReplLine::try_parse_from(["format", "7"]).unwrap();
        match parsed.command {
            Commands::Format { mfn, script } => {
                assert_eq!(mfn, 7);
                assert_eq!(script, "@brief");
            }
            _ => panic!("expected format"),
        }

        assert!(ReplLine::try_parse_from(["read"]).is_err());
    }
}

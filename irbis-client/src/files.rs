//! Readers for the server's text resources, built on the text document
//! primitive.
//!
//! A text document arrives as a single narrow line with lines joined by the
//! IRBIS delimiter. The `read_*` functions accept an empty document (the
//! server's answer for a missing file) and return an empty or default
//! value; the `require_*` functions turn it into
//! [`ClientError::FileNotFound`].

use crate::async_connection::AsyncConnection;
use crate::connection::Connection;
use crate::error::ClientError;
use crate::transport::{AsyncTransport, Transport};
use irbis_protocol::alphabet::{ALPHABET_TABLE_FILE, UPPERCASE_TABLE_FILE};
use irbis_protocol::text::{irbis_to_dos, irbis_to_lines};
use irbis_protocol::{
    AlphabetTable, FileSpecification, IniFile, MenuFile, OptFile, ParFile, SearchScenario,
    ServerResponse, TreeFile, UpperCaseTable,
};

/// Document text with `\n` line breaks.
pub(crate) fn document_text(response: &mut ServerResponse) -> Result<String, ClientError> {
    Ok(irbis_to_dos(&response.read_narrow_line()?))
}

/// Document split into lines.
pub(crate) fn document_lines(response: &mut ServerResponse) -> Result<Vec<String>, ClientError> {
    let text = response.read_narrow_line()?;
    Ok(irbis_to_lines(&text)
        .into_iter()
        .map(str::to_string)
        .collect())
}

fn require_lines(
    lines: Vec<String>,
    specification: &FileSpecification,
) -> Result<Vec<String>, ClientError> {
    if lines.iter().all(|line| line.is_empty()) {
        return Err(ClientError::FileNotFound(specification.to_string()));
    }
    Ok(lines)
}

fn require_text(text: String, specification: &FileSpecification) -> Result<String, ClientError> {
    if text.is_empty() {
        return Err(ClientError::FileNotFound(specification.to_string()));
    }
    Ok(text)
}

fn alphabet_table(text: &str) -> Result<AlphabetTable, ClientError> {
    if text.is_empty() {
        return Ok(AlphabetTable::default());
    }
    Ok(AlphabetTable::parse(text)?)
}

fn uppercase_table(text: &str) -> Result<UpperCaseTable, ClientError> {
    if text.is_empty() {
        return Ok(UpperCaseTable::default());
    }
    Ok(UpperCaseTable::parse(text)?)
}

fn alphabet_spec(specification: Option<&FileSpecification>) -> FileSpecification {
    specification
        .cloned()
        .unwrap_or_else(|| FileSpecification::system(ALPHABET_TABLE_FILE))
}

fn uppercase_spec(specification: Option<&FileSpecification>) -> FileSpecification {
    specification
        .cloned()
        .unwrap_or_else(|| FileSpecification::system(UPPERCASE_TABLE_FILE))
}

// ===== Blocking =====

/// Reads a text document as lines.
pub fn read_text_lines<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<Vec<String>, ClientError> {
    let mut response = connection.read_text_stream(specification)?;
    document_lines(&mut response)
}

/// Reads a text document, failing when the server has no such file.
pub fn require_text_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<String, ClientError> {
    let text = connection.read_text_file(specification)?;
    require_text(text, specification)
}

pub fn read_ini_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<IniFile, ClientError> {
    Ok(IniFile::parse(&read_text_lines(connection, specification)?))
}

pub fn read_menu_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<MenuFile, ClientError> {
    Ok(MenuFile::parse(&read_text_lines(connection, specification)?))
}

pub fn require_menu_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<MenuFile, ClientError> {
    let lines = require_lines(read_text_lines(connection, specification)?, specification)?;
    Ok(MenuFile::parse(&lines))
}

/// Reads a PAR file, usually `FileSpecification::data("<db>.par")`.
pub fn read_par_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<ParFile, ClientError> {
    Ok(ParFile::parse(&read_text_lines(connection, specification)?))
}

pub fn require_par_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<ParFile, ClientError> {
    let lines = require_lines(read_text_lines(connection, specification)?, specification)?;
    Ok(ParFile::parse(&lines))
}

/// Reads a worksheet optimisation table. An empty document has no header
/// and fails to parse.
pub fn read_opt_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<OptFile, ClientError> {
    Ok(OptFile::parse(&read_text_lines(connection, specification)?)?)
}

pub fn require_opt_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<OptFile, ClientError> {
    let lines = require_lines(read_text_lines(connection, specification)?, specification)?;
    Ok(OptFile::parse(&lines)?)
}

pub fn read_tree_file<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<TreeFile, ClientError> {
    Ok(TreeFile::parse(&read_text_lines(connection, specification)?))
}

/// Reads the search scenarios of a database INI file, e.g.
/// `FileSpecification::master("IBIS", "IBIS.INI")`.
pub fn read_search_scenario<T: Transport>(
    connection: &mut Connection<T>,
    specification: &FileSpecification,
) -> Result<Vec<SearchScenario>, ClientError> {
    let ini = read_ini_file(connection, specification)?;
    Ok(SearchScenario::parse(&ini))
}

/// Reads the alphabet table; `None` reads `isisacw.tab` from the system
/// directory. A missing file yields the built-in table.
pub fn read_alphabet_table<T: Transport>(
    connection: &mut Connection<T>,
    specification: Option<&FileSpecification>,
) -> Result<AlphabetTable, ClientError> {
    let text = connection.read_text_file(&alphabet_spec(specification))?;
    alphabet_table(&text)
}

pub fn require_alphabet_table<T: Transport>(
    connection: &mut Connection<T>,
    specification: Option<&FileSpecification>,
) -> Result<AlphabetTable, ClientError> {
    let specification = alphabet_spec(specification);
    let text = require_text(connection.read_text_file(&specification)?, &specification)?;
    alphabet_table(&text)
}

/// Reads the upper-case table; `None` reads `isisucw.tab` from the system
/// directory. A missing file yields the built-in table.
pub fn read_uppercase_table<T: Transport>(
    connection: &mut Connection<T>,
    specification: Option<&FileSpecification>,
) -> Result<UpperCaseTable, ClientError> {
    let text = connection.read_text_file(&uppercase_spec(specification))?;
    uppercase_table(&text)
}

// ===== Async =====

pub async fn read_text_lines_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<Vec<String>, ClientError> {
    let mut response = connection.read_text_stream(specification).await?;
    document_lines(&mut response)
}

pub async fn require_text_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<String, ClientError> {
    let text = connection.read_text_file(specification).await?;
    require_text(text, specification)
}

pub async fn read_ini_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<IniFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(IniFile::parse(&lines))
}

pub async fn read_menu_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<MenuFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(MenuFile::parse(&lines))
}

pub async fn require_menu_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<MenuFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(MenuFile::parse(&require_lines(lines, specification)?))
}

pub async fn read_par_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<ParFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(ParFile::parse(&lines))
}

pub async fn require_par_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<ParFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(ParFile::parse(&require_lines(lines, specification)?))
}

pub async fn read_opt_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<OptFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(OptFile::parse(&lines)?)
}

pub async fn require_opt_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<OptFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(OptFile::parse(&require_lines(lines, specification)?)?)
}

pub async fn read_tree_file_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<TreeFile, ClientError> {
    let lines = read_text_lines_async(connection, specification).await?;
    Ok(TreeFile::parse(&lines))
}

pub async fn read_search_scenario_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: &FileSpecification,
) -> Result<Vec<SearchScenario>, ClientError> {
    let ini = read_ini_file_async(connection, specification).await?;
    Ok(SearchScenario::parse(&ini))
}

pub async fn read_alphabet_table_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: Option<&FileSpecification>,
) -> Result<AlphabetTable, ClientError> {
    let text = connection
        .read_text_file(&alphabet_spec(specification))
        .await?;
    alphabet_table(&text)
}

pub async fn require_alphabet_table_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: Option<&FileSpecification>,
) -> Result<AlphabetTable, ClientError> {
    let specification = alphabet_spec(specification);
    let text = connection.read_text_file(&specification).await?;
    alphabet_table(&require_text(text, &specification)?)
}

pub async fn read_uppercase_table_async<T: AsyncTransport>(
    connection: &mut AsyncConnection<T>,
    specification: Option<&FileSpecification>,
) -> Result<UpperCaseTable, ClientError> {
    let text = connection
        .read_text_file(&uppercase_spec(specification))
        .await?;
    uppercase_table(&text)
}

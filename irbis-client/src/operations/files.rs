use super::{check, Operation};
use bytes::Bytes;
use irbis_protocol::text::irbis_to_lines;
use irbis_protocol::{ClientQuery, Command, FileSpecification, ProtocolError, ServerResponse};

/// Reads a text document (`L`) and hands back the positioned reply.
///
/// Text documents carry no return code; the payload starts right after the
/// preamble.
#[derive(Debug, Clone)]
pub struct ReadTextStream {
    pub specification: FileSpecification,
}

impl ReadTextStream {
    pub fn new(specification: FileSpecification) -> Self {
        Self { specification }
    }
}

impl Operation for ReadTextStream {
    type Output = ServerResponse;

    fn command(&self) -> Command {
        Command::ReadDocument
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.specification.to_string().as_str())?;
        Ok(())
    }

    fn decode(&self, response: ServerResponse) -> Result<ServerResponse, ProtocolError> {
        Ok(response)
    }
}

/// Reads a binary document (`L` with `@`). `None` when the server sent no
/// binary marker.
#[derive(Debug, Clone)]
pub struct ReadBinaryFile {
    pub specification: FileSpecification,
}

impl ReadBinaryFile {
    pub fn new(specification: FileSpecification) -> Self {
        Self {
            specification: specification.with_binary(),
        }
    }
}

impl Operation for ReadBinaryFile {
    type Output = Option<Bytes>;

    fn command(&self) -> Command {
        Command::ReadDocument
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        query.append_narrow(self.specification.to_string().as_str())?;
        Ok(())
    }

    fn decode(&self, response: ServerResponse) -> Result<Option<Bytes>, ProtocolError> {
        Ok(response.binary_payload())
    }
}

/// Writes one or more text documents (`L` with `&content`).
#[derive(Debug, Clone)]
pub struct WriteTextFile {
    pub specifications: Vec<FileSpecification>,
}

impl WriteTextFile {
    pub fn new(specifications: Vec<FileSpecification>) -> Self {
        Self { specifications }
    }
}

impl Operation for WriteTextFile {
    type Output = ();

    fn command(&self) -> Command {
        Command::ReadDocument
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        for specification in &self.specifications {
            query.append_narrow(specification.to_string().as_str())?;
        }
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<(), ProtocolError> {
        check(&mut response)?;
        Ok(())
    }
}

/// Lists server files matching wildcard specifications (`!`).
#[derive(Debug, Clone)]
pub struct ListFiles {
    pub specifications: Vec<String>,
}

impl ListFiles {
    pub fn new<S: ToString>(specifications: &[S]) -> Self {
        Self {
            specifications: specifications.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Operation for ListFiles {
    type Output = Vec<String>;

    fn command(&self) -> Command {
        Command::ListFiles
    }

    fn encode(&self, query: &mut ClientQuery) -> Result<(), ProtocolError> {
        for specification in &self.specifications {
            query.append_narrow(specification.as_str())?;
        }
        Ok(())
    }

    fn decode(&self, mut response: ServerResponse) -> Result<Vec<String>, ProtocolError> {
        let mut files = Vec::new();
        for line in response.remaining_narrow_lines()? {
            files.extend(
                irbis_to_lines(&line)
                    .into_iter()
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(files)
    }
}

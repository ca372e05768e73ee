//! Byte transports.
//!
//! Every IRBIS64 operation is one short-lived TCP exchange: connect, write
//! the request, read until the server closes the socket, close. A transport
//! performs exactly that and nothing else; the protocol logic above it is
//! shared by the blocking and async connections.

use crate::connection::ConnectionConfig;
use crate::error::ClientError;
use bytes::{Bytes, BytesMut};
use std::future::Future;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

/// Blocking request/response exchange.
pub trait Transport {
    /// Sends `request` to `host:port` and returns everything the server
    /// wrote before closing the connection.
    fn exchange(&mut self, host: &str, port: u16, request: &[u8]) -> Result<Bytes, ClientError>;
}

/// Async request/response exchange.
///
/// Suspension happens only while connecting, writing and reading. Dropping
/// the future abandons the exchange; the caller never observes a partial
/// response.
pub trait AsyncTransport {
    fn exchange(
        &mut self,
        host: &str,
        port: u16,
        request: &[u8],
    ) -> impl Future<Output = Result<Bytes, ClientError>> + Send;
}

fn map_io(e: io::Error) -> ClientError {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            tracing::debug!("Socket timeout: {}", e);
            ClientError::Timeout
        }
        _ => {
            tracing::debug!("Socket error: {}", e);
            ClientError::Io(e)
        }
    }
}

/// Transport over blocking `std::net` sockets.
///
/// The read timeout applies to each read call, not to the whole response.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    config: ConnectionConfig,
}

impl TcpTransport {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn open(&self, host: &str, port: u16) -> Result<TcpStream, ClientError> {
        let mut last_error = None;
        for addr in (host, port).to_socket_addrs().map_err(map_io)? {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(map_io(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address found for {host}"),
            )
        })))
    }
}

impl Transport for TcpTransport {
    fn exchange(&mut self, host: &str, port: u16, request: &[u8]) -> Result<Bytes, ClientError> {
        tracing::debug!("Connecting to {}:{}...", host, port);
        let mut stream = self.open(host, port)?;
        stream.set_nodelay(true).ok();
        stream
            .set_read_timeout(Some(self.config.read_timeout))
            .map_err(map_io)?;
        stream
            .set_write_timeout(Some(self.config.read_timeout))
            .map_err(map_io)?;

        stream.write_all(request).map_err(map_io)?;
        stream.flush().map_err(map_io)?;
        tracing::debug!("Sent {} bytes", request.len());

        let buffer_size = self.config.read_buffer_size;
        let mut response = BytesMut::with_capacity(buffer_size);
        let mut chunk = vec![0u8; buffer_size];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => response.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io(e)),
            }
        }
        tracing::debug!("Received {} bytes", response.len());
        Ok(response.freeze())
    }
}

/// Transport over tokio sockets.
///
/// The read timeout bounds the whole write-and-read phase.
#[derive(Debug, Clone, Default)]
pub struct TokioTransport {
    config: ConnectionConfig,
}

impl TokioTransport {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl AsyncTransport for TokioTransport {
    async fn exchange(
        &mut self,
        host: &str,
        port: u16,
        request: &[u8],
    ) -> Result<Bytes, ClientError> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        tracing::debug!("Connecting to {}:{}...", host, port);
        let mut stream = tokio::time::timeout(
            self.config.connect_timeout,
            tokio::net::TcpStream::connect((host, port)),
        )
        .await
        .map_err(|_| {
            tracing::debug!("Connection timeout");
            ClientError::Timeout
        })?
        .map_err(map_io)?;
        stream.set_nodelay(true).ok();

        let buffer_size = self.config.read_buffer_size;
        let roundtrip = async {
            stream.write_all(request).await?;
            stream.flush().await?;
            tracing::debug!("Sent {} bytes", request.len());

            let mut response = BytesMut::with_capacity(buffer_size);
            let mut chunk = vec![0u8; buffer_size];
            loop {
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                response.extend_from_slice(&chunk[..n]);
            }
            Ok::<_, io::Error>(response)
        };

        let response = tokio::time::timeout(self.config.read_timeout, roundtrip)
            .await
            .map_err(|_| {
                tracing::debug!("Response timeout");
                ClientError::Timeout
            })?
            .map_err(map_io)?;
        tracing::debug!("Received {} bytes", response.len());
        Ok(response.freeze())
    }
}

/// In-memory transport that records requests and replays canned replies.
#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::VecDeque;

    /// Server-side preamble before the command-specific payload.
    pub fn reply(command: &str, payload: &[&str]) -> Bytes {
        let mut text = format!("{command}\r\n123456\r\n1\r\n0\r\n64.2018.1\r\n\r\n\r\n\r\n\r\n\r\n");
        for line in payload {
            text.push_str(line);
            text.push_str("\r\n");
        }
        Bytes::from(text)
    }

    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        pub requests: Vec<Bytes>,
        pub replies: VecDeque<Result<Bytes, io::ErrorKind>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&mut self, reply: Bytes) -> &mut Self {
            self.replies.push_back(Ok(reply));
            self
        }

        pub fn push_error(&mut self, kind: io::ErrorKind) -> &mut Self {
            self.replies.push_back(Err(kind));
            self
        }

        /// Body lines of the `index`-th request, after the length prefix.
        pub fn lines(&self, index: usize) -> Vec<String> {
            let request = &self.requests[index];
            let newline = request.iter().position(|&b| b == b'\n').unwrap();
            let body = String::from_utf8_lossy(&request[newline + 1..]).into_owned();
            let mut lines: Vec<String> = body.split('\n').map(str::to_string).collect();
            lines.pop();
            lines
        }

        /// Command-specific lines of the `index`-th request.
        pub fn params(&self, index: usize) -> Vec<String> {
            self.lines(index).split_off(10)
        }

        fn next(&mut self, request: &[u8]) -> Result<Bytes, ClientError> {
            self.requests.push(Bytes::copy_from_slice(request));
            match self.replies.pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(kind)) => Err(map_io(io::Error::from(kind))),
                None => Err(ClientError::Io(io::Error::from(
                    io::ErrorKind::ConnectionRefused,
                ))),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn exchange(&mut self, _host: &str, _port: u16, request: &[u8]) -> Result<Bytes, ClientError> {
            self.next(request)
        }
    }

    impl AsyncTransport for ScriptedTransport {
        async fn exchange(
            &mut self,
            _host: &str,
            _port: u16,
            request: &[u8],
        ) -> Result<Bytes, ClientError> {
            self.next(request)
        }
    }
}

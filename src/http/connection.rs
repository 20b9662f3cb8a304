use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::http::dispatch::Dispatcher;
use crate::http::parser::{ParseError, REQUEST_TERMINATOR, find_request_end, parse_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::store::FileStore;

/// Per-connection limits, taken from `ServerConfig`.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub read_timeout: Duration,
    pub max_read_size: usize,
    pub max_request_size: usize,
}

impl From<&ServerConfig> for ConnectionSettings {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            read_timeout: cfg.read_timeout(),
            max_read_size: cfg.max_read_size,
            max_request_size: cfg.max_request_size,
        }
    }
}

pub struct Connection<T, S> {
    stream: T,
    buffer: BytesMut,
    chunk: Vec<u8>,
    state: ConnectionState,
    dispatcher: Arc<Dispatcher<S>>,
    settings: ConnectionSettings,
    peer_closed: bool,
    served: usize,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = read another request afterwards?
    Closed,
}

enum Incoming {
    Request(Request),
    Malformed(ParseError),
    Closed,
}

impl<T, S> Connection<T, S>
where
    T: AsyncRead + AsyncWrite + Unpin,
    S: FileStore,
{
    pub fn new(stream: T, dispatcher: Arc<Dispatcher<S>>, settings: ConnectionSettings) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(settings.max_read_size),
            chunk: vec![0u8; settings.max_read_size],
            state: ConnectionState::Reading,
            dispatcher,
            settings,
            peer_closed: false,
            served: 0,
        }
    }

    /// Number of requests answered so far, bad requests included.
    pub fn served(&self) -> usize {
        self.served
    }

    /// Serves requests until the peer disconnects, a request is rejected,
    /// or the connection idles past the read timeout.
    ///
    /// Returns an error when the transport fails (reset, timeout before a
    /// complete request); no response is attempted in that case.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await? {
                    Incoming::Request(req) => ConnectionState::Processing(req),
                    Incoming::Malformed(e) => {
                        warn!(error = %e, "Rejecting invalid request");
                        self.served += 1;
                        ConnectionState::Writing(ResponseWriter::new(&Response::bad_request()), false)
                    }
                    Incoming::Closed => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let response = self.dispatcher.dispatch(&req.target).await;
                    self.served += 1;
                    info!(
                        resource = %req.target,
                        status = response.status.as_u16(),
                        bytes = response.body.len(),
                        "Request served"
                    );

                    // Once the peer has hung up there is nothing left to read.
                    let keep_reading = !self.peer_closed;
                    ConnectionState::Writing(ResponseWriter::new(&response), keep_reading)
                }

                ConnectionState::Writing(mut writer, keep_reading) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .context("failed to write response")?;

                    if keep_reading {
                        ConnectionState::Reading
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        if let Err(e) = self.stream.shutdown().await {
            debug!(error = %e, "Shutdown after close failed");
        }
        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<Incoming> {
        loop {
            // Empty lines ahead of a request line are ignored.
            let blank_lines = self
                .buffer
                .iter()
                .take_while(|&&b| b == b'\r' || b == b'\n')
                .count();
            self.buffer.advance(blank_lines);

            if let Some(end) = find_request_end(&self.buffer) {
                let head = self.buffer.split_to(end + REQUEST_TERMINATOR.len());
                return Ok(classify(parse_request(&head)));
            }

            if self.peer_closed {
                // A request cut short by the peer closing is still answered.
                if self.buffer_is_blank() {
                    return Ok(Incoming::Closed);
                }
                let head = self.buffer.split();
                return Ok(classify(parse_request(&head)));
            }

            if self.buffer.len() >= self.settings.max_request_size {
                self.buffer.clear();
                return Ok(Incoming::Malformed(ParseError::TooLarge(
                    self.settings.max_request_size,
                )));
            }

            // Never buffer more than max_request_size.
            let room = self.settings.max_request_size - self.buffer.len();
            let limit = room.min(self.chunk.len());

            let n = match timeout(self.settings.read_timeout, self.stream.read(&mut self.chunk[..limit])).await {
                Ok(read) => read.context("failed to read request")?,
                Err(_) if self.served > 0 && self.buffer_is_blank() => {
                    debug!(served = self.served, "Idle connection timed out");
                    return Ok(Incoming::Closed);
                }
                Err(_) => bail!(
                    "timed out after {:?} waiting for request data",
                    self.settings.read_timeout
                ),
            };

            if n == 0 {
                // Client closed connection
                self.peer_closed = true;
                continue;
            }

            self.buffer.extend_from_slice(&self.chunk[..n]);
        }
    }

    fn buffer_is_blank(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

fn classify(parsed: Result<Request, ParseError>) -> Incoming {
    match parsed {
        Ok(req) => {
            debug!(resource = %req.target, "Got a valid HTTP request");
            Incoming::Request(req)
        }
        Err(e) => Incoming::Malformed(e),
    }
}

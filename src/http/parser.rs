use std::collections::HashMap;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::http::reader::ByteStreamReader;
use crate::http::request::{Method, Request};

const CRLF: &[u8] = b"\r\n";

/// Upper bound on the request line plus header section, terminators included.
pub const MAX_HEADER_BYTES: usize = 16 * 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("connection closed before a complete request arrived")]
    ConnectionClosed,

    #[error("request is incomplete")]
    Incomplete,

    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("unknown HTTP method")]
    InvalidMethod,

    #[error("invalid Content-Length value")]
    InvalidContentLength,

    #[error("request line and headers exceed {max_bytes} bytes")]
    HeadersTooLarge { max_bytes: usize },

    #[error("I/O error while reading request: {0}")]
    Io(#[from] std::io::Error),
}

/// Phase of the request currently being parsed.
///
/// Transitions only move forward; `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    ReadingRequestLine,
    ReadingHeaders,
    AwaitingBody,
    ReadingBody,
    Complete,
}

/// Incremental parser for exactly one request.
///
/// Bytes are pushed in with [`RequestParser::feed`] in whatever chunks the
/// socket produced them. Unconsumed bytes stay in `pending` until the next
/// chunk arrives, so a line or body may be split at any byte.
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    pending: BytesMut,
    /// Prefix of `pending` already searched for a line terminator.
    scanned: usize,
    /// Request line and header bytes split off so far.
    head_bytes: usize,
    method: Option<Method>,
    path: String,
    version: String,
    headers: HashMap<String, String>,
    body_len: usize,
    delivered: bool,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::ReadingRequestLine,
            pending: BytesMut::new(),
            scanned: 0,
            head_bytes: 0,
            method: None,
            path: String::new(),
            version: String::new(),
            headers: HashMap::new(),
            body_len: 0,
            delivered: false,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Pulls chunks from `reader` until one full request has been parsed.
    pub async fn read_request<R>(
        mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<Request, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            let chunk = reader
                .read_chunk()
                .await?
                .ok_or(ParseError::ConnectionClosed)?;

            if let Some(request) = self.feed(&chunk)? {
                return Ok(request);
            }
        }
    }

    /// Pushes one chunk through the state machine.
    ///
    /// Returns the request the first time the parser reaches `Complete` and
    /// `Ok(None)` whenever more bytes are needed. After the request has been
    /// handed out, further input is ignored.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Request>, ParseError> {
        if self.state == ParseState::Complete {
            return Ok(self.take_request());
        }

        self.pending.extend_from_slice(chunk);

        loop {
            match self.state {
                ParseState::ReadingRequestLine => {
                    let Some(line) = self.next_line()? else {
                        return Ok(None);
                    };
                    self.parse_request_line(&line)?;
                    self.state = ParseState::ReadingHeaders;
                }

                ParseState::ReadingHeaders => {
                    let Some(line) = self.next_line()? else {
                        return Ok(None);
                    };
                    if line.is_empty() {
                        self.state = ParseState::AwaitingBody;
                    } else {
                        self.parse_header_line(&line);
                    }
                }

                ParseState::AwaitingBody => {
                    self.body_len = self.declared_length()?;
                    if self.body_len == 0 {
                        self.discard_excess();
                        self.state = ParseState::Complete;
                    } else {
                        self.state = ParseState::ReadingBody;
                    }
                }

                ParseState::ReadingBody => {
                    if self.pending.len() < self.body_len {
                        return Ok(None);
                    }
                    self.state = ParseState::Complete;
                }

                ParseState::Complete => return Ok(self.take_request()),
            }
        }
    }

    /// Splits off the next CRLF-terminated line, leaving the rest pending.
    ///
    /// The search resumes where the previous call stopped, backing up one
    /// byte in case a `\r` ended the earlier chunk.
    fn next_line(&mut self) -> Result<Option<BytesMut>, ParseError> {
        let start = self.scanned.saturating_sub(1);
        let found = self.pending[start..]
            .windows(CRLF.len())
            .position(|w| w == CRLF);

        let Some(offset) = found else {
            self.scanned = self.pending.len();
            self.check_head_size(self.pending.len())?;
            return Ok(None);
        };

        let end = start + offset;
        self.check_head_size(end + CRLF.len())?;
        self.head_bytes += end + CRLF.len();
        self.scanned = 0;

        let line = self.pending.split_to(end);
        self.pending.advance(CRLF.len());
        Ok(Some(line))
    }

    fn check_head_size(&self, upcoming: usize) -> Result<(), ParseError> {
        if self.head_bytes + upcoming > MAX_HEADER_BYTES {
            return Err(ParseError::HeadersTooLarge {
                max_bytes: MAX_HEADER_BYTES,
            });
        }
        Ok(())
    }

    fn parse_request_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::MalformedRequestLine)?;
        let mut parts = line.split_whitespace();

        let method_str = parts.next().ok_or(ParseError::MalformedRequestLine)?;
        let path = parts.next().ok_or(ParseError::MalformedRequestLine)?;
        let version = parts.next().unwrap_or("HTTP/1.1");

        if parts.next().is_some() {
            return Err(ParseError::MalformedRequestLine);
        }

        let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;
        self.method = Some(method);
        self.path = path.to_string();
        self.version = version.to_string();
        Ok(())
    }

    fn parse_header_line(&mut self, line: &[u8]) {
        let Ok(line) = std::str::from_utf8(line) else {
            tracing::warn!("Skipping header line that is not valid UTF-8");
            return;
        };

        let Some((key, value)) = line.split_once(':') else {
            tracing::warn!(line = %line, "Skipping header line without ':'");
            return;
        };

        self.headers
            .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    /// Digits only; a sign, whitespace inside the value or an empty value is rejected.
    fn declared_length(&self) -> Result<usize, ParseError> {
        let Some(value) = self.headers.get("content-length") else {
            return Ok(0);
        };

        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidContentLength);
        }

        value
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)
    }

    /// Only one request is read per connection, so trailing bytes are dropped.
    fn discard_excess(&mut self) {
        if !self.pending.is_empty() {
            tracing::trace!(
                bytes = self.pending.len(),
                "Discarding bytes past end of request"
            );
            self.pending.clear();
        }
    }

    fn take_request(&mut self) -> Option<Request> {
        if self.delivered {
            return None;
        }
        let method = self.method?;

        let body = self.pending.split_to(self.body_len).to_vec();
        self.discard_excess();
        self.delivered = true;

        Some(Request {
            method,
            path: std::mem::take(&mut self.path),
            version: std::mem::take(&mut self.version),
            headers: std::mem::take(&mut self.headers),
            body,
        })
    }
}

/// Parses a request that is already fully buffered.
///
/// Fails with [`ParseError::Incomplete`] when `buf` ends before the request does.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    RequestParser::new().feed(buf)?.ok_or(ParseError::Incomplete)
}

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::parser::{ParseError, RequestParser};
use crate::http::reader::{ByteStreamReader, DEFAULT_CHUNK_SIZE};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::routes::Router;

/// One client connection: a single request, a single response, then close.
pub struct Connection<S> {
    stream: S,
    router: Arc<Router>,
    chunk_size: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>) -> Self {
        Self {
            stream,
            router,
            chunk_size: DEFAULT_CHUNK_SIZE,
            state: ConnectionState::Reading,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some(req) => ConnectionState::Processing(req),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(req) => {
                    let response = self.router.dispatch(req).await;

                    tracing::info!(
                        method = req.method.as_str(),
                        path = %req.path,
                        status = response.status.as_u16(),
                        "Request handled"
                    );

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    // No keep-alive: one response per connection.
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    let _ = self.stream.shutdown().await;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads one request.
    ///
    /// `Ok(None)` means the connection should close without a response,
    /// either because the peer went away or because the request was malformed.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        let mut reader = ByteStreamReader::with_chunk_size(&mut self.stream, self.chunk_size);

        match RequestParser::new().read_request(&mut reader).await {
            Ok(request) => Ok(Some(request)),
            Err(ParseError::ConnectionClosed) => {
                tracing::debug!("Client closed connection before sending a request");
                Ok(None)
            }
            Err(ParseError::Io(e)) => Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed request");
                Ok(None)
            }
        }
    }
}

//! HTTP protocol implementation.
//!
//! This module implements a single-request-per-connection HTTP/1.1 server
//! without an HTTP library underneath it.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`reader`**: Bounded reads from the socket, one chunk at a time
//! - **`parser`**: Incremental request parser driven by an explicit phase state machine
//! - **`request`**: HTTP request representation and header helpers
//! - **`response`**: HTTP response representation with builder pattern
//! - **`encoding`**: `Accept-Encoding` negotiation and gzip compression
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`connection`**: Drives one connection from first byte to close
//!
//! # Parser Phases
//!
//! ```text
//!   ReadingRequestLine ──► ReadingHeaders ──► AwaitingBody ──┬──► Complete
//!                                                            │       ▲
//!                                                            └► ReadingBody
//! ```
//!
//! Chunks can split the request anywhere; bytes not consumed by one phase
//! are carried into the next.
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Parse one request
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Dispatch to the router
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use handwire::http::connection::Connection;
//! use handwire::routes::{FileStore, Router};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     let router = Arc::new(Router::new(FileStore::new("/tmp")));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let router = router.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, router);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod reader;
pub mod encoding;
pub mod connection;
pub mod writer;

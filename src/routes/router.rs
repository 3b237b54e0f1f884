//! Endpoint table and dispatch
//!
//! | Method | Path             | Response                                   |
//! |--------|------------------|--------------------------------------------|
//! | GET    | `/`              | 200, empty                                 |
//! | GET    | `/echo/{value}`  | 200 `text/plain`, body `{value}` (gzip ok) |
//! | GET    | `/user-agent`    | 200 `text/plain`, `User-Agent` value       |
//! | GET    | `/files/{name}`  | 200 `application/octet-stream` or 404      |
//! | POST   | `/files/{name}`  | 201 after writing the request body         |
//! | *      | anything else    | 404, empty                                 |

use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routes::files::FileStore;

const ECHO_PREFIX: &str = "/echo/";
const FILES_PREFIX: &str = "/files/";

/// A request matched to an endpoint. Borrowed segments are taken verbatim
/// from the path without decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Root,
    Echo(&'a str),
    UserAgent,
    ReadFile(&'a str),
    WriteFile(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    /// First match wins, in the order of the table above.
    pub fn resolve(method: Method, path: &'a str) -> Self {
        match method {
            Method::GET => {
                if path == "/" {
                    Route::Root
                } else if let Some(value) = path.strip_prefix(ECHO_PREFIX) {
                    Route::Echo(value)
                } else if path == "/user-agent" {
                    Route::UserAgent
                } else {
                    match file_name(path) {
                        Some(name) => Route::ReadFile(name),
                        None => Route::NotFound,
                    }
                }
            }
            Method::POST => match file_name(path) {
                Some(name) => Route::WriteFile(name),
                None => Route::NotFound,
            },
            _ => Route::NotFound,
        }
    }
}

fn file_name(path: &str) -> Option<&str> {
    path.strip_prefix(FILES_PREFIX).filter(|name| !name.is_empty())
}

/// Dispatches requests to the built-in endpoints.
///
/// Holds nothing mutable, so one instance is shared by every connection.
#[derive(Debug, Clone)]
pub struct Router {
    files: FileStore,
}

impl Router {
    pub fn new(files: FileStore) -> Self {
        Self { files }
    }

    pub async fn dispatch(&self, request: &Request) -> Response {
        match Route::resolve(request.method, &request.path) {
            Route::Root => Response::ok(),
            Route::Echo(value) => echo(value, request.accepts_gzip()),
            Route::UserAgent => Response::text(request.user_agent()),
            Route::ReadFile(name) => self.read_file(name).await,
            Route::WriteFile(name) => self.write_file(name, &request.body).await,
            Route::NotFound => Response::not_found(),
        }
    }

    async fn read_file(&self, name: &str) -> Response {
        match self.files.read(name).await {
            Ok(Some(contents)) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", "application/octet-stream")
                .body(contents)
                .build(),
            Ok(None) => Response::not_found(),
            Err(e) => {
                tracing::error!(file = %name, error = %e, "Failed to read file");
                Response::internal_error()
            }
        }
    }

    async fn write_file(&self, name: &str, body: &[u8]) -> Response {
        match self.files.write(name, body).await {
            Ok(()) => {
                tracing::debug!(file = %name, bytes = body.len(), "File written");
                Response::created()
            }
            Err(e) => {
                tracing::error!(file = %name, error = %e, "Failed to write file");
                Response::internal_error()
            }
        }
    }
}

fn echo(value: &str, gzip: bool) -> Response {
    let builder = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(value);

    if !gzip {
        return builder.build();
    }

    match builder.gzip() {
        Ok(builder) => builder.build(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to gzip echo body");
            Response::internal_error()
        }
    }
}

//! Request routing
//!
//! This module maps a parsed request onto one of the built-in endpoints and
//! produces the response for it.

pub mod files;
pub mod router;

pub use files::FileStore;
pub use router::{Route, Router};

//! fileserve - minimal HTTP/1.1 static file daemon
//!
//! Core library: request parsing, response dispatch, and the file store.

pub mod config;
pub mod http;
pub mod server;
pub mod store;

//! HTTP protocol implementation.
//!
//! This module implements the GET-only HTTP/1.1 subset the file server speaks.
//!
//! # Architecture
//!
//! - **`connection`**: Per-client session implementing the request-response state machine
//! - **`parser`**: Validates the request line and extracts the target
//! - **`request`**: The validated request
//! - **`dispatch`**: Resolves a target against the rule table and the file store
//! - **`rules`**: Canned responses for `/forbidden`, `/error` and `/moved`
//! - **`mime`**: Content-Type detection based on file extensions
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for "\r\n\r\n" (or the peer closing)
//!        └──────┬──────┘
//!               │ Request line parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Dispatch target
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Peer still open → Reading (pipelined requests)
//!               └─ Bad request / peer closed → Closed
//! ```
//!
//! A malformed request skips Processing and goes straight to Writing with a
//! `400 BAD REQUEST`, after which the connection closes.

pub mod connection;
pub mod dispatch;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod rules;
pub mod writer;

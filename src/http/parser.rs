use thiserror::Error;

use crate::http::request::{Method, Request};

/// Marks the end of a request head.
pub const REQUEST_TERMINATOR: &[u8] = b"\r\n\r\n";

/// What `validate` hands back in place of a target when a request is rejected.
pub const BAD_REQUEST: &str = "400 BAD REQUEST";

const VERSION_SUFFIX: &str = " HTTP/1.1";

/// Why a request line was rejected.
///
/// Every variant produces the same `400 BAD REQUEST` on the wire; the
/// distinction only shows up in logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("request line is not valid UTF-8")]
    InvalidEncoding,
    #[error("unsupported method {0:?}")]
    InvalidMethod(String),
    #[error("request line does not carry HTTP/1.1")]
    InvalidVersion,
    #[error("request head exceeds {0} bytes")]
    TooLarge(usize),
}

/// Parses the first line of `buf` as `GET <target> HTTP/1.1`.
///
/// The target is everything between `GET ` and the last ` HTTP/1.1` on the
/// line, taken verbatim: no percent-decoding and no normalization. Headers
/// after the first line are ignored.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    let line_end = buf
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(buf.len());

    let line = std::str::from_utf8(&buf[..line_end])
        .map_err(|_| ParseError::InvalidEncoding)?;

    if line.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let rest = match line.strip_prefix("GET ") {
        Some(rest) => rest,
        None => {
            let token = line.split(' ').next().unwrap_or_default();
            if Method::from_str(token).is_some() {
                return Err(ParseError::InvalidVersion);
            }
            return Err(ParseError::InvalidMethod(token.to_string()));
        }
    };

    let target_end = rest
        .rfind(VERSION_SUFFIX)
        .ok_or(ParseError::InvalidVersion)?;

    Ok(Request::get(&rest[..target_end]))
}

/// Checks `raw` against the GET grammar.
///
/// Returns `(true, target)` on success and `(false, "400 BAD REQUEST")`
/// otherwise. Code that goes on to serve the request should use
/// [`parse_request`], which cannot mix the two up.
pub fn validate(raw: &str) -> (bool, String) {
    match parse_request(raw.as_bytes()) {
        Ok(request) => (true, request.target),
        Err(_) => (false, BAD_REQUEST.to_string()),
    }
}

/// Position of the `\r\n\r\n` terminator, if the buffer holds a full request head.
pub fn find_request_end(buf: &[u8]) -> Option<usize> {
    buf.windows(REQUEST_TERMINATOR.len())
        .position(|w| w == REQUEST_TERMINATOR)
}

use bytes::Bytes;

/// HTTP status codes the server can produce.
///
/// Reason phrases are upper-case on the wire (`404 NOT FOUND`), matching
/// what existing clients of this server expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 302 MOVED TEMPORARILY
    MovedTemporarily,
    /// 400 BAD REQUEST
    BadRequest,
    /// 403 FORBIDDEN
    Forbidden,
    /// 404 NOT FOUND
    NotFound,
    /// 500 INTERNAL SERVER ERROR
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use fileserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MovedTemporarily => 302,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use fileserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::MovedTemporarily.reason_phrase(), "MOVED TEMPORARILY");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedTemporarily => "MOVED TEMPORARILY",
            StatusCode::BadRequest => "BAD REQUEST",
            StatusCode::Forbidden => "FORBIDDEN",
            StatusCode::NotFound => "NOT FOUND",
            StatusCode::InternalServerError => "INTERNAL SERVER ERROR",
        }
    }

    /// `"<code> <REASON>"`, the part of the status line after the version.
    pub fn status_text(&self) -> String {
        format!("{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// A complete HTTP response ready to be serialized.
///
/// Headers keep insertion order so the serialized bytes are deterministic.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Header name/value pairs, in the order they are written
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Bytes,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/css")
///     .body(css_bytes)
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header, replacing an earlier one with the same name
    /// (compared case-insensitively) in place.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(existing) => existing.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response.
    ///
    /// Always sets `Content-Length` from the body, overriding any value a
    /// caller supplied, so the header can never disagree with what is sent.
    pub fn build(self) -> Response {
        let content_length = self.body.len().to_string();
        let builder = self.header("Content-Length", content_length);

        Response {
            status: builder.status,
            headers: builder.headers,
            body: builder.body,
        }
    }
}

impl Response {
    /// Status line only, empty body.
    pub fn status_only(status: StatusCode) -> Self {
        ResponseBuilder::new(status).build()
    }

    /// A `302 MOVED TEMPORARILY` pointing at `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        ResponseBuilder::new(StatusCode::MovedTemporarily)
            .header("Location", location)
            .build()
    }

    /// A `200 OK` carrying `body` as `content_type`.
    pub fn ok(content_type: &str, body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .body(body)
            .build()
    }

    /// Sent when a request line fails validation.
    pub fn bad_request() -> Self {
        Self::status_only(StatusCode::BadRequest)
    }

    /// The plain-text 404 used when even the fallback image is missing.
    pub fn not_found_text() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", "text/plain")
            .body(StatusCode::NotFound.reason_phrase())
            .build()
    }

    /// Looks up a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

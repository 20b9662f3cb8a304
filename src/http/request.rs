/// HTTP request methods understood by the server.
///
/// Only `GET` is served; any other token on the request line is rejected by
/// the parser before a `Request` is ever built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
}

/// A validated request line.
///
/// Built fresh for every request and handed straight to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Always `GET`
    pub method: Method,
    /// The requested path exactly as the client sent it (e.g. "/index.html").
    /// May be empty.
    pub target: String,
    /// Always "HTTP/1.1"
    pub version: String,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Matching is case-sensitive, so `get` is not a method.
    ///
    /// # Example
    ///
    /// ```
    /// # use fileserve::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("POST"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

impl Request {
    pub fn get(target: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            target: target.into(),
            version: "HTTP/1.1".to_string(),
        }
    }
}

//! Canned responses for specific paths, checked before any file lookup.

use std::collections::HashMap;

use crate::http::response::{Response, StatusCode};

/// Outcome attached to a rule-table path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Answer with a bare status line.
    Status(StatusCode),
    /// Answer with `302 MOVED TEMPORARILY` to `location`.
    Redirect { location: String },
}

impl Rule {
    pub fn to_response(&self) -> Response {
        match self {
            Rule::Status(status) => Response::status_only(*status),
            Rule::Redirect { location } => Response::redirect(location.as_str()),
        }
    }
}

/// Exact-match path table. Keys are unique, so at most one rule applies.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<String, Rule>,
}

impl RuleTable {
    /// The standard table: `/forbidden`, `/error`, and `/moved` (redirecting
    /// to `default_resource`).
    pub fn new(default_resource: &str) -> Self {
        let mut rules = HashMap::new();
        rules.insert("/forbidden".to_string(), Rule::Status(StatusCode::Forbidden));
        rules.insert(
            "/error".to_string(),
            Rule::Status(StatusCode::InternalServerError),
        );
        rules.insert(
            "/moved".to_string(),
            Rule::Redirect {
                location: default_resource.to_string(),
            },
        );
        Self { rules }
    }

    pub fn lookup(&self, path: &str) -> Option<&Rule> {
        self.rules.get(path)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

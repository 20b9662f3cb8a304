//! Maps a validated target onto a response.
//!
//! Resolution order:
//!
//! 1. `/` (or an empty target) becomes the default resource.
//! 2. An exact rule-table hit answers with its canned response.
//! 3. Otherwise the path is read from the file store; a miss falls back to
//!    the not-found image, and a missing image to a plain-text 404.
//!
//! Dispatching never touches the connection; the session decides when to
//! close.

use tracing::{debug, error, info, warn};

use crate::config::StaticFilesConfig;
use crate::http::mime;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::rules::RuleTable;
use crate::store::{FileStore, StoreError};

pub struct Dispatcher<S> {
    store: S,
    rules: RuleTable,
    default_resource: String,
    not_found_resource: String,
}

impl<S: FileStore> Dispatcher<S> {
    pub fn new(store: S, cfg: &StaticFilesConfig) -> Self {
        Self {
            store,
            rules: RuleTable::new(&cfg.default_resource),
            default_resource: cfg.default_resource.clone(),
            not_found_resource: cfg.not_found_resource.clone(),
        }
    }

    /// The path actually served for `target`.
    pub fn resolve<'a>(&'a self, target: &'a str) -> &'a str {
        if target.is_empty() || target == "/" {
            &self.default_resource
        } else {
            target
        }
    }

    pub async fn dispatch(&self, target: &str) -> Response {
        let path = self.resolve(target);

        if let Some(rule) = self.rules.lookup(path) {
            debug!(path, rule = ?rule, "Rule table hit");
            return rule.to_response();
        }

        match self.store.read(path).await {
            Ok(data) => {
                let content_type = mime::content_type_for_path(path);
                debug!(path, content_type, bytes = data.len(), "Serving file");
                Response::ok(content_type, data)
            }
            Err(e) => {
                log_store_error(&e);
                self.not_found().await
            }
        }
    }

    async fn not_found(&self) -> Response {
        let fallback = self.not_found_resource.as_str();

        match self.store.read(fallback).await {
            Ok(image) => ResponseBuilder::new(StatusCode::NotFound)
                .header("Content-Type", mime::content_type_for_path(fallback))
                .body(image)
                .build(),
            Err(e) => {
                warn!(path = fallback, error = %e, "Not-found image unavailable, answering with text");
                Response::not_found_text()
            }
        }
    }
}

fn log_store_error(err: &StoreError) {
    match err {
        StoreError::NotFound(path) => info!(path = %path, "Resource not found"),
        StoreError::PermissionDenied(path) => {
            error!(path = %path, "Permission denied reading resource")
        }
        StoreError::Other { path, source } => {
            error!(path = %path, error = %source, "Failed to read resource")
        }
    }
}

//! Content-Type selection by file extension.
//!
//! Extensions include the leading dot and are matched case-sensitively:
//! `.PNG` is not `.png`.

/// Served for any extension missing from [`CONTENT_TYPES`].
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension to MIME type. `.gif` deliberately maps to `image/jpeg`.
pub const CONTENT_TYPES: &[(&str, &str)] = &[
    (".html", "text/html;charset=utf-8"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".js", "text/javascript;charset=UTF-8"),
    (".css", "text/css"),
    (".txt", "text/plain"),
    (".ico", "image/x-icon"),
    (".gif", "image/jpeg"),
];

/// MIME type for an extension such as `".css"`.
///
/// # Examples
/// ```
/// use fileserve::http::mime::content_type_for;
/// assert_eq!(content_type_for(".css"), "text/css");
/// assert_eq!(content_type_for(".CSS"), "application/octet-stream");
/// assert_eq!(content_type_for(""), "application/octet-stream");
/// ```
pub fn content_type_for(extension: &str) -> &'static str {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// MIME type for the file a logical path points at.
pub fn content_type_for_path(path: &str) -> &'static str {
    content_type_for(extension_of(path))
}

/// Extension of the last path segment, dot included.
///
/// Leading dots of the file name do not start an extension, so
/// `"/.profile"` has none while `"/a.tar.gz"` has `".gz"`.
pub fn extension_of(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];
    let stem_start = name.len() - name.trim_start_matches('.').len();

    match name[stem_start..].rfind('.') {
        Some(dot) => &name[stem_start + dot..],
        None => "",
    }
}

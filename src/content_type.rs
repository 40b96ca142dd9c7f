//! Content-type based filtering of loggable payloads.

use http::header::CONTENT_TYPE;
use http::HeaderMap;

/// Returns whether a payload with these headers is safe to render into a log
/// line.
///
/// Absence of a `content-type` header is treated as loggable. Otherwise at
/// least one declared value must start with `application/json` or `text`
/// (prefix match, no case folding).
pub fn loggable(headers: &HeaderMap) -> bool {
    let mut values = headers.get_all(CONTENT_TYPE).iter().peekable();
    if values.peek().is_none() {
        return true;
    }
    values.any(|value| {
        value
            .to_str()
            .map(|ct| ct.starts_with("application/json") || ct.starts_with("text"))
            .unwrap_or(false)
    })
}

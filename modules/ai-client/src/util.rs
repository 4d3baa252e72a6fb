use serde::de::DeserializeOwned;
use tracing::warn;

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code-fence wrapping from a model response.
pub fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Fence-strip then parse a model response as JSON. A parse miss is a
/// "use the default" signal for the caller, not an error.
pub fn parse_json_lenient<T: DeserializeOwned>(response: &str) -> Option<T> {
    let cleaned = strip_code_fences(response);
    match serde_json::from_str(cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "Model response was not parsable JSON, falling back");
            None
        }
    }
}

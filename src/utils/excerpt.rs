//! Short, single-line excerpts of upstream response bodies
//!
//! Provider error bodies end up in logs and in the `detail` returned to the
//! browser, so they are flattened and capped first.

/// Maximum number of characters kept from an upstream body
pub const MAX_EXCERPT_CHARS: usize = 300;

/// Collapse whitespace runs to single spaces and cap the result at
/// `max_chars` characters, appending `...` when anything was cut
///
/// # Example
/// ```
/// use music_pal_relay::utils::excerpt;
///
/// assert_eq!(excerpt("{\n  \"error\": \"busy\"\n}", 100), "{ \"error\": \"busy\" }");
/// assert_eq!(excerpt("abcdef", 3), "abc...");
/// ```
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_body_unchanged() {
        assert_eq!(excerpt("Service Unavailable", MAX_EXCERPT_CHARS), "Service Unavailable");
    }

    #[test]
    fn test_excerpt_flattens_whitespace() {
        assert_eq!(excerpt("  a\n\tb   c \r\n", 10), "a b c");
    }

    #[test]
    fn test_excerpt_cuts_on_char_boundary() {
        assert_eq!(excerpt("和弦音符很多", 2), "和弦...");
    }

    #[test]
    fn test_excerpt_empty() {
        assert_eq!(excerpt("", 10), "");
        assert_eq!(excerpt("   ", 10), "");
    }
}

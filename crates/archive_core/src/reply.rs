/// Link text that marks an in-body reference to another post.
pub const REPLY_MARKER: &str = "In reply to";

pub fn is_reply_marker(text: &str) -> bool {
    text.contains(REPLY_MARKER)
}

/// Turns a remote post reference into a local anchor.
///
/// Takes the last non-empty path segment of `href` (query and fragment are
/// ignored), drops its first character and prefixes `#`:
/// `/forum/viewtopic/42` becomes `#2`.
pub fn rewrite_reply_href(href: &str) -> String {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segment = path.rsplit('/').next().unwrap_or_default();
    let mut chars = segment.chars();
    chars.next();
    format!("#{}", chars.as_str())
}

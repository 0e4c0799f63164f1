/// Fallback used when a title or album name is missing or sanitises to nothing.
pub const DEFAULT_NAME: &str = "default";

pub const OUTPUT_EXTENSION: &str = "html";

/// Deterministic output file name for a 1-based chunk index.
pub fn chunk_file_name(index: usize) -> String {
    format!("{index}.{OUTPUT_EXTENSION}")
}

/// Reduces a title to `[-_.A-Za-z0-9]`. Leading dots are removed so the
/// result can never be `.`, `..` or a hidden entry.
pub fn sanitize_name(input: Option<&str>) -> String {
    let cleaned: String = input
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

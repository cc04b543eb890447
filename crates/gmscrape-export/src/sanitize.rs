//! Filesystem-safe session directory names.

/// Characters kept besides Unicode alphanumerics.
const ALLOWED_PUNCTUATION: [char; 4] = [' ', '_', '-', ','];

/// Directory name for a session: `"{query} en {location}"` with every
/// character outside the allowed set dropped, runs of spaces collapsed to one,
/// and leading/trailing spaces removed.
///
/// The result depends only on its inputs, so repeated sessions for the same
/// pair reuse one directory.
#[must_use]
pub fn session_dir_name(query: &str, location: &str) -> String {
    sanitize_component(&format!("{query} en {location}"))
}

/// Apply the allowed-character filter and space collapsing to arbitrary text.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    let filtered: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_alphanumeric() || ALLOWED_PUNCTUATION.contains(c))
        .collect();

    filtered.split(' ').filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
}

//! Bullet helpers
//!
//! A summary is a newline-separated list of `- ` lines. The model also emits
//! `•` bullets, which are read but never written.

/// Marker written in front of every bullet
pub const MARKER: char = '-';

const READ_MARKERS: [char; 2] = [MARKER, '•'];

pub fn starts_with_marker(line: &str) -> bool {
    line.trim_start().starts_with(READ_MARKERS)
}

/// Trim a line and drop a single leading marker
pub fn strip_marker(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix(READ_MARKERS).unwrap_or(line).trim()
}

/// Non-blank lines with their markers removed
pub fn split_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| strip_marker(l).to_string())
        .collect()
}

pub fn join_bullets<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|b| format!("{} {}", MARKER, b.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

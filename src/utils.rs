//! Text utilities for building bridge command strings

/// Escape a value for embedding inside a single-quoted UIAutomation string
/// literal.
///
/// Backslashes must be doubled before anything else, otherwise the quote
/// escapes get re-escaped.
pub fn escape_special_chars(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('"', "\\\"")
        .replace('\'', "\\'")
}

/// Undo the escaping of `\n` so UIAutomation can treat it specially.
///
/// A user-supplied two-character `\n` sequence becomes `\\n` after
/// [`escape_special_chars`]; typing it as a literal backslash-n would never
/// produce a newline on the device.
pub fn deescape_newlines(text: &str) -> String {
    text.replace("\\\\n", "\\n")
}

//! Platform conventions
//!
//! Captured tool output is re-joined line by line using the host convention:
//! - Windows → `"\r\n"`
//! - everything else → `"\n"`

/// Line separator used when joining captured output lines
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";

/// Line separator used when joining captured output lines
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Join the lines of `text` with [`LINE_SEPARATOR`]
///
/// Both `\n` and `\r\n` are accepted as input line endings and a trailing
/// line ending is dropped, so `"a\nb\n"` becomes `"a\nb"` on Unix.
#[must_use]
pub fn join_lines(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(LINE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_lines_drops_trailing_newline() {
        let joined = join_lines("first\nsecond\n");
        assert_eq!(joined, format!("first{LINE_SEPARATOR}second"));
    }

    #[test]
    fn test_join_lines_normalizes_crlf() {
        let joined = join_lines("a\r\nb\r\n");
        assert_eq!(joined, format!("a{LINE_SEPARATOR}b"));
    }

    #[test]
    fn test_join_lines_empty() {
        assert_eq!(join_lines(""), "");
    }
}

//! Line based editing of text files.
//!
//! The text functions work on in-memory bytes so files in any encoding are
//! kept intact. The file functions are thin wrappers that read, apply, and
//! write back only when something changed.
use std::path::Path;

use crate::error::{AddContext, InstallerError};

fn lines(text: &[u8]) -> impl Iterator<Item = &[u8]> {
    text.split(|byte| *byte == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty()
        || haystack
            .windows(needle.len())
            .any(|window| window == needle)
}

/// Appends `line` (preceded by `comment`) unless a line equal to `line` exists.
///
/// Returns `None` when the text already contains the line.
///
/// The comparison is exact: a line differing only in whitespace does not count.
pub fn ensure_line_exists(text: &[u8], line: &str, comment: Option<&str>) -> Option<Vec<u8>> {
    if lines(text).any(|existing| existing == line.as_bytes()) {
        return None;
    }

    let mut output = Vec::with_capacity(text.len() + line.len() + 2);
    output.extend_from_slice(text);

    if !output.is_empty() && !output.ends_with(b"\n") {
        output.push(b'\n');
    }

    if let Some(comment) = comment {
        output.extend_from_slice(comment.as_bytes());
        output.push(b'\n');
    }

    output.extend_from_slice(line.as_bytes());
    output.push(b'\n');

    Some(output)
}

/// Removes every line containing `pattern`.
///
/// Returns `None` when no line matched.
pub fn remove_lines_matching(text: &[u8], pattern: &str) -> Option<Vec<u8>> {
    let pattern = pattern.as_bytes();

    if !lines(text).any(|line| contains(line, pattern)) {
        return None;
    }

    let output = text
        .split_inclusive(|byte| *byte == b'\n')
        .filter(|line| !contains(line, pattern))
        .flatten()
        .copied()
        .collect();

    Some(output)
}

/// Applies [`ensure_line_exists`] to a file, creating the file if absent.
///
/// Returns whether the file was created.
pub fn ensure_line_in_file(
    path: &Path,
    line: &str,
    comment: Option<&str>,
) -> Result<bool, InstallerError> {
    let created = !path.exists();

    let text = if created {
        Vec::new()
    } else {
        tracing::debug!(?path, "reading file");
        std::fs::read(path).with_contextc(|_| format!("could not read {path:?}"))?
    };

    match ensure_line_exists(&text, line, comment) {
        Some(new_text) => {
            tracing::info!(?path, line, "appending line");
            std::fs::write(path, new_text).with_contextc(|_| format!("could not write {path:?}"))?;
        }
        None => {
            tracing::info!(?path, "line already present");

            if created {
                std::fs::write(path, "")?;
            }
        }
    }

    Ok(created)
}

/// Applies [`remove_lines_matching`] to a file if it exists.
///
/// Returns whether the file was modified.
pub fn remove_lines_in_file(path: &Path, pattern: &str) -> Result<bool, InstallerError> {
    if !path.is_file() {
        tracing::debug!(?path, "file not present");
        return Ok(false);
    }

    let text = std::fs::read(path).with_contextc(|_| format!("could not read {path:?}"))?;

    match remove_lines_matching(&text, pattern) {
        Some(new_text) => {
            tracing::info!(?path, pattern, "removing lines");
            std::fs::write(path, new_text).with_contextc(|_| format!("could not write {path:?}"))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "export WEBKIT_DISABLE_DMABUF_RENDERER=1";
    const COMMENT: &str = "# Lumen: WEBKIT_DISABLE_DMABUF_RENDERER workaround";
    const PATTERN: &str = "WEBKIT_DISABLE_DMABUF_RENDERER";

    fn count_lines(text: &[u8], line: &str) -> usize {
        lines(text).filter(|existing| *existing == line.as_bytes()).count()
    }

    #[test]
    fn test_ensure_line_empty_text() {
        assert_eq!(
            ensure_line_exists(b"", LINE, Some(COMMENT)).unwrap(),
            format!("{COMMENT}\n{LINE}\n").into_bytes()
        );
    }

    #[test]
    fn test_ensure_line_missing_newline() {
        assert_eq!(
            ensure_line_exists(b"alias ll='ls -l'", LINE, None).unwrap(),
            format!("alias ll='ls -l'\n{LINE}\n").into_bytes()
        );
    }

    #[test]
    fn test_ensure_line_idempotent() {
        let once = ensure_line_exists(b"PS1='$ '\n", LINE, Some(COMMENT)).unwrap();

        assert!(ensure_line_exists(&once, LINE, Some(COMMENT)).is_none());
        assert_eq!(count_lines(&once, LINE), 1);
    }

    #[test]
    fn test_ensure_line_crlf() {
        let text = format!("a\r\n{LINE}\r\n");

        assert!(ensure_line_exists(text.as_bytes(), LINE, None).is_none());
    }

    #[test]
    fn test_ensure_line_exact_match_only() {
        let text = format!("  {LINE}\n");
        let patched = ensure_line_exists(text.as_bytes(), LINE, None).unwrap();

        assert_eq!(patched, format!("  {LINE}\n{LINE}\n").into_bytes());
    }

    #[test]
    fn test_remove_lines() {
        let text = format!("a\n{COMMENT}\n{LINE}\nb\n");

        assert_eq!(
            remove_lines_matching(text.as_bytes(), PATTERN).unwrap(),
            b"a\nb\n"
        );
        assert!(remove_lines_matching(b"a\nb\n", PATTERN).is_none());
    }

    #[test]
    fn test_remove_last_line_without_newline() {
        let text = format!("a\n{LINE}");

        assert_eq!(
            remove_lines_matching(text.as_bytes(), PATTERN).unwrap(),
            b"a\n"
        );
    }

    #[test]
    fn test_file_twice_single_occurrence() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".bashrc");

        assert!(ensure_line_in_file(&path, LINE, Some(COMMENT)).unwrap());
        assert!(!ensure_line_in_file(&path, LINE, Some(COMMENT)).unwrap());

        let text = std::fs::read(&path).unwrap();
        assert_eq!(count_lines(&text, LINE), 1);

        assert!(remove_lines_in_file(&path, PATTERN).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), b"");
        assert!(!remove_lines_in_file(&path, PATTERN).unwrap());
    }

    #[test]
    fn test_file_latin1_preserved() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".bashrc");
        let original: &[u8] = b"# caf\xe9 latin-1 comment\nalias ll='ls -l'\n";

        std::fs::write(&path, original).unwrap();

        assert!(!ensure_line_in_file(&path, LINE, Some(COMMENT)).unwrap());
        assert!(!ensure_line_in_file(&path, LINE, Some(COMMENT)).unwrap());

        let patched = std::fs::read(&path).unwrap();
        assert!(patched.starts_with(original));
        assert_eq!(count_lines(&patched, LINE), 1);

        assert!(remove_lines_in_file(&path, PATTERN).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_remove_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();

        assert!(!remove_lines_in_file(&temp_dir.path().join(".zshrc"), "X").unwrap());
    }
}

//! Line buffers and the one-line lookback emitter used by every rewrite pass.

use std::fs;
use std::path::Path;

use super::PatchResult;
use crate::error::PatchError;

/// Line terminator of a file, taken from its first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(pos) if text[..pos].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Full text of a generated file as ordered lines without terminators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineBuffer {
    lines: Vec<String>,
    trailing_newline: bool,
    ending: LineEnding,
}

impl LineBuffer {
    pub fn from_text(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let lines = text.lines().map(str::to_string).collect();
        LineBuffer {
            lines,
            trailing_newline,
            ending: LineEnding::detect(text),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        LineBuffer {
            lines,
            trailing_newline: true,
            ending: LineEnding::Lf,
        }
    }

    /// Read a whole file. A missing file is `PatchError::FileNotFound`.
    pub fn read(path: &Path) -> PatchResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PatchError::FileNotFound(path.display().to_string())
            } else {
                PatchError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Ok(Self::from_text(&text))
    }

    /// Replace the file contents with this buffer.
    pub fn write(&self, path: &Path) -> PatchResult<()> {
        fs::write(path, self.to_text()).map_err(|e| PatchError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn to_text(&self) -> String {
        let terminator = self.ending.as_str();
        let mut text = self.lines.join(terminator);
        if self.trailing_newline && !self.lines.is_empty() {
            text.push_str(terminator);
        }
        text
    }

    pub fn line_ending(&self) -> LineEnding {
        self.ending
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Same terminator convention, new content. Each pass builds a fresh buffer.
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        LineBuffer {
            lines,
            trailing_newline: self.trailing_newline,
            ending: self.ending,
        }
    }
}

/// Output side of a pass: everything emitted so far, with the most recently
/// emitted line held back so a later line can still rewrite it.
///
/// Rewrite rules look at the held line when the *next* input line arrives and
/// either replace it or let it commit on the next `emit`.
#[derive(Debug, Default)]
pub struct Lookback {
    committed: Vec<String>,
    held: Option<String>,
}

impl Lookback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one line; the previously held line is committed.
    pub fn emit(&mut self, line: impl Into<String>) {
        if let Some(previous) = self.held.replace(line.into()) {
            self.committed.push(previous);
        }
    }

    /// Emit a block of lines; the last one becomes the held line.
    pub fn emit_block<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.emit(line);
        }
    }

    /// The held line, if any
    pub fn held(&self) -> Option<&str> {
        self.held.as_deref()
    }

    /// Replace the held line. No-op when nothing has been emitted yet.
    pub fn replace_held(&mut self, line: String) {
        if let Some(held) = self.held.as_mut() {
            *held = line;
        }
    }

    /// All emitted lines, held line included
    pub fn finish(mut self) -> Vec<String> {
        if let Some(held) = self.held.take() {
            self.committed.push(held);
        }
        self.committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_text_roundtrip_keeps_terminator_convention() {
        let with_newline = LineBuffer::from_text("a\nb\n");
        assert_eq!(with_newline.lines(), &["a", "b"]);
        assert_eq!(with_newline.to_text(), "a\nb\n");

        let without_newline = LineBuffer::from_text("a\n\nb");
        assert_eq!(without_newline.len(), 3);
        assert_eq!(without_newline.to_text(), "a\n\nb");
    }

    #[test]
    fn test_crlf_text_keeps_crlf_terminators() {
        let text = "module top\r\n(\r\n);\r\n";
        let buffer = LineBuffer::from_text(text);
        assert_eq!(buffer.lines(), &["module top", "(", ");"]);
        assert_eq!(buffer.line_ending(), LineEnding::CrLf);
        assert_eq!(buffer.to_text(), text);

        let rebuilt = buffer.with_lines(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(rebuilt.to_text(), "a\r\nb\r\n");

        let unterminated = LineBuffer::from_text("a\r\nb");
        assert_eq!(unterminated.to_text(), "a\r\nb");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = LineBuffer::read(&temp_dir.path().join("nope.v"));
        assert!(matches!(result, Err(PatchError::FileNotFound(_))));
    }

    #[test]
    fn test_lookback_rewrites_only_held_line() {
        let mut out = Lookback::new();
        out.emit("first");
        out.emit("second");
        assert_eq!(out.held(), Some("second"));
        out.replace_held("SECOND".to_string());
        out.emit("third");
        assert_eq!(out.finish(), vec!["first", "SECOND", "third"]);
    }

    #[test]
    fn test_lookback_block_holds_last_line() {
        let mut out = Lookback::new();
        out.emit("head");
        out.emit_block(vec!["a", "b"]);
        assert_eq!(out.held(), Some("b"));
        out.replace_held("b'".to_string());
        assert_eq!(out.finish(), vec!["head", "a", "b'"]);
    }

    #[test]
    fn test_replace_without_held_is_noop() {
        let mut out = Lookback::new();
        out.replace_held("ghost".to_string());
        assert!(out.finish().is_empty());
    }
}

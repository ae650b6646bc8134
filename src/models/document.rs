//! Immutable document snapshots

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::edit::{Position, Range, TextEdit};

/// Stable identity of a document (its URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Identity derived from a file path (`file://` URI)
    pub fn from_path(path: &Path) -> Self {
        let display = path.display().to_string().replace('\\', "/");
        if display.starts_with('/') {
            Self(format!("file://{}", display))
        } else {
            Self(format!("file:///{}", display))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a document's text for the duration of one invocation
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    path: Option<PathBuf>,
    text: String,
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(id: DocumentId, path: Option<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            id,
            path,
            text,
            line_starts,
        }
    }

    /// Snapshot of a file on disk, identified by its path
    pub fn from_file(path: &Path, text: impl Into<String>) -> Self {
        Self::new(DocumentId::from_path(path), Some(path.to_path_buf()), text)
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines; an empty document has one empty line
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Text of a line without its terminator
    pub fn line(&self, index: usize) -> Option<&str> {
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line = &self.text[start..end];
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    /// Line length in UTF-16 code units
    pub fn line_len(&self, index: usize) -> Option<u32> {
        self.line(index).map(utf16_len)
    }

    /// Range spanning the entire document
    pub fn full_range(&self) -> Range {
        let last = self.line_count() - 1;
        let last_len = self.line_len(last).unwrap_or(0);
        Range::new(Position::new(0, 0), Position::new(last as u32, last_len))
    }

    /// Text produced by applying an edit to this snapshot
    pub fn apply(&self, edit: &TextEdit) -> String {
        let start = self.offset_of(edit.range.start);
        let end = self.offset_of(edit.range.end).max(start);
        let mut out = String::with_capacity(self.text.len() + edit.new_text.len());
        out.push_str(&self.text[..start]);
        out.push_str(&edit.new_text);
        out.push_str(&self.text[end..]);
        out
    }

    /// Byte offset for a position, clamped to the document
    fn offset_of(&self, pos: Position) -> usize {
        let Some(line) = self.line(pos.line as usize) else {
            return self.text.len();
        };
        let line_start = self.line_starts[pos.line as usize];

        let mut units = 0u32;
        for (byte, ch) in line.char_indices() {
            if units >= pos.character {
                return line_start + byte;
            }
            units += ch.len_utf16() as u32;
        }
        line_start + line.len()
    }
}

fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

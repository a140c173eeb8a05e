use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier for a source file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A half-open byte range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn is_valid(self) -> bool {
        self.start <= self.end
    }
}

impl From<hoist_syntax::TextRange> for TextRange {
    fn from(range: hoist_syntax::TextRange) -> Self {
        Self::new(range.start().into(), range.end().into())
    }
}

/// Replace `range` of `file` with `replacement`.
///
/// Equivalent to the `(offset, length, replacement)` triple used by edit consumers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub file: FileId,
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn insert(file: FileId, offset: usize, text: impl Into<String>) -> Self {
        Self::replace(file, TextRange::new(offset, offset), text)
    }

    pub fn replace(file: FileId, range: TextRange, text: impl Into<String>) -> Self {
        Self {
            file,
            range,
            replacement: text.into(),
        }
    }

    pub fn delete(file: FileId, range: TextRange) -> Self {
        Self::replace(file, range, String::new())
    }

    pub fn offset(&self) -> usize {
        self.range.start
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_insert(&self) -> bool {
        self.range.is_empty()
    }
}

/// A set of edits that must be applied together.
///
/// After [`WorkspaceEdit::normalize`] the edits are sorted by file and offset, free of exact
/// duplicates and pairwise non-overlapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEdit {
    pub edits: Vec<TextEdit>,
}

impl WorkspaceEdit {
    pub fn new(edits: Vec<TextEdit>) -> Self {
        Self { edits }
    }

    /// Edits that target `file`, in normalized order.
    pub fn edits_for<'a>(&'a self, file: &'a FileId) -> impl Iterator<Item = &'a TextEdit> + 'a {
        self.edits.iter().filter(move |edit| &edit.file == file)
    }

    pub fn normalize(&mut self) -> Result<(), EditError> {
        if let Some(edit) = self.edits.iter().find(|edit| !edit.range.is_valid()) {
            return Err(EditError::InvalidRange {
                file: edit.file.clone(),
                range: edit.range,
            });
        }

        // Inserts sort before a replacement starting at the same offset, so an insertion at
        // the start of a removed range lands in front of it.
        self.edits.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.range.start.cmp(&b.range.start))
                .then(a.range.end.cmp(&b.range.end))
        });
        self.edits.dedup();

        let mut merged: Vec<TextEdit> = Vec::with_capacity(self.edits.len());
        for edit in std::mem::take(&mut self.edits) {
            let Some(last) = merged.last_mut() else {
                merged.push(edit);
                continue;
            };
            if last.file != edit.file {
                merged.push(edit);
                continue;
            }
            if last.range == edit.range && last.is_insert() {
                last.replacement.push_str(&edit.replacement);
                continue;
            }
            if edit.range.start < last.range.end || last.range == edit.range {
                return Err(EditError::OverlappingEdits {
                    file: edit.file,
                    first: last.range,
                    second: edit.range,
                });
            }
            merged.push(edit);
        }
        self.edits = merged;
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("invalid text range {range:?} in {file}")]
    InvalidRange { file: FileId, range: TextRange },
    #[error("overlapping edits in {file}: {first:?} overlaps {second:?}")]
    OverlappingEdits {
        file: FileId,
        first: TextRange,
        second: TextRange,
    },
    #[error("text edit range {range:?} is outside the file bounds (len={len}) in {file}")]
    OutOfBounds {
        file: FileId,
        range: TextRange,
        len: usize,
    },
}

/// Applies non-overlapping `edits` to `original`.
pub fn apply_text_edits(original: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    // Back to front so earlier offsets stay valid; at equal offsets the replacement goes
    // first so that a same-offset insert ends up in front of it.
    ordered.sort_by(|a, b| {
        b.range
            .start
            .cmp(&a.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });

    let mut out = original.to_string();
    for edit in ordered {
        let in_bounds = edit.range.is_valid()
            && edit.range.end <= out.len()
            && out.is_char_boundary(edit.range.start)
            && out.is_char_boundary(edit.range.end);
        if !in_bounds {
            return Err(EditError::OutOfBounds {
                file: edit.file.clone(),
                range: edit.range,
                len: out.len(),
            });
        }
        out.replace_range(edit.range.start..edit.range.end, &edit.replacement);
    }
    Ok(out)
}

//! Byte-range safe code rewriter.
//!
//! Applies edits using byte ranges, preserving formatting and rejecting
//! overlaps.
//!
//! # Usage
//!
//! ```
//! use gettype_nameof::fix::{ByteRangeRewriter, Edit};
//!
//! let source = "var n = GetType().Name;";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edit(Edit::new(8, 22, "nameof(C)"));
//! let fixed = rewriter.apply().expect("should apply");
//! assert_eq!(fixed, "var n = nameof(C);");
//! ```

use ruff_text_size::TextRange;

/// A single edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start byte offset (inclusive)
    pub start_byte: usize,
    /// End byte offset (exclusive)
    pub end_byte: usize,
    /// Replacement content
    pub replacement: String,
    /// Optional description for logging
    pub description: Option<String>,
}

impl Edit {
    /// Create a new edit
    #[must_use]
    pub fn new(start_byte: usize, end_byte: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_byte,
            end_byte,
            replacement: replacement.into(),
            description: None,
        }
    }

    /// Create an edit replacing `range`
    #[must_use]
    pub fn replace_range(range: TextRange, replacement: impl Into<String>) -> Self {
        Self::new(range.start().to_usize(), range.end().to_usize(), replacement)
    }

    /// Attach a description used in logs
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this edit overlaps with another
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Two or more edits have overlapping ranges
    #[error("Overlapping edits at indices {edit_a} and {edit_b}")]
    OverlappingEdits {
        /// Index of first overlapping edit
        edit_a: usize,
        /// Index of second overlapping edit
        edit_b: usize,
    },
    /// Edit range is out of bounds
    #[error("Edit {edit_index} out of bounds: end_byte {end_byte} > source length {source_len}")]
    OutOfBounds {
        /// Index of the bad edit
        edit_index: usize,
        /// End byte of the edit
        end_byte: usize,
        /// Length of the source
        source_len: usize,
    },
    /// Edit range splits a UTF-8 character
    #[error("Edit {edit_index} does not fall on character boundaries")]
    NotCharBoundary {
        /// Index of the bad edit
        edit_index: usize,
    },
}

/// Safe code rewriter using byte ranges
///
/// This rewriter applies edits in reverse order to preserve byte positions,
/// and validates that edits don't overlap.
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter {
    source: String,
    edits: Vec<Edit>,
}

impl ByteRangeRewriter {
    /// Create a new rewriter for the given source
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Get the number of pending edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Validate edits without applying them
    ///
    /// # Errors
    /// Returns error if edits overlap, are out of bounds or split a character
    pub fn validate(&self) -> Result<(), RewriteError> {
        for (i, edit) in self.edits.iter().enumerate() {
            if edit.end_byte > self.source.len() || edit.start_byte > edit.end_byte {
                return Err(RewriteError::OutOfBounds {
                    edit_index: i,
                    end_byte: edit.end_byte,
                    source_len: self.source.len(),
                });
            }
            if !self.source.is_char_boundary(edit.start_byte)
                || !self.source.is_char_boundary(edit.end_byte)
            {
                return Err(RewriteError::NotCharBoundary { edit_index: i });
            }
        }

        for i in 0..self.edits.len() {
            for j in (i + 1)..self.edits.len() {
                if self.edits[i].overlaps(&self.edits[j]) {
                    return Err(RewriteError::OverlappingEdits {
                        edit_a: i,
                        edit_b: j,
                    });
                }
            }
        }

        Ok(())
    }

    /// Apply all edits and return the modified source
    ///
    /// Edits are applied in reverse order (by start position) to preserve
    /// byte offsets as we modify the string.
    ///
    /// # Errors
    /// Returns error if validation fails; the source is left untouched
    pub fn apply(self) -> Result<String, RewriteError> {
        self.validate()?;

        let mut result = self.source;
        let mut sorted_edits = self.edits;
        sorted_edits.sort_by(|a, b| b.start_byte.cmp(&a.start_byte));

        for edit in sorted_edits {
            if let Some(description) = &edit.description {
                tracing::trace!(start = edit.start_byte, end = edit.end_byte, "{description}");
            }
            result.replace_range(edit.start_byte..edit.end_byte, &edit.replacement);
        }

        Ok(result)
    }
}

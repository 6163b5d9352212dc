//! Character offset <-> line/column conversion
//!
//! Offsets are character indices (Unicode scalar values), lines and columns
//! are 0-indexed, and only `\n` starts a new line. The newline character
//! itself sits at the end of the line it terminates.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// A position in query text (0-indexed line and column)
///
/// Ordering follows document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub line: usize,
    pub column: usize,
}

impl Coordinate {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Map a character index to its line and column
///
/// `index == text.chars().count()` is the end-of-document position, right
/// after the last character. Anything beyond that is an `InvalidCoordinate`.
pub fn coordinate_of(text: &str, index: usize) -> Result<Coordinate> {
    let mut line = 0;
    let mut column = 0;
    let mut seen = 0;

    for ch in text.chars() {
        if seen == index {
            return Ok(Coordinate::new(line, column));
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
        seen += 1;
    }

    if seen == index {
        Ok(Coordinate::new(line, column))
    } else {
        Err(ValidationError::InvalidCoordinate { index, len: seen })
    }
}

/// Precomputed line starts for repeated conversions over the same text
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Character offset at which each line begins
    starts: Vec<usize>,
    /// Length of the text in characters
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        let mut len = 0;
        for ch in text.chars() {
            len += 1;
            if ch == '\n' {
                starts.push(len);
            }
        }
        Self { starts, len }
    }

    /// Length of the indexed text in characters
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Same mapping as [`coordinate_of`], in logarithmic time
    pub fn coordinate(&self, index: usize) -> Result<Coordinate> {
        if index > self.len {
            return Err(ValidationError::InvalidCoordinate {
                index,
                len: self.len,
            });
        }
        let line = self.starts.partition_point(|&start| start <= index) - 1;
        Ok(Coordinate::new(line, index - self.starts[line]))
    }

    /// Inverse of [`LineIndex::coordinate`]
    pub fn offset(&self, coordinate: Coordinate) -> Result<usize> {
        let index = self
            .starts
            .get(coordinate.line)
            .and_then(|start| start.checked_add(coordinate.column))
            .unwrap_or(usize::MAX);
        let line_end = coordinate
            .line
            .checked_add(1)
            .and_then(|next| self.starts.get(next))
            .copied()
            .unwrap_or(self.len + 1);

        if index >= line_end || index > self.len {
            return Err(ValidationError::InvalidCoordinate {
                index,
                len: self.len,
            });
        }
        Ok(index)
    }
}

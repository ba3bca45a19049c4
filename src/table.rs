//! Flattened report tables
//!
//! A `FlattenedTable` is the rectangular grid of strings produced by the report
//! flattener. Row 0 is the group-header row: a non-blank cell opens a new
//! column group, a blank cell continues the group to its left.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a table is rejected before it is partitioned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("malformed table: no rows")]
    Empty,
    #[error("malformed table: header row has no columns")]
    NoColumns,
    #[error("malformed table: first header cell is blank")]
    BlankLeadingHeader,
    #[error("malformed table: row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A cell is blank when it is empty. Absent cells are read as empty.
pub fn is_blank(cell: &str) -> bool {
    cell.is_empty()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Option<String>>>", into = "Vec<Vec<String>>")]
pub struct FlattenedTable {
    rows: Vec<Vec<String>>,
}

impl FlattenedTable {
    /// Validate and wrap a grid of rows
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let header = rows.first().ok_or(TableError::Empty)?;
        let width = header.len();
        if width == 0 {
            return Err(TableError::NoColumns);
        }
        if is_blank(&header[0]) {
            return Err(TableError::BlankLeadingHeader);
        }

        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .map(|(index, row)| (index, row.len()))
            .find(|(_, len)| *len != width)
        {
            return Err(TableError::Ragged {
                row,
                expected: width,
                found,
            });
        }

        Ok(Self { rows })
    }

    /// Build a table from string slices, mostly useful for fixtures
    pub fn from_rows<R, C>(rows: R) -> Result<Self, TableError>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

impl TryFrom<Vec<Vec<Option<String>>>> for FlattenedTable {
    type Error = TableError;

    fn try_from(rows: Vec<Vec<Option<String>>>) -> Result<Self, Self::Error> {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
                .collect(),
        )
    }
}

impl From<FlattenedTable> for Vec<Vec<String>> {
    fn from(table: FlattenedTable) -> Self {
        table.rows
    }
}

//! Column partitioning
//!
//! Splits a flattened table into contiguous column groups using the
//! group-header row. Index 0 always opens the first group; every later
//! non-blank header cell closes the open group and starts a new one.

use serde::{Deserialize, Serialize};

use crate::table::{TableError, is_blank};

/// Contiguous slice of columns belonging to one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub start: usize,
    pub end: usize,
}

impl ColumnRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// How the upper bound of the last range is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Every range ends on its last column
    #[default]
    Inclusive,
    /// The last range ends one past the final column, as older exports did
    Legacy,
}

/// Compute the column groups of a header row
pub fn partition<S: AsRef<str>>(
    header: &[S],
    policy: RangePolicy,
) -> Result<Vec<ColumnRange>, TableError> {
    let first = header.first().ok_or(TableError::NoColumns)?;
    if is_blank(first.as_ref()) {
        return Err(TableError::BlankLeadingHeader);
    }

    let mut ranges = Vec::new();
    let mut start = 0;
    let mut end = 1;

    for cell in &header[1..] {
        if !is_blank(cell.as_ref()) {
            ranges.push(ColumnRange::new(start, end - 1));
            start = end;
        }
        end += 1;
    }

    let last = match policy {
        RangePolicy::Inclusive => end - 1,
        RangePolicy::Legacy => end,
    };
    ranges.push(ColumnRange::new(start, last));

    Ok(ranges)
}

/// Slice every row into one sub-table per range.
///
/// Bounds are clamped to the row width so `Legacy` ranges slice the same
/// columns as `Inclusive` ones.
pub fn slice_columns(rows: &[Vec<String>], ranges: &[ColumnRange]) -> Vec<Vec<Vec<String>>> {
    ranges
        .iter()
        .map(|range| {
            rows.iter()
                .map(|row| {
                    let start = range.start.min(row.len());
                    let end = (range.end + 1).min(row.len());
                    row[start..end].to_vec()
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(pairs: &[(usize, usize)]) -> Vec<ColumnRange> {
        pairs.iter().map(|&(s, e)| ColumnRange::new(s, e)).collect()
    }

    #[test]
    fn test_partition_groups_inclusive() {
        let header = ["A", "", "B", "", "", "C"];
        let result = partition(&header, RangePolicy::Inclusive).unwrap();
        assert_eq!(result, ranges(&[(0, 1), (2, 4), (5, 5)]));
    }

    #[test]
    fn test_partition_groups_legacy_last_bound() {
        let header = ["A", "", "B", "", "", "C"];
        let result = partition(&header, RangePolicy::Legacy).unwrap();
        assert_eq!(result, ranges(&[(0, 1), (2, 4), (5, 6)]));
    }

    #[test]
    fn test_single_column() {
        let result = partition(&["Only"], RangePolicy::Inclusive).unwrap();
        assert_eq!(result, ranges(&[(0, 0)]));
    }

    #[test]
    fn test_trailing_blanks_join_last_group() {
        let result = partition(&["A", "B", "", ""], RangePolicy::Inclusive).unwrap();
        assert_eq!(result, ranges(&[(0, 0), (1, 3)]));
    }

    #[test]
    fn test_every_cell_a_group() {
        let result = partition(&["A", "B", "C"], RangePolicy::Inclusive).unwrap();
        assert_eq!(result, ranges(&[(0, 0), (1, 1), (2, 2)]));
    }

    #[test]
    fn test_rejects_malformed_header() {
        let empty: [&str; 0] = [];
        assert_eq!(
            partition(&empty, RangePolicy::Inclusive),
            Err(TableError::NoColumns)
        );
        assert_eq!(
            partition(&["", "A"], RangePolicy::Inclusive),
            Err(TableError::BlankLeadingHeader)
        );
    }

    #[test]
    fn test_inclusive_ranges_cover_all_columns() {
        let headers: [&[&str]; 4] = [
            &["A", "", "", "B", "C", "", "D"],
            &["A", "", "", ""],
            &["A", "B", "", "C", ""],
            &["Patient", "", "", "", "Visit 1", "", "Visit 2", ""],
        ];

        for header in headers {
            let result = partition(header, RangePolicy::Inclusive).unwrap();
            let groups = header.iter().filter(|cell| !cell.is_empty()).count();
            assert_eq!(result.len(), groups);
            assert_eq!(result.first().unwrap().start, 0);
            assert_eq!(result.last().unwrap().end, header.len() - 1);
            for pair in result.windows(2) {
                assert_eq!(pair[0].end + 1, pair[1].start);
                assert!(pair[0].start <= pair[0].end);
            }
        }
    }

    #[test]
    fn test_slice_columns_two_tabs() {
        let rows = vec![
            vec!["H1".to_string(), "".to_string(), "H2".to_string()],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        ];
        let result = partition(&rows[0], RangePolicy::Inclusive).unwrap();
        let tabs = slice_columns(&rows, &result);

        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0], vec![vec!["H1", ""], vec!["a", "b"]]);
        assert_eq!(tabs[1], vec![vec!["H2"], vec!["c"]]);
    }

    #[test]
    fn test_legacy_ranges_slice_same_columns() {
        let rows = vec![
            vec!["A".to_string(), "".to_string(), "B".to_string(), "".to_string()],
            vec!["1".to_string(), "2".to_string(), "3".to_string(), "4".to_string()],
        ];
        let inclusive = partition(&rows[0], RangePolicy::Inclusive).unwrap();
        let legacy = partition(&rows[0], RangePolicy::Legacy).unwrap();

        assert_ne!(inclusive, legacy);
        assert_eq!(slice_columns(&rows, &inclusive), slice_columns(&rows, &legacy));
    }
}

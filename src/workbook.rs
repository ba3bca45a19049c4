//! Tab building and spreadsheet output

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};

use crate::partition::{ColumnRange, slice_columns};

/// One output tab: a rectangular slice of the flattened table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTab {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Slice `rows` into one tab per range, named `Tab1..TabN` in range order
pub fn build_tabs(rows: &[Vec<String>], ranges: &[ColumnRange]) -> Vec<SheetTab> {
    slice_columns(rows, ranges)
        .into_iter()
        .enumerate()
        .map(|(index, rows)| SheetTab {
            name: format!("Tab{}", index + 1),
            rows,
        })
        .collect()
}

/// Writes a set of tabs to disk and returns the files it produced
pub trait TableWriter: Send + Sync {
    fn write(&self, tabs: &[SheetTab], path: &Path) -> Result<Vec<PathBuf>>;
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
            debug!("Created output directory: {:?}", parent);
        }
    }
    Ok(())
}

/// Worksheet limits of the xlsx format
pub const XLSX_MAX_ROWS: usize = 1_048_576;
pub const XLSX_MAX_COLUMNS: usize = 16_384;

fn check_sheet_size(tab: &SheetTab) -> Result<()> {
    let width = tab.rows.iter().map(Vec::len).max().unwrap_or(0);
    if width > XLSX_MAX_COLUMNS {
        bail!(
            "{} has {} columns, more than the {} an xlsx sheet can hold",
            tab.name,
            width,
            XLSX_MAX_COLUMNS
        );
    }
    if tab.rows.len() > XLSX_MAX_ROWS {
        bail!(
            "{} has {} rows, more than the {} an xlsx sheet can hold",
            tab.name,
            tab.rows.len(),
            XLSX_MAX_ROWS
        );
    }
    Ok(())
}

/// Multi-tab `.xlsx` workbook, one worksheet per tab
#[derive(Debug, Default)]
pub struct XlsxWriter;

impl TableWriter for XlsxWriter {
    fn write(&self, tabs: &[SheetTab], path: &Path) -> Result<Vec<PathBuf>> {
        for tab in tabs {
            check_sheet_size(tab)?;
        }

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for tab in tabs {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&tab.name)?;

            for (row, cells) in tab.rows.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    if cell.is_empty() {
                        continue;
                    }
                    if row == 0 {
                        sheet.write_string_with_format(row as u32, col as u16, cell, &header_format)?;
                    } else {
                        sheet.write_string(row as u32, col as u16, cell)?;
                    }
                }
            }
        }

        // Nothing touches the disk until the whole workbook is built
        ensure_parent_dir(path)?;
        workbook
            .save(path)
            .with_context(|| format!("Failed to save Excel file: {:?}", path))?;

        info!("Wrote {} tabs to {:?}", tabs.len(), path);
        Ok(vec![path.to_path_buf()])
    }
}

/// One CSV file per tab, named `<stem>_<tab>.csv` next to `path`
#[derive(Debug, Default)]
pub struct CsvTabsWriter;

impl CsvTabsWriter {
    pub fn tab_path(path: &Path, tab: &SheetTab) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        path.with_file_name(format!("{}_{}.csv", stem, tab.name))
    }
}

impl TableWriter for CsvTabsWriter {
    fn write(&self, tabs: &[SheetTab], path: &Path) -> Result<Vec<PathBuf>> {
        let mut buffers = Vec::with_capacity(tabs.len());
        for tab in tabs {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in &tab.rows {
                writer.write_record(row)?;
            }
            let bytes = writer
                .into_inner()
                .with_context(|| format!("Failed to encode {} as CSV", tab.name))?;
            buffers.push((Self::tab_path(path, tab), bytes));
        }

        ensure_parent_dir(path)?;
        let mut written = Vec::with_capacity(buffers.len());
        for (tab_path, bytes) in buffers {
            if let Err(e) = fs::write(&tab_path, bytes) {
                remove_written(&written);
                return Err(e).with_context(|| format!("Failed to write CSV file: {:?}", tab_path));
            }
            written.push(tab_path);
        }

        info!("Wrote {} CSV tabs next to {:?}", written.len(), path);
        Ok(written)
    }
}

/// Undo a partly written set of tab files
fn remove_written(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove partial output {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{RangePolicy, partition};

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_build_tabs_names_positionally() {
        let rows = rows(&[&["A", "", "B", "C"], &["1", "2", "3", "4"]]);
        let ranges = partition(&rows[0], RangePolicy::Inclusive).unwrap();
        let tabs = build_tabs(&rows, &ranges);

        let names: Vec<&str> = tabs.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Tab1", "Tab2", "Tab3"]);
        assert_eq!(tabs[0].rows, vec![vec!["A", ""], vec!["1", "2"]]);
        assert_eq!(tabs[2].rows, vec![vec!["C"], vec!["4"]]);
    }

    #[test]
    fn test_csv_tab_path() {
        let tab = SheetTab {
            name: "Tab2".to_string(),
            rows: vec![],
        };
        let path = CsvTabsWriter::tab_path(Path::new("/tmp/out/output.xlsx"), &tab);
        assert_eq!(path, PathBuf::from("/tmp/out/output_Tab2.csv"));
    }

    #[test]
    fn test_csv_writer_writes_one_file_per_tab() {
        let dir = tempfile::tempdir().unwrap();
        let rows = rows(&[&["H1", "", "H2"], &["a", "b,c", "d"]]);
        let ranges = partition(&rows[0], RangePolicy::Inclusive).unwrap();
        let tabs = build_tabs(&rows, &ranges);

        let files = CsvTabsWriter
            .write(&tabs, &dir.path().join("output.xlsx"))
            .unwrap();

        assert_eq!(files.len(), 2);
        let first = fs::read_to_string(&files[0]).unwrap();
        assert_eq!(first, "H1,\na,\"b,c\"\n");
        let second = fs::read_to_string(&files[1]).unwrap();
        assert_eq!(second, "H2\nd\n");
    }

    #[test]
    fn test_xlsx_writer_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("output.xlsx");
        let tabs = vec![SheetTab {
            name: "Tab1".to_string(),
            rows: rows(&[&["A"], &["1"]]),
        }];

        let files = XlsxWriter.write(&tabs, &path).unwrap();
        assert_eq!(files, vec![path.clone()]);
        assert!(path.exists());
    }

    #[test]
    fn test_csv_writer_removes_earlier_tabs_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let rows = rows(&[&["H1", "", "H2"], &["a", "b", "c"]]);
        let ranges = partition(&rows[0], RangePolicy::Inclusive).unwrap();
        let tabs = build_tabs(&rows, &ranges);

        // A directory in the way of the second tab
        fs::create_dir(dir.path().join("output_Tab2.csv")).unwrap();

        let result = CsvTabsWriter.write(&tabs, &dir.path().join("output.xlsx"));
        assert!(result.is_err());
        assert!(!dir.path().join("output_Tab1.csv").exists());
    }

    #[test]
    fn test_xlsx_writer_rejects_oversized_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.xlsx");
        let tabs = vec![SheetTab {
            name: "Tab1".to_string(),
            rows: vec![vec!["x".to_string(); XLSX_MAX_COLUMNS + 1]],
        }];

        let error = XlsxWriter.write(&tabs, &path).unwrap_err();
        assert!(error.to_string().contains("16384"));
        assert!(!path.exists());
    }
}

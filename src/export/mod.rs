//! Export step and the runtime that drives the wizard
//!
//! `export_prepared` is the one-shot export: flatten, partition, slice into
//! tabs, write. `ExportController` executes the wizard's effects on tokio and
//! feeds their results back into it.

pub mod command;
pub mod runtime;

use anyhow::{Context, Result};
use log::{info, warn};
use std::path::PathBuf;

use crate::config::{CsvOutput, ExportSettings};
use crate::partition::partition;
use crate::services::{DownloadGridData, ExportServices};
use crate::wizard::ExportFormat;
use crate::workbook::build_tabs;

pub use runtime::ExportController;

/// Outcome of a finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub tabs: usize,
    pub files: Vec<PathBuf>,
}

/// Flatten, partition and write one prepared download
pub fn export_prepared(
    data: &DownloadGridData,
    format: ExportFormat,
    settings: &ExportSettings,
    services: &ExportServices,
) -> Result<ExportReport> {
    let table = services
        .flattener
        .flatten(data)
        .context("Failed to flatten report data")?;

    let ranges = partition(table.header(), settings.range_policy)?;
    let tabs = build_tabs(table.rows(), &ranges);
    info!(
        "Partitioned {}x{} table into {} tabs",
        table.height(),
        table.width(),
        tabs.len()
    );

    let path = settings.output_path();
    let writer = match (format, settings.csv_output) {
        (ExportFormat::Csv, CsvOutput::PerTab) => &services.csv_writer,
        (ExportFormat::Csv, CsvOutput::Workbook) => {
            warn!("CSV selected but csv_output is 'workbook'; writing {:?}", path);
            &services.xlsx_writer
        }
        (ExportFormat::Xlsx, _) => &services.xlsx_writer,
    };

    let files = writer.write(&tabs, &path)?;
    Ok(ExportReport {
        tabs: tabs.len(),
        files,
    })
}

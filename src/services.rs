//! Collaborators the export flow depends on
//!
//! The wizard never reaches for ambient state: every service it needs is
//! handed to the controller through `ExportServices`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::table::FlattenedTable;
use crate::workbook::{CsvTabsWriter, TableWriter, XlsxWriter};

/// Everything the server prepares for one grid download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadGridData {
    pub download: Value,
    #[serde(default)]
    pub patient_grid: Value,
    #[serde(default)]
    pub forms: Vec<Value>,
    #[serde(default)]
    pub form_schemas: Vec<Value>,
    #[serde(default)]
    pub column_names_to_include: Vec<String>,
    #[serde(default)]
    pub patient_details_group_header: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Persists pending grid edits
#[async_trait]
pub trait SaveService: Send + Sync {
    async fn save_changes(&self) -> Result<()>;
}

/// Reloads the grid after a successful save
pub trait GridRefresher: Send + Sync {
    fn refresh_grid(&self);
}

/// Asks the server to prepare the download of one grid
#[async_trait]
pub trait DownloadPreparer: Send + Sync {
    async fn prepare_download(&self, grid_id: &str) -> Result<DownloadGridData>;
}

/// Turns prepared grid data into the flat report table
pub trait ReportFlattener: Send + Sync {
    fn flatten(&self, data: &DownloadGridData) -> Result<FlattenedTable>;
}

/// Injected dependencies of an export session
#[derive(Clone)]
pub struct ExportServices {
    pub save: Arc<dyn SaveService>,
    pub refresh: Option<Arc<dyn GridRefresher>>,
    pub preparer: Arc<dyn DownloadPreparer>,
    pub flattener: Arc<dyn ReportFlattener>,
    pub xlsx_writer: Arc<dyn TableWriter>,
    pub csv_writer: Arc<dyn TableWriter>,
}

impl ExportServices {
    pub fn new(
        save: Arc<dyn SaveService>,
        preparer: Arc<dyn DownloadPreparer>,
        flattener: Arc<dyn ReportFlattener>,
    ) -> Self {
        Self {
            save,
            refresh: None,
            preparer,
            flattener,
            xlsx_writer: Arc::new(XlsxWriter),
            csv_writer: Arc::new(CsvTabsWriter),
        }
    }

    pub fn with_refresh(mut self, refresh: Arc<dyn GridRefresher>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn with_xlsx_writer(mut self, writer: Arc<dyn TableWriter>) -> Self {
        self.xlsx_writer = writer;
        self
    }

    pub fn with_csv_writer(mut self, writer: Arc<dyn TableWriter>) -> Self {
        self.csv_writer = writer;
        self
    }
}

/// Save service for front ends that keep no unsaved edits
#[derive(Debug, Default)]
pub struct LoggingSaveService;

#[async_trait]
impl SaveService for LoggingSaveService {
    async fn save_changes(&self) -> Result<()> {
        info!("No pending grid edits to save");
        Ok(())
    }
}

/// Reads prepared downloads from `<data_dir>/<grid_id>.json`
#[derive(Debug, Clone)]
pub struct JsonFilePreparer {
    data_dir: PathBuf,
}

impl JsonFilePreparer {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, grid_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", grid_id))
    }
}

#[async_trait]
impl DownloadPreparer for JsonFilePreparer {
    async fn prepare_download(&self, grid_id: &str) -> Result<DownloadGridData> {
        let path = self.path_for(grid_id);
        debug!("Reading prepared download from: {:?}", path);

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read prepared download: {:?}", path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse prepared download: {:?}", path))
    }
}

/// Flattener for payloads whose `download` is already a 2-D array of cells.
///
/// When the column allow-list is non-empty, only columns whose second-row
/// label is on the list are kept, together with column 0.
#[derive(Debug, Default)]
pub struct PreflattenedReport;

impl ReportFlattener for PreflattenedReport {
    fn flatten(&self, data: &DownloadGridData) -> Result<FlattenedTable> {
        let table: FlattenedTable = serde_json::from_value(data.download.clone())
            .context("Prepared download is not a flattened table")?;

        if data.column_names_to_include.is_empty() || table.height() < 2 {
            return Ok(table);
        }

        let labels = &table.rows()[1];
        let keep: Vec<usize> = (0..table.width())
            .filter(|&col| col == 0 || data.column_names_to_include.contains(&labels[col]))
            .collect();
        debug!("Keeping {} of {} columns", keep.len(), table.width());

        let mut rows: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|row| keep.iter().map(|&col| row[col].clone()).collect())
            .collect();

        // A dropped group start would leave its kept columns attached to the
        // previous group, so carry the group label over to the first survivor.
        let header = table.header();
        let mut last_group = None;
        for (out, &col) in keep.iter().enumerate() {
            let group = (0..=col).rev().find(|&c| !header[c].is_empty()).unwrap_or(0);
            if last_group != Some(group) {
                rows[0][out] = header[group].clone();
                last_group = Some(group);
            }
        }

        Ok(FlattenedTable::new(rows)?)
    }
}

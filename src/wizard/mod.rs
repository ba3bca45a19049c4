//! The export wizard state machine
//!
//! `Wizard` is pure: `update()` takes a message and returns the side effects
//! the runtime must perform. Async results come back as messages tagged with
//! the session that started them, so results from a closed or reopened
//! wizard are dropped.
//!
//! Steps:
//! - `InternalExternal`: primary declares an external transfer and moves to
//!   the warning; secondary declares internal-only use and skips it.
//! - `ExternalConfirmation`: primary acknowledges the minimisation duty,
//!   secondary cancels.
//! - `ChooseDownload`: primary (once a format is chosen) saves and starts
//!   the download, secondary cancels.

pub mod resource;
pub mod view;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::export::ExportReport;
use crate::services::DownloadGridData;
use resource::{Delivery, Resource};
use view::StepView;

/// Generation counter, bumped every time the wizard opens
pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Xlsx];

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV (Comma-Separated Values)",
            ExportFormat::Xlsx => "XLSX (Microsoft Excel)",
        }
    }
}

/// When the prepared-data request is sent relative to the save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreparationOrder {
    /// Request prepared data only after the save succeeded
    #[default]
    AfterSave,
    /// Fire the save and the preparation request together
    Concurrent,
}

/// Side effects of an in-flight download
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DownloadProgress {
    pub save: Resource<()>,
    pub delivery: Delivery,
    /// Delivered data held back until the save succeeds
    pub pending: Option<Box<DownloadGridData>>,
    pub export: Resource<ExportReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardStep {
    InternalExternal,
    ExternalConfirmation,
    ChooseDownload {
        format: Option<ExportFormat>,
        /// `None` until the primary action starts the download
        download: Option<DownloadProgress>,
    },
}

impl WizardStep {
    fn choose_download() -> Self {
        WizardStep::ChooseDownload {
            format: None,
            download: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Msg {
    Open,
    Close,
    Primary,
    Secondary,
    SelectFormat(ExportFormat),
    SaveCompleted {
        session: SessionId,
        result: Result<(), String>,
    },
    DownloadPrepared {
        session: SessionId,
        result: Result<DownloadGridData, String>,
    },
    ExportCompleted {
        session: SessionId,
        result: Result<ExportReport, String>,
    },
}

/// Work the runtime performs on behalf of the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Save {
        session: SessionId,
    },
    RefreshGrid,
    Prepare {
        session: SessionId,
        grid_id: String,
    },
    Export {
        session: SessionId,
        data: Box<DownloadGridData>,
        format: ExportFormat,
    },
    /// The wizard closed itself (cancel or finished export)
    Closed,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    grid_id: String,
    order: PreparationOrder,
    open: bool,
    session: SessionId,
    step: WizardStep,
    last_export: Option<ExportReport>,
}

impl Wizard {
    /// A closed wizard for one grid
    pub fn new(grid_id: impl Into<String>, order: PreparationOrder) -> Self {
        Self {
            grid_id: grid_id.into(),
            order,
            open: false,
            session: 0,
            step: WizardStep::InternalExternal,
            last_export: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn grid_id(&self) -> &str {
        &self.grid_id
    }

    /// Report of the export that closed the most recent session
    pub fn last_export(&self) -> Option<&ExportReport> {
        self.last_export.as_ref()
    }

    pub fn download(&self) -> Option<&DownloadProgress> {
        match &self.step {
            WizardStep::ChooseDownload { download, .. } => download.as_ref(),
            _ => None,
        }
    }

    pub fn download_started(&self) -> bool {
        self.download().is_some()
    }

    pub fn primary_disabled(&self) -> bool {
        match &self.step {
            WizardStep::ChooseDownload { format, download } => {
                format.is_none() || download.is_some()
            }
            _ => false,
        }
    }

    pub fn view(&self) -> Option<StepView> {
        if !self.open {
            return None;
        }
        Some(StepView {
            danger: self.step.danger(),
            heading: self.step.heading(),
            body: self.step.body(),
            primary_text: self.step.primary_text(),
            secondary_text: self.step.secondary_text(),
            primary_disabled: self.primary_disabled(),
        })
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Open => self.open(),
            Msg::Close => self.close(),
            Msg::Primary if !self.open => vec![],
            Msg::Secondary if !self.open => vec![],
            Msg::Primary => self.primary(),
            Msg::Secondary => self.secondary(),
            Msg::SelectFormat(format) => self.select_format(format),
            Msg::SaveCompleted { session, result } => self.save_completed(session, result),
            Msg::DownloadPrepared { session, result } => self.download_prepared(session, result),
            Msg::ExportCompleted { session, result } => self.export_completed(session, result),
        }
    }

    fn open(&mut self) -> Vec<Effect> {
        if self.open {
            return vec![];
        }
        self.open = true;
        self.session += 1;
        self.step = WizardStep::InternalExternal;
        self.last_export = None;
        info!("Opened export wizard for grid {} (session {})", self.grid_id, self.session);
        vec![]
    }

    fn close(&mut self) -> Vec<Effect> {
        if !self.open {
            return vec![];
        }
        self.open = false;
        self.step = WizardStep::InternalExternal;
        info!("Closed export wizard (session {})", self.session);
        vec![Effect::Closed]
    }

    fn primary(&mut self) -> Vec<Effect> {
        if self.primary_disabled() {
            debug!("Primary action ignored while disabled");
            return vec![];
        }

        match &mut self.step {
            WizardStep::InternalExternal => {
                self.step = WizardStep::ExternalConfirmation;
                vec![]
            }
            WizardStep::ExternalConfirmation => {
                info!("External transfer acknowledged");
                self.step = WizardStep::choose_download();
                vec![]
            }
            WizardStep::ChooseDownload { download, .. } => {
                let mut progress = DownloadProgress {
                    save: Resource::Loading,
                    ..Default::default()
                };
                let mut effects = vec![Effect::Save {
                    session: self.session,
                }];
                if self.order == PreparationOrder::Concurrent {
                    progress.delivery = Delivery::Awaiting;
                    effects.push(Effect::Prepare {
                        session: self.session,
                        grid_id: self.grid_id.clone(),
                    });
                }
                *download = Some(progress);
                info!("Download started for grid {}", self.grid_id);
                effects
            }
        }
    }

    fn secondary(&mut self) -> Vec<Effect> {
        match self.step {
            WizardStep::InternalExternal => {
                self.step = WizardStep::choose_download();
                vec![]
            }
            WizardStep::ExternalConfirmation | WizardStep::ChooseDownload { .. } => self.close(),
        }
    }

    fn select_format(&mut self, selected: ExportFormat) -> Vec<Effect> {
        match &mut self.step {
            WizardStep::ChooseDownload {
                format,
                download: None,
            } if self.open => {
                *format = Some(selected);
            }
            _ => debug!("Format selection ignored outside the format choice"),
        }
        vec![]
    }

    fn is_current(&self, session: SessionId) -> bool {
        self.open && session == self.session
    }

    fn progress_mut(&mut self, session: SessionId) -> Option<&mut DownloadProgress> {
        if !self.is_current(session) {
            debug!("Dropping result for stale session {}", session);
            return None;
        }
        match &mut self.step {
            WizardStep::ChooseDownload {
                download: Some(progress),
                ..
            } => Some(progress),
            _ => None,
        }
    }

    fn save_completed(&mut self, session: SessionId, result: Result<(), String>) -> Vec<Effect> {
        let order = self.order;
        let grid_id = self.grid_id.clone();
        let format = self.format();
        let Some(progress) = self.progress_mut(session) else {
            return vec![];
        };

        match result {
            Ok(()) => {
                progress.save = Resource::Success(());
                let mut effects = vec![Effect::RefreshGrid];
                if order == PreparationOrder::AfterSave && progress.delivery == Delivery::NotRequested {
                    progress.delivery = Delivery::Awaiting;
                    effects.push(Effect::Prepare { session, grid_id });
                }
                if let (Some(data), Some(format)) = (progress.pending.take(), format) {
                    debug!("Save finished, exporting held download");
                    progress.export = Resource::Loading;
                    effects.push(Effect::Export {
                        session,
                        data,
                        format,
                    });
                }
                effects
            }
            Err(error) => {
                warn!("Saving grid changes failed: {}", error);
                if progress.pending.take().is_some() {
                    debug!("Discarding prepared download after a failed save");
                }
                progress.save = Resource::Failure(error);
                vec![]
            }
        }
    }

    fn format(&self) -> Option<ExportFormat> {
        match &self.step {
            WizardStep::ChooseDownload { format, .. } => *format,
            _ => None,
        }
    }

    fn download_prepared(
        &mut self,
        session: SessionId,
        result: Result<DownloadGridData, String>,
    ) -> Vec<Effect> {
        let Some(format) = self.format() else {
            return vec![];
        };
        let Some(progress) = self.progress_mut(session) else {
            return vec![];
        };

        if progress.save.is_failure() {
            debug!("Ignoring prepared download after a failed save");
            return vec![];
        }
        if !progress.delivery.is_awaiting() {
            warn!("Ignoring duplicate prepared download (state {:?})", progress.delivery);
            return vec![];
        }

        match result {
            Ok(data) => {
                progress.delivery = Delivery::Delivered;
                if progress.save != Resource::Success(()) {
                    // Concurrent order: never export data the save may still reject
                    debug!("Holding prepared download until the save finishes");
                    progress.pending = Some(Box::new(data));
                    return vec![];
                }
                progress.export = Resource::Loading;
                vec![Effect::Export {
                    session,
                    data: Box::new(data),
                    format,
                }]
            }
            Err(error) => {
                warn!("Preparing download failed: {}", error);
                progress.delivery = Delivery::Failed(error);
                vec![]
            }
        }
    }

    fn export_completed(
        &mut self,
        session: SessionId,
        result: Result<ExportReport, String>,
    ) -> Vec<Effect> {
        let Some(progress) = self.progress_mut(session) else {
            return vec![];
        };
        if progress.export != Resource::Loading {
            warn!("Ignoring export result with no export running");
            return vec![];
        }

        match result {
            Ok(report) => {
                info!("Export finished: {} tabs", report.tabs);
                progress.export = Resource::Success(report.clone());
                self.last_export = Some(report);
                self.close()
            }
            Err(error) => {
                warn!("Export failed: {}", error);
                progress.export = Resource::Failure(error);
                vec![]
            }
        }
    }
}

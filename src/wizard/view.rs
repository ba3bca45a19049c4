//! Presentation data for each wizard step

use super::{ExportFormat, WizardStep};
use crate::wizard::resource::{Delivery, Resource};

pub const INTERNAL_EXTERNAL_HEADING: &str = "Shared internally?";
pub const INTERNAL_EXTERNAL_BODY: &str =
    "Is the data extracted shared EXCLUSIVELY within the organisation?";
pub const INTERNAL_EXTERNAL_PRIMARY: &str = "No (external transfer)";
pub const INTERNAL_EXTERNAL_SECONDARY: &str = "Yes (only internal)";

pub const EXTERNAL_CONFIRMATION_HEADING: &str = "Please note";
pub const EXTERNAL_CONFIRMATION_BODY: &str = "Under the data protection rules, you are required to minimize the amount of personal data that is to be transferred outside of the organisation. You must edit the spreadsheet to ensure data minimization before sharing.";
pub const EXTERNAL_CONFIRMATION_PRIMARY: &str = "Proceed";

pub const CHOOSE_DOWNLOAD_HEADING: &str = "Download data as file";
pub const CHOOSE_DOWNLOAD_LEGEND: &str =
    "Select the file format that you want the data to be converted to";
pub const CHOOSE_DOWNLOAD_PRIMARY: &str = "Convert & Download";
pub const CHOOSE_DOWNLOAD_PRIMARY_STARTED: &str = "Converting...";

pub const CANCEL: &str = "Cancel";

pub const PREPARING_MESSAGE: &str = "Preparing your download... This may take some time. Please don't close or reload this window.";
pub const PREPARATION_ERROR: &str =
    "There was an error while preparing the download. You can close this modal and try again.";
pub const SAVE_ERROR: &str = "Your changes could not be saved, so the download was not started.";
pub const EXPORT_ERROR: &str = "The spreadsheet could not be written.";

/// Body of the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepBody {
    Text(&'static str),
    FormatChoice {
        legend: &'static str,
        options: Vec<(ExportFormat, &'static str)>,
        selected: Option<ExportFormat>,
    },
    Preparing(&'static str),
    Error(String),
}

/// Everything a front end needs to render the open wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub danger: bool,
    pub heading: &'static str,
    pub body: StepBody,
    pub primary_text: &'static str,
    pub secondary_text: &'static str,
    pub primary_disabled: bool,
}

impl WizardStep {
    pub fn danger(&self) -> bool {
        matches!(self, WizardStep::InternalExternal)
    }

    pub fn heading(&self) -> &'static str {
        match self {
            WizardStep::InternalExternal => INTERNAL_EXTERNAL_HEADING,
            WizardStep::ExternalConfirmation => EXTERNAL_CONFIRMATION_HEADING,
            WizardStep::ChooseDownload { .. } => CHOOSE_DOWNLOAD_HEADING,
        }
    }

    pub fn primary_text(&self) -> &'static str {
        match self {
            WizardStep::InternalExternal => INTERNAL_EXTERNAL_PRIMARY,
            WizardStep::ExternalConfirmation => EXTERNAL_CONFIRMATION_PRIMARY,
            WizardStep::ChooseDownload { download: None, .. } => CHOOSE_DOWNLOAD_PRIMARY,
            WizardStep::ChooseDownload { .. } => CHOOSE_DOWNLOAD_PRIMARY_STARTED,
        }
    }

    pub fn secondary_text(&self) -> &'static str {
        match self {
            WizardStep::InternalExternal => INTERNAL_EXTERNAL_SECONDARY,
            WizardStep::ExternalConfirmation | WizardStep::ChooseDownload { .. } => CANCEL,
        }
    }

    pub fn body(&self) -> StepBody {
        match self {
            WizardStep::InternalExternal => StepBody::Text(INTERNAL_EXTERNAL_BODY),
            WizardStep::ExternalConfirmation => StepBody::Text(EXTERNAL_CONFIRMATION_BODY),
            WizardStep::ChooseDownload {
                format,
                download: None,
            } => StepBody::FormatChoice {
                legend: CHOOSE_DOWNLOAD_LEGEND,
                options: ExportFormat::ALL
                    .iter()
                    .map(|format| (*format, format.label()))
                    .collect(),
                selected: *format,
            },
            WizardStep::ChooseDownload {
                download: Some(progress),
                ..
            } => {
                if let Some(error) = progress.save.error() {
                    StepBody::Error(format!("{} ({})", SAVE_ERROR, error))
                } else if let Delivery::Failed(_) = progress.delivery {
                    StepBody::Error(PREPARATION_ERROR.to_string())
                } else if let Resource::Failure(error) = &progress.export {
                    StepBody::Error(format!("{} ({})", EXPORT_ERROR, error))
                } else {
                    StepBody::Preparing(PREPARING_MESSAGE)
                }
            }
        }
    }
}

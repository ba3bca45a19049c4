use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::command::Command;
use super::export_prepared;
use crate::config::ExportSettings;
use crate::services::ExportServices;
use crate::wizard::view::StepView;
use crate::wizard::{Effect, ExportFormat, Msg, Wizard};

/// Result of one tracked task
enum Completion {
    Finished(Msg),
    Lost,
}

/// Drives a `Wizard`: turns its effects into commands, runs them on tokio
/// and feeds the resulting messages back.
///
/// Must be used from within a tokio runtime. Closing the wizard does not
/// cancel in-flight work; the wizard drops the late results itself.
pub struct ExportController {
    wizard: Wizard,
    services: ExportServices,
    settings: ExportSettings,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl ExportController {
    pub fn new(grid_id: impl Into<String>, services: ExportServices, settings: ExportSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            wizard: Wizard::new(grid_id, settings.preparation_order),
            services,
            settings,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn view(&self) -> Option<StepView> {
        self.wizard.view()
    }

    pub fn is_open(&self) -> bool {
        self.wizard.is_open()
    }

    /// Tasks started but not yet fed back
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn open(&mut self) {
        self.dispatch(Msg::Open);
    }

    pub fn close(&mut self) {
        self.dispatch(Msg::Close);
    }

    pub fn primary(&mut self) {
        self.dispatch(Msg::Primary);
    }

    pub fn secondary(&mut self) {
        self.dispatch(Msg::Secondary);
    }

    pub fn select_format(&mut self, format: ExportFormat) {
        self.dispatch(Msg::SelectFormat(format));
    }

    /// Feed one message to the wizard and start the work it asks for
    pub fn dispatch(&mut self, msg: Msg) {
        debug!("Dispatching {:?}", msg);
        for effect in self.wizard.update(msg) {
            let command = self.command_for(effect);
            self.execute(command);
        }
    }

    /// Wait for one in-flight task and dispatch its result.
    /// Returns `false` when nothing is in flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        let Some(completion) = self.rx.recv().await else {
            return false;
        };
        self.in_flight -= 1;
        if let Completion::Finished(msg) = completion {
            self.dispatch(msg);
        }
        true
    }

    /// Process results until no task is in flight
    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    fn command_for(&self, effect: Effect) -> Command<Msg> {
        match effect {
            Effect::Save { session } => {
                let save = self.services.save.clone();
                Command::perform(async move { save.save_changes().await }, move |result| {
                    Msg::SaveCompleted {
                        session,
                        result: result.map_err(|e| format!("{:#}", e)),
                    }
                })
            }
            Effect::RefreshGrid => {
                if let Some(refresh) = &self.services.refresh {
                    debug!("Refreshing grid after save");
                    refresh.refresh_grid();
                }
                Command::None
            }
            Effect::Prepare { session, grid_id } => {
                let preparer = self.services.preparer.clone();
                info!("Requesting prepared download for grid {}", grid_id);
                Command::perform(
                    async move { preparer.prepare_download(&grid_id).await },
                    move |result| Msg::DownloadPrepared {
                        session,
                        result: result.map_err(|e| format!("{:#}", e)),
                    },
                )
            }
            Effect::Export {
                session,
                data,
                format,
            } => {
                let services = self.services.clone();
                let settings = self.settings.clone();
                Command::blocking(move || Msg::ExportCompleted {
                    session,
                    result: export_prepared(&data, format, &settings, &services)
                        .map_err(|e| format!("{:#}", e)),
                })
            }
            Effect::Closed => {
                debug!("Wizard closed");
                Command::None
            }
        }
    }

    fn execute(&mut self, command: Command<Msg>) {
        match command {
            Command::None => {}
            Command::Perform(future) => self.track(tokio::spawn(future)),
            Command::Blocking(job) => self.track(tokio::task::spawn_blocking(job)),
        }
    }

    fn track(&mut self, handle: JoinHandle<Msg>) {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let completion = match handle.await {
                Ok(msg) => Completion::Finished(msg),
                Err(e) => {
                    error!("Export task did not complete: {}", e);
                    Completion::Lost
                }
            };
            let _ = tx.send(completion);
        });
    }
}

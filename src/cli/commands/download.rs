use anyhow::Result;
use colored::Colorize;
use log::info;
use std::sync::Arc;

use grid_export::config::Config;
use grid_export::export::ExportController;
use grid_export::services::{
    ExportServices, JsonFilePreparer, LoggingSaveService, PreflattenedReport,
};
use grid_export::wizard::view::{StepBody, StepView};

use crate::cli::app::DownloadArgs;
use crate::cli::ui::prompts::{StepAction, prompt_format, prompt_step_action};
use crate::cli::ui::with_spinner;

pub async fn download_command(args: DownloadArgs, config: Config) -> Result<()> {
    let mut settings = config.export;
    if let Some(dir) = args.output_dir {
        settings.output_dir = Some(dir);
    }
    info!("Starting download wizard for grid {}", args.grid_id);

    let services = ExportServices::new(
        Arc::new(LoggingSaveService),
        Arc::new(JsonFilePreparer::new(&args.data_dir)),
        Arc::new(PreflattenedReport),
    );
    let mut controller = ExportController::new(args.grid_id, services, settings);
    controller.open();

    while let Some(view) = controller.view() {
        print_heading(&view);

        match &view.body {
            StepBody::Text(text) => println!("{}\n", text),
            StepBody::FormatChoice {
                legend,
                options,
                selected: None,
            } => {
                match prompt_format(legend, options, None)? {
                    Some(format) => controller.select_format(format),
                    None => controller.close(),
                }
                continue;
            }
            StepBody::FormatChoice {
                selected: Some(format),
                ..
            } => println!("Format: {}\n", format.label().cyan()),
            StepBody::Preparing(message) => {
                if controller.in_flight() > 0 {
                    with_spinner(*message, controller.settle()).await;
                    continue;
                }
                println!("{}\n", message);
            }
            StepBody::Error(message) => println!("{}\n", message.red()),
        }

        match prompt_step_action(&view)? {
            StepAction::Primary => controller.primary(),
            StepAction::Secondary => controller.secondary(),
            StepAction::ChangeFormat => {
                if let StepBody::FormatChoice {
                    legend,
                    options,
                    selected,
                } = &view.body
                {
                    if let Some(format) = prompt_format(legend, options, *selected)? {
                        controller.select_format(format);
                    }
                }
            }
            StepAction::Dismiss => controller.close(),
        }
    }

    match controller.wizard().last_export() {
        Some(report) => {
            for file in &report.files {
                println!("{} {}", "✓ Wrote".green(), file.display());
            }
            println!("{} tabs exported", report.tabs);
        }
        None => println!("{}", "Download cancelled".yellow()),
    }

    Ok(())
}

fn print_heading(view: &StepView) {
    if view.danger {
        println!("\n{}", view.heading.red().bold());
    } else {
        println!("\n{}", view.heading.bold());
    }
}

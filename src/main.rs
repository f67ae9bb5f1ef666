mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use app::RustyHeronApp;
use clap::Parser;
use config::Cli;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // A dataset that cannot be loaded stops startup; nothing is rendered.
    let dataset = data::loader::load_file(&cli.data)
        .inspect_err(|e| log::error!("{e}"))
        .with_context(|| format!("could not load observations from {}", cli.data.display()))?;

    if dataset.is_empty() {
        log::warn!("{} contains no observations", cli.data.display());
    }

    if cli.json {
        let selection = cli.selection(&dataset);
        let report = data::summarize(&dataset, &selection, &cli.report_options());
        let stdout = std::io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &report).context("writing report")?;
        println!();
        return Ok(());
    }

    let state = AppState::new(Arc::new(dataset), cli.report_options());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Heron – Bird Observation Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyHeronApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

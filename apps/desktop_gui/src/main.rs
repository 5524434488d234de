use std::path::PathBuf;

mod backend_bridge;
mod config;
mod controller;
mod headless;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand, controller::events::UiEvent,
    headless::HeadlessRequest, ui::BackdropApp,
};

#[derive(Parser, Debug)]
#[command(name = "backdrop", about = "Fetch desktop backgrounds sized for your display")]
struct Args {
    /// Settings file; defaults to ./backdrop.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run one request from the arguments below and exit, without a window.
    #[arg(long)]
    headless: bool,
    #[arg(long)]
    count: Option<String>,
    #[arg(long)]
    width: Option<String>,
    #[arg(long)]
    height: Option<String>,
    #[arg(long)]
    path: Option<String>,
}

impl Args {
    fn headless_request(&self) -> HeadlessRequest {
        HeadlessRequest {
            count: self.count.clone(),
            width: self.width.clone(),
            height: self.height.clone(),
            path: self.path.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref())?;

    if args.headless {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build runtime")?;
        return runtime.block_on(headless::run(settings, args.headless_request()));
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Backdrop")
            .with_inner_size([520.0, 360.0])
            .with_min_inner_size([420.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Backdrop",
        options,
        Box::new(|_cc| Ok(Box::new(BackdropApp::new(cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop window failed: {err}"))
}

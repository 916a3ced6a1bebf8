//! ICB Activity Explorer - choropleth map and monthly series of ICB counts
//!
//! Loads an activity table and ICB boundaries in the background and binds
//! them to a map, a series chart and the Region / Month / Category selectors.

mod charts;
mod config;
mod data;
mod geo;
mod gui;
mod state;

use clap::Parser;
use config::AppConfig;
use eframe::egui;
use gui::ExplorerApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::parse();
    tracing::info!(base = %config.base, "Starting ICB Activity Explorer");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("ICB Activity Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "ICB Activity Explorer",
        options,
        Box::new(|cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
    )
}

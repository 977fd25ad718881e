mod app;
mod classifier;
mod color;
mod config;
mod data;
mod pipeline;
mod state;
mod ui;

use anyhow::Context;
use app::DashboardApp;
use classifier::{Classifier, ForestModel};
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;

    // The model is loaded exactly once; without it there is nothing to serve.
    let model = ForestModel::load(&config.model_path).map_err(|e| {
        log::error!("Cannot load model artifact: {e}");
        e
    })?;
    log::info!(
        "Loaded random forest from {}: {} trees, {} features, classes {:?}",
        config.model_path.display(),
        model.n_trees(),
        model.n_features(),
        model.classes()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let state = AppState::new(Box::new(model), &config);

    eframe::run_native(
        "Bankruptcy Prediction App",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the logo.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DashboardApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the dashboard window")
}

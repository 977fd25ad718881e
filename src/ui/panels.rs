use eframe::egui::{self, Color32, Frame, RichText, Ui};

use crate::color::CategoryColors;
use crate::pipeline::PredictionReport;
use crate::state::AppState;
use crate::ui::{charts, tables};

// ---------------------------------------------------------------------------
// Left side panel – upload
// ---------------------------------------------------------------------------

/// Render the left upload panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    let logo = egui::include_image!("../../assets/logo.png");
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add(
            egui::Image::new(logo)
                .max_width(ui.available_width() * 0.5)
                .max_height(96.0)
                .rounding(4.0),
        );
    });
    ui.add_space(4.0);

    ui.heading("Upload Company Financial Data");
    ui.separator();

    if ui.button("Upload CSV file…").clicked() {
        open_file_dialog(state);
    }
    if let Some(name) = &state.source_name {
        ui.label(RichText::new(name).weak());
    }

    ui.add_space(12.0);
    ui.strong("Model");
    let model = state.model();
    ui.label(format!("{} input features", model.n_features()));
    ui.label(if model.feature_names().is_some() {
        "Feature names stored with the model"
    } else {
        "Columns matched by position"
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(format!("{} companies predicted", report.results.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central report
// ---------------------------------------------------------------------------

fn banner(ui: &mut Ui, fill: Color32, text: &str) {
    Frame::default()
        .fill(fill)
        .inner_margin(10.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(text).color(Color32::WHITE).strong());
        });
}

/// Render the scrollable report for the latest upload.
pub fn report_view(ui: &mut Ui, state: &AppState) {
    ui.heading(RichText::new("Bankruptcy Prediction System").size(26.0));
    ui.separator();

    match (&state.report, &state.status_message) {
        (Some(report), _) => report_sections(ui, report),
        (None, Some(msg)) => {
            banner(ui, Color32::from_rgb(150, 30, 30), msg);
        }
        (None, None) => {
            banner(
                ui,
                Color32::from_rgb(30, 80, 140),
                "Please upload a CSV file to get started!",
            );
        }
    }
}

fn report_sections(ui: &mut Ui, report: &PredictionReport) {
    let colors = CategoryColors::new(
        report
            .distribution
            .counts
            .iter()
            .map(|(label, _)| label.as_str()),
    );

    ui.heading("Uploaded Data");
    tables::data_table(ui, "preview_table", &report.preview, 180.0, None);
    ui.add_space(12.0);

    ui.heading("Prediction Results");
    tables::data_table(ui, "results_table", &report.results, 320.0, Some(&colors));
    ui.add_space(12.0);

    ui.heading("Data Visualizations");
    ui.strong("Bankruptcy Prediction Distribution");
    charts::distribution_pie(ui, &report.distribution);
    if report.distribution.unlabeled > 0 {
        ui.label(
            RichText::new(format!(
                "{} rows have a prediction outside {{0, 1}} and are left unlabeled",
                report.distribution.unlabeled
            ))
            .weak(),
        );
    }
    ui.add_space(12.0);

    ui.heading("Feature Correlation");
    charts::correlation_heatmap(ui, &report.correlation);
    ui.add_space(12.0);

    ui.heading("Feature Importance");
    match &report.importances {
        Ok(importances) => {
            charts::importance_bars(ui, importances);
            ui.add_space(12.0);
            banner(
                ui,
                Color32::from_rgb(30, 120, 60),
                "Prediction completed successfully!",
            );
        }
        Err(e) => {
            ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload company financial data")
        .add_filter("CSV", &["csv"])
        .add_filter("Other tables", &["json", "parquet", "pq"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match crate::data::loader::load_file(&path) {
        Ok(table) => {
            log::info!(
                "Loaded {name}: {} rows, {} columns",
                table.len(),
                table.width()
            );
            state.ingest(name, table);
        }
        Err(e) => state.upload_failed(name, e),
    }
}

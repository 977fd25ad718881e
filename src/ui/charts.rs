use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Ui, vec2};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text,
    uniform_grid_spacer,
};

use crate::color::{CategoryColors, coolwarm, contrast_text, viridis};
use crate::pipeline::importance::FeatureImportance;
use crate::pipeline::stats::{CorrelationMatrix, Distribution};

// ---------------------------------------------------------------------------
// Pie chart – prediction distribution
// ---------------------------------------------------------------------------

/// Largest arc drawn as one polygon; egui only fills convex shapes.
const MAX_WEDGE: f64 = FRAC_PI_2;

/// Points of a filled wedge from `start` to `end` (radians), centre included.
fn wedge(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start) / TAU) * 128.0).ceil().max(2.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    points.extend((0..=steps).map(|i| {
        let a = start + (end - start) * i as f64 / steps as f64;
        [a.cos(), a.sin()]
    }));
    points
}

/// Slices start at 12 o'clock and run counterclockwise, largest first.
pub fn distribution_pie(ui: &mut Ui, distribution: &Distribution) {
    let colors = CategoryColors::new(distribution.counts.iter().map(|(l, _)| l.as_str()));

    Plot::new("prediction_pie")
        .legend(Legend::default())
        .data_aspect(1.0)
        .height(320.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let mut start = FRAC_PI_2;
            for (label, pct) in distribution.percentages() {
                let sweep = pct / 100.0 * TAU;
                let end = start + sweep;
                let color = colors.color_for(&label);

                let mut a = start;
                while a < end - 1e-9 {
                    let b = (a + MAX_WEDGE).min(end);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(wedge(a, b)))
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, color))
                            .name(&label),
                    );
                    a = b;
                }

                let mid = start + sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                    RichText::new(format!("{pct:.1}%"))
                        .color(contrast_text(color))
                        .strong(),
                ));
                plot_ui.text(Text::new(
                    PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                    RichText::new(&label),
                ));
                start = end;
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

const LABEL_WIDTH: f32 = 160.0;
const HEADER_HEIGHT: f32 = 24.0;
const COLORBAR_WIDTH: f32 = 60.0;

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let head: String = name.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// Annotated correlation matrix drawn directly with the painter.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    if matrix.is_empty() {
        ui.label("No numeric columns to correlate.");
        return;
    }
    let n = matrix.len();

    let available = ui.available_width() - LABEL_WIDTH - COLORBAR_WIDTH;
    let cell = (available / n as f32).clamp(28.0, 72.0);
    let size = vec2(
        LABEL_WIDTH + cell * n as f32 + COLORBAR_WIDTH,
        HEADER_HEIGHT + cell * n as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + vec2(LABEL_WIDTH, HEADER_HEIGHT);
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional((cell * 0.28).clamp(9.0, 13.0));
    let max_chars = (cell / 7.0).max(3.0) as usize;

    for (i, name) in matrix.columns.iter().enumerate() {
        painter.text(
            origin + vec2(-6.0, cell * (i as f32 + 0.5)),
            Align2::RIGHT_CENTER,
            truncate(name, 24),
            font.clone(),
            text_color,
        );
        painter.text(
            origin + vec2(cell * (i as f32 + 0.5), -4.0),
            Align2::CENTER_BOTTOM,
            truncate(name, max_chars),
            font.clone(),
            text_color,
        );
    }

    for row in 0..n {
        for col in 0..n {
            let r = matrix.get(row, col);
            let min = origin + vec2(cell * col as f32, cell * row as f32);
            let rect = Rect::from_min_size(min, vec2(cell, cell));
            let (fill, text) = if r.is_nan() {
                (Color32::from_gray(90), "nan".to_string())
            } else {
                (coolwarm(r), format!("{r:.2}"))
            };
            painter.rect_filled(rect.shrink(0.5), 0.0, fill);
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                text,
                font.clone(),
                contrast_text(fill),
            );
        }
    }

    // Colour bar on the right, +1 at the top.
    let bar_left = origin.x + cell * n as f32 + 12.0;
    let bar_height = cell * n as f32;
    let steps = 64;
    for s in 0..steps {
        let t = s as f32 / steps as f32;
        let rect = Rect::from_min_size(
            egui::pos2(bar_left, origin.y + t * bar_height),
            vec2(12.0, bar_height / steps as f32 + 0.5),
        );
        painter.rect_filled(rect, 0.0, coolwarm(1.0 - 2.0 * t as f64));
    }
    for (label, t) in [("1.0", 0.0), ("0.0", 0.5), ("-1.0", 1.0)] {
        painter.text(
            egui::pos2(bar_left + 16.0, origin.y + t * bar_height),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(10.0),
            text_color,
        );
    }

    if let Some(pos) = response.hover_pos() {
        let rel = pos - origin;
        if rel.x >= 0.0 && rel.y >= 0.0 {
            let (col, row) = ((rel.x / cell) as usize, (rel.y / cell) as usize);
            if row < n && col < n {
                let tip = format!(
                    "{} × {}: {:.3}",
                    matrix.columns[row],
                    matrix.columns[col],
                    matrix.get(row, col)
                );
                response.on_hover_text(tip);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Feature importance – horizontal bars
// ---------------------------------------------------------------------------

/// First feature at the top, coloured along a sequential ramp.
pub fn importance_bars(ui: &mut Ui, importances: &[FeatureImportance]) {
    let n = importances.len();
    if n == 0 {
        ui.label("The model reports no feature importances.");
        return;
    }

    let bars: Vec<Bar> = importances
        .iter()
        .enumerate()
        .map(|(i, fi)| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            Bar::new((n - 1 - i) as f64, fi.score)
                .name(&fi.feature)
                .fill(viridis(t))
                .width(0.7)
        })
        .collect();

    let names: Vec<String> = importances.iter().map(|fi| fi.feature.clone()).collect();
    let y_labels = move |mark: GridMark, _range: &RangeInclusive<f64>| -> String {
        let v = mark.value;
        if v.fract() != 0.0 || v < 0.0 {
            return String::new();
        }
        let pos = v as usize;
        if pos >= names.len() {
            return String::new();
        }
        truncate(&names[names.len() - 1 - pos], 28)
    };

    Plot::new("feature_importance")
        .height((26.0 * n as f32).clamp(160.0, 640.0))
        .x_axis_label("Importance Score")
        .y_axis_label("Features")
        .y_axis_formatter(y_labels)
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_x(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Importance"));
        });
}

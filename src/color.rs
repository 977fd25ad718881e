use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::pipeline::label::{BANKRUPT, NOT_BANKRUPT};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Category colours: label → Color32
// ---------------------------------------------------------------------------

pub const BANKRUPT_RED: Color32 = Color32::from_rgb(214, 39, 40);
pub const SOLVENT_GREEN: Color32 = Color32::from_rgb(44, 160, 44);

/// Maps the distinct labels of a chart to colours.
///
/// The two bankruptcy labels keep fixed red/green; any other label gets a
/// hue from [`generate_palette`].
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        let mapping = labels
            .iter()
            .zip(palette)
            .map(|(&label, hue)| {
                let color = match label {
                    BANKRUPT => BANKRUPT_RED,
                    NOT_BANKRUPT => SOLVENT_GREEN,
                    _ => hue,
                };
                (label.to_string(), color)
            })
            .collect();

        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous ramps
// ---------------------------------------------------------------------------

fn lin(r: u8, g: u8, b: u8) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

/// Piecewise-linear interpolation through evenly spaced stops, in linear RGB.
fn ramp(stops: &[LinSrgb], t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let segments = (stops.len() - 1) as f32;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    let mixed = stops[i].mix(stops[i + 1], pos - i as f32);
    to_color32(Srgb::from_linear(mixed))
}

/// Diverging blue → light grey → red ramp for correlations in [-1, 1].
pub fn coolwarm(r: f64) -> Color32 {
    let stops = [lin(59, 76, 192), lin(221, 221, 221), lin(180, 4, 38)];
    ramp(&stops, (r + 1.0) / 2.0)
}

/// Sequential dark purple → teal → yellow ramp for t in [0, 1].
pub fn viridis(t: f64) -> Color32 {
    let stops = [
        lin(68, 1, 84),
        lin(59, 82, 139),
        lin(33, 145, 140),
        lin(94, 201, 98),
        lin(253, 231, 37),
    ];
    ramp(&stops, t)
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 { Color32::BLACK } else { Color32::WHITE }
}

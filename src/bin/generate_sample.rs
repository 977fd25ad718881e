//! Writes a small demo setup into the working directory:
//!
//! * `random_forest_model.json` – a three-tree forest over six ratios
//! * `sample_companies.csv` / `sample_companies.parquet` – 60 companies

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

const FEATURES: [&str; 6] = [
    "current_ratio",
    "debt_ratio",
    "roa",
    "net_profit_margin",
    "working_capital_to_assets",
    "interest_coverage",
];

/// Mean and spread per feature for (healthy, distressed) companies.
const PROFILES: [((f64, f64), (f64, f64)); 6] = [
    ((1.8, 0.4), (0.9, 0.3)),
    ((0.45, 0.12), (0.85, 0.15)),
    ((0.08, 0.04), (-0.06, 0.06)),
    ((0.09, 0.05), (-0.04, 0.05)),
    ((0.22, 0.08), (0.0, 0.08)),
    ((6.0, 2.0), (0.9, 0.7)),
];

/// Seeded SplitMix64 stream with normal draws from the Marsaglia polar
/// method. The second normal of each accepted pair is kept for the next call.
struct SampleRng {
    state: u64,
    spare: Option<f64>,
}

impl SampleRng {
    fn seeded(seed: u64) -> Self {
        SampleRng { state: seed, spare: None }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let z = match self.spare.take() {
            Some(z) => z,
            None => loop {
                let u = 2.0 * self.uniform() - 1.0;
                let v = 2.0 * self.uniform() - 1.0;
                let s = u * u + v * v;
                if s > 0.0 && s < 1.0 {
                    let k = (-2.0 * s.ln() / s).sqrt();
                    self.spare = Some(v * k);
                    break u * k;
                }
            },
        };
        mean + sd * z
    }
}

/// The forest: depth-2 trees in CART array layout. Feature indices refer to
/// `FEATURES`; leaf weights are (not bankrupt, bankrupt).
fn model_artifact() -> serde_json::Value {
    // Root splits on `root`; its left child splits on `left`, its right child
    // is a leaf. Leaves in node order: left-left, left-right, right.
    let tree = |root: (usize, f64), left: (usize, f64), leaves: [[f64; 2]; 3]| {
        let [a, b, c] = leaves;
        let left_sum = [a[0] + b[0], a[1] + b[1]];
        let root_sum = [left_sum[0] + c[0], left_sum[1] + c[1]];
        json!({
            "children_left":  [1, 2, -1, -1, -1],
            "children_right": [4, 3, -1, -1, -1],
            "feature":        [root.0, left.0, -2, -2, -2],
            "threshold":      [root.1, left.1, -2.0, -2.0, -2.0],
            "value":          [root_sum, left_sum, a, b, c],
        })
    };

    json!({
        "model_type": "random_forest",
        "classes": [0, 1],
        "n_features": FEATURES.len(),
        "feature_names": FEATURES,
        "feature_importances": [0.14, 0.28, 0.24, 0.10, 0.12, 0.12],
        "trees": [
            // debt_ratio > 0.7 → bankrupt unless roa is still clearly positive
            {
                "children_left":  [1, -1, 3, -1, -1],
                "children_right": [2, -1, 4, -1, -1],
                "feature":        [1, -2, 2, -2, -2],
                "threshold":      [0.7, -2.0, 0.02, -2.0, -2.0],
                "value":          [[140.0, 60.0], [115.0, 10.0], [25.0, 50.0], [8.0, 45.0], [17.0, 5.0]]
            },
            tree((2, 0.0), (5, 1.5), [[6.0, 48.0], [20.0, 10.0], [118.0, 8.0]]),
            tree((4, 0.08), (3, 0.0), [[5.0, 44.0], [18.0, 12.0], [115.0, 6.0]]),
        ]
    })
}

fn main() -> Result<()> {
    let mut rng = SampleRng::seeded(42);
    let n_companies = 60;

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(n_companies); FEATURES.len()];
    let mut distressed = 0;
    for _ in 0..n_companies {
        let is_distressed = rng.uniform() < 0.3;
        distressed += usize::from(is_distressed);
        for (col, &(healthy, risky)) in columns.iter_mut().zip(PROFILES.iter()) {
            let (mean, sd) = if is_distressed { risky } else { healthy };
            let v = rng.normal(mean, sd);
            col.push((v * 10_000.0).round() / 10_000.0);
        }
    }

    // Model artifact
    let model_path = "random_forest_model.json";
    let text = serde_json::to_string_pretty(&model_artifact())?;
    std::fs::write(model_path, text).with_context(|| format!("writing {model_path}"))?;

    // CSV upload
    let csv_path = "sample_companies.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV")?;
    writer.write_record(FEATURES)?;
    for row in 0..n_companies {
        writer.write_record(columns.iter().map(|c| format!("{:.4}", c[row])))?;
    }
    writer.flush()?;

    // Parquet upload
    let schema = Arc::new(Schema::new(
        FEATURES
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|c| Arc::new(Float64Array::from(c.clone())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let parquet_path = "sample_companies.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!("{}", arrow::util::pretty::pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {model_path}, {csv_path} and {parquet_path} ({n_companies} companies, {distressed} drawn from the distressed profile)"
    );
    Ok(())
}

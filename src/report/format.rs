//! Plain-text reports for the CLI: training summary, artifact inspection and
//! probe results.

use crate::domain::{DrugCategory, ForecastResult, ModelInfo};
use crate::fit::CategoryMetrics;
use crate::io::SalesData;
use crate::models::ModelArtifact;

/// Training run summary: dataset, sample size and per-category diagnostics.
pub fn format_training_summary(
    data: &SalesData,
    n_samples: usize,
    artifact: &ModelArtifact,
    metrics: &[CategoryMetrics],
) -> String {
    let mut out = String::new();

    out.push_str("=== forecast - model training ===\n");
    if let (Some(first), Some(last)) = (data.rows.first(), data.rows.last()) {
        out.push_str(&format!(
            "Sales rows: {} used / {} read | {} .. {}\n",
            data.rows.len(),
            data.rows_read,
            first.date,
            last.date
        ));
    }
    if !data.row_errors.is_empty() {
        out.push_str(&format!("Skipped rows: {}\n", data.row_errors.len()));
        for err in data.row_errors.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", err.line, err.message));
        }
    }
    out.push_str(&format!(
        "Samples: n={n_samples} | horizons={:?} | stock_reference={}\n",
        artifact.horizons, artifact.stock_reference
    ));
    out.push_str(&format!("Model: {}\n", artifact.model_type));

    out.push_str("\nIn-sample metrics:\n");
    out.push_str(&format!("{:<10} {:>12} {:>12} {:>8}\n", "category", "mse", "mae", "r2"));
    out.push_str(&format!("{:-<10} {:-<12} {:-<12} {:-<8}\n", "", "", "", ""));
    for m in metrics {
        out.push_str(&format!(
            "{:<10} {:>12.6} {:>12.6} {:>8.4}\n",
            truncate(&m.category, 10),
            m.mse,
            m.mae,
            m.r2
        ));
    }

    out
}

/// Artifact inspection: stages, schema and one sample prediction.
pub fn format_model_summary(artifact: &ModelArtifact, sample_label: &str, sample: &[f64]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Model type: {}\n", artifact.model_type));
    out.push_str(&format!("Trained: {} by {}\n", artifact.trained_at, artifact.tool));
    out.push_str("\nPipeline steps:\n");
    out.push_str(&format!(
        "- preprocessor: StandardScaler ({} features)\n",
        artifact.preprocessor.n_features()
    ));
    out.push_str(&format!(
        "- model: MultiOutput LinearRegression ({} estimators)\n",
        artifact.regressor.estimators.len()
    ));

    out.push_str("\nFeature names:\n");
    out.push_str(&format!("{:?}\n", artifact.preprocessor.feature_names));
    out.push_str(&format!("- mean : {}\n", fmt_vec(&artifact.preprocessor.mean)));
    out.push_str(&format!("- scale: {}\n", fmt_vec(&artifact.preprocessor.scale)));

    out.push_str(&format!("\nPrediction for {sample_label}:\n"));
    for (target, v) in artifact.targets().iter().zip(sample) {
        out.push_str(&format!("  {target:<8} {v:.6}\n"));
    }

    out
}

pub fn format_drug_types(types: &[DrugCategory]) -> String {
    let mut out = format!("Found {} drug types:\n", types.len());
    for t in types {
        out.push_str(&format!("- {}: {}\n", t.code, t.name));
    }
    out
}

pub fn format_model_info(info: &ModelInfo) -> String {
    let mut out = format!("Model Type: {}\n\nTop {} Important Features:\n", info.model_type, info.feature_importance.len());
    for f in &info.feature_importance {
        out.push_str(&format!("- {}: {:.4}\n", f.name, f.importance));
    }
    out
}

/// Summary table of forecast results, one row per case.
pub fn format_forecast_table(rows: &[(f64, ForecastResult)]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<8} {:<10} {:>5} {:>8} {:>10} {:>9} {:>10}\n",
        "drug", "date", "days", "stock", "prediction", "quantity", "daily"
    ));
    out.push_str(&format!(
        "{:-<8} {:-<10} {:-<5} {:-<8} {:-<10} {:-<9} {:-<10}\n",
        "", "", "", "", "", "", ""
    ));
    for (stock, r) in rows {
        out.push_str(&format!(
            "{:<8} {:<10} {:>5} {:>8.1} {:>10.4} {:>9} {:>10.2}\n",
            truncate(&r.drug_type, 8),
            r.date,
            r.days,
            stock,
            r.prediction,
            r.predicted_quantity,
            r.average_daily
        ));
    }
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

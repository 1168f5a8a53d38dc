//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - returned as-is from HTTP handlers
//! - decoded by the probe client
//! - printed by the CLI reports

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Feature names in the exact column order the model was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Year",
    "Month",
    "Hour",
    "quarter",
    "day_of_year",
    "is_weekend",
    "prediction_days",
];

pub const FEATURE_COUNT: usize = 7;

/// Hour-of-day fed to the model for every row (noon).
pub const DEFAULT_HOUR: f64 = 12.0;

/// One drug class the model forecasts a consumption ratio for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugCategory {
    pub code: String,
    pub name: String,
}

impl DrugCategory {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// The code as accepted by `/predict/forecast` (uppercase, no slashes).
    pub fn normalized_code(&self) -> String {
        normalize_code(&self.code)
    }

    /// Column name used for this category in the daily sales CSV.
    ///
    /// The dataset drops the sub-class suffix: `N02BE/B` is stored as `N02BE`.
    pub fn dataset_column(&self) -> &str {
        self.code.split('/').next().unwrap_or(&self.code)
    }
}

/// Uppercase and strip every `/`. Whitespace is kept, so `" M01AB"` matches
/// nothing.
pub fn normalize_code(raw: &str) -> String {
    raw.to_uppercase().replace('/', "")
}

/// Ordered category table.
///
/// Order matters: position `i` is column `i` of every model output vector.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    entries: Vec<DrugCategory>,
    index: HashMap<String, usize>,
}

impl CategoryCatalog {
    pub fn new(entries: Vec<DrugCategory>) -> Result<Self, AppError> {
        if entries.is_empty() {
            return Err(AppError::config("Category catalog must not be empty."));
        }
        let catalog = Self::from_entries(entries);
        if catalog.index.len() != catalog.entries.len() {
            let mut seen = HashSet::new();
            let dup = catalog
                .entries
                .iter()
                .find(|e| !seen.insert(e.normalized_code()))
                .map(|e| e.code.clone())
                .unwrap_or_default();
            return Err(AppError::config(format!(
                "Duplicate category code after normalization: {dup}"
            )));
        }
        Ok(catalog)
    }

    fn from_entries(entries: Vec<DrugCategory>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.normalized_code(), i))
            .collect();
        Self { entries, index }
    }

    /// The eight ATC drug classes of the pharma sales dataset.
    pub fn pharma_sales() -> Self {
        let entries = vec![
            DrugCategory::new(
                "M01AB",
                "Anti-inflammatory and antirheumatic products (Acetic acid derivatives)",
            ),
            DrugCategory::new(
                "M01AE",
                "Anti-inflammatory and antirheumatic products (Propionic acid derivatives)",
            ),
            DrugCategory::new(
                "N02BA",
                "Other analgesics and antipyretics (Salicylic acid derivatives)",
            ),
            DrugCategory::new(
                "N02BE/B",
                "Other analgesics and antipyretics (Pyrazolones and Anilides)",
            ),
            DrugCategory::new("N05B", "Psycholeptics drugs (Anxiolytic)"),
            DrugCategory::new("N05C", "Psycholeptics drugs (Hypnotics and sedatives)"),
            DrugCategory::new("R03", "Drugs for obstructive airway diseases"),
            DrugCategory::new("R06", "Antihistamines for systemic use"),
        ];
        Self::from_entries(entries)
    }

    pub fn entries(&self) -> &[DrugCategory] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a caller-supplied code to its output column.
    pub fn index_of(&self, raw: &str) -> Option<usize> {
        self.index.get(&normalize_code(raw)).copied()
    }

    /// Resolve a caller-supplied code, failing with a client error.
    pub fn resolve(&self, raw: &str) -> Result<usize, AppError> {
        self.index_of(raw)
            .ok_or_else(|| AppError::validation(format!("Invalid drug type: {raw}")))
    }

    pub fn normalized_codes(&self) -> Vec<String> {
        self.entries.iter().map(DrugCategory::normalized_code).collect()
    }
}

/// Fixed-schema model input derived from a calendar date and a horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub year: f64,
    pub month: f64,
    pub hour: f64,
    pub quarter: f64,
    pub day_of_year: f64,
    pub is_weekend: f64,
    pub prediction_days: f64,
}

impl FeatureVector {
    /// Values in `FEATURE_NAMES` order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.year,
            self.month,
            self.hour,
            self.quarter,
            self.day_of_year,
            self.is_weekend,
            self.prediction_days,
        ]
    }
}

/// Output of one forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Averaged ratio of the start and end predictions.
    pub prediction: f64,
    pub date: NaiveDate,
    pub end_date: NaiveDate,
    pub predicted_quantity: i64,
    pub average_daily: f64,
    /// Normalized category code.
    pub drug_type: String,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub feature_importance: Vec<FeatureImportance>,
}

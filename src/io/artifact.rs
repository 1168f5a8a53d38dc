//! Read/write model artifact JSON files.
//!
//! The artifact is the portable representation of a trained pipeline:
//! - training metadata (date, stock reference, horizons)
//! - scaler parameters
//! - one linear estimator per drug category
//!
//! The schema is defined by `models::ModelArtifact`.

use std::fs::{File, create_dir_all};
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;
use crate::models::ModelArtifact;

/// Write an artifact, creating the parent directory if needed.
pub fn write_artifact_json(path: &Path, artifact: &ModelArtifact) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir).map_err(|e| {
            AppError::config(format!("Failed to create model directory '{}': {e}", dir.display()))
        })?;
    }

    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create model file '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| AppError::config(format!("Failed to write model JSON: {e}")))?;

    Ok(())
}

/// Read and validate an artifact.
pub fn read_artifact_json(path: &Path) -> Result<ModelArtifact, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open model file '{}': {e}", path.display())))?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::config(format!("Invalid model JSON '{}': {e}", path.display())))?;
    artifact.validate()?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::features::feature_row;
    use crate::models::ForecastModel;
    use crate::models::pipeline::tests::tiny_artifact;
    use chrono::NaiveDate;

    #[test]
    fn written_artifact_reloads_with_same_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let artifact = tiny_artifact();

        write_artifact_json(&path, &artifact).unwrap();
        let loaded = read_artifact_json(&path).unwrap();

        let row = feature_row(NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(), 14);
        assert_eq!(loaded.predict(&row).unwrap(), artifact.predict(&row).unwrap());
        assert_eq!(loaded.targets(), vec!["A", "B"]);
    }

    #[test]
    fn missing_or_corrupt_files_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = read_artifact_json(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Config);

        let corrupt = dir.path().join("bad.json");
        std::fs::write(&corrupt, "{\"tool\": 1").unwrap();
        let err = read_artifact_json(&corrupt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().starts_with("Invalid model JSON"));
    }
}

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use spdlog::prelude::*;
use thiserror::Error;

use crate::report::Report;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File stem for an entry exported from the history list
pub fn history_stem(report: &Report) -> String {
    format!("soil_analysis_{}", report.id)
}

/// File stem for the payload open in the editor
pub fn editor_stem(report: &Report) -> String {
    format!("soil_report_{}", report.id)
}

/// File stem for an extraction result that has no stored record
pub fn timestamp_stem() -> String {
    format!("soil_report_{}", Utc::now().format("%Y%m%d%H%M%S"))
}

/// Writes `data` as indented JSON to `<dir>/<stem>.json`
pub async fn export_json<T: Serialize>(
    data: &T,
    dir: &Path,
    stem: &str,
) -> Result<PathBuf, ExportError> {
    let json = serde_json::to_string_pretty(data)?;
    let path = dir.join(format!("{}.json", stem));
    tokio::fs::write(&path, json).await?;
    info!("Exported {}", path.display());

    Ok(path)
}

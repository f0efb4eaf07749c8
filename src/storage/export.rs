use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{fs::operations::write_atomic, utils::time::date_to_file_name};

use super::entities::{ExportEntity, SessionEntity};

/// `attendance-data-<YYYY-MM-DD>.json`, dated in UTC.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("attendance-data-{}.json", date_to_file_name(now.date_naive()))
}

/// Writes every session together with the export moment into `dir` and returns the file path.
/// An export from the same day is overwritten.
pub async fn export_sessions(
    sessions: &[SessionEntity],
    now: DateTime<Utc>,
    dir: &Path,
) -> Result<PathBuf> {
    let path = dir.join(export_file_name(now));
    let export = ExportEntity {
        sessions: sessions.to_vec(),
        export_date: now,
    };

    let buffer = serde_json::to_vec_pretty(&export)?;
    write_atomic(&path, &buffer)
        .await
        .with_context(|| format!("Failed to write export into {path:?}"))?;

    info!("Exported {} sessions into {path:?}", sessions.len());
    Ok(path)
}

//! CSV export of run and weight history.
//!
//! Each export rewrites its file from scratch with a header row, then
//! flushes and fsyncs before returning.

use crate::{Result, RunHistory, WeightEntry};
use std::fs::File;
use std::path::Path;

/// A row in the runs CSV
#[derive(Debug, serde::Serialize)]
struct RunRow {
    id: String,
    recorded_at: String,
    distance_km: f64,
    duration_ms: i64,
    calories_burned: i32,
    avg_pace: String,
    path: String,
}

impl RunRow {
    fn try_from_run(run: &RunHistory) -> Result<Self> {
        Ok(RunRow {
            id: run.id.to_string(),
            recorded_at: run.recorded_at.to_rfc3339(),
            distance_km: run.distance_km,
            duration_ms: run.duration_ms,
            calories_burned: run.calories_burned,
            avg_pace: run.avg_pace.clone(),
            path: crate::tracker::encode_path(&run.path)?,
        })
    }
}

/// A row in the weights CSV
#[derive(Debug, serde::Serialize)]
struct WeightRow {
    id: String,
    recorded_at: String,
    weight_kg: f64,
}

impl From<&WeightEntry> for WeightRow {
    fn from(entry: &WeightEntry) -> Self {
        WeightRow {
            id: entry.id.to_string(),
            recorded_at: entry.recorded_at.to_rfc3339(),
            weight_kg: entry.weight_kg,
        }
    }
}

/// Write runs to `path`, returning the number of rows written
pub fn export_runs_csv(runs: &[RunHistory], path: &Path) -> Result<usize> {
    let rows = runs
        .iter()
        .map(RunRow::try_from_run)
        .collect::<Result<Vec<_>>>()?;
    write_rows(&rows, path)?;

    tracing::info!("Exported {} runs to {:?}", rows.len(), path);
    Ok(rows.len())
}

/// Write the weight history to `path`, returning the number of rows written
pub fn export_weights_csv(entries: &[WeightEntry], path: &Path) -> Result<usize> {
    let rows: Vec<WeightRow> = entries.iter().map(WeightRow::from).collect();
    write_rows(&rows, path)?;

    tracing::info!("Exported {} weight entries to {:?}", rows.len(), path);
    Ok(rows.len())
}

fn write_rows<T: serde::Serialize>(rows: &[T], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    Ok(())
}

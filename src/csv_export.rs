// src/csv_export.rs
use anyhow::{Context, Result};
use csv::Writer;
use std::path::Path;
use tracing::info;

use crate::statistics::{PrimaryStatistics, RemainingStatistics};

/// Writes the primary statistics as CSV: one line per category-set row plus a
/// trailing total line.
pub fn write_primary_csv(
    path: &Path,
    statistics: &PrimaryStatistics,
    total_label: &str,
) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    writer.write_record([
        "Title",
        "Effective (min)",
        "Target (min)",
        "Effective %",
        "Target %",
    ])?;
    for row in &statistics.rows {
        let effective = row.effective_duration.to_string();
        let target = row.target_duration.to_string();
        writer.write_record([
            row.title.as_str(),
            effective.as_str(),
            target.as_str(),
            row.effective_workload_percent.as_str(),
            row.target_workload_percent.as_str(),
        ])?;
    }
    let total_effective = statistics.total_effective_duration.to_string();
    let total_target = statistics.total_target_duration.to_string();
    writer.write_record([
        total_label,
        total_effective.as_str(),
        total_target.as_str(),
        "",
        "",
    ])?;
    writer.flush()?;
    info!("Saved primary statistics to {}", path.display());
    Ok(())
}

pub fn write_remaining_csv(path: &Path, statistics: &RemainingStatistics) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    writer.write_record(["Title", "Effective (min)", "Target (min)"])?;
    for row in &statistics.rows {
        let effective = row.effective_duration.to_string();
        let target = row.target_duration.to_string();
        writer.write_record([row.title.as_str(), effective.as_str(), target.as_str()])?;
    }
    writer.flush()?;
    info!("Saved remaining statistics to {}", path.display());
    Ok(())
}

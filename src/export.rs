//! Plain-text export of summaries.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// File name for a summary exported at `at`, e.g. `bid_analysis_20250301_142500.txt`
pub fn export_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("bid_analysis_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Write `summary` into `dir`, creating the directory if needed.
pub fn write_summary<Tz>(
    dir: &Path,
    summary: &str,
    at: &DateTime<Tz>,
) -> std::io::Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(at));
    std::fs::write(&path, summary)?;
    tracing::info!(path = %path.display(), "summary exported");
    Ok(path)
}

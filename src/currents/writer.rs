/*
Copyright 2021 Jakub Lewandowski

This file is part of Marine Currents Converter (MCC).

Marine Currents Converter (MCC) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

Marine Currents Converter (MCC) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with Marine Currents Converter (MCC). If not, see https://www.gnu.org/licenses/.
*/

//! Writing the feature collection to GeoJSON files.
//!
//! Every run writes the collection twice: to the configured path and
//! to a copy stamped with the local date and time of the run, kept
//! alongside as the history of requests.

use crate::errors::OutputError;
use chrono::{DateTime, Local};
use geojson::FeatureCollection;
use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Writes the collection to `output_path` and its timestamped copy.
///
/// When the primary file cannot be written only the timestamped
/// copy is written. Returns the path of the main file written.
pub fn write_collection(
    collection: &FeatureCollection,
    output_path: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, OutputError> {
    let contents = serde_json::to_string_pretty(collection)?;

    if let Some(dir) = output_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            fs::create_dir_all(dir)?;
            info!("Created output directory {}", dir.display());
        }
    }

    let stamped_path = timestamped_path(output_path, now);

    if let Err(err) = fs::write(output_path, &contents) {
        warn!(
            "Cannot write {} ({}), writing only the timestamped copy",
            output_path.display(),
            err
        );
        fs::write(&stamped_path, &contents)?;
        return Ok(stamped_path);
    }

    fs::write(&stamped_path, &contents)?;
    debug!("Timestamped copy written to {}", stamped_path.display());

    Ok(output_path.to_path_buf())
}

/// `dir/name.geojson` becomes `dir/name_YYYYmmdd_HHMMSS.geojson`.
pub fn timestamped_path(output_path: &Path, now: DateTime<Local>) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = format!("{}_{}.geojson", stem, now.format("%Y%m%d_%H%M%S"));

    output_path.with_file_name(file_name)
}

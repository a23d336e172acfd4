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

//! Module converting Copernicus Marine sea water velocity
//! into a GeoJSON feature collection.
//!
//! The conversion runs in a single pass: configuration and credentials
//! are checked first, then the grid is read from the zarr store,
//! subsampled, turned into features and written to disk.
//! Any error stops the run before output is written.

mod features;
mod grid;
mod summary;
mod writer;
mod zarr_source;

use self::{summary::SpeedSummary, zarr_source::CopernicusStore};
use crate::cli::CurrentsArgs;
use crate::configuration::{credentials::Credentials, CurrentsConfig};
use crate::errors::AppError;
use chrono::{Local, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

/// Main currents function, responsible for all conversion steps.
pub fn main(args: &CurrentsArgs) -> Result<(), AppError> {
    let config = CurrentsConfig::new_from_args(args, Utc::now())?;

    // credentials must be valid before anything is requested
    let credentials = Credentials::resolve()?;
    debug!("Using Copernicus Marine account {}", credentials.username);

    info!("Fetching currents of {}", config.dataset_id);
    info!(
        "Area: {}° to {}° E, {}° to {}° N",
        config.bbox.min_lon, config.bbox.max_lon, config.bbox.min_lat, config.bbox.max_lat
    );
    info!(
        "Period: {} to {}",
        config.time_range.start.format("%Y-%m-%dT%H:%M:%SZ"),
        config.time_range.end.format("%Y-%m-%dT%H:%M:%SZ")
    );

    let store = CopernicusStore::open(&config.store_url)?;
    let grid = store.read_grid(&config)?.subsample(config.stride);

    let (steps, height, width) = grid.dim();
    info!(
        "Building features for {} time steps on {}x{} gridpoints",
        steps, height, width
    );

    let progress_bar = ProgressBar::new(steps as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .progress_chars("#>-"),
    );
    progress_bar.set_prefix("Time steps");

    let collection = features::convert_grid_to_features(&grid, config.arrow_scale, &progress_bar);
    progress_bar.finish_with_message("done");

    info!("Writing GeoJSON");
    let written = writer::write_collection(&collection, &config.output_path, Local::now())?;

    info!("File written: {}", written.display());
    info!("Number of features: {}", collection.features.len());

    match SpeedSummary::new(&grid) {
        Some(summary) => summary.log(),
        None => info!("No valid current data in the selected area"),
    }

    Ok(())
}

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

//! Module responsible for building and checking the configuration
//! of the currents conversion.
//!
//! Configuration comes either from one of the named [`presets`]
//! or from a YAML file deserialized with `serde`, which enforces
//! strong typing and automatic type checking. In both cases
//! command line overrides are applied on top and the result
//! is checked before any data is requested.

pub mod credentials;
pub mod presets;

use crate::cli::CurrentsArgs;
use crate::constants::{COPERNICUS_ZARR_URL, DEFAULT_TIME_STEPS, MAX_FORECAST_HOURS};
use crate::errors::ConfigError;
use crate::Float;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Geographic extent (in degrees) of requested data.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct BoundingBox {
    pub min_lon: Float,
    pub max_lon: Float,
    pub min_lat: Float,
    pub max_lat: Float,
}

impl BoundingBox {
    /// Builds the bounding box from `MIN_LON,MAX_LON,MIN_LAT,MAX_LAT` list.
    pub fn from_slice(values: &[Float]) -> Result<Self, ConfigError> {
        if let [min_lon, max_lon, min_lat, max_lat] = *values {
            Ok(BoundingBox {
                min_lon,
                max_lon,
                min_lat,
                max_lat,
            })
        } else {
            Err(ConfigError::OutOfBounds(
                "Bounding box needs exactly four values",
            ))
        }
    }

    /// Checks if bounding box follows conventions and limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        let coords = [self.min_lon, self.max_lon, self.min_lat, self.max_lat];

        if coords.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::OutOfBounds(
                "Bounding box coordinates must be finite",
            ));
        }

        if !(-180.0..=180.0).contains(&self.min_lon) || !(-180.0..=180.0).contains(&self.max_lon) {
            return Err(ConfigError::OutOfBounds(
                "Longitude is too low or too high",
            ));
        }

        if !(-90.0..=90.0).contains(&self.min_lat) || !(-90.0..=90.0).contains(&self.max_lat) {
            return Err(ConfigError::OutOfBounds("Latitude is too low or too high"));
        }

        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(ConfigError::OutOfBounds(
                "Bounding box minimum must be smaller than maximum",
            ));
        }

        Ok(())
    }
}

/// Forecast window. Currently, it is reported in the log
/// but data is always taken from the most recent time steps
/// available in the store.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Window of `hours` starting at `start`.
    /// Fails when `hours` is negative or longer than [`MAX_FORECAST_HOURS`].
    pub fn from_hours(start: DateTime<Utc>, hours: i64) -> Result<Self, ConfigError> {
        if !(0..=MAX_FORECAST_HOURS).contains(&hours) {
            return Err(ConfigError::OutOfBounds("Forecast window is too long"));
        }

        let end = start
            .checked_add_signed(Duration::hours(hours))
            .ok_or(ConfigError::OutOfBounds("Forecast window is too long"))?;

        Ok(TimeRange { start, end })
    }
}

/// Spatial sampling interval along longitude (`x`)
/// and latitude (`y`).
///
/// Cannot be smaller than `1`. Defaults to `1` (every gridpoint).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize)]
pub struct Stride {
    pub x: usize,
    pub y: usize,
}

impl Default for Stride {
    fn default() -> Self {
        Stride { x: 1, y: 1 }
    }
}

/// Depth range (in metres, positive downwards).
/// The level nearest to `min` is read.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct DepthRange {
    pub min: Float,
    pub max: Float,
}

impl Default for DepthRange {
    fn default() -> Self {
        DepthRange { min: 0.0, max: 1.0 }
    }
}

/// Main config structure representing the fields in
/// configuration file.
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct CurrentsConfig {
    /// Copernicus Marine product identifier, used for reporting.
    pub dataset_id: String,

    /// Eastward and northward velocity variable names, in that order.
    pub variables: Vec<String>,

    pub bbox: BoundingBox,

    pub time_range: TimeRange,

    #[serde(default)]
    pub stride: Stride,

    /// Length (in degrees) of direction arrows.
    pub arrow_scale: Float,

    #[serde(default)]
    pub depth_range: DepthRange,

    pub output_path: PathBuf,

    /// _(Optional)_ Zarr store URL. Defaults to the global
    /// physics analysis and forecast store.
    #[serde(default = "CurrentsConfig::default_store_url")]
    pub store_url: String,

    /// _(Optional)_ Number of the most recent time steps to read.
    ///
    /// Cannot be less than `1`. Defaults to `6`.
    #[serde(default = "CurrentsConfig::default_time_steps")]
    pub time_steps: usize,
}

impl CurrentsConfig {
    /// Config structure constructor, responsible for
    /// deserializing configuration and checking it.
    pub fn new_from_file(file_path: &Path) -> Result<CurrentsConfig, ConfigError> {
        let data = fs::read(file_path)?;
        let config: CurrentsConfig = serde_yaml::from_slice(data.as_slice())?;

        config.check_bounds()?;

        Ok(config)
    }

    /// Builds the configuration from command line arguments:
    /// a YAML file or a preset, then overrides.
    pub fn new_from_args(args: &CurrentsArgs, now: DateTime<Utc>) -> Result<CurrentsConfig, ConfigError> {
        let bbox = match &args.bbox {
            Some(values) => Some(BoundingBox::from_slice(values)?),
            None => None,
        };

        let mut config = match &args.config {
            Some(path) => {
                debug!("Reading configuration from {}", path.display());
                CurrentsConfig::new_from_file(path)?
            }
            None => {
                debug!("Using {:?} preset", args.preset);
                args.preset.config(now, bbox)?
            }
        };

        if let Some(bbox) = bbox {
            config.bbox = bbox;
        }

        if let Some(hours) = args.hours {
            config.time_range = TimeRange::from_hours(config.time_range.start, hours)?;
        }

        if let Some(stride) = args.stride {
            config.stride = Stride {
                x: stride,
                y: stride,
            };
        }

        if let Some(arrow_scale) = args.arrow_scale {
            config.arrow_scale = arrow_scale;
        }

        if let Some(time_steps) = args.time_steps {
            config.time_steps = time_steps;
        }

        if let Some(output) = &args.output {
            config.output_path = output.clone();
        }

        config.check_bounds()?;

        Ok(config)
    }

    /// Checks that all components are present and within limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.dataset_id.is_empty() {
            return Err(ConfigError::MissingParameter("dataset_id"));
        }

        if self.variables.len() != 2 || self.variables.iter().any(String::is_empty) {
            return Err(ConfigError::OutOfBounds(
                "Exactly two velocity variables (eastward, northward) are required",
            ));
        }

        self.bbox.check_bounds()?;

        if self.time_range.end < self.time_range.start {
            return Err(ConfigError::OutOfBounds(
                "Time window cannot end before it starts",
            ));
        }

        if self.stride.x < 1 || self.stride.y < 1 {
            return Err(ConfigError::OutOfBounds("Stride cannot be less than 1"));
        }

        if !self.arrow_scale.is_finite() || self.arrow_scale <= 0.0 {
            return Err(ConfigError::OutOfBounds(
                "Arrow scale must be a positive number",
            ));
        }

        if !(self.depth_range.min <= self.depth_range.max) || self.depth_range.min < 0.0 {
            return Err(ConfigError::OutOfBounds(
                "Depth range must be non-negative and ordered",
            ));
        }

        if self.time_steps < 1 {
            return Err(ConfigError::OutOfBounds(
                "Number of time steps cannot be less than 1",
            ));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingParameter("output_path"));
        }

        if self.store_url.is_empty() {
            return Err(ConfigError::MissingParameter("store_url"));
        }

        Ok(())
    }

    fn default_store_url() -> String {
        COPERNICUS_ZARR_URL.to_string()
    }

    fn default_time_steps() -> usize {
        DEFAULT_TIME_STEPS
    }
}

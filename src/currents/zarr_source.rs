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

//! Sub-module reading sea water velocity from the Copernicus Marine
//! analysis-ready zarr store over HTTP.
//!
//! Arrays in the store follow CF conventions: coordinates are kept
//! in separate one-dimensional arrays (`longitude`, `latitude`,
//! `elevation`, `time`) and velocity components are four-dimensional
//! arrays with `(time, elevation, latitude, longitude)` axes.
//!
//! Only the part of the store covering the requested area, the level
//! nearest to the requested depth and the most recent time steps is
//! downloaded.

use super::grid::Grid;
use crate::configuration::CurrentsConfig;
use crate::errors::{AppError, DataError, SourceError};
use crate::Float;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use ndarray::Array3;
use std::{ops::Range, sync::Arc};
use zarrs::array::{Array, ArrayCreateError, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::{ReadableStorage, ReadableStorageTraits};
use zarrs_http::HTTPStore;

const LONGITUDE: &str = "longitude";
const LATITUDE: &str = "latitude";
const ELEVATION: &str = "elevation";
const TIME: &str = "time";

/// Largest time offset accepted from the store, about 100 000 years.
const MAX_TIME_OFFSET_MS: Float = 3.2e15;

const VELOCITY_DIMS: [&str; 4] = [TIME, ELEVATION, LATITUDE, LONGITUDE];

/// Read-only handle to the remote zarr store.
pub struct CopernicusStore {
    storage: ReadableStorage,
}

/// Indices of the requested part of the store.
#[derive(Clone, PartialEq, Eq, Debug)]
struct Selection {
    time: Range<usize>,
    elevation: usize,
    lat: Range<usize>,
    lon: Range<usize>,
}

impl Selection {
    fn subset(&self) -> ArraySubset {
        ArraySubset::new_with_ranges(&[
            self.time.start as u64..self.time.end as u64,
            self.elevation as u64..self.elevation as u64 + 1,
            self.lat.start as u64..self.lat.end as u64,
            self.lon.start as u64..self.lon.end as u64,
        ])
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.lat.len(), self.lon.len())
    }
}

impl CopernicusStore {
    pub fn open(url: &str) -> Result<Self, SourceError> {
        debug!("Opening zarr store at {}", url);
        let storage: ReadableStorage = Arc::new(HTTPStore::new(url)?);

        Ok(CopernicusStore { storage })
    }

    /// Reads both velocity components in the configured area,
    /// depth and time window.
    pub fn read_grid(&self, config: &CurrentsConfig) -> Result<Grid, AppError> {
        let lons = self.read_coordinate(LONGITUDE)?;
        let lats = self.read_coordinate(LATITUDE)?;
        let elevations = self.read_coordinate(ELEVATION)?;
        let (times, time_units) = self.read_time()?;

        debug!(
            "Store dimensions: time {}, elevation {}, latitude {}, longitude {}",
            times.len(),
            elevations.len(),
            lats.len(),
            lons.len()
        );

        let lon = index_range(&lons, config.bbox.min_lon, config.bbox.max_lon)
            .ok_or(DataError::EmptySelection("no longitude inside bounding box"))?;
        let lat = index_range(&lats, config.bbox.min_lat, config.bbox.max_lat)
            .ok_or(DataError::EmptySelection("no latitude inside bounding box"))?;
        let elevation = nearest_depth_index(&elevations, config.depth_range.min)
            .ok_or(DataError::EmptySelection("store has no depth levels"))?;
        let time = trailing_range(times.len(), config.time_steps);

        if time.is_empty() {
            return Err(DataError::EmptySelection("store has no time steps").into());
        }

        let depth = elevations[elevation].abs();
        if depth > config.depth_range.max {
            warn!(
                "Nearest level at {:.3} m is below requested depth range ({} - {} m)",
                depth, config.depth_range.min, config.depth_range.max
            );
        }

        let selection = Selection {
            time,
            elevation,
            lat,
            lon,
        };

        info!(
            "Reading {} time steps at {:.3} m depth on {}x{} gridpoints",
            selection.time.len(),
            depth,
            selection.lat.len(),
            selection.lon.len()
        );

        let u = self.read_component(&config.variables[0], &selection)?;
        let v = self.read_component(&config.variables[1], &selection)?;

        let times = decode_times(&times[selection.time.clone()], &time_units)?;

        let grid = Grid::new(
            u,
            v,
            lons[selection.lon.clone()].to_vec(),
            lats[selection.lat.clone()].to_vec(),
            times,
        )?;

        Ok(grid)
    }

    fn open_array(&self, name: &str) -> Result<Array<dyn ReadableStorageTraits>, AppError> {
        match Array::open(self.storage.clone(), &format!("/{}", name)) {
            Ok(array) => Ok(array),
            Err(ArrayCreateError::MissingMetadata) => {
                Err(DataError::VariableNotFound(name.to_string()).into())
            }
            Err(err) => Err(SourceError::ArrayOpen(err).into()),
        }
    }

    fn read_coordinate(&self, name: &str) -> Result<Vec<Float>, AppError> {
        let array = self.open_array(name)?;
        let subset = ArraySubset::new_with_shape(array.shape().to_vec());

        read_as_float(&array, name, &subset)
    }

    fn read_time(&self) -> Result<(Vec<Float>, String), AppError> {
        let array = self.open_array(TIME)?;
        let subset = ArraySubset::new_with_shape(array.shape().to_vec());

        let units = array
            .attributes()
            .get("units")
            .and_then(|u| u.as_str())
            .ok_or_else(|| DataError::TimeUnits("<missing>".to_string()))?
            .to_string();

        let values = read_as_float(&array, TIME, &subset)?;

        Ok((values, units))
    }

    /// Reads one velocity component with missing values set to NaN.
    fn read_component(&self, name: &str, selection: &Selection) -> Result<Array3<Float>, AppError> {
        debug!("Reading {}", name);
        let array = self.open_array(name)?;

        if array.shape().len() != VELOCITY_DIMS.len() {
            return Err(DataError::InconsistentGrid("velocity array must have four dimensions").into());
        }

        if let Some(dims) = dimension_names(&array) {
            if !is_velocity_layout(&dims) {
                return Err(DataError::InconsistentGrid(
                    "velocity dimensions are not (time, elevation, latitude, longitude)",
                )
                .into());
            }
        }

        let packing = Packing::of(&array);
        debug!("{} packing: {:?}", name, packing);

        let values = read_as_float(&array, name, &selection.subset())?;
        let values = packing.unpack(values);

        let component = Array3::from_shape_vec(selection.shape(), values).map_err(DataError::from)?;

        Ok(component)
    }
}

/// Reads the subset of a numeric array converting values to [`Float`].
fn read_as_float(
    array: &Array<dyn ReadableStorageTraits>,
    name: &str,
    subset: &ArraySubset,
) -> Result<Vec<Float>, AppError> {
    let values = match array.data_type() {
        DataType::Float32 => array
            .retrieve_array_subset_elements::<f32>(subset)
            .map_err(SourceError::from)?
            .into_iter()
            .map(Float::from)
            .collect(),
        DataType::Float64 => array
            .retrieve_array_subset_elements::<f64>(subset)
            .map_err(SourceError::from)?,
        DataType::Int8 => array
            .retrieve_array_subset_elements::<i8>(subset)
            .map_err(SourceError::from)?
            .into_iter()
            .map(Float::from)
            .collect(),
        DataType::Int16 => array
            .retrieve_array_subset_elements::<i16>(subset)
            .map_err(SourceError::from)?
            .into_iter()
            .map(Float::from)
            .collect(),
        DataType::UInt8 => array
            .retrieve_array_subset_elements::<u8>(subset)
            .map_err(SourceError::from)?
            .into_iter()
            .map(Float::from)
            .collect(),
        DataType::UInt16 => array
            .retrieve_array_subset_elements::<u16>(subset)
            .map_err(SourceError::from)?
            .into_iter()
            .map(Float::from)
            .collect(),
        DataType::Int32 => array
            .retrieve_array_subset_elements::<i32>(subset)
            .map_err(SourceError::from)?
            .into_iter()
            .map(Float::from)
            .collect(),
        DataType::Int64 => array
            .retrieve_array_subset_elements::<i64>(subset)
            .map_err(SourceError::from)?
            .into_iter()
            .map(|v| v as Float)
            .collect(),
        _ => return Err(DataError::UnsupportedDataType(name.to_string()).into()),
    };

    Ok(values)
}

/// Names of array dimensions, from zarr v3 `dimension_names`
/// or the xarray `_ARRAY_DIMENSIONS` attribute of zarr v2 arrays.
fn dimension_names(array: &Array<dyn ReadableStorageTraits>) -> Option<Vec<Option<String>>> {
    if let Some(names) = array.dimension_names() {
        return Some(names.iter().map(|n| n.as_str().map(str::to_string)).collect());
    }

    array
        .attributes()
        .get("_ARRAY_DIMENSIONS")
        .and_then(|dims| dims.as_array())
        .map(|dims| dims.iter().map(|d| d.as_str().map(str::to_string)).collect())
}

fn is_velocity_layout(dims: &[Option<String>]) -> bool {
    dims.iter()
        .map(Option::as_deref)
        .eq(VELOCITY_DIMS.iter().map(|n| Some(*n)))
}

/// CF encoding of stored values: missing value marker
/// and linear packing (`stored * scale_factor + add_offset`).
#[derive(Copy, Clone, PartialEq, Debug)]
struct Packing {
    fill_value: Option<Float>,
    scale_factor: Float,
    add_offset: Float,
}

impl Default for Packing {
    fn default() -> Self {
        Packing {
            fill_value: None,
            scale_factor: 1.0,
            add_offset: 0.0,
        }
    }
}

impl Packing {
    fn of(array: &Array<dyn ReadableStorageTraits>) -> Self {
        let attribute = |key: &str| array.attributes().get(key).and_then(|v| v.as_f64());

        let fill_value = attribute("_FillValue")
            .or_else(|| attribute("missing_value"))
            .or_else(|| fill_value_from_bytes(array.data_type(), array.fill_value().as_ne_bytes()));

        Packing {
            fill_value,
            scale_factor: attribute("scale_factor").unwrap_or(1.0),
            add_offset: attribute("add_offset").unwrap_or(0.0),
        }
    }

    /// Sets missing values to NaN and unpacks the rest.
    fn unpack(&self, values: Vec<Float>) -> Vec<Float> {
        let fill = self.fill_value.filter(|f| f.is_finite());

        values
            .into_iter()
            .map(|v| {
                if Some(v) == fill {
                    Float::NAN
                } else {
                    v * self.scale_factor + self.add_offset
                }
            })
            .collect()
    }
}

/// Interprets the array fill value of a numeric data type.
fn fill_value_from_bytes(data_type: &DataType, bytes: &[u8]) -> Option<Float> {
    let value = match data_type {
        DataType::Int8 => Float::from(i8::from_ne_bytes(bytes.try_into().ok()?)),
        DataType::Int16 => Float::from(i16::from_ne_bytes(bytes.try_into().ok()?)),
        DataType::Int32 => Float::from(i32::from_ne_bytes(bytes.try_into().ok()?)),
        DataType::Int64 => i64::from_ne_bytes(bytes.try_into().ok()?) as Float,
        DataType::UInt8 => Float::from(u8::from_ne_bytes(bytes.try_into().ok()?)),
        DataType::UInt16 => Float::from(u16::from_ne_bytes(bytes.try_into().ok()?)),
        DataType::Float32 => Float::from(f32::from_ne_bytes(bytes.try_into().ok()?)),
        DataType::Float64 => f64::from_ne_bytes(bytes.try_into().ok()?),
        _ => return None,
    };

    Some(value)
}

/// Range of indices of coordinates within `[min, max]`.
///
/// Coordinates can be either ascending or descending.
/// Returns `None` when no coordinate is inside.
fn index_range(coords: &[Float], min: Float, max: Float) -> Option<Range<usize>> {
    let inside = |c: &Float| (min..=max).contains(c);

    let first = coords.iter().position(inside)?;
    let last = coords.iter().rposition(inside)?;

    Some(first..last + 1)
}

/// Index of the level with depth nearest to `depth`.
/// Elevations may be stored as negative values.
fn nearest_depth_index(elevations: &[Float], depth: Float) -> Option<usize> {
    elevations
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_finite())
        .min_by(|(_, a), (_, b)| {
            let da = (a.abs() - depth).abs();
            let db = (b.abs() - depth).abs();
            da.total_cmp(&db)
        })
        .map(|(i, _)| i)
}

fn trailing_range(len: usize, steps: usize) -> Range<usize> {
    len.saturating_sub(steps)..len
}

/// Decodes CF time values (`<unit> since <reference>`)
/// to `YYYY-MM-DDTHH:MM:SS` strings.
fn decode_times(values: &[Float], units: &str) -> Result<Vec<String>, DataError> {
    let units_error = || DataError::TimeUnits(units.to_string());

    let (unit, reference) = units.split_once(" since ").ok_or_else(units_error)?;

    let unit_seconds: Float = match unit.trim().to_lowercase().as_str() {
        "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
        "minutes" | "minute" | "mins" | "min" => 60.0,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
        "days" | "day" | "d" => 86400.0,
        _ => return Err(units_error()),
    };

    let reference = parse_reference(reference.trim()).ok_or_else(units_error)?;

    values
        .iter()
        .map(|&v| {
            let invalid = || DataError::InvalidTime(format!("{} {}", v, unit.trim()));

            let millis = (v * unit_seconds * 1000.0).round();
            if !millis.is_finite() || millis.abs() > MAX_TIME_OFFSET_MS {
                return Err(invalid());
            }

            let time = reference
                .checked_add_signed(Duration::milliseconds(millis as i64))
                .ok_or_else(invalid)?;

            Ok(time.format("%Y-%m-%dT%H:%M:%S").to_string())
        })
        .collect()
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let reference = reference.trim_end_matches('Z').trim_end_matches(" UTC");

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(reference, format) {
            return Some(datetime);
        }
    }

    NaiveDate::parse_from_str(reference, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

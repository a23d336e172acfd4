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

//! Module containing constants used by the converter.

use crate::Float;

/// Knots in one metre per second.
pub const MS_TO_KNOTS: Float = 1.94384;

/// Analysis-ready zarr store of the global physics analysis and forecast
/// (`GLOBAL_ANALYSISFORECAST_PHY_001_024`), chunked along time.
pub const COPERNICUS_ZARR_URL: &str = "https://s3.waw3-1.cloudferro.com/mdl-arco-time-009/arco/GLOBAL_ANALYSISFORECAST_PHY_001_024/cmems_mod_glo_phy-cur_anfc_0.083deg_PT6H-i_202406/timeChunked.zarr";

/// Depth (in metres) of the topmost model level in Copernicus products.
#[allow(clippy::excessive_precision)]
pub const SURFACE_DEPTH: Float = 0.494_024_991_989_135_74;

/// Number of the most recent time steps read from the store by default.
pub const DEFAULT_TIME_STEPS: usize = 6;

/// Longest accepted forecast window, in hours.
pub const MAX_FORECAST_HOURS: i64 = 24 * 366;

/// Default directory for GeoJSON written by presets.
pub const DEFAULT_OUTPUT_DIR: &str = "data/currents";

/// Environment variables holding Copernicus Marine credentials.
pub const USERNAME_VAR: &str = "COPERNICUS_USERNAME";
pub const PASSWORD_VAR: &str = "COPERNICUS_PASSWORD";

/// Fallback credentials used when environment variables are not set.
/// The placeholder password is rejected, so real credentials must come
/// from the environment or be written here.
pub const FALLBACK_USERNAME: &str = "";
pub const PLACEHOLDER_PASSWORD: &str = "VOTRE_MOT_DE_PASSE_ICI";
pub const FALLBACK_PASSWORD: &str = PLACEHOLDER_PASSWORD;

/// GRIB short names accepted for the `U` and `V` components.
pub const U_SHORT_NAMES: [&str; 3] = ["u", "u10m", "ugrd"];
pub const V_SHORT_NAMES: [&str; 3] = ["v", "v10m", "vgrd"];

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

//! Catalog of named configurations for areas and scenarios
//! commonly requested by the front-end.

use super::{BoundingBox, CurrentsConfig, DepthRange, Stride, TimeRange};
use crate::constants::{COPERNICUS_ZARR_URL, DEFAULT_OUTPUT_DIR, DEFAULT_TIME_STEPS};
use crate::errors::ConfigError;
use crate::Float;
use chrono::{DateTime, Timelike, Utc};
use clap::ValueEnum;
use std::path::PathBuf;

const GLOBAL_6H: &str = "cmems_mod_glo_phy-cur_anfc_0.083deg_PT6H-i";
const GLOBAL_MERGED_1H: &str = "cmems_mod_glo_phy_anfc_merged-uv_PT1H-i_DYNAMIC_202211";
const IBI_1H: &str = "cmems_mod_ibi_phy_anfc_0.027deg-2D_PT1H-m_DYNAMIC";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, ValueEnum)]
pub enum Preset {
    /// Small area off southern Brittany, global 6-hourly product.
    TestSimple,
    /// Gulf of Morbihan and Belle-Île.
    BretagneSud,
    /// Western English Channel, Brest to Cherbourg.
    Manche,
    /// North Atlantic overview.
    AtlantiqueLarge,
    /// Bay of Biscay, regional hourly product.
    GolfeGascogne,
    /// Fine sampling for detailed tactical analysis.
    HauteResolution,
    /// Three-day forecast on a coarser sampling.
    PrevisionLongue,
    /// Any area given with `--bbox`.
    Custom,
}

/// Values which differ between presets.
struct PresetParams {
    dataset_id: &'static str,
    bbox: BoundingBox,
    hours: i64,
    stride: usize,
    arrow_scale: Float,
    file_name: &'static str,
}

impl Preset {
    /// Builds the configuration of a preset for the window starting
    /// at the beginning of the current hour.
    ///
    /// Only [`Preset::Custom`] uses `bbox`, and requires it.
    pub fn config(
        self,
        now: DateTime<Utc>,
        bbox: Option<BoundingBox>,
    ) -> Result<CurrentsConfig, ConfigError> {
        let params = self.params(bbox)?;
        let start = truncate_to_hour(now);

        Ok(CurrentsConfig {
            dataset_id: params.dataset_id.to_string(),
            variables: vec!["uo".to_string(), "vo".to_string()],
            bbox: params.bbox,
            time_range: TimeRange::from_hours(start, params.hours)?,
            stride: Stride {
                x: params.stride,
                y: params.stride,
            },
            arrow_scale: params.arrow_scale,
            depth_range: DepthRange::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR).join(params.file_name),
            store_url: COPERNICUS_ZARR_URL.to_string(),
            time_steps: DEFAULT_TIME_STEPS,
        })
    }

    fn params(self, bbox: Option<BoundingBox>) -> Result<PresetParams, ConfigError> {
        let params = match self {
            Preset::TestSimple => PresetParams {
                dataset_id: GLOBAL_6H,
                bbox: bounding_box(-5.0, -2.0, 46.0, 48.0),
                hours: 6,
                stride: 10,
                arrow_scale: 0.1,
                file_name: "test_currents.geojson",
            },
            Preset::BretagneSud => PresetParams {
                bbox: bounding_box(-3.5, -2.0, 47.0, 47.8),
                file_name: "bretagne_sud_currents.geojson",
                ..custom_defaults()
            },
            Preset::Manche => PresetParams {
                bbox: bounding_box(-5.0, -1.0, 48.0, 50.0),
                file_name: "manche_currents.geojson",
                ..custom_defaults()
            },
            Preset::AtlantiqueLarge => PresetParams {
                dataset_id: GLOBAL_MERGED_1H,
                bbox: bounding_box(-20.0, 5.0, 40.0, 55.0),
                hours: 48,
                stride: 10,
                arrow_scale: 0.1,
                file_name: "atlantique.geojson",
            },
            Preset::GolfeGascogne => PresetParams {
                dataset_id: IBI_1H,
                bbox: bounding_box(-8.0, -1.0, 43.0, 48.0),
                hours: 24,
                stride: 5,
                arrow_scale: 0.06,
                file_name: "gascogne.geojson",
            },
            Preset::HauteResolution => PresetParams {
                dataset_id: IBI_1H,
                bbox: bounding_box(-6.0, -1.0, 45.0, 49.0),
                hours: 6,
                stride: 2,
                arrow_scale: 0.02,
                file_name: "haute_resolution.geojson",
            },
            Preset::PrevisionLongue => PresetParams {
                dataset_id: GLOBAL_MERGED_1H,
                bbox: bounding_box(-6.0, -1.0, 45.0, 49.0),
                hours: 72,
                stride: 8,
                arrow_scale: 0.07,
                file_name: "prevision_longue.geojson",
            },
            Preset::Custom => PresetParams {
                bbox: bbox.ok_or(ConfigError::MissingParameter(
                    "bounding box (--bbox) is required by the custom preset",
                ))?,
                ..custom_defaults()
            },
        };

        Ok(params)
    }
}

fn custom_defaults() -> PresetParams {
    PresetParams {
        dataset_id: GLOBAL_MERGED_1H,
        bbox: bounding_box(-6.0, -1.0, 45.0, 49.0),
        hours: 24,
        stride: 6,
        arrow_scale: 0.05,
        file_name: "custom.geojson",
    }
}

fn bounding_box(min_lon: Float, max_lon: Float, min_lat: Float, max_lat: Float) -> BoundingBox {
    BoundingBox {
        min_lon,
        max_lon,
        min_lat,
        max_lat,
    }
}

fn truncate_to_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

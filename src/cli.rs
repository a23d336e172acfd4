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

//! Command line interface definition.

use crate::configuration::presets::Preset;
use crate::Float;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Convert ocean current and weather grids for the mapping front-end.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch sea water velocity from Copernicus Marine and
    /// write it as a GeoJSON feature collection.
    Currents(CurrentsArgs),

    /// Print values of one field from a GRIB file as CSV records.
    Grib(GribArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CurrentsArgs {
    /// Named configuration preset.
    #[arg(short, long, value_enum, default_value_t = Preset::TestSimple)]
    pub preset: Preset,

    /// Complete configuration in YAML. Takes precedence over `--preset`.
    #[arg(short, long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Forecast window length in hours.
    #[arg(long)]
    pub hours: Option<i64>,

    /// Spatial sampling interval applied on both axes.
    #[arg(long)]
    pub stride: Option<usize>,

    /// Length of the direction arrows in degrees.
    #[arg(long)]
    pub arrow_scale: Option<Float>,

    /// Bounding box as `MIN_LON,MAX_LON,MIN_LAT,MAX_LAT`.
    /// Required by the `custom` preset.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub bbox: Option<Vec<Float>>,

    /// Number of the most recent time steps to read.
    #[arg(long)]
    pub time_steps: Option<usize>,

    /// Output GeoJSON path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct GribArgs {
    /// Input GRIB file.
    pub file: PathBuf,

    /// `U`, `V` or a field name, eg. `TEMP`.
    pub component: String,

    /// Field short name overriding the component, eg. `prmsl`.
    pub field_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use crate::configuration::presets::Preset;
    use clap::Parser;

    #[test]
    fn parse_grib() {
        let cli = Cli::try_parse_from(["mcc", "grib", "data.grib", "TEMP", "TMP"]).unwrap();

        match cli.command {
            Command::Grib(args) => {
                assert_eq!(args.file.to_str(), Some("data.grib"));
                assert_eq!(args.component, "TEMP");
                assert_eq!(args.field_name.as_deref(), Some("TMP"));
            }
            Command::Currents(_) => panic!("expected grib subcommand"),
        }
    }

    #[test]
    fn parse_currents_overrides() {
        let cli = Cli::try_parse_from([
            "mcc",
            "currents",
            "--preset",
            "golfe-gascogne",
            "--bbox",
            "-7.0,0.0,46.0,50.0",
            "--stride",
            "3",
        ])
        .unwrap();

        match cli.command {
            Command::Currents(args) => {
                assert_eq!(args.preset, Preset::GolfeGascogne);
                assert_eq!(args.bbox, Some(vec![-7.0, 0.0, 46.0, 50.0]));
                assert_eq!(args.stride, Some(3));
                assert!(args.config.is_none());
            }
            Command::Grib(_) => panic!("expected currents subcommand"),
        }
    }

    #[test]
    fn grib_needs_component() {
        assert!(Cli::try_parse_from(["mcc", "grib", "data.grib"]).is_err());
    }
}

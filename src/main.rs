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

//! Marine Currents Converter (MCC) fetches ocean-current and
//! meteorological grid data and converts it into formats
//! easily consumed by a front-end mapping application.
//!
//! Two conversions are available:
//!
//! - `mcc currents` reads sea water velocity from the Copernicus Marine
//! zarr store and writes it as a GeoJSON feature collection of points and arrows,
//! - `mcc grib` reads a local GRIB file with ecCodes and prints
//! the selected field as CSV records on standard output.

mod cli;
mod configuration;
mod constants;
mod currents;
mod errors;
mod gribs;

use clap::Parser;
use cli::{Cli, Command};
use env_logger::Env;
use errors::AppError;
use log::{error, info};
use std::process;

type Float = f64;

/// The main program function.
/// Prepares the runtime environment and dispatches the subcommand.
///
/// Logging goes to the standard error so that CSV records printed
/// by `mcc grib` are the only thing on the standard output.
/// Any error ends the process with non-zero exit status.
fn main() {
    #[cfg(not(feature = "debug"))]
    let logger_env = Env::new().filter_or("MCC_LOG_LEVEL", "info");

    #[cfg(feature = "debug")]
    let logger_env = Env::new().filter_or("MCC_LOG_LEVEL", "debug");

    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(_) => info!("Conversion finished."),
        Err(err) => {
            error!("Conversion failed with error: {}", err);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Currents(args) => currents::main(&args),
        Command::Grib(args) => gribs::main(&args),
    }
}

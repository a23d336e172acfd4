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

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot access data source: {0}")]
    Source(#[from] SourceError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Cannot write output: {0}")]
    Output(#[from] OutputError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open configuration file: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("Cannot deserialize configuration file: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),

    #[error("Configuration component is out of bounds: {0}")]
    OutOfBounds(&'static str),

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Copernicus Marine credentials are not configured, set {0} and {1}")]
    MissingCredentials(&'static str, &'static str),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot create HTTP store: {0}")]
    HttpStore(#[from] zarrs_http::HTTPStoreCreateError),

    #[error("Cannot open zarr array: {0}")]
    ArrayOpen(#[from] zarrs::array::ArrayCreateError),

    #[error("Cannot read zarr array: {0}")]
    ArrayRead(#[from] zarrs::array::ArrayError),

    #[error("ecCodes failed to read GRIB: {0}")]
    Codes(#[from] eccodes::errors::CodesError),

    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Variable {0} not found in the source")]
    VariableNotFound(String),

    #[error("Selection is empty: {0}")]
    EmptySelection(&'static str),

    #[error("No data found for component {component} (fields in file: {available})")]
    NoRecords { component: String, available: String },

    #[error("Key {0} has incorrect type")]
    IncorrectKeyType(&'static str),

    #[error("Inconsistent grid: {0}")]
    InconsistentGrid(&'static str),

    #[error("Cannot shape array: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Unsupported data type of {0}")]
    UnsupportedDataType(String),

    #[error("Cannot decode time units '{0}'")]
    TimeUnits(String),

    #[error("Time value {0} is out of range")]
    InvalidTime(String),
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Cannot write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot serialize GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot write CSV: {0}")]
    Csv(#[from] csv::Error),
}

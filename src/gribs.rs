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

//! Module extracting gridpoint values of one field from a local GRIB file
//! and printing them as CSV lines on standard output.

mod reader;
mod selector;
mod writer;

use self::{reader::read_records, selector::FieldSelector, writer::RecordWriter};
use crate::cli::GribArgs;
use crate::errors::{AppError, DataError};
use log::info;
use std::io;

pub fn main(args: &GribArgs) -> Result<(), AppError> {
    let selector = FieldSelector::new(&args.component, args.field_name.as_deref());
    info!(
        "Reading {} from {}",
        args.component,
        args.file.display()
    );

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());

    let summary = read_records(&args.file, &selector, |record| writer.write(record))?;
    writer.flush()?;

    if summary.records == 0 {
        return Err(DataError::NoRecords {
            component: args.component.clone(),
            available: summary.available(),
        }
        .into());
    }

    info!(
        "Written {} records from {} of {} messages",
        summary.records, summary.selected, summary.messages
    );

    Ok(())
}

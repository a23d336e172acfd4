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

//! CSV output of GRIB records.

use super::reader::GribRecord;
use crate::errors::OutputError;
use crate::Float;
use std::io::Write;

/// Writes records as header-less CSV lines:
/// `record,message,grid,sub_grid,lat,lon,value`.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W) -> Self {
        let inner = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);

        RecordWriter { inner }
    }

    pub fn write(&mut self, record: &GribRecord) -> Result<(), OutputError> {
        self.inner.write_record(&[
            record.record.to_string(),
            record.message.to_string(),
            record.grid.to_string(),
            record.sub_grid.to_string(),
            format_float(record.lat),
            format_float(record.lon),
            format_float(record.value),
        ])?;

        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.inner.flush()?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.inner.into_inner() {
            Ok(out) => out,
            Err(err) => panic!("cannot flush CSV writer: {}", err),
        }
    }
}

/// Shortest representation that reads back to the same value,
/// always with a decimal point (`-90.0`); missing values are `nan`.
fn format_float(value: Float) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }

    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::{format_float, RecordWriter};
    use crate::gribs::reader::GribRecord;

    #[test]
    fn floats() {
        assert_eq!(format_float(-90.0), "-90.0");
        assert_eq!(format_float(12.5), "12.5");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn lines() {
        let mut writer = RecordWriter::new(vec![]);

        for (record, value) in [(0, 12.5), (1, f64::NAN)] {
            writer
                .write(&GribRecord {
                    record,
                    message: 3,
                    grid: 0,
                    sub_grid: 0,
                    lat: -90.0,
                    lon: -180.0 + record as f64 * 0.25,
                    value,
                })
                .unwrap();
        }

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "0,3,0,0,-90.0,-180.0,12.5\n1,3,0,0,-90.0,-179.75,nan\n");
    }
}

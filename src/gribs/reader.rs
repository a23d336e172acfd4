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

//! Reading of gridpoint values from GRIB messages with ecCodes.

use super::selector::FieldSelector;
use crate::errors::{AppError, DataError, OutputError, SourceError};
use crate::Float;
use eccodes::codes_handle::{CodesHandle, KeyType, KeyedMessage, ProductKind::GRIB};
use eccodes::FallibleIterator;
use log::{debug, warn};
use rustc_hash::FxHashSet;
use std::path::Path;

/// Value of a single gridpoint of a selected message.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct GribRecord {
    pub record: usize,
    pub message: usize,
    pub grid: usize,
    pub sub_grid: usize,
    pub lat: Float,
    pub lon: Float,
    pub value: Float,
}

/// Gridpoint arrays of one message.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MessageArrays {
    pub lats: Vec<Float>,
    pub lons: Vec<Float>,
    pub values: Vec<Float>,
}

#[derive(Clone, Debug, Default)]
pub struct ReadSummary {
    pub messages: usize,
    pub selected: usize,
    pub records: usize,
    pub short_names: FxHashSet<String>,
}

impl ReadSummary {
    /// Distinct short names seen in the file, sorted and comma-separated.
    pub fn available(&self) -> String {
        let mut names: Vec<&str> = self.short_names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.join(", ")
    }

    /// Accounts for the next message of the file and returns its records.
    ///
    /// Every message advances the (1-based) message index.
    /// Arrays are read only for messages matching `selector`;
    /// a message whose arrays cannot be read is skipped
    /// and does not advance the record index.
    pub fn next_message<F>(
        &mut self,
        selector: &FieldSelector,
        short_name: String,
        read_arrays: F,
    ) -> Vec<GribRecord>
    where
        F: FnOnce() -> Result<MessageArrays, AppError>,
    {
        self.messages += 1;

        let selected = selector.matches(&short_name);
        self.short_names.insert(short_name);

        if !selected {
            return vec![];
        }

        let records = read_arrays().and_then(|arrays| {
            Ok(records_from_message(
                self.records,
                self.messages,
                &arrays.lats,
                &arrays.lons,
                &arrays.values,
            )?)
        });

        let records = match records {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "Skipping message {} ({}): {}",
                    self.messages,
                    selector_label(selector),
                    err
                );
                return vec![];
            }
        };

        debug!(
            "Message {} selected with {} gridpoints",
            self.messages,
            records.len()
        );

        self.selected += 1;
        self.records += records.len();

        records
    }
}

/// Iterates over all messages of the file and passes every gridpoint
/// of messages matching `selector` to `emit`, in file order.
pub fn read_records<F>(
    path: &Path,
    selector: &FieldSelector,
    mut emit: F,
) -> Result<ReadSummary, AppError>
where
    F: FnMut(&GribRecord) -> Result<(), OutputError>,
{
    if !path.exists() {
        return Err(SourceError::FileNotFound(path.to_path_buf()).into());
    }

    let mut handle = CodesHandle::new_from_file(path, GRIB).map_err(SourceError::from)?;
    let mut summary = ReadSummary::default();

    while let Some(msg) = handle.next().map_err(SourceError::from)? {
        let short_name = match msg.read_key("shortName").map_err(SourceError::from)?.value {
            KeyType::Str(name) => name,
            _ => return Err(DataError::IncorrectKeyType("shortName").into()),
        };

        let records = summary.next_message(selector, short_name, || read_arrays(&msg));

        for record in &records {
            emit(record)?;
        }
    }

    Ok(summary)
}

fn selector_label(selector: &FieldSelector) -> &str {
    match selector {
        FieldSelector::U => "U",
        FieldSelector::V => "V",
        FieldSelector::Name(name) => name,
    }
}

fn read_arrays(msg: &KeyedMessage) -> Result<MessageArrays, AppError> {
    let read = |key: &'static str| -> Result<Vec<Float>, AppError> {
        let value = msg.read_key(key).map_err(SourceError::from)?.value;
        Ok(float_values(key, value)?)
    };

    Ok(MessageArrays {
        lats: read("latitudes")?,
        lons: read("longitudes")?,
        values: read("values")?,
    })
}

/// ecCodes returns a single float instead of an array
/// for keys with exactly one element.
fn float_values(key: &'static str, value: KeyType) -> Result<Vec<Float>, DataError> {
    match value {
        KeyType::FloatArray(v) => Ok(v),
        KeyType::Float(v) => Ok(vec![v]),
        _ => Err(DataError::IncorrectKeyType(key)),
    }
}

/// Zips gridpoint coordinates with values into records
/// numbered from `first_record`.
pub fn records_from_message(
    first_record: usize,
    message: usize,
    lats: &[Float],
    lons: &[Float],
    values: &[Float],
) -> Result<Vec<GribRecord>, DataError> {
    if lats.len() != values.len() || lons.len() != values.len() {
        return Err(DataError::InconsistentGrid(
            "latitudes, longitudes and values have different lengths",
        ));
    }

    let records = lats
        .iter()
        .zip(lons)
        .zip(values)
        .enumerate()
        .map(|(i, ((&lat, &lon), &value))| GribRecord {
            record: first_record + i,
            message,
            grid: 0,
            sub_grid: 0,
            lat,
            lon,
            value,
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{float_values, read_records, records_from_message, MessageArrays, ReadSummary};
    use crate::errors::{AppError, DataError, SourceError};
    use crate::gribs::selector::FieldSelector;
    use eccodes::codes_handle::KeyType;
    use std::path::Path;

    fn arrays(values: &[f64]) -> MessageArrays {
        MessageArrays {
            lats: vec![45.0; values.len()],
            lons: (0..values.len()).map(|i| -5.0 + i as f64).collect(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn records_are_numbered() {
        let records =
            records_from_message(4, 2, &[50.0, 49.75], &[-5.0, -5.0], &[1.5, f64::NAN]).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record, 4);
        assert_eq!(records[1].record, 5);
        assert!(records.iter().all(|r| r.message == 2));
        assert!(records.iter().all(|r| r.grid == 0 && r.sub_grid == 0));
        assert_eq!(records[1].lat, 49.75);
        assert!(records[1].value.is_nan());
    }

    #[test]
    fn length_mismatch() {
        let result = records_from_message(0, 1, &[50.0], &[-5.0, -4.0], &[1.0]);
        assert!(matches!(result, Err(DataError::InconsistentGrid(_))));
    }

    #[test]
    fn available_names_sorted() {
        let mut summary = ReadSummary::default();
        for name in ["vgrd", "prmsl", "ugrd", "prmsl"] {
            summary.short_names.insert(name.to_string());
        }

        assert_eq!(summary.available(), "prmsl, ugrd, vgrd");
    }

    #[test]
    fn missing_file() {
        let result = read_records(
            Path::new("does/not/exist.grib2"),
            &FieldSelector::U,
            |_| Ok(()),
        );

        assert!(matches!(
            result,
            Err(AppError::Source(SourceError::FileNotFound(_)))
        ));
    }

    #[test]
    fn message_and_record_indices() {
        let selector = FieldSelector::U;
        let mut summary = ReadSummary::default();

        let t = summary.next_message(&selector, "t".to_string(), || {
            panic!("arrays of unselected messages are not read")
        });
        assert!(t.is_empty());

        let first = summary.next_message(&selector, "ugrd".to_string(), || Ok(arrays(&[1.0, 2.0])));
        let v = summary.next_message(&selector, "vgrd".to_string(), || Ok(arrays(&[9.0])));
        let broken = summary.next_message(&selector, "ugrd".to_string(), || {
            Err(DataError::IncorrectKeyType("values").into())
        });
        let last = summary.next_message(&selector, "u10m".to_string(), || Ok(arrays(&[3.0])));

        assert!(v.is_empty());
        assert!(broken.is_empty());

        assert_eq!(first.iter().map(|r| r.message).collect::<Vec<_>>(), vec![2, 2]);
        assert_eq!(first.iter().map(|r| r.record).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].message, 5);
        assert_eq!(last[0].record, 2);
        assert_eq!(last[0].value, 3.0);

        assert_eq!(summary.messages, 5);
        assert_eq!(summary.selected, 2);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.available(), "t, u10m, ugrd, vgrd");
    }

    #[test]
    fn mismatched_arrays_are_skipped() {
        let selector = FieldSelector::Name("prmsl".to_string());
        let mut summary = ReadSummary::default();

        let records = summary.next_message(&selector, "prmsl".to_string(), || {
            Ok(MessageArrays {
                lats: vec![45.0],
                lons: vec![-5.0, -4.0],
                values: vec![101_325.0],
            })
        });

        assert!(records.is_empty());
        assert_eq!(summary.messages, 1);
        assert_eq!(summary.records, 0);
    }

    #[test]
    fn single_gridpoint_keys() {
        assert_eq!(float_values("values", KeyType::Float(12.5)).unwrap(), vec![12.5]);
        assert_eq!(
            float_values("values", KeyType::FloatArray(vec![1.0, 2.0])).unwrap(),
            vec![1.0, 2.0]
        );
        assert!(matches!(
            float_values("latitudes", KeyType::Str("x".to_string())),
            Err(DataError::IncorrectKeyType("latitudes"))
        ));

        let mut summary = ReadSummary::default();
        let records = summary.next_message(&FieldSelector::V, "v".to_string(), || {
            Ok(MessageArrays {
                lats: float_values("latitudes", KeyType::Float(47.0))?,
                lons: float_values("longitudes", KeyType::Float(-3.0))?,
                values: float_values("values", KeyType::Float(0.25))?,
            })
        });

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lat, 47.0);
        assert_eq!(records[0].lon, -3.0);
    }
}

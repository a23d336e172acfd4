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

//! Normalized velocity grid consumed by the feature builder,
//! independent of the source it was read from.

use crate::configuration::Stride;
use crate::errors::DataError;
use crate::Float;
use ndarray::{s, Array3};

/// Eastward (`u`) and northward (`v`) velocity components
/// on a regular lon-lat mesh.
///
/// Arrays are indexed `[time, latitude row, longitude column]`.
/// Missing values are NaN.
#[derive(Clone, PartialEq, Debug)]
pub struct Grid {
    pub u: Array3<Float>,
    pub v: Array3<Float>,
    pub lons: Vec<Float>,
    pub lats: Vec<Float>,
    pub times: Vec<String>,
}

impl Grid {
    /// Grid constructor checking that components and
    /// coordinates describe the same mesh.
    pub fn new(
        u: Array3<Float>,
        v: Array3<Float>,
        lons: Vec<Float>,
        lats: Vec<Float>,
        times: Vec<String>,
    ) -> Result<Self, DataError> {
        if u.dim() != v.dim() {
            return Err(DataError::InconsistentGrid(
                "u and v components have different shapes",
            ));
        }

        let (steps, height, width) = u.dim();

        if steps != times.len() {
            return Err(DataError::InconsistentGrid(
                "number of time values differs from grid time axis",
            ));
        }

        if height != lats.len() {
            return Err(DataError::InconsistentGrid(
                "number of latitudes differs from grid height",
            ));
        }

        if width != lons.len() {
            return Err(DataError::InconsistentGrid(
                "number of longitudes differs from grid width",
            ));
        }

        Ok(Grid {
            u,
            v,
            lons,
            lats,
            times,
        })
    }

    /// Shape as `(time steps, height, width)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.u.dim()
    }

    /// Takes every `stride.y`-th row and `stride.x`-th column
    /// starting from the first one.
    pub fn subsample(&self, stride: Stride) -> Grid {
        let step_x = stride.x.max(1) as isize;
        let step_y = stride.y.max(1) as isize;

        let u = self.u.slice(s![.., ..;step_y, ..;step_x]).to_owned();
        let v = self.v.slice(s![.., ..;step_y, ..;step_x]).to_owned();

        let lons = self.lons.iter().copied().step_by(step_x as usize).collect();
        let lats = self.lats.iter().copied().step_by(step_y as usize).collect();

        Grid {
            u,
            v,
            lons,
            lats,
            times: self.times.clone(),
        }
    }
}

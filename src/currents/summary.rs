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

//! Speed statistics reported after a successful conversion.

use super::{features::speed, grid::Grid};
use crate::constants::MS_TO_KNOTS;
use crate::Float;
use log::info;

#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct SpeedSummary {
    pub min_kn: Float,
    pub max_kn: Float,
    pub mean_kn: Float,
    pub points: usize,
    pub time_steps: usize,
}

impl SpeedSummary {
    /// Computes statistics over gridpoints with both components present,
    /// the same ones that become point features.
    /// Returns `None` when there are no such gridpoints.
    pub fn new(grid: &Grid) -> Option<Self> {
        let speeds: Vec<Float> = grid
            .u
            .iter()
            .zip(grid.v.iter())
            .filter(|(u, v)| u.is_finite() && v.is_finite())
            .map(|(u, v)| speed(*u, *v) * MS_TO_KNOTS)
            .collect();

        if speeds.is_empty() {
            return None;
        }

        let min_kn = speeds.iter().copied().fold(Float::INFINITY, Float::min);
        let max_kn = speeds.iter().copied().fold(Float::NEG_INFINITY, Float::max);
        let mean_kn = speeds.iter().sum::<Float>() / speeds.len() as Float;

        Some(SpeedSummary {
            min_kn,
            max_kn,
            mean_kn,
            points: speeds.len(),
            time_steps: grid.times.len(),
        })
    }

    pub fn points_per_step(&self) -> usize {
        if self.time_steps == 0 {
            return 0;
        }
        self.points / self.time_steps
    }

    pub fn log(&self) {
        info!(
            "Current speed: min {:.2} kn, max {:.2} kn, mean {:.2} kn",
            self.min_kn, self.max_kn, self.mean_kn
        );
        info!(
            "Time steps: {}, points per time step: {}",
            self.time_steps,
            self.points_per_step()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::SpeedSummary;
    use crate::currents::grid::Grid;
    use crate::Float;
    use float_cmp::approx_eq;
    use ndarray::Array3;

    fn grid(u: Vec<Float>, v: Vec<Float>) -> Grid {
        Grid::new(
            Array3::from_shape_vec((2, 1, 2), u).unwrap(),
            Array3::from_shape_vec((2, 1, 2), v).unwrap(),
            vec![0.0, 1.0],
            vec![45.0],
            vec!["t0".to_string(), "t1".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn statistics_over_valid_points() {
        let nan = Float::NAN;
        let summary = grid(vec![1.0, nan, 0.0, 0.0], vec![0.0, 5.0, 3.0, nan]);
        let summary = SpeedSummary::new(&summary).unwrap();

        assert_eq!(summary.points, 2);
        assert_eq!(summary.points_per_step(), 1);
        assert!(approx_eq!(Float, summary.min_kn, 1.94384, epsilon = 1e-12));
        assert!(approx_eq!(Float, summary.max_kn, 3.0 * 1.94384, epsilon = 1e-12));
        assert!(approx_eq!(Float, summary.mean_kn, 2.0 * 1.94384, epsilon = 1e-12));
    }

    #[test]
    fn no_points() {
        let nan = Float::NAN;
        assert!(SpeedSummary::new(&grid(vec![nan; 4], vec![0.0; 4])).is_none());
    }
}

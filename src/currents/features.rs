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

//! Sub-module converting a velocity grid into geographic features.
//!
//! Each valid gridpoint at each time step becomes two features:
//! a point carrying speed and direction, and a short line segment
//! (arrow) pointing where the current flows to.
//!
//! Arrow length is given in degrees and applied equally to longitude
//! and latitude. Longitude offset is not corrected by the cosine of
//! latitude, so arrows pointing east-west look longer on the map
//! than arrows pointing north-south. The front-end relies on this
//! rendering, so it is kept as is.

use super::grid::Grid;
use crate::constants::MS_TO_KNOTS;
use crate::Float;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use indicatif::ProgressBar;
use log::debug;

/// Values shared by the point and arrow of one gridpoint.
#[derive(Clone, PartialEq, PartialOrd, Debug)]
pub struct CurrentProperties {
    pub time: String,
    pub u: Float,
    pub v: Float,
    pub speed_ms: Float,
    pub speed_kn: Float,
    pub dir_deg: Float,
}

impl CurrentProperties {
    pub fn new(time: &str, u: Float, v: Float) -> Self {
        let speed_ms = speed(u, v);

        CurrentProperties {
            time: time.to_string(),
            u,
            v,
            speed_ms,
            speed_kn: speed_ms * MS_TO_KNOTS,
            dir_deg: direction_deg(u, v),
        }
    }

    fn to_json_object(&self) -> JsonObject {
        let mut properties = JsonObject::new();

        properties.insert("time".to_string(), JsonValue::from(self.time.clone()));
        properties.insert("u".to_string(), JsonValue::from(self.u));
        properties.insert("v".to_string(), JsonValue::from(self.v));
        properties.insert("speed_ms".to_string(), JsonValue::from(self.speed_ms));
        properties.insert("speed_kn".to_string(), JsonValue::from(self.speed_kn));
        properties.insert("dir_deg".to_string(), JsonValue::from(self.dir_deg));

        properties
    }
}

#[derive(Clone, PartialEq, PartialOrd, Debug)]
pub enum CurrentFeature {
    Point {
        lon: Float,
        lat: Float,
        properties: CurrentProperties,
    },
    Arrow {
        origin: (Float, Float),
        end: (Float, Float),
        properties: CurrentProperties,
    },
}

impl CurrentFeature {
    pub fn is_arrow(&self) -> bool {
        matches!(self, CurrentFeature::Arrow { .. })
    }
}

impl From<&CurrentFeature> for Feature {
    fn from(feature: &CurrentFeature) -> Self {
        let (geometry, mut properties) = match feature {
            CurrentFeature::Point {
                lon,
                lat,
                properties,
            } => (Value::Point(vec![*lon, *lat]), properties.to_json_object()),
            CurrentFeature::Arrow {
                origin,
                end,
                properties,
            } => (
                Value::LineString(vec![vec![origin.0, origin.1], vec![end.0, end.1]]),
                properties.to_json_object(),
            ),
        };

        if feature.is_arrow() {
            properties.insert("is_arrow".to_string(), JsonValue::Bool(true));
        }

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geometry)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Current speed (in m/s) from velocity components.
pub fn speed(u: Float, v: Float) -> Float {
    (u * u + v * v).sqrt()
}

/// Direction (in degrees, clockwise from north) the current flows to.
/// Always in `[0, 360)`.
pub fn direction_deg(u: Float, v: Float) -> Float {
    (u.atan2(v).to_degrees() + 360.0) % 360.0
}

/// End of an arrow of `arrow_scale` degrees starting at `(lon, lat)`.
pub fn arrow_end(lon: Float, lat: Float, dir_deg: Float, arrow_scale: Float) -> (Float, Float) {
    let theta = dir_deg.to_radians();

    (
        lon + arrow_scale * theta.sin(),
        lat + arrow_scale * theta.cos(),
    )
}

/// Builds point and arrow features for every valid gridpoint,
/// time step by time step, row by row.
///
/// Gridpoints where either component is not finite are skipped,
/// so a time slice without any valid data simply contributes nothing.
fn build_features(grid: &Grid, arrow_scale: Float, progress: &ProgressBar) -> Vec<CurrentFeature> {
    let (steps, height, width) = grid.dim();
    let mut features = Vec::new();

    for t in 0..steps {
        let time = &grid.times[t];
        let count_before = features.len();

        for j in 0..height {
            for i in 0..width {
                let u = grid.u[[t, j, i]];
                let v = grid.v[[t, j, i]];

                if !u.is_finite() || !v.is_finite() {
                    continue;
                }

                let (lon, lat) = (grid.lons[i], grid.lats[j]);
                let properties = CurrentProperties::new(time, u, v);
                let end = arrow_end(lon, lat, properties.dir_deg, arrow_scale);

                features.push(CurrentFeature::Point {
                    lon,
                    lat,
                    properties: properties.clone(),
                });

                features.push(CurrentFeature::Arrow {
                    origin: (lon, lat),
                    end,
                    properties,
                });
            }
        }

        if features.len() == count_before {
            debug!("No valid data at {}, time step skipped", time);
        }

        progress.inc(1);
    }

    features
}

/// Converts the whole grid into a feature collection,
/// advancing `progress` once per time step.
pub fn convert_grid_to_features(
    grid: &Grid,
    arrow_scale: Float,
    progress: &ProgressBar,
) -> FeatureCollection {
    let features = build_features(grid, arrow_scale, progress);

    FeatureCollection {
        bbox: None,
        features: features.iter().map(Feature::from).collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{arrow_end, direction_deg, speed, CurrentProperties};
    use crate::constants::MS_TO_KNOTS;
    use crate::currents::grid::Grid;
    use crate::Float;
    use float_cmp::approx_eq;
    use geojson::{FeatureCollection, GeoJson, JsonValue, Value};
    use indicatif::ProgressBar;
    use ndarray::Array3;

    fn convert_grid_to_features(grid: &Grid, arrow_scale: Float) -> FeatureCollection {
        super::convert_grid_to_features(grid, arrow_scale, &ProgressBar::hidden())
    }

    fn grid(u: Vec<Float>, v: Vec<Float>, shape: (usize, usize, usize)) -> Grid {
        let lons = (0..shape.2).map(|i| -5.0 + i as Float).collect();
        let lats = (0..shape.1).map(|j| 46.0 + j as Float).collect();
        let times = (0..shape.0).map(|t| format!("2024-06-01T0{}:00:00", t)).collect();

        Grid::new(
            Array3::from_shape_vec(shape, u).unwrap(),
            Array3::from_shape_vec(shape, v).unwrap(),
            lons,
            lats,
            times,
        )
        .unwrap()
    }

    fn number(feature: &geojson::Feature, key: &str) -> Float {
        feature.property(key).and_then(JsonValue::as_f64).unwrap()
    }

    #[test]
    fn cardinal_directions() {
        assert!(approx_eq!(Float, direction_deg(1.0, 0.0), 90.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, direction_deg(0.0, 1.0), 0.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, direction_deg(-1.0, 0.0), 270.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, direction_deg(0.0, -1.0), 180.0, epsilon = 1e-12));
    }

    #[test]
    fn direction_range() {
        let components = [-2.0, -1.0, -1e-17, -0.0, 0.0, 1e-17, 0.3, 1.0, 2.5];

        for u in components {
            for v in components {
                let dir = direction_deg(u, v);
                assert!((0.0..360.0).contains(&dir), "{} for ({}, {})", dir, u, v);
            }
        }
    }

    #[test]
    fn speed_in_knots() {
        for (u, v) in [(0.3, -0.4), (1.2, 0.0), (-0.05, 0.7), (0.0, 0.0)] {
            let props = CurrentProperties::new("t", u, v);
            assert!(approx_eq!(Float, props.speed_ms, speed(u, v)));
            assert!(approx_eq!(Float, props.speed_kn, props.speed_ms * MS_TO_KNOTS));
        }

        assert!(approx_eq!(Float, speed(0.3, -0.4), 0.5, ulps = 2));
    }

    #[test]
    fn arrow_endpoints() {
        let (lon, lat) = arrow_end(-3.0, 47.0, 0.0, 0.1);
        assert!(approx_eq!(Float, lon, -3.0, epsilon = 1e-12));
        assert!(approx_eq!(Float, lat, 47.1, epsilon = 1e-12));

        let (lon, lat) = arrow_end(-3.0, 47.0, 90.0, 0.1);
        assert!(approx_eq!(Float, lon, -2.9, epsilon = 1e-12));
        assert!(approx_eq!(Float, lat, 47.0, epsilon = 1e-12));
    }

    #[test]
    fn feature_count_and_order() {
        // 2 time steps, 2x2 grid, one missing gridpoint in the first step
        let nan = Float::NAN;
        let u = vec![1.0, nan, 0.0, -1.0, 0.5, 0.5, 0.5, 0.5];
        let v = vec![0.0, 1.0, 1.0, 0.0, 0.5, 0.5, 0.5, 0.5];
        let fc = convert_grid_to_features(&grid(u, v, (2, 2, 2)), 0.1);

        assert_eq!(fc.features.len(), 2 * 7);

        let kinds: Vec<bool> = fc
            .features
            .iter()
            .map(|f| f.property("is_arrow").is_some())
            .collect();
        assert!(kinds.chunks(2).all(|pair| pair == [false, true]));

        // first step, row 0 col 0, then row 1 col 0 (row 0 col 1 is missing)
        let first = &fc.features[0];
        assert_eq!(
            first.geometry.as_ref().unwrap().value,
            Value::Point(vec![-5.0, 46.0])
        );
        assert!(approx_eq!(Float, number(first, "dir_deg"), 90.0, epsilon = 1e-12));

        let third = &fc.features[2];
        assert_eq!(
            third.geometry.as_ref().unwrap().value,
            Value::Point(vec![-5.0, 47.0])
        );
        assert_eq!(
            third.property("time").and_then(JsonValue::as_str),
            Some("2024-06-01T00:00:00")
        );

        let last = fc.features.last().unwrap();
        assert_eq!(
            last.property("time").and_then(JsonValue::as_str),
            Some("2024-06-01T01:00:00")
        );
        assert_eq!(last.property("is_arrow"), Some(&JsonValue::Bool(true)));
    }

    #[test]
    fn arrow_geometry() {
        let fc = convert_grid_to_features(&grid(vec![0.0], vec![2.0], (1, 1, 1)), 0.1);

        match &fc.features[1].geometry.as_ref().unwrap().value {
            Value::LineString(line) => {
                assert_eq!(line.len(), 2);
                assert_eq!(line[0], vec![-5.0, 46.0]);
                assert!(approx_eq!(Float, line[1][0], -5.0, epsilon = 1e-12));
                assert!(approx_eq!(Float, line[1][1], 46.1, epsilon = 1e-12));
            }
            other => panic!("expected line string, got {:?}", other),
        }
    }

    #[test]
    fn missing_components_are_skipped() {
        let nan = Float::NAN;
        let fc = convert_grid_to_features(&grid(vec![nan, 0.2], vec![0.1, nan], (1, 1, 2)), 0.1);
        assert!(fc.features.is_empty());
    }

    #[test]
    fn empty_slices() {
        let nan = Float::NAN;

        // first slice entirely missing, second valid
        let u = vec![nan, nan, 0.1, 0.2];
        let v = vec![nan, nan, 0.1, 0.2];
        let fc = convert_grid_to_features(&grid(u, v, (2, 1, 2)), 0.1);
        assert_eq!(fc.features.len(), 4);

        let fc = convert_grid_to_features(&grid(vec![nan; 4], vec![nan; 4], (2, 1, 2)), 0.1);
        assert!(fc.features.is_empty());

        let fc = convert_grid_to_features(&grid(vec![], vec![], (0, 0, 0)), 0.1);
        assert!(fc.features.is_empty());
    }

    #[test]
    fn property_keys_order() {
        let fc = convert_grid_to_features(&grid(vec![0.1], vec![0.1], (1, 1, 1)), 0.1);
        let keys: Vec<&str> = fc.features[1]
            .properties
            .as_ref()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert_eq!(
            keys,
            vec!["time", "u", "v", "speed_ms", "speed_kn", "dir_deg", "is_arrow"]
        );
    }

    #[test]
    fn serialization_round_trip() {
        let nan = Float::NAN;
        let u = vec![0.123_456_789, -0.3, nan, 1.0e-3];
        let v = vec![-0.987_654_321, 0.7, 0.1, 2.5];
        let fc = convert_grid_to_features(&grid(u, v, (1, 2, 2)), 0.07);

        let text = serde_json::to_string_pretty(&fc).unwrap();
        let parsed: GeoJson = text.parse().unwrap();
        let parsed = FeatureCollection::try_from(parsed).unwrap();

        assert_eq!(parsed.features.len(), 6);
        assert_eq!(parsed, fc);
    }
}

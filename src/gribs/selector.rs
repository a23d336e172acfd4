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

//! Matching of GRIB messages against the requested component.

use crate::constants::{U_SHORT_NAMES, V_SHORT_NAMES};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FieldSelector {
    /// Eastward wind or current component.
    U,
    /// Northward wind or current component.
    V,
    /// Any field whose short name contains this (lowercase) text.
    Name(String),
}

impl FieldSelector {
    /// `U` and `V` (case-insensitive) select vector components,
    /// anything else is a field name, unless `field_name` overrides it.
    pub fn new(component: &str, field_name: Option<&str>) -> Self {
        if component.eq_ignore_ascii_case("u") {
            return FieldSelector::U;
        }

        if component.eq_ignore_ascii_case("v") {
            return FieldSelector::V;
        }

        FieldSelector::Name(field_name.unwrap_or(component).to_lowercase())
    }

    pub fn matches(&self, short_name: &str) -> bool {
        match self {
            FieldSelector::U => U_SHORT_NAMES.contains(&short_name),
            FieldSelector::V => V_SHORT_NAMES.contains(&short_name),
            FieldSelector::Name(name) => short_name.to_lowercase().contains(name.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FieldSelector;

    #[test]
    fn vector_components() {
        let u = FieldSelector::new("u", None);
        assert_eq!(u, FieldSelector::U);
        assert!(u.matches("u"));
        assert!(u.matches("ugrd"));
        assert!(u.matches("u10m"));
        assert!(!u.matches("v"));
        assert!(!u.matches("10u"));

        let v = FieldSelector::new("V", Some("ignored"));
        assert_eq!(v, FieldSelector::V);
        assert!(v.matches("vgrd"));
        assert!(!v.matches("ugrd"));
    }

    #[test]
    fn field_names() {
        let temp = FieldSelector::new("TEMP", Some("TMP"));
        assert_eq!(temp, FieldSelector::Name("tmp".to_string()));
        assert!(temp.matches("tmp"));
        assert!(!temp.matches("t"));

        let pressure = FieldSelector::new("PRESSURE", Some("PRMSL"));
        assert!(pressure.matches("prmsl"));

        let temp = FieldSelector::new("t", None);
        assert!(temp.matches("2t"));
        assert!(temp.matches("t"));
        assert!(!temp.matches("msl"));
    }
}

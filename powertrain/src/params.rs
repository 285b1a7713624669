/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of ev-designer.
 *
 * ev-designer is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * ev-designer is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with ev-designer. If not, see <https://www.gnu.org/licenses/>.
 */

use crate::{Error, Result};

/// Describes one numeric input field: where it is shown, what it means and the
/// range of values it accepts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub key: &'static str,
    pub group: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub decimals: usize,
    /// Only whole values are accepted, e.g. tooth counts
    pub whole: bool
}

impl ParamSpec {
    pub const fn new(key: &'static str,
                     group: &'static str,
                     label: &'static str,
                     unit: &'static str,
                     range: (f64, f64),
                     step: f64,
                     decimals: usize) -> ParamSpec {
        ParamSpec { key, group, label, unit, min: range.0, max: range.1, step, decimals, whole: false }
    }

    pub const fn whole_number(mut self) -> ParamSpec {
        self.whole = true;
        self
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn check(&self, value: f64) -> Result<()> {
        if !self.contains(value) {
            return Err(Error::OutOfRange { key: self.key, value, min: self.min, max: self.max });
        }
        if self.whole && value.fract() != 0.0 {
            return Err(Error::NotAWholeNumber { key: self.key, value });
        }
        Ok(())
    }

    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", self.decimals, value)
    }

    /// The label with its unit appended, e.g. `Mass (kg)`
    pub fn display_label(&self) -> String {
        match self.unit.is_empty() {
            true => self.label.to_string(),
            false => format!("{} ({})", self.label, self.unit)
        }
    }

    /// Parses user entered text and checks it against the allowed range
    pub fn parse(&self, text: &str) -> Result<f64> {
        let value = text.trim().parse::<f64>().map_err(|_| Error::NotANumber(text.to_string()))?;
        self.check(value)?;
        Ok(value)
    }
}

/// A set of named numeric inputs that can be edited field by field
pub trait DesignInputs {
    fn param_specs() -> &'static [ParamSpec];

    fn get(&self, key: &str) -> Option<f64>;

    fn set_unchecked(&mut self, key: &str, value: f64) -> Result<()>;

    fn spec(key: &str) -> Result<&'static ParamSpec> {
        Self::param_specs()
            .iter()
            .find(|spec| spec.key == key)
            .ok_or_else(|| Error::UnknownParameter(key.to_string()))
    }

    fn set(&mut self, key: &str, value: f64) -> Result<()> {
        Self::spec(key)?.check(value)?;
        self.set_unchecked(key, value)
    }

    fn validate(&self) -> Result<()> {
        for spec in Self::param_specs() {
            let value = self.get(spec.key).ok_or_else(|| Error::UnknownParameter(spec.key.to_string()))?;
            spec.check(value)?;
        }
        Ok(())
    }
}

/// Implements [`DesignInputs`] for a struct of `f64` fields whose names match the keys
/// of the given spec table.
macro_rules! impl_design_inputs {
    ($ty:ty, $specs:expr, [$($field:ident),+ $(,)?]) => {
        impl $crate::params::DesignInputs for $ty {
            fn param_specs() -> &'static [$crate::params::ParamSpec] {
                &$specs
            }

            fn get(&self, key: &str) -> Option<f64> {
                match key {
                    $(k if k == stringify!($field) => Some(self.$field),)+
                    _ => None
                }
            }

            fn set_unchecked(&mut self, key: &str, value: f64) -> $crate::Result<()> {
                match key {
                    $(k if k == stringify!($field) => {
                        self.$field = value;
                        Ok(())
                    })+
                    _ => Err($crate::Error::UnknownParameter(key.to_string()))
                }
            }
        }
    };
}

pub(crate) use impl_design_inputs;

// Fields shared by several input sets
pub(crate) const VEHICLE: &str = "Vehicle";
pub(crate) const MASS: (f64, f64) = (1000.0, 10000.0);
pub(crate) const GRAVITY: (f64, f64) = (9.0, 10.0);
pub(crate) const ROLLING_COEFFICIENT: (f64, f64) = (0.001, 0.1);
pub(crate) const DRAG_COEFFICIENT: (f64, f64) = (0.1, 1.0);
pub(crate) const FRONTAL_AREA: (f64, f64) = (1.0, 10.0);
pub(crate) const EFFICIENCY: (f64, f64) = (0.5, 1.0);
pub(crate) const MOTOR_RPM: (f64, f64) = (1000.0, 10000.0);
pub(crate) const MOTOR_MAX_RPM: (f64, f64) = (1000.0, 15000.0);
pub(crate) const PEAK_TORQUE: (f64, f64) = (100.0, 1000.0);
pub(crate) const WHEEL_RADIUS: (f64, f64) = (0.1, 1.0);
pub(crate) const GRADE_ANGLE: (f64, f64) = (5.0, 30.0);
pub(crate) const TOTAL_RATIO: (f64, f64) = (1.0, 20.0);

#[cfg(test)]
mod tests {
    use crate::Error;
    use crate::params::{DesignInputs, ParamSpec};

    const TEST_SPECS: [ParamSpec; 2] = [
        ParamSpec::new("mass", "Vehicle", "Mass", "kg", (1000.0, 10000.0), 100.0, 0),
        ParamSpec::new("ratio", "Gearing", "Ratio", "", (1.0, 20.0), 0.01, 2),
    ];

    #[derive(Debug, Default)]
    struct TestInputs {
        mass: f64,
        ratio: f64
    }

    impl_design_inputs!(TestInputs, TEST_SPECS, [mass, ratio]);

    #[test]
    fn spec_range_checks() {
        let spec = &TEST_SPECS[0];
        assert!(spec.contains(1000.0));
        assert!(spec.contains(10000.0));
        assert!(!spec.contains(999.9));
        assert!(!spec.contains(f64::NAN));
        assert!(matches!(spec.check(0.0), Err(Error::OutOfRange { key: "mass", .. })));
    }

    #[test]
    fn whole_number_specs() {
        let teeth = ParamSpec::new("teeth", "Gear design", "Pinion teeth", "", (12.0, 40.0), 1.0, 0).whole_number();
        assert!(teeth.check(17.0).is_ok());
        assert!(matches!(teeth.check(17.6), Err(Error::NotAWholeNumber { key: "teeth", .. })));
        assert!(matches!(teeth.parse("17.6"), Err(Error::NotAWholeNumber { .. })));
        assert!(TEST_SPECS[0].check(1000.5).is_ok());
    }

    #[test]
    fn spec_parsing_and_formatting() {
        let spec = &TEST_SPECS[1];
        assert_eq!(spec.parse(" 7.11 ").unwrap(), 7.11);
        assert!(matches!(spec.parse("abc"), Err(Error::NotANumber(_))));
        assert!(matches!(spec.parse("25"), Err(Error::OutOfRange { .. })));
        assert_eq!(spec.format(7.0), "7.00");
        assert_eq!(spec.display_label(), "Ratio");
        assert_eq!(TEST_SPECS[0].display_label(), "Mass (kg)");
    }

    #[test]
    fn generated_accessors() {
        let mut inputs = TestInputs { mass: 4200.0, ratio: 7.0 };
        assert_eq!(inputs.get("mass"), Some(4200.0));
        assert_eq!(inputs.get("nope"), None);
        inputs.set("ratio", 4.0).unwrap();
        assert_eq!(inputs.ratio, 4.0);
        assert!(inputs.set("ratio", 40.0).is_err());
        assert_eq!(inputs.ratio, 4.0);
        assert!(matches!(inputs.set("nope", 1.0), Err(Error::UnknownParameter(_))));
        assert!(inputs.validate().is_ok());

        inputs.mass = 0.0;
        assert!(inputs.validate().is_err());
    }
}

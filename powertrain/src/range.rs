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

//! How the cruising range responds to changes in mass, rolling resistance, drag
//! coefficient and frontal area.

use std::fmt::{Display, Formatter};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};
use utils::numeric::percent_change;
use crate::{Error, Result};
use crate::params::{impl_design_inputs, ParamSpec, VEHICLE};
use crate::params::{DRAG_COEFFICIENT, EFFICIENCY, FRONTAL_AREA, GRAVITY, MASS, ROLLING_COEFFICIENT};
use crate::resistance::{RoadLoad, tractive_power_kw};

const DRIVE: &str = "Drive";

pub const RANGE_PARAMS: [ParamSpec; 10] = [
    ParamSpec::new("cruise_speed_kmh", DRIVE, "Cruise speed", "km/h", (30.0, 120.0), 5.0, 1),
    ParamSpec::new("transmission_efficiency", DRIVE, "Driveline efficiency", "", EFFICIENCY, 0.01, 2),
    ParamSpec::new("motor_efficiency", DRIVE, "Motor efficiency", "", (0.5, 1.0), 0.01, 2),
    ParamSpec::new("gravity", DRIVE, "Gravitational acceleration", "m/s²", GRAVITY, 0.1, 2),
    ParamSpec::new("battery_energy_kwh", DRIVE, "Battery energy", "kWh", (10.0, 200.0), 5.0, 2),
    ParamSpec::new("laden_mass", VEHICLE, "Laden mass", "kg", MASS, 1.0, 2),
    ParamSpec::new("curb_mass", VEHICLE, "Curb mass", "kg", MASS, 1.0, 2),
    ParamSpec::new("rolling_coefficient", VEHICLE, "Rolling resistance coefficient", "", ROLLING_COEFFICIENT, 0.001, 3),
    ParamSpec::new("drag_coefficient", VEHICLE, "Drag coefficient", "", DRAG_COEFFICIENT, 0.01, 2),
    ParamSpec::new("frontal_area", VEHICLE, "Frontal area", "m²", FRONTAL_AREA, 0.1, 3),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeInputs {
    pub cruise_speed_kmh: f64,
    pub transmission_efficiency: f64,
    pub motor_efficiency: f64,
    pub gravity: f64,
    pub battery_energy_kwh: f64,
    pub laden_mass: f64,
    pub curb_mass: f64,
    pub rolling_coefficient: f64,
    pub drag_coefficient: f64,
    pub frontal_area: f64
}

impl Default for RangeInputs {
    fn default() -> Self {
        RangeInputs {
            cruise_speed_kmh: 60.0,
            transmission_efficiency: 0.92,
            motor_efficiency: 0.92,
            gravity: 9.8,
            battery_energy_kwh: 68.74,
            laden_mass: 4250.0,
            curb_mass: 2980.0,
            rolling_coefficient: 0.015,
            drag_coefficient: 0.38,
            frontal_area: 3.769
        }
    }
}

impl_design_inputs!(RangeInputs, RANGE_PARAMS, [
    cruise_speed_kmh, transmission_efficiency, motor_efficiency, gravity, battery_energy_kwh,
    laden_mass, curb_mass, rolling_coefficient, drag_coefficient, frontal_area
]);

impl RangeInputs {
    /// Cruising range (km) at the laden mass
    pub fn range_km(&self) -> f64 {
        let road = RoadLoad::new(self.laden_mass, self.gravity, self.rolling_coefficient, self.drag_coefficient, self.frontal_area);
        let speed = self.cruise_speed_kmh;
        let power_kw = tractive_power_kw(road.level_road_force(speed), speed, self.transmission_efficiency);
        self.battery_energy_kwh * speed / power_kw * self.motor_efficiency
    }

    /// A copy of these inputs with `factor` set to `value`
    pub fn with_factor(&self, factor: Factor, value: f64) -> RangeInputs {
        let mut inputs = self.clone();
        match factor {
            Factor::Mass => inputs.laden_mass = value,
            Factor::RollingCoefficient => inputs.rolling_coefficient = value,
            Factor::DragCoefficient => inputs.drag_coefficient = value,
            Factor::FrontalArea => inputs.frontal_area = value
        }
        inputs
    }

    pub fn factor_value(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Mass => self.laden_mass,
            Factor::RollingCoefficient => self.rolling_coefficient,
            Factor::DragCoefficient => self.drag_coefficient,
            Factor::FrontalArea => self.frontal_area
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Factor {
    Mass,
    RollingCoefficient,
    DragCoefficient,
    FrontalArea
}

impl Factor {
    pub const ALL: [Factor; 4] = [Factor::Mass, Factor::RollingCoefficient, Factor::DragCoefficient, Factor::FrontalArea];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Mass => "Vehicle mass",
            Factor::RollingCoefficient => "Rolling resistance coefficient",
            Factor::DragCoefficient => "Drag coefficient",
            Factor::FrontalArea => "Frontal area"
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Factor::Mass => "kg",
            Factor::FrontalArea => "m²",
            _ => ""
        }
    }

    fn decimals(&self) -> usize {
        match self {
            Factor::Mass => 0,
            Factor::RollingCoefficient => 3,
            Factor::DragCoefficient => 2,
            Factor::FrontalArea => 1
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        match self.unit() {
            "" => format!("{:.*}", self.decimals(), value),
            unit => format!("{:.*} {}", self.decimals(), value, unit)
        }
    }
}

impl Display for Factor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Alternative values each factor is compared against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeProbes {
    pub mass: f64,
    pub rolling_coefficient: f64,
    pub drag_coefficient: f64,
    pub frontal_area: f64
}

impl Default for RangeProbes {
    fn default() -> Self {
        RangeProbes { mass: 1600.0, rolling_coefficient: 0.016, drag_coefficient: 0.35, frontal_area: 2.5 }
    }
}

impl RangeProbes {
    pub fn value(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Mass => self.mass,
            Factor::RollingCoefficient => self.rolling_coefficient,
            Factor::DragCoefficient => self.drag_coefficient,
            Factor::FrontalArea => self.frontal_area
        }
    }
}

/// Bounds of each factor's sweep. The mass sweep always runs from curb to laden mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeSweep {
    pub points: usize,
    pub rolling_coefficient: (f64, f64),
    pub drag_coefficient: (f64, f64),
    pub frontal_area: (f64, f64),
    /// Motor efficiency at curb mass, rising linearly to the input efficiency at laden mass
    pub curb_motor_efficiency: f64,
    pub probes: RangeProbes
}

impl Default for RangeSweep {
    fn default() -> Self {
        RangeSweep {
            points: 100,
            rolling_coefficient: (0.008, 0.018),
            drag_coefficient: (0.25, 0.45),
            frontal_area: (1.5, 3.5),
            curb_motor_efficiency: 0.85,
            probes: RangeProbes::default()
        }
    }
}

impl RangeSweep {
    pub fn validate(&self) -> Result<()> {
        match self.points < 2 {
            true => Err(Error::InvalidSweep(format!("need at least 2 points, got {}", self.points))),
            false => Ok(())
        }
    }

    fn bounds(&self, factor: Factor, inputs: &RangeInputs) -> (f64, f64) {
        match factor {
            Factor::Mass => (inputs.curb_mass, inputs.laden_mass),
            Factor::RollingCoefficient => self.rolling_coefficient,
            Factor::DragCoefficient => self.drag_coefficient,
            Factor::FrontalArea => self.frontal_area
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensitivitySweep {
    pub factor: Factor,
    pub values: Array1<f64>,
    pub range_km: Array1<f64>
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub factor: Factor,
    pub base_value: f64,
    pub probe_value: f64,
    pub base_range_km: f64,
    pub new_range_km: f64,
    pub change_percent: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeAnalysis {
    pub base_range_km: f64,
    pub sweeps: Vec<SensitivitySweep>,
    /// Motor efficiency at each point of the mass sweep
    pub motor_efficiency: Array1<f64>,
    pub probes: Vec<ProbeResult>
}

impl RangeAnalysis {
    pub fn sweep(&self, factor: Factor) -> Option<&SensitivitySweep> {
        self.sweeps.iter().find(|sweep| sweep.factor == factor)
    }
}

fn motor_efficiency_along(masses: &Array1<f64>, inputs: &RangeInputs, curb_efficiency: f64) -> Array1<f64> {
    let mass_span = inputs.laden_mass - inputs.curb_mass;
    if mass_span == 0.0 {
        return Array1::from_elem(masses.len(), inputs.motor_efficiency);
    }
    let slope = (inputs.motor_efficiency - curb_efficiency) / mass_span;
    masses.mapv(|mass| slope * (mass - inputs.curb_mass) + curb_efficiency)
}

pub fn analyse_range(inputs: &RangeInputs, sweep: &RangeSweep) -> Result<RangeAnalysis> {
    let span = info_span!("analyse_range", points = sweep.points);
    let _enter = span.enter();
    sweep.validate()?;

    let base_range_km = inputs.range_km();
    let sweeps: Vec<SensitivitySweep> = Factor::ALL.iter()
        .map(|factor| {
            let (start, end) = sweep.bounds(*factor, inputs);
            let values = Array1::linspace(start, end, sweep.points);
            let range_km = values.mapv(|value| inputs.with_factor(*factor, value).range_km());
            SensitivitySweep { factor: *factor, values, range_km }
        })
        .collect();
    let motor_efficiency = match sweeps.first() {
        Some(mass_sweep) => motor_efficiency_along(&mass_sweep.values, inputs, sweep.curb_motor_efficiency),
        None => Array1::zeros(0)
    };

    let probes = Factor::ALL.iter()
        .map(|factor| {
            let probe_value = sweep.probes.value(*factor);
            let new_range_km = inputs.with_factor(*factor, probe_value).range_km();
            ProbeResult {
                factor: *factor,
                base_value: inputs.factor_value(*factor),
                probe_value,
                base_range_km,
                new_range_km,
                change_percent: percent_change(base_range_km, new_range_km)
            }
        })
        .collect();
    debug!("Base range {:.2} km", base_range_km);
    Ok(RangeAnalysis { base_range_km, sweeps, motor_efficiency, probes })
}

impl Display for RangeAnalysis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Effect of parameter changes on range =====")?;
        writeln!(f, "{:<44}{:>16}{:>16}{:>12}", "Change", "Base range (km)", "New range (km)", "Change (%)")?;
        for probe in &self.probes {
            let change = format!("{} {} → {}",
                                 probe.factor,
                                 probe.factor.format_value(probe.base_value),
                                 probe.factor.format_value(probe.probe_value));
            writeln!(f, "{:<44}{:>16.1}{:>16.1}{:>+12.1}", change, probe.base_range_km, probe.new_range_km, probe.change_percent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use itertools::Itertools;
    use crate::params::DesignInputs;
    use crate::range::{analyse_range, Factor, RangeInputs, RangeSweep};

    #[test]
    fn base_range() {
        let inputs = RangeInputs::default();
        assert!(inputs.validate().is_ok());
        assert_relative_eq!(inputs.range_km(), 241.158068, epsilon = 1e-5);
    }

    #[test]
    fn probes() {
        let analysis = analyse_range(&RangeInputs::default(), &RangeSweep::default()).unwrap();
        let expected = [
            (Factor::Mass, 437.288820, 81.328713),
            (Factor::RollingCoefficient, 230.122657, -4.576007),
            (Factor::DragCoefficient, 246.623031, 2.266133),
            (Factor::FrontalArea, 266.327119, 10.436745),
        ];
        assert_eq!(analysis.probes.len(), expected.len());
        for (probe, (factor, new_range, change)) in analysis.probes.iter().zip(expected) {
            assert_eq!(probe.factor, factor);
            assert_relative_eq!(probe.base_range_km, 241.158068, epsilon = 1e-5);
            assert_relative_eq!(probe.new_range_km, new_range, epsilon = 1e-5);
            assert_relative_eq!(probe.change_percent, change, epsilon = 1e-5);
        }

        let report = analysis.to_string();
        assert!(report.contains("Vehicle mass 4250 kg → 1600 kg"));
        assert!(report.contains("437.3"));
        assert!(report.contains("+81.3"));
        assert!(report.contains("-4.6"));
    }

    #[test]
    fn range_falls_as_factors_grow() {
        let analysis = analyse_range(&RangeInputs::default(), &RangeSweep::default()).unwrap();
        assert_eq!(analysis.sweeps.len(), 4);
        for sweep in &analysis.sweeps {
            assert_eq!(sweep.values.len(), 100);
            assert!(sweep.range_km.iter().tuple_windows().all(|(a, b)| b < a), "{} is not decreasing", sweep.factor);
        }
        let mass = analysis.sweep(Factor::Mass).unwrap();
        assert_relative_eq!(mass.values[0], 2980.0);
        assert_relative_eq!(mass.range_km[0], 307.187721, epsilon = 1e-5);
        assert_relative_eq!(analysis.sweep(Factor::FrontalArea).unwrap().range_km[0], 290.193772, epsilon = 1e-5);
    }

    #[test]
    fn motor_efficiency_rises_with_mass() {
        let analysis = analyse_range(&RangeInputs::default(), &RangeSweep::default()).unwrap();
        assert_relative_eq!(analysis.motor_efficiency[0], 0.85, epsilon = 1e-12);
        assert_relative_eq!(analysis.motor_efficiency[99], 0.92, epsilon = 1e-12);

        let inputs = RangeInputs { curb_mass: 4250.0, ..Default::default() };
        let analysis = analyse_range(&inputs, &RangeSweep::default()).unwrap();
        assert!(analysis.motor_efficiency.iter().all(|eta| *eta == 0.92));
    }

    #[test]
    fn invalid_sweep() {
        let sweep = RangeSweep { points: 0, ..Default::default() };
        assert!(analyse_range(&RangeInputs::default(), &sweep).is_err());
    }
}

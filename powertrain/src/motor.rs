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

//! Traction motor sizing.
//!
//! The required motor power is the largest of three demands: holding the top speed
//! on a level road, climbing the maximum grade at the climbing speed and accelerating
//! from rest to the acceleration end speed within the target time.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utils::units::kmh_to_ms;
use crate::params::{impl_design_inputs, ParamSpec, VEHICLE};
use crate::params::{DRAG_COEFFICIENT, EFFICIENCY, FRONTAL_AREA, GRADE_ANGLE, GRAVITY, MASS, MOTOR_MAX_RPM, MOTOR_RPM, PEAK_TORQUE, ROLLING_COEFFICIENT};
use crate::resistance::{RoadLoad, tractive_power_kw};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MotorModel {
    Sd290HighVoltage,
    ModelS,
    Other
}

impl MotorModel {
    pub const ALL: [MotorModel; 3] = [MotorModel::Sd290HighVoltage, MotorModel::ModelS, MotorModel::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotorModel::Sd290HighVoltage => "SD290 high voltage",
            MotorModel::ModelS => "Model S motor",
            MotorModel::Other => "Other"
        }
    }
}

impl Default for MotorModel {
    fn default() -> Self {
        MotorModel::Sd290HighVoltage
    }
}

impl Display for MotorModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const PERFORMANCE: &str = "Performance targets";
const MOTOR_DESIGN: &str = "Motor design";
const CANDIDATE: &str = "Candidate motor";

pub const MOTOR_SIZING_PARAMS: [ParamSpec; 21] = [
    ParamSpec::new("mass", VEHICLE, "Laden mass", "kg", MASS, 1.0, 2),
    ParamSpec::new("gravity", VEHICLE, "Gravitational acceleration", "m/s²", GRAVITY, 0.1, 2),
    ParamSpec::new("rolling_coefficient", VEHICLE, "Rolling resistance coefficient", "", ROLLING_COEFFICIENT, 0.001, 3),
    ParamSpec::new("drag_coefficient", VEHICLE, "Drag coefficient", "", DRAG_COEFFICIENT, 0.01, 2),
    ParamSpec::new("frontal_area", VEHICLE, "Frontal area", "m²", FRONTAL_AREA, 0.1, 3),
    ParamSpec::new("transmission_efficiency", VEHICLE, "Driveline efficiency", "", EFFICIENCY, 0.01, 2),
    ParamSpec::new("air_density", VEHICLE, "Air density", "kg/m³", (1.0, 1.5), 0.01, 4),
    ParamSpec::new("rotating_mass_factor", VEHICLE, "Rotating mass factor", "", (1.0, 1.5), 0.01, 2),
    ParamSpec::new("max_speed_kmh", PERFORMANCE, "Top speed", "km/h", (50.0, 200.0), 5.0, 1),
    ParamSpec::new("climb_speed_kmh", PERFORMANCE, "Climbing speed", "km/h", (10.0, 100.0), 5.0, 1),
    ParamSpec::new("max_grade_deg", PERFORMANCE, "Maximum grade angle", "°", GRADE_ANGLE, 1.0, 1),
    ParamSpec::new("accel_end_speed_kmh", PERFORMANCE, "Acceleration end speed", "km/h", (30.0, 100.0), 5.0, 1),
    ParamSpec::new("accel_time_s", PERFORMANCE, "Acceleration time", "s", (1.0, 30.0), 1.0, 1),
    ParamSpec::new("base_speed_rpm", MOTOR_DESIGN, "Motor base speed", "rpm", MOTOR_RPM, 100.0, 0),
    ParamSpec::new("design_max_rpm", MOTOR_DESIGN, "Design maximum speed", "rpm", MOTOR_MAX_RPM, 100.0, 0),
    ParamSpec::new("rated_power_kw", CANDIDATE, "Rated power", "kW", (10.0, 300.0), 1.0, 2),
    ParamSpec::new("peak_power_kw", CANDIDATE, "Peak power", "kW", (20.0, 500.0), 1.0, 2),
    ParamSpec::new("rated_rpm", CANDIDATE, "Rated speed", "rpm", MOTOR_RPM, 1.0, 0),
    ParamSpec::new("max_rpm", CANDIDATE, "Maximum speed", "rpm", MOTOR_MAX_RPM, 1.0, 0),
    ParamSpec::new("peak_torque_nm", CANDIDATE, "Peak torque", "N·m", PEAK_TORQUE, 1.0, 2),
    ParamSpec::new("voltage_v", CANDIDATE, "Voltage", "V", (100.0, 1000.0), 1.0, 2),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorSizingInputs {
    pub mass: f64,
    pub gravity: f64,
    pub rolling_coefficient: f64,
    pub drag_coefficient: f64,
    pub frontal_area: f64,
    pub transmission_efficiency: f64,
    pub air_density: f64,
    pub rotating_mass_factor: f64,
    pub max_speed_kmh: f64,
    pub climb_speed_kmh: f64,
    pub max_grade_deg: f64,
    pub accel_end_speed_kmh: f64,
    pub accel_time_s: f64,
    pub base_speed_rpm: f64,
    pub design_max_rpm: f64,
    pub model: MotorModel,
    pub rated_power_kw: f64,
    pub peak_power_kw: f64,
    pub rated_rpm: f64,
    pub max_rpm: f64,
    pub peak_torque_nm: f64,
    pub voltage_v: f64
}

impl Default for MotorSizingInputs {
    fn default() -> Self {
        MotorSizingInputs {
            mass: 4200.0,
            gravity: 9.8,
            rolling_coefficient: 0.015,
            drag_coefficient: 0.38,
            frontal_area: 3.769,
            transmission_efficiency: 0.92,
            air_density: 1.2258,
            rotating_mass_factor: 1.01,
            max_speed_kmh: 120.0,
            climb_speed_kmh: 30.0,
            max_grade_deg: 20.0,
            accel_end_speed_kmh: 50.0,
            accel_time_s: 9.0,
            base_speed_rpm: 2500.0,
            design_max_rpm: 4500.0,
            model: MotorModel::default(),
            rated_power_kw: 58.0,
            peak_power_kw: 158.0,
            rated_rpm: 2500.0,
            max_rpm: 8000.0,
            peak_torque_nm: 600.0,
            voltage_v: 650.0
        }
    }
}

impl_design_inputs!(MotorSizingInputs, MOTOR_SIZING_PARAMS, [
    mass, gravity, rolling_coefficient, drag_coefficient, frontal_area, transmission_efficiency,
    air_density, rotating_mass_factor, max_speed_kmh, climb_speed_kmh, max_grade_deg,
    accel_end_speed_kmh, accel_time_s, base_speed_rpm, design_max_rpm, rated_power_kw,
    peak_power_kw, rated_rpm, max_rpm, peak_torque_nm, voltage_v
]);

impl MotorSizingInputs {
    pub fn road_load(&self) -> RoadLoad {
        RoadLoad::new(self.mass, self.gravity, self.rolling_coefficient, self.drag_coefficient, self.frontal_area)
    }

    pub fn candidate(&self) -> CandidateMotor {
        CandidateMotor {
            model: self.model,
            rated_power_kw: self.rated_power_kw,
            peak_power_kw: self.peak_power_kw,
            rated_rpm: self.rated_rpm,
            max_rpm: self.max_rpm,
            peak_torque_nm: self.peak_torque_nm,
            voltage_v: self.voltage_v
        }
    }

    /// Road speed (m/s) at which the motor reaches its base speed when the top speed
    /// coincides with the design maximum motor speed. Only counts towards the
    /// acceleration demand when the acceleration run finishes above it.
    pub fn base_road_speed_ms(&self) -> f64 {
        let base_speed_kmh = (self.max_speed_kmh * self.base_speed_rpm) / self.design_max_rpm;
        let base_speed_ms = kmh_to_ms(base_speed_kmh);
        match kmh_to_ms(self.accel_end_speed_kmh) < base_speed_ms {
            true => 0.0,
            false => base_speed_ms
        }
    }

    /// Power (kW) needed to hold the top speed on a level road
    pub fn top_speed_power_kw(&self) -> f64 {
        let road = self.road_load();
        tractive_power_kw(road.level_road_force(self.max_speed_kmh),
                          self.max_speed_kmh,
                          self.transmission_efficiency)
    }

    /// Power (kW) needed to climb the maximum grade at the climbing speed
    pub fn climbing_power_kw(&self) -> f64 {
        let road = self.road_load();
        tractive_power_kw(road.climbing_force(self.climb_speed_kmh, self.max_grade_deg.to_radians()),
                          self.climb_speed_kmh,
                          self.transmission_efficiency)
    }

    /// Power (kW) needed to reach the acceleration end speed within the target time
    pub fn acceleration_power_kw(&self) -> f64 {
        let road = self.road_load();
        let end_speed = kmh_to_ms(self.accel_end_speed_kmh);
        let base_speed = self.base_road_speed_ms();
        let rolling_term = (2.0 / 3.0) * road.rolling_force() * end_speed;
        let aero_term = (self.air_density * self.drag_coefficient * self.frontal_area * end_speed.powi(3)) / 5.0;
        let inertia_term = self.rotating_mass_factor * self.mass * (end_speed.powi(2) + base_speed.powi(2)) / (2.0 * self.accel_time_s);
        (rolling_term + aero_term + inertia_term) / (1000.0 * self.transmission_efficiency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMotor {
    pub model: MotorModel,
    pub rated_power_kw: f64,
    pub peak_power_kw: f64,
    pub rated_rpm: f64,
    pub max_rpm: f64,
    pub peak_torque_nm: f64,
    pub voltage_v: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct MotorSizing {
    pub top_speed_power_kw: f64,
    pub climbing_power_kw: f64,
    pub acceleration_power_kw: f64,
    pub rated_power_required_kw: f64,
    pub peak_power_required_kw: f64,
    pub candidate: CandidateMotor
}

impl MotorSizing {
    pub fn rated_power_sufficient(&self) -> bool {
        self.candidate.rated_power_kw >= self.rated_power_required_kw
    }

    pub fn peak_power_sufficient(&self) -> bool {
        self.candidate.peak_power_kw >= self.peak_power_required_kw
    }

    pub fn is_suitable(&self) -> bool {
        self.rated_power_sufficient() && self.peak_power_sufficient()
    }
}

pub fn size_motor(inputs: &MotorSizingInputs) -> MotorSizing {
    let top_speed_power_kw = inputs.top_speed_power_kw();
    let climbing_power_kw = inputs.climbing_power_kw();
    let acceleration_power_kw = inputs.acceleration_power_kw();
    let peak_power_required_kw = top_speed_power_kw.max(climbing_power_kw).max(acceleration_power_kw);
    debug!("Motor demand: top speed {:.2} kW, climbing {:.2} kW, acceleration {:.2} kW",
           top_speed_power_kw, climbing_power_kw, acceleration_power_kw);
    MotorSizing {
        top_speed_power_kw,
        climbing_power_kw,
        acceleration_power_kw,
        rated_power_required_kw: top_speed_power_kw,
        peak_power_required_kw,
        candidate: inputs.candidate()
    }
}

fn verdict(ok: bool, what: &str) -> String {
    match ok {
        true => format!("✓ {} meets the requirement", what),
        false => format!("✗ {} is insufficient, choose a more powerful motor", what)
    }
}

impl Display for MotorSizing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Required motor power =====")?;
        writeln!(f, "P_m1 (top speed): {:.2} kW", self.top_speed_power_kw)?;
        writeln!(f, "P_m2 (maximum grade): {:.2} kW", self.climbing_power_kw)?;
        writeln!(f, "P_m3 (acceleration): {:.2} kW", self.acceleration_power_kw)?;
        writeln!(f, "Rated power required: ≥ {:.2} kW", self.rated_power_required_kw)?;
        writeln!(f, "Peak power required: ≥ {:.2} kW", self.peak_power_required_kw)?;
        writeln!(f)?;
        writeln!(f, "===== Selected motor =====")?;
        writeln!(f, "Model: {}", self.candidate.model)?;
        writeln!(f, "Rated power: {:.2} kW", self.candidate.rated_power_kw)?;
        writeln!(f, "Peak power: {:.2} kW", self.candidate.peak_power_kw)?;
        writeln!(f, "Rated speed: {:.0} rpm", self.candidate.rated_rpm)?;
        writeln!(f, "Maximum speed: {:.0} rpm", self.candidate.max_rpm)?;
        writeln!(f, "Peak torque: {:.2} N·m", self.candidate.peak_torque_nm)?;
        writeln!(f, "Voltage: {:.2} V", self.candidate.voltage_v)?;
        writeln!(f)?;
        writeln!(f, "===== Verification =====")?;
        writeln!(f, "{}", verdict(self.rated_power_sufficient(), "Rated power"))?;
        writeln!(f, "{}", verdict(self.peak_power_sufficient(), "Peak power"))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::motor::{MotorSizingInputs, size_motor};
    use crate::params::DesignInputs;

    #[test]
    fn defaults_are_valid() {
        assert!(MotorSizingInputs::default().validate().is_ok());
    }

    #[test]
    fn every_spec_maps_to_a_field() {
        let inputs = MotorSizingInputs::default();
        for spec in MotorSizingInputs::param_specs() {
            assert!(inputs.get(spec.key).is_some(), "{} has no field", spec.key);
        }
    }

    #[test]
    fn default_power_demands() {
        let sizing = size_motor(&MotorSizingInputs::default());
        assert_relative_eq!(sizing.top_speed_power_kw, 57.700308, epsilon = 1e-5);
        assert_relative_eq!(sizing.climbing_power_kw, 133.321203, epsilon = 1e-5);
        assert_relative_eq!(sizing.acceleration_power_kw, 56.649762, epsilon = 1e-5);
        assert_relative_eq!(sizing.rated_power_required_kw, sizing.top_speed_power_kw);
        assert_relative_eq!(sizing.peak_power_required_kw, sizing.climbing_power_kw);
        assert!(sizing.rated_power_sufficient());
        assert!(sizing.peak_power_sufficient());
        assert!(sizing.is_suitable());
    }

    #[test]
    fn base_speed_only_counts_when_acceleration_run_passes_it() {
        let mut inputs = MotorSizingInputs::default();
        // 120 * 2500 / 4500 = 66.7 km/h which the 50 km/h run never reaches
        assert_eq!(inputs.base_road_speed_ms(), 0.0);

        inputs.design_max_rpm = 10000.0;
        // 120 * 2500 / 10000 = 30 km/h
        assert_relative_eq!(inputs.base_road_speed_ms(), 30.0 / 3.6, epsilon = 1e-12);
        let without_base = {
            let mut i = inputs.clone();
            i.design_max_rpm = 4500.0;
            i.acceleration_power_kw()
        };
        assert!(inputs.acceleration_power_kw() > without_base);
    }

    #[test]
    fn undersized_candidate_fails() {
        let mut inputs = MotorSizingInputs::default();
        inputs.rated_power_kw = 40.0;
        inputs.peak_power_kw = 120.0;
        let sizing = size_motor(&inputs);
        assert!(!sizing.rated_power_sufficient());
        assert!(!sizing.peak_power_sufficient());
        let report = sizing.to_string();
        assert!(report.contains("P_m1 (top speed): 57.70 kW"));
        assert!(report.contains("✗ Rated power is insufficient"));
        assert!(report.contains("✗ Peak power is insufficient"));
    }

    #[test]
    fn demand_grows_with_mass() {
        let light = size_motor(&MotorSizingInputs { mass: 2000.0, ..Default::default() });
        let heavy = size_motor(&MotorSizingInputs { mass: 8000.0, ..Default::default() });
        assert!(heavy.peak_power_required_kw > light.peak_power_required_kw);
        assert!(heavy.top_speed_power_kw > light.top_speed_power_kw);
    }
}

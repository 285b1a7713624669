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

use std::fmt::{Display, Formatter};
use itertools::Itertools;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};
use utils::units::{kmh_to_ms, torque_from_power};
use crate::{Error, Result};
use crate::params::{impl_design_inputs, ParamSpec, VEHICLE};
use crate::params::{DRAG_COEFFICIENT, EFFICIENCY, FRONTAL_AREA, GRAVITY, MASS, MOTOR_MAX_RPM, MOTOR_RPM, PEAK_TORQUE, ROLLING_COEFFICIENT, TOTAL_RATIO, WHEEL_RADIUS};
use crate::resistance::{RoadLoad, ROAD_SPEED_FACTOR};

/// Grades steeper than this (as a sine) aren't reported
pub const MAX_REPORTED_GRADE: f64 = 0.5;

const MOTOR: &str = "Motor";
const TESTS: &str = "Test points";

pub const PERFORMANCE_PARAMS: [ParamSpec; 15] = [
    ParamSpec::new("mass", VEHICLE, "Laden mass", "kg", MASS, 1.0, 2),
    ParamSpec::new("gravity", VEHICLE, "Gravitational acceleration", "m/s²", GRAVITY, 0.1, 2),
    ParamSpec::new("rolling_coefficient", VEHICLE, "Rolling resistance coefficient", "", ROLLING_COEFFICIENT, 0.001, 3),
    ParamSpec::new("drag_coefficient", VEHICLE, "Drag coefficient", "", DRAG_COEFFICIENT, 0.01, 2),
    ParamSpec::new("frontal_area", VEHICLE, "Frontal area", "m²", FRONTAL_AREA, 0.1, 3),
    ParamSpec::new("transmission_efficiency", VEHICLE, "Driveline efficiency", "", EFFICIENCY, 0.01, 2),
    ParamSpec::new("wheel_radius_m", VEHICLE, "Wheel radius", "m", WHEEL_RADIUS, 0.01, 3),
    ParamSpec::new("rotating_mass_factor", VEHICLE, "Rotating mass factor", "", (1.0, 1.5), 0.01, 2),
    ParamSpec::new("peak_torque_nm", MOTOR, "Peak torque", "N·m", PEAK_TORQUE, 1.0, 1),
    ParamSpec::new("peak_power_kw", MOTOR, "Peak power", "kW", (50.0, 500.0), 1.0, 1),
    ParamSpec::new("rated_rpm", MOTOR, "Rated speed", "rpm", MOTOR_RPM, 100.0, 0),
    ParamSpec::new("max_rpm", MOTOR, "Maximum speed", "rpm", MOTOR_MAX_RPM, 100.0, 0),
    ParamSpec::new("total_ratio", MOTOR, "Total ratio", "", TOTAL_RATIO, 0.01, 2),
    ParamSpec::new("accel_test_speed_kmh", TESTS, "Acceleration test speed", "km/h", (30.0, 100.0), 5.0, 1),
    ParamSpec::new("grade_test_speed_kmh", TESTS, "Grade test speed", "km/h", (10.0, 60.0), 5.0, 1),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceInputs {
    pub mass: f64,
    pub gravity: f64,
    pub rolling_coefficient: f64,
    pub drag_coefficient: f64,
    pub frontal_area: f64,
    pub transmission_efficiency: f64,
    pub wheel_radius_m: f64,
    pub rotating_mass_factor: f64,
    pub peak_torque_nm: f64,
    pub peak_power_kw: f64,
    pub rated_rpm: f64,
    pub max_rpm: f64,
    pub total_ratio: f64,
    pub accel_test_speed_kmh: f64,
    pub grade_test_speed_kmh: f64
}

impl Default for PerformanceInputs {
    fn default() -> Self {
        PerformanceInputs {
            mass: 4200.0,
            gravity: 9.8,
            rolling_coefficient: 0.015,
            drag_coefficient: 0.38,
            frontal_area: 3.769,
            transmission_efficiency: 0.92,
            wheel_radius_m: 0.364,
            rotating_mass_factor: 1.01,
            peak_torque_nm: 600.0,
            peak_power_kw: 156.0,
            rated_rpm: 2500.0,
            max_rpm: 8000.0,
            total_ratio: 7.11,
            accel_test_speed_kmh: 50.0,
            grade_test_speed_kmh: 30.0
        }
    }
}

impl_design_inputs!(PerformanceInputs, PERFORMANCE_PARAMS, [
    mass, gravity, rolling_coefficient, drag_coefficient, frontal_area, transmission_efficiency,
    wheel_radius_m, rotating_mass_factor, peak_torque_nm, peak_power_kw, rated_rpm, max_rpm,
    total_ratio, accel_test_speed_kmh, grade_test_speed_kmh
]);

impl PerformanceInputs {
    /// Motor torque (Nm) at `rpm`: constant up to the rated speed, constant power up to the
    /// maximum speed and nothing beyond it
    pub fn motor_torque_at(&self, rpm: f64) -> f64 {
        if rpm <= self.rated_rpm {
            self.peak_torque_nm
        } else if rpm <= self.max_rpm {
            torque_from_power(self.peak_power_kw, rpm)
        } else {
            0.0
        }
    }

    pub fn motor_rpm_at(&self, speed_kmh: f64) -> f64 {
        speed_kmh * self.total_ratio / (ROAD_SPEED_FACTOR * self.wheel_radius_m)
    }
}

/// The road speeds the analysis is evaluated at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSweep {
    pub top_speed_kmh: f64,
    pub points: usize
}

impl Default for PerformanceSweep {
    fn default() -> Self {
        PerformanceSweep { top_speed_kmh: 150.0, points: 1000 }
    }
}

impl PerformanceSweep {
    pub fn validate(&self) -> Result<()> {
        if self.points < 2 {
            return Err(Error::InvalidSweep(format!("need at least 2 points, got {}", self.points)));
        }
        if !self.top_speed_kmh.is_finite() || self.top_speed_kmh <= 0.0 {
            return Err(Error::InvalidSweep(format!("top speed must be positive, got {}", self.top_speed_kmh)));
        }
        Ok(())
    }

    pub fn speeds(&self) -> Array1<f64> {
        Array1::linspace(0.0, self.top_speed_kmh, self.points)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceAnalysis {
    pub speed_kmh: Array1<f64>,
    pub motor_rpm: Array1<f64>,
    pub motor_torque_nm: Array1<f64>,
    pub drive_force_n: Array1<f64>,
    pub rolling_force_n: Array1<f64>,
    pub aero_force_n: Array1<f64>,
    pub resistance_force_n: Array1<f64>,
    pub grade_percent: Array1<f64>,
    pub acceleration_ms2: Array1<f64>,
    /// Elapsed time at each sweep point up to the acceleration test speed
    pub elapsed_time_s: Array1<f64>,
    pub top_speed_kmh: f64,
    /// The drive force still covered the resistance at the end of the sweep
    pub top_speed_limited_by_sweep: bool,
    pub accel_test_speed_kmh: f64,
    pub accel_time_s: f64,
    pub grade_test_speed_kmh: f64,
    pub grade_at_test_speed_percent: f64,
    pub rated_rpm: f64,
    pub max_rpm: f64,
    pub peak_torque_nm: f64
}

fn nearest_index(values: &Array1<f64>, target: f64) -> usize {
    values.iter()
        .position_min_by(|a, b| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .unwrap_or(0)
}

pub fn analyse_performance(inputs: &PerformanceInputs, sweep: &PerformanceSweep) -> Result<PerformanceAnalysis> {
    let span = info_span!("analyse_performance", points = sweep.points);
    let _enter = span.enter();
    sweep.validate()?;

    let road = RoadLoad::new(inputs.mass, inputs.gravity, inputs.rolling_coefficient, inputs.drag_coefficient, inputs.frontal_area);
    let speed_kmh = sweep.speeds();
    let rolling_force_n = Array1::from_elem(speed_kmh.len(), road.rolling_force());
    let aero_force_n = speed_kmh.mapv(|speed| road.aero_force(speed));
    let resistance_force_n = &rolling_force_n + &aero_force_n;

    let motor_rpm = speed_kmh.mapv(|speed| inputs.motor_rpm_at(speed));
    let motor_torque_nm = motor_rpm.mapv(|rpm| inputs.motor_torque_at(rpm));
    let drive_force_n = motor_torque_nm.mapv(|torque| torque * inputs.total_ratio * inputs.transmission_efficiency / inputs.wheel_radius_m);
    let surplus_force_n = &drive_force_n - &resistance_force_n;

    let top_speed_index = surplus_force_n.iter()
        .positions(|force| *force >= 0.0)
        .last()
        .ok_or(Error::NoFeasibleSpeed)?;
    let top_speed_kmh = speed_kmh[top_speed_index];

    let weight = road.gravitational_force();
    let grade_percent = surplus_force_n.mapv(|force| {
        ((force + road.rolling_force()) / weight).clamp(0.0, MAX_REPORTED_GRADE) * 100.0
    });
    let grade_at_test_speed_percent = grade_percent[nearest_index(&speed_kmh, inputs.grade_test_speed_kmh)];

    let acceleration_ms2 = surplus_force_n.mapv(|force| force / (inputs.rotating_mass_factor * inputs.mass));
    let accel_target_index = nearest_index(&speed_kmh, inputs.accel_test_speed_kmh);
    if let Some(stall) = acceleration_ms2.iter().take(accel_target_index).position(|accel| *accel <= 0.0) {
        return Err(Error::CannotAccelerate { speed_kmh: speed_kmh[stall] });
    }
    let speed_step_ms = kmh_to_ms(speed_kmh[1] - speed_kmh[0]);
    let elapsed_time_s: Array1<f64> = acceleration_ms2.iter()
        .take(accel_target_index)
        .scan(0.0, |elapsed, accel| {
            *elapsed += speed_step_ms / accel;
            Some(*elapsed)
        })
        .collect();
    let accel_time_s = elapsed_time_s.last().copied().unwrap_or(0.0);

    debug!("Top speed {:.1} km/h at sweep index {}, 0-{} km/h in {:.2} s",
           top_speed_kmh, top_speed_index, inputs.accel_test_speed_kmh, accel_time_s);
    Ok(PerformanceAnalysis {
        top_speed_limited_by_sweep: top_speed_index + 1 == speed_kmh.len(),
        speed_kmh,
        motor_rpm,
        motor_torque_nm,
        drive_force_n,
        rolling_force_n,
        aero_force_n,
        resistance_force_n,
        grade_percent,
        acceleration_ms2,
        elapsed_time_s,
        top_speed_kmh,
        accel_test_speed_kmh: inputs.accel_test_speed_kmh,
        accel_time_s,
        grade_test_speed_kmh: inputs.grade_test_speed_kmh,
        grade_at_test_speed_percent,
        rated_rpm: inputs.rated_rpm,
        max_rpm: inputs.max_rpm,
        peak_torque_nm: inputs.peak_torque_nm
    })
}

impl Display for PerformanceAnalysis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Vehicle performance =====")?;
        write!(f, "Top speed: {:.1} km/h", self.top_speed_kmh)?;
        match self.top_speed_limited_by_sweep {
            true => writeln!(f, " (end of the speed sweep)")?,
            false => writeln!(f)?
        }
        writeln!(f, "0-{:.0} km/h acceleration time: {:.1} s", self.accel_test_speed_kmh, self.accel_time_s)?;
        writeln!(f, "Maximum grade at {:.0} km/h: {:.1}%", self.grade_test_speed_kmh, self.grade_at_test_speed_percent)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::Error;
    use crate::params::DesignInputs;
    use crate::performance::{analyse_performance, PerformanceInputs, PerformanceSweep};

    #[test]
    fn torque_curve() {
        let inputs = PerformanceInputs::default();
        assert_eq!(inputs.motor_torque_at(0.0), 600.0);
        assert_eq!(inputs.motor_torque_at(2500.0), 600.0);
        // 156 kW at 5000 rpm
        assert_relative_eq!(inputs.motor_torque_at(5000.0), 297.938, epsilon = 1e-3);
        assert_eq!(inputs.motor_torque_at(8000.1), 0.0);
    }

    #[test]
    fn default_analysis() {
        let inputs = PerformanceInputs::default();
        assert!(inputs.validate().is_ok());
        let analysis = analyse_performance(&inputs, &PerformanceSweep::default()).unwrap();
        assert_eq!(analysis.speed_kmh.len(), 1000);
        assert_relative_eq!(analysis.drive_force_n[0], 10782.197802, epsilon = 1e-5);
        assert_relative_eq!(analysis.top_speed_kmh, 150.0, epsilon = 1e-9);
        assert!(analysis.top_speed_limited_by_sweep);
        assert_eq!(analysis.elapsed_time_s.len(), 333);
        assert_relative_eq!(analysis.accel_time_s, 5.833678, epsilon = 1e-5);
        assert_relative_eq!(analysis.grade_at_test_speed_percent, 26.047449, epsilon = 1e-5);
        assert_relative_eq!(analysis.acceleration_ms2[0], 2.396228, epsilon = 1e-5);

        let report = analysis.to_string();
        assert!(report.contains("Top speed: 150.0 km/h (end of the speed sweep)"));
        assert!(report.contains("0-50 km/h acceleration time: 5.8 s"));
        assert!(report.contains("Maximum grade at 30 km/h: 26.0%"));
    }

    #[test]
    fn power_limited_top_speed() {
        let inputs = PerformanceInputs { peak_power_kw: 60.0, ..Default::default() };
        let analysis = analyse_performance(&inputs, &PerformanceSweep::default()).unwrap();
        // sweep index 813
        assert_relative_eq!(analysis.top_speed_kmh, 122.072072, epsilon = 1e-5);
        assert!(!analysis.top_speed_limited_by_sweep);
        assert_relative_eq!(analysis.accel_time_s, 6.229702, epsilon = 1e-5);

        let inputs = PerformanceInputs { peak_power_kw: 60.0, total_ratio: 4.0, ..Default::default() };
        let analysis = analyse_performance(&inputs, &PerformanceSweep::default()).unwrap();
        assert_relative_eq!(analysis.accel_time_s, 10.926916, epsilon = 1e-5);
        assert_relative_eq!(analysis.grade_at_test_speed_percent, 14.589083, epsilon = 1e-5);
    }

    #[test]
    fn motor_speed_limits_top_speed() {
        let inputs = PerformanceInputs { total_ratio: 20.0, ..Default::default() };
        let analysis = analyse_performance(&inputs, &PerformanceSweep::default()).unwrap();
        assert_relative_eq!(analysis.top_speed_kmh, 54.804805, epsilon = 1e-5);
        assert!(analysis.grade_percent.iter().all(|grade| *grade <= 50.0));
        assert_eq!(analysis.grade_percent[0], 50.0);
    }

    #[test]
    fn cannot_accelerate_to_test_speed() {
        let inputs = PerformanceInputs { total_ratio: 20.0, accel_test_speed_kmh: 100.0, ..Default::default() };
        let result = analyse_performance(&inputs, &PerformanceSweep::default());
        match result {
            Err(Error::CannotAccelerate { speed_kmh }) => assert!(speed_kmh > 54.0 && speed_kmh < 100.0),
            other => panic!("expected CannotAccelerate, got {:?}", other)
        }
    }

    #[test]
    fn no_feasible_speed() {
        let inputs = PerformanceInputs {
            mass: 10000.0,
            peak_torque_nm: 100.0,
            total_ratio: 1.0,
            wheel_radius_m: 1.0,
            ..Default::default()
        };
        assert!(matches!(analyse_performance(&inputs, &PerformanceSweep::default()), Err(Error::NoFeasibleSpeed)));
    }

    #[test]
    fn test_speed_on_first_sweep_point() {
        // sweep points are 0 and 100 km/h, 30 km/h snaps to the first one
        let inputs = PerformanceInputs { accel_test_speed_kmh: 30.0, ..Default::default() };
        let sweep = PerformanceSweep { top_speed_kmh: 100.0, points: 2 };
        let analysis = analyse_performance(&inputs, &sweep).unwrap();
        assert_eq!(analysis.accel_time_s, 0.0);
        assert!(analysis.elapsed_time_s.is_empty());
        assert_eq!(analysis.top_speed_kmh, 100.0);
        assert!(analysis.top_speed_limited_by_sweep);
    }

    #[test]
    fn sweep_validation() {
        let inputs = PerformanceInputs::default();
        let sweep = PerformanceSweep { points: 1, ..Default::default() };
        assert!(matches!(analyse_performance(&inputs, &sweep), Err(Error::InvalidSweep(_))));
        let sweep = PerformanceSweep { top_speed_kmh: 0.0, ..Default::default() };
        assert!(matches!(analyse_performance(&inputs, &sweep), Err(Error::InvalidSweep(_))));
    }
}

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
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utils::numeric::nearest_in_stepped_series;
use crate::{Error, Result};
use crate::params::{DesignInputs, impl_design_inputs, ParamSpec, VEHICLE};
use crate::params::{EFFICIENCY, GRADE_ANGLE, GRAVITY, MASS, MOTOR_MAX_RPM, PEAK_TORQUE, ROLLING_COEFFICIENT, TOTAL_RATIO, WHEEL_RADIUS};
use crate::resistance::{RoadLoad, ROAD_SPEED_FACTOR};

/// Normal modules (mm) a gear pair can be cut with
pub const STANDARD_MODULES: [f64; 11] = [1.0, 1.25, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0];

/// Centre distances (mm) are picked from `MIN, MIN+STEP, ..., MAX`
pub const CENTRE_DISTANCE_MIN: f64 = 50.0;
pub const CENTRE_DISTANCE_MAX: f64 = 200.0;
pub const CENTRE_DISTANCE_STEP: f64 = 5.0;

const INPUT_SHAFT_FACTOR: f64 = 4.3;
const INTERMEDIATE_SHAFT_FACTOR: f64 = 0.54;
const HALF_SHAFT_FACTOR: f64 = 0.211;

const GEARING: &str = "Gearing";
const GEAR_DESIGN: &str = "Gear design";

pub const DRIVETRAIN_PARAMS: [ParamSpec; 18] = [
    ParamSpec::new("mass", VEHICLE, "Laden mass", "kg", MASS, 1.0, 2),
    ParamSpec::new("gravity", VEHICLE, "Gravitational acceleration", "m/s²", GRAVITY, 0.1, 2),
    ParamSpec::new("rolling_coefficient", VEHICLE, "Rolling resistance coefficient", "", ROLLING_COEFFICIENT, 0.001, 3),
    ParamSpec::new("max_grade_deg", VEHICLE, "Maximum grade angle", "°", GRADE_ANGLE, 1.0, 1),
    ParamSpec::new("wheel_radius_m", VEHICLE, "Wheel radius", "m", WHEEL_RADIUS, 0.01, 3),
    ParamSpec::new("peak_torque_nm", VEHICLE, "Motor peak torque", "N·m", PEAK_TORQUE, 1.0, 1),
    ParamSpec::new("transmission_efficiency", VEHICLE, "Driveline efficiency", "", EFFICIENCY, 0.01, 2),
    ParamSpec::new("max_motor_rpm", VEHICLE, "Motor maximum speed", "rpm", MOTOR_MAX_RPM, 100.0, 0),
    ParamSpec::new("max_speed_kmh", VEHICLE, "Top speed", "km/h", (50.0, 200.0), 5.0, 1),
    ParamSpec::new("total_ratio", GEARING, "Target total ratio", "", TOTAL_RATIO, 0.01, 2),
    ParamSpec::new("final_drive_ratio", GEARING, "Final drive ratio", "", (1.0, 10.0), 0.01, 2),
    ParamSpec::new("centre_distance_coefficient", GEARING, "Centre distance coefficient K_A", "", (5.0, 15.0), 0.1, 1),
    ParamSpec::new("gear_efficiency", GEARING, "Gear mesh efficiency", "", EFFICIENCY, 0.01, 2),
    ParamSpec::new("face_width_coefficient", GEAR_DESIGN, "Face width coefficient k_c", "", (5.0, 15.0), 0.1, 1),
    ParamSpec::new("first_stage_helix_deg", GEAR_DESIGN, "First stage helix angle", "°", (8.0, 30.0), 1.0, 1),
    ParamSpec::new("second_stage_helix_deg", GEAR_DESIGN, "Second stage helix angle", "°", (8.0, 30.0), 1.0, 1),
    ParamSpec::new("first_pinion_teeth", GEAR_DESIGN, "First stage pinion teeth", "", (12.0, 40.0), 1.0, 0).whole_number(),
    ParamSpec::new("second_pinion_teeth", GEAR_DESIGN, "Second stage pinion teeth", "", (12.0, 40.0), 1.0, 0).whole_number(),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainInputs {
    pub mass: f64,
    pub gravity: f64,
    pub rolling_coefficient: f64,
    pub max_grade_deg: f64,
    pub wheel_radius_m: f64,
    pub peak_torque_nm: f64,
    pub transmission_efficiency: f64,
    pub max_motor_rpm: f64,
    pub max_speed_kmh: f64,
    pub total_ratio: f64,
    pub final_drive_ratio: f64,
    pub centre_distance_coefficient: f64,
    pub gear_efficiency: f64,
    pub face_width_coefficient: f64,
    pub first_stage_helix_deg: f64,
    pub second_stage_helix_deg: f64,
    pub first_pinion_teeth: f64,
    pub second_pinion_teeth: f64
}

impl Default for DrivetrainInputs {
    fn default() -> Self {
        DrivetrainInputs {
            mass: 4200.0,
            gravity: 9.8,
            rolling_coefficient: 0.015,
            max_grade_deg: 20.0,
            wheel_radius_m: 0.364,
            peak_torque_nm: 600.0,
            transmission_efficiency: 0.92,
            max_motor_rpm: 8000.0,
            max_speed_kmh: 120.0,
            total_ratio: 7.0,
            final_drive_ratio: 4.0,
            centre_distance_coefficient: 9.0,
            gear_efficiency: 0.96,
            face_width_coefficient: 7.0,
            first_stage_helix_deg: 25.0,
            second_stage_helix_deg: 20.0,
            first_pinion_teeth: 17.0,
            second_pinion_teeth: 14.0
        }
    }
}

impl_design_inputs!(DrivetrainInputs, DRIVETRAIN_PARAMS, [
    mass, gravity, rolling_coefficient, max_grade_deg, wheel_radius_m, peak_torque_nm,
    transmission_efficiency, max_motor_rpm, max_speed_kmh, total_ratio, final_drive_ratio,
    centre_distance_coefficient, gear_efficiency, face_width_coefficient, first_stage_helix_deg,
    second_stage_helix_deg, first_pinion_teeth, second_pinion_teeth
]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gear {
    pub teeth: u32,
    pub pitch_diameter_mm: f64
}

/// A meshing helical pinion and wheel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearPair {
    pub centre_distance_mm: f64,
    pub module_mm: f64,
    pub helix_angle_deg: f64,
    pub face_width_mm: f64,
    pub pinion: Gear,
    pub wheel: Gear
}

impl GearPair {
    pub fn ratio(&self) -> f64 {
        self.wheel.teeth as f64 / self.pinion.teeth as f64
    }
}

/// Helix angles (degrees) a solved pair may end up with
pub const HELIX_BAND_DEG: (f64, f64) = (8.0, 45.0);

/// Largest relative ratio error allowed when the wheel tooth count is moved off
/// `trunc(pinion_teeth * ratio)`
pub const WHEEL_TEETH_RATIO_TOLERANCE: f64 = 0.05;

/// Helix angle that makes the pitch circles of a `tooth_sum` pair cut with `module_mm`
/// touch on `centre_distance_mm`, if it lies in [`HELIX_BAND_DEG`]
fn solved_helix_deg(module_mm: f64, tooth_sum: f64, centre_distance_mm: f64) -> Option<f64> {
    let cos_helix = module_mm * tooth_sum / (2.0 * centre_distance_mm);
    if cos_helix > 1.0 {
        return None;
    }
    let helix_deg = cos_helix.acos().to_degrees();
    (helix_deg >= HELIX_BAND_DEG.0 && helix_deg <= HELIX_BAND_DEG.1).then_some(helix_deg)
}

/// `trunc(pinion_teeth * ratio)` first, then the other counts within the ratio tolerance,
/// closest ratio first
fn wheel_teeth_candidates(pinion_teeth: u32, ratio: f64) -> Vec<u32> {
    let exact = pinion_teeth as f64 * ratio;
    let nominal = exact.trunc() as u32;
    let lowest = (exact * (1.0 - WHEEL_TEETH_RATIO_TOLERANCE)).ceil().max(1.0) as u32;
    let highest = (exact * (1.0 + WHEEL_TEETH_RATIO_TOLERANCE)).floor() as u32;
    let adjusted = (lowest..=highest)
        .filter(|teeth| *teeth != nominal)
        .sorted_by(|a, b| (*a as f64 - exact).abs().total_cmp(&(*b as f64 - exact).abs()));
    std::iter::once(nominal).chain(adjusted).collect()
}

/// Lays out a helical pair on `centre_distance_mm`.
///
/// The wheel gets `trunc(pinion_teeth * ratio)` teeth when some standard module gives a
/// helix angle inside [`HELIX_BAND_DEG`]; otherwise the nearest tooth counts within
/// [`WHEEL_TEETH_RATIO_TOLERANCE`] are tried. For the chosen count the module whose
/// solved helix angle is nearest the nominal one is used.
pub fn helical_pair(centre_distance_mm: f64,
                    pinion_teeth: u32,
                    ratio: f64,
                    nominal_helix_deg: f64,
                    face_width_coefficient: f64) -> Result<GearPair> {
    let (wheel_teeth, module_mm, helix_angle_deg) = wheel_teeth_candidates(pinion_teeth, ratio)
        .into_iter()
        .find_map(|wheel_teeth| {
            let tooth_sum = (pinion_teeth + wheel_teeth) as f64;
            STANDARD_MODULES.iter()
                .filter_map(|module| solved_helix_deg(*module, tooth_sum, centre_distance_mm).map(|helix| (*module, helix)))
                .min_by(|a, b| (a.1 - nominal_helix_deg).abs().total_cmp(&(b.1 - nominal_helix_deg).abs()))
                .map(|(module, helix)| (wheel_teeth, module, helix))
        })
        .ok_or_else(|| Error::GearPairDoesNotFit {
            centre_distance_mm,
            pinion_teeth,
            wheel_teeth: (pinion_teeth as f64 * ratio).trunc() as u32
        })?;

    let cos_helix = module_mm * (pinion_teeth + wheel_teeth) as f64 / (2.0 * centre_distance_mm);
    debug!("{}/{} pair on {} mm: module {}, helix {:.2}° (nominal {})",
           pinion_teeth, wheel_teeth, centre_distance_mm, module_mm, helix_angle_deg, nominal_helix_deg);
    Ok(GearPair {
        centre_distance_mm,
        module_mm,
        helix_angle_deg,
        face_width_mm: face_width_coefficient * module_mm,
        pinion: Gear { teeth: pinion_teeth, pitch_diameter_mm: module_mm * pinion_teeth as f64 / cos_helix },
        wheel: Gear { teeth: wheel_teeth, pitch_diameter_mm: module_mm * wheel_teeth as f64 / cos_helix }
    })
}

/// Centre distance (mm) for a stage transmitting `torque_nm`, snapped to the standard series
pub fn centre_distance(coefficient: f64, torque_nm: f64) -> f64 {
    let raw = coefficient * torque_nm.cbrt();
    nearest_in_stepped_series(raw, CENTRE_DISTANCE_MIN, CENTRE_DISTANCE_MAX, CENTRE_DISTANCE_STEP)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaftDiameters {
    pub input_mm: f64,
    pub intermediate_mm: f64,
    pub half_shaft_mm: f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrivetrainSizing {
    pub grade_force_n: f64,
    pub min_total_ratio: f64,
    pub max_total_ratio: f64,
    pub gearbox_ratio: f64,
    pub total_ratio: f64,
    pub first_stage: GearPair,
    pub second_stage: GearPair,
    pub shafts: ShaftDiameters
}

impl DrivetrainSizing {
    pub fn ratio_within_limits(&self) -> bool {
        self.total_ratio >= self.min_total_ratio && self.total_ratio <= self.max_total_ratio
    }
}

fn tooth_count(key: &str, value: f64) -> Result<u32> {
    DrivetrainInputs::spec(key)?.check(value)?;
    Ok(value as u32)
}

pub fn size_drivetrain(inputs: &DrivetrainInputs) -> Result<DrivetrainSizing> {
    let road = RoadLoad::new(inputs.mass, inputs.gravity, inputs.rolling_coefficient, 0.0, 0.0);
    let grade_force_n = road.grade_force(inputs.max_grade_deg.to_radians());
    let min_total_ratio = grade_force_n * inputs.wheel_radius_m / (inputs.peak_torque_nm * inputs.transmission_efficiency);
    let max_total_ratio = ROAD_SPEED_FACTOR * inputs.max_motor_rpm * inputs.wheel_radius_m / inputs.max_speed_kmh;
    if min_total_ratio > max_total_ratio {
        warn!("No total ratio satisfies both gradeability ({:.3}) and top speed ({:.3})", min_total_ratio, max_total_ratio);
    }

    let gearbox_ratio = inputs.total_ratio / inputs.final_drive_ratio;
    let total_ratio = gearbox_ratio * inputs.final_drive_ratio;

    let first_centre = centre_distance(inputs.centre_distance_coefficient,
                                       inputs.peak_torque_nm * gearbox_ratio * inputs.gear_efficiency);
    let second_centre = centre_distance(inputs.centre_distance_coefficient,
                                        inputs.peak_torque_nm * total_ratio * inputs.gear_efficiency.powi(2));
    let first_stage = helical_pair(first_centre,
                                   tooth_count("first_pinion_teeth", inputs.first_pinion_teeth)?,
                                   gearbox_ratio,
                                   inputs.first_stage_helix_deg,
                                   inputs.face_width_coefficient)?;
    let second_stage = helical_pair(second_centre,
                                    tooth_count("second_pinion_teeth", inputs.second_pinion_teeth)?,
                                    inputs.final_drive_ratio,
                                    inputs.second_stage_helix_deg,
                                    inputs.face_width_coefficient)?;

    let shafts = ShaftDiameters {
        input_mm: INPUT_SHAFT_FACTOR * inputs.peak_torque_nm.cbrt(),
        intermediate_mm: INTERMEDIATE_SHAFT_FACTOR * first_centre,
        half_shaft_mm: HALF_SHAFT_FACTOR * (1000.0 * inputs.peak_torque_nm).cbrt()
    };
    info!("Drivetrain sized: centre distances {} mm / {} mm", first_centre, second_centre);
    Ok(DrivetrainSizing {
        grade_force_n,
        min_total_ratio,
        max_total_ratio,
        gearbox_ratio,
        total_ratio,
        first_stage,
        second_stage,
        shafts
    })
}

fn write_stage(f: &mut Formatter<'_>, name: &str, pair: &GearPair) -> std::fmt::Result {
    writeln!(f, "===== {} =====", name)?;
    writeln!(f, "Centre distance: {:.0} mm", pair.centre_distance_mm)?;
    writeln!(f, "Teeth: {} / {} (ratio {:.3})", pair.pinion.teeth, pair.wheel.teeth, pair.ratio())?;
    writeln!(f, "Normal module: {} mm", pair.module_mm)?;
    writeln!(f, "Helix angle: {:.2}°", pair.helix_angle_deg)?;
    writeln!(f, "Pitch diameters: {:.2} mm / {:.2} mm", pair.pinion.pitch_diameter_mm, pair.wheel.pitch_diameter_mm)?;
    writeln!(f, "Face width: {:.1} mm", pair.face_width_mm)
}

impl Display for DrivetrainSizing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Ratio limits =====")?;
        writeln!(f, "Maximum grade resistance: {:.2} N", self.grade_force_n)?;
        writeln!(f, "Minimum total ratio (gradeability): {:.3}", self.min_total_ratio)?;
        writeln!(f, "Maximum total ratio (top speed): {:.3}", self.max_total_ratio)?;
        writeln!(f, "Gearbox ratio: {:.3}", self.gearbox_ratio)?;
        writeln!(f, "Total ratio: {:.3}", self.total_ratio)?;
        match self.ratio_within_limits() {
            true => writeln!(f, "✓ Total ratio is within the limits")?,
            false => writeln!(f, "✗ Total ratio is outside the limits")?
        }
        writeln!(f)?;
        write_stage(f, "First stage", &self.first_stage)?;
        writeln!(f)?;
        write_stage(f, "Second stage", &self.second_stage)?;
        writeln!(f)?;
        writeln!(f, "===== Shafts =====")?;
        writeln!(f, "Input shaft: {:.2} mm", self.shafts.input_mm)?;
        writeln!(f, "Intermediate shaft: {:.2} mm", self.shafts.intermediate_mm)?;
        writeln!(f, "Half shaft: {:.2} mm", self.shafts.half_shaft_mm)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::drivetrain::{centre_distance, DrivetrainInputs, helical_pair, HELIX_BAND_DEG, size_drivetrain};
    use crate::Error;
    use crate::params::DesignInputs;

    #[test]
    fn centre_distance_rounding() {
        // 9 * 1008^(1/3) = 90.24
        assert_eq!(centre_distance(9.0, 600.0 * 1.75 * 0.96), 90.0);
        // 9 * 3870.72^(1/3) = 141.31
        assert_eq!(centre_distance(9.0, 600.0 * 7.0 * 0.96 * 0.96), 140.0);
        assert_eq!(centre_distance(1.0, 1.0), 50.0);
        assert_eq!(centre_distance(15.0, 100000.0), 200.0);
    }

    #[test]
    fn default_drivetrain() {
        let inputs = DrivetrainInputs::default();
        assert!(inputs.validate().is_ok());
        let sizing = size_drivetrain(&inputs).unwrap();
        assert_relative_eq!(sizing.grade_force_n, 14657.715323, epsilon = 1e-5);
        assert_relative_eq!(sizing.min_total_ratio, 9.665590, epsilon = 1e-5);
        assert_relative_eq!(sizing.max_total_ratio, 9.148533, epsilon = 1e-5);
        assert_relative_eq!(sizing.gearbox_ratio, 1.75);
        assert_relative_eq!(sizing.total_ratio, 7.0);
        assert!(!sizing.ratio_within_limits());

        let first = sizing.first_stage;
        assert_eq!(first.centre_distance_mm, 90.0);
        assert_eq!((first.pinion.teeth, first.wheel.teeth), (17, 29));
        assert_eq!(first.module_mm, 3.0);
        assert_relative_eq!(first.helix_angle_deg, 39.944505, epsilon = 1e-5);
        assert_relative_eq!(first.pinion.pitch_diameter_mm, 66.521739, epsilon = 1e-5);
        assert_relative_eq!(first.wheel.pitch_diameter_mm, 113.478261, epsilon = 1e-5);
        assert_relative_eq!(first.face_width_mm, 21.0);

        let second = sizing.second_stage;
        assert_eq!(second.centre_distance_mm, 140.0);
        assert_eq!((second.pinion.teeth, second.wheel.teeth), (14, 56));
        // module 4 would close the pair as a spur gear
        assert_eq!(second.module_mm, 3.0);
        assert_relative_eq!(second.helix_angle_deg, 41.409622, epsilon = 1e-5);
        assert_relative_eq!(second.pinion.pitch_diameter_mm, 56.0, epsilon = 1e-9);
        assert_relative_eq!(second.wheel.pitch_diameter_mm, 224.0, epsilon = 1e-9);
        assert_relative_eq!(second.face_width_mm, 21.0);

        assert_relative_eq!(sizing.shafts.input_mm, 36.267605, epsilon = 1e-5);
        assert_relative_eq!(sizing.shafts.intermediate_mm, 48.6, epsilon = 1e-9);
        assert_relative_eq!(sizing.shafts.half_shaft_mm, 17.796429, epsilon = 1e-5);
    }

    #[test]
    fn pitch_circles_touch() {
        for (centre, pinion, ratio, helix) in [(90.0, 17, 1.75, 25.0), (140.0, 14, 4.0, 20.0), (125.0, 21, 2.3, 15.0)] {
            let pair = helical_pair(centre, pinion, ratio, helix, 7.0).unwrap();
            assert_relative_eq!(pair.pinion.pitch_diameter_mm + pair.wheel.pitch_diameter_mm, 2.0 * centre, epsilon = 1e-9);
            assert!(pair.helix_angle_deg >= HELIX_BAND_DEG.0 && pair.helix_angle_deg <= HELIX_BAND_DEG.1);
        }
    }

    #[test]
    fn impossible_pair() {
        // 200 teeth at the smallest module need more than 100 mm between centres
        let result = helical_pair(50.0, 40, 4.0, 20.0, 7.0);
        assert!(matches!(result, Err(Error::GearPairDoesNotFit { pinion_teeth: 40, wheel_teeth: 160, .. })));
    }

    #[test]
    fn module_nearest_nominal_helix() {
        // modules 1.25 and 1.5 both fit, 1.5 lands closer to 25°
        let pair = helical_pair(200.0, 12, 20.0, 25.0, 7.0).unwrap();
        assert_eq!(pair.wheel.teeth, 240);
        assert_eq!(pair.module_mm, 1.5);
        assert_relative_eq!(pair.helix_angle_deg, 19.091053, epsilon = 1e-5);
    }

    #[test]
    fn wheel_teeth_adjusted_into_helix_band() {
        // 20/80 on module 1 closes as a spur pair, 20/79 gives a usable helix
        let pair = helical_pair(50.0, 20, 4.0, 20.0, 7.0).unwrap();
        assert_eq!((pair.pinion.teeth, pair.wheel.teeth), (20, 79));
        assert_eq!(pair.module_mm, 1.0);
        assert_relative_eq!(pair.helix_angle_deg, 8.109614, epsilon = 1e-5);
        assert_relative_eq!(pair.pinion.pitch_diameter_mm + pair.wheel.pitch_diameter_mm, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn no_module_inside_helix_band() {
        let inputs = DrivetrainInputs {
            peak_torque_nm: 1000.0,
            centre_distance_coefficient: 15.0,
            total_ratio: 20.0,
            final_drive_ratio: 1.0,
            max_grade_deg: 5.0,
            first_pinion_teeth: 12.0,
            second_pinion_teeth: 12.0,
            ..Default::default()
        };
        assert!(inputs.validate().is_ok());
        // 12/12 on 200 mm needs at least a 53° helix with the largest module
        let result = size_drivetrain(&inputs);
        assert!(matches!(result, Err(Error::GearPairDoesNotFit { pinion_teeth: 12, wheel_teeth: 12, .. })));
    }

    #[test]
    fn fractional_tooth_counts_rejected() {
        let inputs = DrivetrainInputs { first_pinion_teeth: 17.6, ..Default::default() };
        assert!(matches!(inputs.validate(), Err(Error::NotAWholeNumber { key: "first_pinion_teeth", .. })));
        assert!(matches!(size_drivetrain(&inputs), Err(Error::NotAWholeNumber { .. })));
    }

    #[test]
    fn ratio_limits_can_be_met() {
        let inputs = DrivetrainInputs { max_grade_deg: 15.0, total_ratio: 9.0, ..Default::default() };
        let sizing = size_drivetrain(&inputs).unwrap();
        assert!(sizing.min_total_ratio < 9.0);
        assert!(sizing.ratio_within_limits());
        assert!(sizing.to_string().contains("✓ Total ratio is within the limits"));
    }
}

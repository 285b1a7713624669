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

//! Battery pack sizing from a single cell's data sheet.
//!
//! The series count is fixed by the motor voltage and the parallel count by whichever
//! is larger of the energy needed for the range target and the current needed for the
//! motor's peak power.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utils::numeric::ceil_count;
use crate::params::{impl_design_inputs, ParamSpec, VEHICLE};
use crate::params::{DRAG_COEFFICIENT, EFFICIENCY, FRONTAL_AREA, GRAVITY, MASS, ROLLING_COEFFICIENT};
use crate::resistance::{RoadLoad, tractive_power_kw};

/// Continuous discharge rate assumed for the cell when working out pack peak power
pub const CELL_DISCHARGE_RATE_C: f64 = 3.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CellModel {
    Eve50e21700,
    CatlNmc,
    BydLfp
}

impl CellModel {
    pub const ALL: [CellModel; 3] = [CellModel::Eve50e21700, CellModel::CatlNmc, CellModel::BydLfp];

    pub fn as_str(&self) -> &'static str {
        match self {
            CellModel::Eve50e21700 => "EVE 50E 21700",
            CellModel::CatlNmc => "CATL NMC",
            CellModel::BydLfp => "BYD LFP"
        }
    }
}

impl Default for CellModel {
    fn default() -> Self {
        CellModel::Eve50e21700
    }
}

impl Display for CellModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const CELL: &str = "Cell";
const MOTOR: &str = "Motor";
const MISSION: &str = "Range target";

pub const BATTERY_SIZING_PARAMS: [ParamSpec; 17] = [
    ParamSpec::new("cell_voltage_v", CELL, "Cell voltage", "V", (2.0, 5.0), 0.1, 2),
    ParamSpec::new("cell_capacity_ah", CELL, "Cell capacity", "Ah", (1.0, 10.0), 0.1, 2),
    ParamSpec::new("cell_energy_wh", CELL, "Cell energy", "Wh", (5.0, 50.0), 0.1, 2),
    ParamSpec::new("cell_mass_kg", CELL, "Cell mass", "kg", (0.01, 0.5), 0.001, 4),
    ParamSpec::new("motor_voltage_v", MOTOR, "Motor rated voltage", "V", (100.0, 1000.0), 10.0, 1),
    ParamSpec::new("motor_peak_power_kw", MOTOR, "Motor peak power", "kW", (50.0, 500.0), 1.0, 1),
    ParamSpec::new("motor_efficiency", MOTOR, "Motor efficiency", "", (0.7, 0.99), 0.01, 2),
    ParamSpec::new("controller_efficiency", MOTOR, "Controller efficiency", "", (0.7, 0.99), 0.01, 2),
    ParamSpec::new("range_km", MISSION, "Range target", "km", (100.0, 1000.0), 10.0, 1),
    ParamSpec::new("cruise_speed_kmh", MISSION, "Cruise speed", "km/h", (30.0, 120.0), 5.0, 1),
    ParamSpec::new("depth_of_discharge", MISSION, "Depth of discharge", "", (0.5, 1.0), 0.01, 2),
    ParamSpec::new("mass", VEHICLE, "Laden mass", "kg", MASS, 1.0, 2),
    ParamSpec::new("gravity", VEHICLE, "Gravitational acceleration", "m/s²", GRAVITY, 0.1, 2),
    ParamSpec::new("rolling_coefficient", VEHICLE, "Rolling resistance coefficient", "", ROLLING_COEFFICIENT, 0.001, 3),
    ParamSpec::new("drag_coefficient", VEHICLE, "Drag coefficient", "", DRAG_COEFFICIENT, 0.01, 2),
    ParamSpec::new("frontal_area", VEHICLE, "Frontal area", "m²", FRONTAL_AREA, 0.1, 3),
    ParamSpec::new("transmission_efficiency", VEHICLE, "Driveline efficiency", "", EFFICIENCY, 0.01, 2),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatterySizingInputs {
    pub cell_model: CellModel,
    pub cell_voltage_v: f64,
    pub cell_capacity_ah: f64,
    pub cell_energy_wh: f64,
    pub cell_mass_kg: f64,
    pub motor_voltage_v: f64,
    pub motor_peak_power_kw: f64,
    pub motor_efficiency: f64,
    pub controller_efficiency: f64,
    pub range_km: f64,
    pub cruise_speed_kmh: f64,
    pub depth_of_discharge: f64,
    pub mass: f64,
    pub gravity: f64,
    pub rolling_coefficient: f64,
    pub drag_coefficient: f64,
    pub frontal_area: f64,
    pub transmission_efficiency: f64
}

impl Default for BatterySizingInputs {
    fn default() -> Self {
        BatterySizingInputs {
            cell_model: CellModel::default(),
            cell_voltage_v: 3.6,
            cell_capacity_ah: 5.0,
            cell_energy_wh: 18.25,
            cell_mass_kg: 0.0678,
            motor_voltage_v: 650.0,
            motor_peak_power_kw: 100.0,
            motor_efficiency: 0.90,
            controller_efficiency: 0.95,
            range_km: 200.0,
            cruise_speed_kmh: 60.0,
            depth_of_discharge: 0.90,
            mass: 4200.0,
            gravity: 9.8,
            rolling_coefficient: 0.015,
            drag_coefficient: 0.38,
            frontal_area: 3.769,
            transmission_efficiency: 0.92
        }
    }
}

impl_design_inputs!(BatterySizingInputs, BATTERY_SIZING_PARAMS, [
    cell_voltage_v, cell_capacity_ah, cell_energy_wh, cell_mass_kg, motor_voltage_v,
    motor_peak_power_kw, motor_efficiency, controller_efficiency, range_km, cruise_speed_kmh,
    depth_of_discharge, mass, gravity, rolling_coefficient, drag_coefficient, frontal_area,
    transmission_efficiency
]);

impl BatterySizingInputs {
    fn road_load(&self) -> RoadLoad {
        RoadLoad::new(self.mass, self.gravity, self.rolling_coefficient, self.drag_coefficient, self.frontal_area)
    }

    /// Motor and controller losses between the pack terminals and the motor shaft
    fn electrical_efficiency(&self) -> f64 {
        self.motor_efficiency * self.controller_efficiency
    }

    /// Power the cell can sustain at [CELL_DISCHARGE_RATE_C] in W
    pub fn cell_discharge_power_w(&self) -> f64 {
        CELL_DISCHARGE_RATE_C * self.cell_voltage_v * self.cell_capacity_ah
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatterySizing {
    pub cell_model: CellModel,
    pub series_count: u32,
    pub pack_voltage_v: f64,
    pub cruise_power_kw: f64,
    pub battery_power_kw: f64,
    pub required_energy_wh: f64,
    pub energy_parallel_count: u32,
    pub energy_pack_peak_power_kw: f64,
    pub peak_power_demand_kw: f64,
    /// Only present when the energy-sized pack can't deliver the motor's peak demand
    pub power_parallel_count: Option<u32>,
    pub parallel_count: u32,
    pub total_cells: u32,
    pub capacity_ah: f64,
    pub energy_kwh: f64,
    pub mass_kg: f64,
    pub peak_power_kw: f64,
    pub achievable_range_km: f64,
    pub range_target_km: f64
}

impl BatterySizing {
    pub fn meets_range(&self) -> bool {
        self.achievable_range_km >= self.range_target_km
    }

    pub fn meets_peak_power(&self) -> bool {
        self.peak_power_kw >= self.peak_power_demand_kw
    }
}

pub fn size_battery(inputs: &BatterySizingInputs) -> BatterySizing {
    let series_count = ceil_count(inputs.motor_voltage_v / inputs.cell_voltage_v);
    let pack_voltage_v = series_count as f64 * inputs.cell_voltage_v;

    let speed = inputs.cruise_speed_kmh;
    let cruise_power_kw = tractive_power_kw(inputs.road_load().level_road_force(speed),
                                            speed,
                                            inputs.transmission_efficiency);
    let battery_power_kw = cruise_power_kw / inputs.electrical_efficiency();
    let required_energy_wh = battery_power_kw * (inputs.range_km / speed) * 1000.0 / inputs.depth_of_discharge;
    let energy_parallel_count = ceil_count(required_energy_wh / (series_count as f64 * inputs.cell_energy_wh));

    let cell_power_w = inputs.cell_discharge_power_w();
    let energy_pack_peak_power_kw = cell_power_w * series_count as f64 * energy_parallel_count as f64 / 1000.0;
    let peak_power_demand_kw = inputs.motor_peak_power_kw / inputs.electrical_efficiency();
    let power_parallel_count = match energy_pack_peak_power_kw < peak_power_demand_kw {
        true => Some(ceil_count(
            (peak_power_demand_kw * 1000.0) / (cell_power_w * series_count as f64 * inputs.electrical_efficiency())
        )),
        false => None
    };
    let parallel_count = power_parallel_count.map_or(energy_parallel_count, |count| count.max(energy_parallel_count));
    debug!("Battery parallel count: energy {} power {:?}", energy_parallel_count, power_parallel_count);

    let total_cells = series_count * parallel_count;
    let energy_kwh = total_cells as f64 * inputs.cell_energy_wh / 1000.0;
    let achievable_range_km = speed * (energy_kwh * 1000.0 * inputs.depth_of_discharge) / (battery_power_kw * 1000.0);
    info!("Battery pack sized to {}S{}P ({} cells)", series_count, parallel_count, total_cells);
    BatterySizing {
        cell_model: inputs.cell_model,
        series_count,
        pack_voltage_v,
        cruise_power_kw,
        battery_power_kw,
        required_energy_wh,
        energy_parallel_count,
        energy_pack_peak_power_kw,
        peak_power_demand_kw,
        power_parallel_count,
        parallel_count,
        total_cells,
        capacity_ah: inputs.cell_capacity_ah * parallel_count as f64,
        energy_kwh,
        mass_kg: total_cells as f64 * inputs.cell_mass_kg,
        peak_power_kw: cell_power_w * total_cells as f64 / 1000.0,
        achievable_range_km,
        range_target_km: inputs.range_km
    }
}

impl Display for BatterySizing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "===== Battery pack design =====")?;
        writeln!(f, "Cell model: {}", self.cell_model)?;
        writeln!(f, "Series count: {}", self.series_count)?;
        writeln!(f, "Pack voltage: {:.2} V", self.pack_voltage_v)?;
        writeln!(f)?;
        writeln!(f, "===== Energy =====")?;
        writeln!(f, "Cruise power at the wheels: {:.2} kW", self.cruise_power_kw)?;
        writeln!(f, "Battery output power: {:.2} kW", self.battery_power_kw)?;
        writeln!(f, "Required energy: {:.2} Wh", self.required_energy_wh)?;
        writeln!(f, "Parallel count (energy): {}", self.energy_parallel_count)?;
        writeln!(f)?;
        writeln!(f, "===== Power =====")?;
        writeln!(f, "Pack peak power (energy sized): {:.2} kW", self.energy_pack_peak_power_kw)?;
        writeln!(f, "Motor peak demand: {:.2} kW", self.peak_power_demand_kw)?;
        match self.power_parallel_count {
            Some(count) => writeln!(f, "Parallel count (power): {}", count)?,
            None => writeln!(f, "Parallel count (power): not needed")?
        }
        writeln!(f)?;
        writeln!(f, "===== Pack =====")?;
        writeln!(f, "Configuration: {}S{}P", self.series_count, self.parallel_count)?;
        writeln!(f, "Total cells: {}", self.total_cells)?;
        writeln!(f, "Capacity: {:.2} Ah", self.capacity_ah)?;
        writeln!(f, "Energy: {:.2} kWh", self.energy_kwh)?;
        writeln!(f, "Mass: {:.2} kg", self.mass_kg)?;
        writeln!(f, "Peak output: {:.2} kW", self.peak_power_kw)?;
        writeln!(f)?;
        writeln!(f, "===== Verification =====")?;
        writeln!(f, "Achievable range: {:.2} km", self.achievable_range_km)?;
        match self.meets_range() {
            true => writeln!(f, "✓ Range target of {:.0} km is met", self.range_target_km),
            false => writeln!(f, "✗ Range target of {:.0} km is not met", self.range_target_km)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::battery::{BatterySizingInputs, size_battery};
    use crate::params::DesignInputs;

    #[test]
    fn default_pack() {
        let inputs = BatterySizingInputs::default();
        assert!(inputs.validate().is_ok());
        let pack = size_battery(&inputs);
        assert_eq!(pack.series_count, 181);
        assert_relative_eq!(pack.pack_voltage_v, 651.6, epsilon = 1e-9);
        assert_relative_eq!(pack.cruise_power_kw, 15.601126, epsilon = 1e-5);
        assert_relative_eq!(pack.battery_power_kw, 18.246930, epsilon = 1e-5);
        assert_relative_eq!(pack.required_energy_wh, 67581.22, epsilon = 1e-2);
        assert_eq!(pack.energy_parallel_count, 21);
        assert_relative_eq!(pack.energy_pack_peak_power_kw, 205.254, epsilon = 1e-6);
        assert_relative_eq!(pack.peak_power_demand_kw, 116.959064, epsilon = 1e-5);
        assert_eq!(pack.power_parallel_count, None);
        assert_eq!(pack.parallel_count, 21);
        assert_eq!(pack.total_cells, 3801);
        assert_relative_eq!(pack.capacity_ah, 105.0, epsilon = 1e-9);
        assert_relative_eq!(pack.energy_kwh, 69.36825, epsilon = 1e-9);
        assert_relative_eq!(pack.mass_kg, 257.7078, epsilon = 1e-6);
        assert_relative_eq!(pack.achievable_range_km, 205.288529, epsilon = 1e-5);
        assert!(pack.meets_range());
        assert!(pack.meets_peak_power());
    }

    #[test]
    fn series_count_rounds_up() {
        let inputs = BatterySizingInputs { motor_voltage_v: 360.0, ..Default::default() };
        assert_eq!(size_battery(&inputs).series_count, 100);
        let inputs = BatterySizingInputs { motor_voltage_v: 361.0, ..Default::default() };
        assert_eq!(size_battery(&inputs).series_count, 101);
    }

    #[test]
    fn power_limited_pack() {
        let inputs = BatterySizingInputs { motor_peak_power_kw: 500.0, ..Default::default() };
        let pack = size_battery(&inputs);
        assert_eq!(pack.energy_parallel_count, 21);
        assert_eq!(pack.power_parallel_count, Some(70));
        assert_eq!(pack.parallel_count, 70);
        assert_eq!(pack.total_cells, 181 * 70);
        assert_relative_eq!(pack.peak_power_kw, 684.18, epsilon = 1e-6);
        assert!(pack.meets_peak_power());
        assert!(pack.to_string().contains("Configuration: 181S70P"));
    }

    #[test]
    fn short_of_range() {
        let inputs = BatterySizingInputs { range_km: 1000.0, cell_energy_wh: 50.0, ..Default::default() };
        let pack = size_battery(&inputs);
        // ceil keeps the pack at or above the target
        assert!(pack.achievable_range_km >= 1000.0);

        let mut pack = size_battery(&BatterySizingInputs::default());
        pack.range_target_km = 300.0;
        assert!(!pack.meets_range());
        assert!(pack.to_string().contains("✗ Range target of 300 km is not met"));
    }
}

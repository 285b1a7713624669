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

/// Combines air density, the 1/2 factor and the km/h -> m/s conversion so that
/// `Cd * A * u^2 / 21.15` gives aerodynamic drag in N with `u` in km/h
pub const AERO_DRAG_DIVISOR: f64 = 21.15;

/// `2 * pi * 60 / 1000`, relates motor speed (rpm), wheel radius (m) and overall
/// ratio to road speed in km/h: `u = 0.377 * n * r / i`
pub const ROAD_SPEED_FACTOR: f64 = 0.377;

/// The forces resisting a vehicle's motion on the road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadLoad {
    pub mass: f64,
    pub gravity: f64,
    pub rolling_coefficient: f64,
    pub drag_coefficient: f64,
    pub frontal_area: f64
}

impl RoadLoad {
    pub fn new(mass: f64,
               gravity: f64,
               rolling_coefficient: f64,
               drag_coefficient: f64,
               frontal_area: f64) -> RoadLoad {
        RoadLoad { mass, gravity, rolling_coefficient, drag_coefficient, frontal_area }
    }

    /// Vehicle weight in N
    pub fn gravitational_force(&self) -> f64 {
        self.mass * self.gravity
    }

    /// Tyre rolling resistance in N. Independent of speed.
    pub fn rolling_force(&self) -> f64 {
        self.gravitational_force() * self.rolling_coefficient
    }

    /// Aerodynamic drag in N at `speed_kmh`
    pub fn aero_force(&self, speed_kmh: f64) -> f64 {
        (self.drag_coefficient * self.frontal_area * speed_kmh.powi(2)) / AERO_DRAG_DIVISOR
    }

    /// Rolling plus gradient resistance in N on a slope of `angle_rad`
    pub fn grade_force(&self, angle_rad: f64) -> f64 {
        self.gravitational_force() * (self.rolling_coefficient * angle_rad.cos() + angle_rad.sin())
    }

    /// Total resistance in N on a level road at `speed_kmh`
    pub fn level_road_force(&self, speed_kmh: f64) -> f64 {
        self.rolling_force() + self.aero_force(speed_kmh)
    }

    /// Total resistance in N climbing a slope of `angle_rad` at `speed_kmh`
    pub fn climbing_force(&self, speed_kmh: f64, angle_rad: f64) -> f64 {
        self.grade_force(angle_rad) + self.aero_force(speed_kmh)
    }
}

/// Power in kW the motor must deliver to overcome `force_n` at `speed_kmh`
/// through a driveline of efficiency `driveline_efficiency`
pub fn tractive_power_kw(force_n: f64, speed_kmh: f64, driveline_efficiency: f64) -> f64 {
    (speed_kmh / (3600.0 * driveline_efficiency)) * force_n
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::resistance::{RoadLoad, tractive_power_kw};

    fn bus() -> RoadLoad {
        RoadLoad::new(4200.0, 9.8, 0.015, 0.38, 3.769)
    }

    #[test]
    fn resistance_forces() {
        let road = bus();
        assert_relative_eq!(road.rolling_force(), 617.4, epsilon = 1e-9);
        assert_relative_eq!(road.aero_force(120.0), 975.128510638, epsilon = 1e-6);
        assert_relative_eq!(road.aero_force(0.0), 0.0);
        assert_relative_eq!(road.level_road_force(120.0), 1592.528510638, epsilon = 1e-6);
        assert_relative_eq!(road.grade_force(0.0), road.rolling_force(), epsilon = 1e-9);
        assert_relative_eq!(road.grade_force(20f64.to_radians()), 14657.715323, epsilon = 1e-5);
    }

    #[test]
    fn power_from_force() {
        let road = bus();
        let power = tractive_power_kw(road.level_road_force(120.0), 120.0, 0.92);
        assert_relative_eq!(power, 57.700308, epsilon = 1e-5);
    }
}

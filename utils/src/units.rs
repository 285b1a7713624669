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

pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh * (1000.0 / 3600.0)
}

pub fn rpm_to_rad_per_sec(rpm: f64) -> f64 {
    2.0 * std::f64::consts::PI * rpm / 60.0
}

/// Torque (Nm) a motor delivering `power_kw` produces at `rpm`
pub fn torque_from_power(power_kw: f64, rpm: f64) -> f64 {
    (power_kw * 1000.0) / rpm_to_rad_per_sec(rpm)
}

#[cfg(test)]
mod tests {
    use crate::units::{kmh_to_ms, rpm_to_rad_per_sec, torque_from_power};

    #[test]
    fn speed_conversions() {
        assert!((kmh_to_ms(36.0) - 10.0).abs() < 1e-12);
        assert!((kmh_to_ms(120.0) - 33.333333).abs() < 1e-6);
    }

    #[test]
    fn torque_from_power_tests() {
        let torque = torque_from_power(156.0, 4000.0);
        assert!((torque * rpm_to_rad_per_sec(4000.0) / 1000.0 - 156.0).abs() < 1e-9);
        assert!((torque - 372.42).abs() < 0.01);
    }
}

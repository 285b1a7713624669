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

use std::{io, result};

pub type Result<T> = result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("`{key}` = {value} is outside the allowed range {min} - {max}")]
    OutOfRange {
        key: &'static str,
        value: f64,
        min: f64,
        max: f64
    },
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("`{key}` = {value} must be a whole number")]
    NotAWholeNumber {
        key: &'static str,
        value: f64
    },
    #[error("drive force never covers the driving resistance within the speed sweep")]
    NoFeasibleSpeed,
    #[error("vehicle cannot accelerate past {speed_kmh:.1} km/h")]
    CannotAccelerate {
        speed_kmh: f64
    },
    #[error("no standard module fits a {pinion_teeth}/{wheel_teeth} tooth pair on a {centre_distance_mm} mm centre distance")]
    GearPairDoesNotFit {
        centre_distance_mm: f64,
        pinion_teeth: u32,
        wheel_teeth: u32
    },
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
    #[error("chart rendering failed. {0}")]
    Chart(String),
    #[error("io error")]
    Io(#[from] io::Error),
    #[error("toml decode error. {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("toml encode error. {0}")]
    TomlEncode(#[from] toml::ser::Error)
}

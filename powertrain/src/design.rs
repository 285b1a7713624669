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

use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::info;
use crate::Result;
use crate::battery::BatterySizingInputs;
use crate::drivetrain::DrivetrainInputs;
use crate::motor::MotorSizingInputs;
use crate::params::DesignInputs;
use crate::performance::{PerformanceInputs, PerformanceSweep};
use crate::range::{RangeInputs, RangeSweep};

/// A complete set of inputs for every calculation, as stored in a TOML design file.
///
/// Missing sections and fields fall back to their defaults so a file only needs to
/// contain the values that differ.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignFile {
    pub motor: MotorSizingInputs,
    pub battery: BatterySizingInputs,
    pub drivetrain: DrivetrainInputs,
    pub performance: PerformanceInputs,
    pub performance_sweep: PerformanceSweep,
    pub range: RangeInputs,
    pub range_sweep: RangeSweep
}

impl DesignFile {
    pub fn from_toml(contents: &str) -> Result<DesignFile> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<DesignFile> {
        info!("Loading design from {}", path.display());
        DesignFile::from_toml(&fs::read_to_string(path)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Checks every input against its allowed range
    pub fn validate(&self) -> Result<()> {
        self.motor.validate()?;
        self.battery.validate()?;
        self.drivetrain.validate()?;
        self.performance.validate()?;
        self.performance_sweep.validate()?;
        self.range.validate()?;
        self.range_sweep.validate()
    }
}

#[cfg(test)]
mod tests {
    use crate::design::DesignFile;
    use crate::Error;
    use crate::motor::MotorModel;

    #[test]
    fn partial_file_uses_defaults() {
        let design = DesignFile::from_toml(r#"
[motor]
mass = 3000.0
model = "ModelS"

[range_sweep]
points = 50
"#).unwrap();
        assert_eq!(design.motor.mass, 3000.0);
        assert_eq!(design.motor.model, MotorModel::ModelS);
        assert_eq!(design.motor.max_speed_kmh, 120.0);
        assert_eq!(design.range_sweep.points, 50);
        assert_eq!(design.range_sweep.probes.mass, 1600.0);
        assert_eq!(design.battery, Default::default());
        assert!(design.validate().is_ok());
    }

    #[test]
    fn defaults_survive_toml() {
        let design = DesignFile::default();
        let text = design.to_toml().unwrap();
        assert!(text.contains("[drivetrain]"));
        assert_eq!(DesignFile::from_toml(&text).unwrap(), design);
    }

    #[test]
    fn out_of_range_values_are_reported() {
        let design = DesignFile::from_toml("[battery]\ndepth_of_discharge = 1.5\n").unwrap();
        assert!(matches!(design.validate(), Err(Error::OutOfRange { key: "depth_of_discharge", .. })));
        assert!(matches!(DesignFile::from_toml("[motor]\nmass = \"heavy\""), Err(Error::TomlDecode(_))));
    }
}

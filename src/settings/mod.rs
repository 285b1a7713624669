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
use std::path::{Path, PathBuf};
use config::{Config, ConfigBuilder, ConfigError};
use config::builder::DefaultState;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use powertrain::performance::PerformanceSweep;
use powertrain::range::RangeSweep;

pub fn get_default_export_path() -> PathBuf {
    match UserDirs::new() {
        Some(user_dirs) => match user_dirs.document_dir() {
            Some(doc_dir) => doc_dir.join("ev-designer"),
            None => user_dirs.home_dir().join("ev-designer")
        },
        None => PathBuf::from("exports")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GlobalSettings {
    export_path: String,
    sweep_top_speed_kmh: f64,
    performance_sweep_points: u64,
    range_sweep_points: u64
}

impl GlobalSettings {
    const EXPORT_PATH: &'static str = "export_path";
    const SWEEP_TOP_SPEED_KMH: &'static str = "sweep_top_speed_kmh";
    const PERFORMANCE_SWEEP_POINTS: &'static str = "performance_sweep_points";
    const RANGE_SWEEP_POINTS: &'static str = "range_sweep_points";
    const CONFIG_FILENAME: &'static str = "ev-designer-conf";

    pub fn default() -> Self {
        let performance = PerformanceSweep::default();
        GlobalSettings {
            export_path: get_default_export_path().to_string_lossy().into_owned(),
            sweep_top_speed_kmh: performance.top_speed_kmh,
            performance_sweep_points: performance.points as u64,
            range_sweep_points: RangeSweep::default().points as u64
        }
    }

    fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = GlobalSettings::default();
        builder
            .set_default(GlobalSettings::EXPORT_PATH, defaults.export_path)?
            .set_default(GlobalSettings::SWEEP_TOP_SPEED_KMH, defaults.sweep_top_speed_kmh)?
            .set_default(GlobalSettings::PERFORMANCE_SWEEP_POINTS, defaults.performance_sweep_points as i64)?
            .set_default(GlobalSettings::RANGE_SWEEP_POINTS, defaults.range_sweep_points as i64)
    }

    pub fn load() -> Result<Self, ConfigError> {
        let builder = GlobalSettings::with_defaults(Config::builder())?;
        return match builder
            .add_source(config::File::with_name(GlobalSettings::CONFIG_FILENAME))
            .add_source(config::Environment::with_prefix("APP"))
            .build() {
            Ok(settings) => {
                settings.try_deserialize()
            }
            Err(e) => {
                warn!("Failed to load settings. {}", e.to_string());
                let settings = GlobalSettings::with_defaults(Config::builder())?.build()?;
                let ret: GlobalSettings = settings.try_deserialize()?;
                ret.write().unwrap_or_else(|e| { error!("Failed to write settings. {}", e.to_string())});
                Ok(ret)
            }
        }
    }

    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(&self.export_path)
    }

    pub fn set_export_path(&mut self, new_path: &Path) {
        self.export_path = new_path.to_string_lossy().into_owned();
    }

    pub fn sweep_top_speed_kmh(&self) -> f64 {
        self.sweep_top_speed_kmh
    }

    pub fn performance_sweep_points(&self) -> u64 {
        self.performance_sweep_points
    }

    pub fn range_sweep_points(&self) -> u64 {
        self.range_sweep_points
    }

    pub fn set_sweeps(&mut self, top_speed_kmh: f64, performance_points: u64, range_points: u64) {
        self.sweep_top_speed_kmh = top_speed_kmh;
        self.performance_sweep_points = performance_points;
        self.range_sweep_points = range_points;
    }

    pub fn performance_sweep(&self) -> PerformanceSweep {
        PerformanceSweep {
            top_speed_kmh: self.sweep_top_speed_kmh,
            points: self.performance_sweep_points as usize
        }
    }

    pub fn range_sweep(&self) -> RangeSweep {
        RangeSweep {
            points: self.range_sweep_points as usize,
            ..RangeSweep::default()
        }
    }

    pub fn write(&self) -> std::io::Result<()> {
        fs::write(format!("{}.toml", GlobalSettings::CONFIG_FILENAME), toml::to_string(&self).map_err(|_e|{
            std::io::Error::new(std::io::ErrorKind::Other, "Failed to encode settings to toml")
        })?)
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::GlobalSettings;

    #[test]
    fn sweeps_follow_settings() {
        let mut settings = GlobalSettings::default();
        assert_eq!(settings.performance_sweep().points, 1000);
        assert_eq!(settings.performance_sweep().top_speed_kmh, 150.0);
        assert_eq!(settings.range_sweep().points, 100);

        settings.set_sweeps(180.0, 500, 40);
        assert_eq!(settings.performance_sweep().top_speed_kmh, 180.0);
        assert_eq!(settings.performance_sweep().points, 500);
        assert_eq!(settings.range_sweep().points, 40);
        assert_eq!(settings.range_sweep().probes.mass, 1600.0);
    }

    #[test]
    fn settings_survive_toml() {
        let settings = GlobalSettings::default();
        let text = toml::to_string(&settings).unwrap();
        assert!(text.contains("export_path"));
        let decoded: GlobalSettings = toml::from_str(&text).unwrap();
        assert_eq!(decoded, settings);
    }
}

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

use std::path::PathBuf;
use tracing::{error, info, warn};
use powertrain::performance::PerformanceSweep;
use powertrain::range::RangeSweep;
use crate::settings::GlobalSettings;

pub struct ApplicationData {
    pub(crate) settings: GlobalSettings
}

impl ApplicationData {
    pub(crate) fn new() -> ApplicationData {
        let settings = GlobalSettings::load().unwrap_or_else(|e| {
            warn!("Failed to load settings. {}", e.to_string());
            GlobalSettings::default()
        });
        info!("Export path set to {}", settings.export_path().display());
        ApplicationData { settings }
    }

    pub(crate) fn export_path(&self) -> PathBuf {
        self.settings.export_path()
    }

    pub(crate) fn performance_sweep(&self) -> PerformanceSweep {
        self.settings.performance_sweep()
    }

    pub(crate) fn range_sweep(&self) -> RangeSweep {
        self.settings.range_sweep()
    }

    pub(crate) fn update_settings(&mut self, settings: GlobalSettings) {
        self.settings = settings;
        match self.settings.write() {
            Ok(_) => { info!("Wrote settings successfully"); }
            Err(e) => { error!("Failed to write settings. {}", e.to_string()); }
        }
    }
}

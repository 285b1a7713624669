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

use powertrain::chart::performance_chart;
use powertrain::performance::{analyse_performance, PerformanceInputs};
use crate::ui::ApplicationData;
use crate::ui::calculator::{Calculation, CalculatorTab, Outcome};

/// Runs the speed sweep configured in the settings tab
pub struct PerformanceCalculation;

impl Calculation for PerformanceCalculation {
    type Inputs = PerformanceInputs;

    const TITLE: &'static str = "Performance";
    const ACTION: &'static str = "Analyse";
    const EXPORT_NAME: &'static str = "performance";

    fn calculate(inputs: &PerformanceInputs, app_data: &ApplicationData) -> powertrain::Result<Outcome> {
        let analysis = analyse_performance(inputs, &app_data.performance_sweep())?;
        Ok(Outcome { report: analysis.to_string(), chart: Some(performance_chart(&analysis)?) })
    }
}

pub type PerformanceTab = CalculatorTab<PerformanceCalculation>;

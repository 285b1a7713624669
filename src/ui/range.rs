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

use powertrain::chart::range_chart;
use powertrain::range::{analyse_range, RangeInputs};
use crate::ui::ApplicationData;
use crate::ui::calculator::{Calculation, CalculatorTab, Outcome};

pub struct RangeCalculation;

impl Calculation for RangeCalculation {
    type Inputs = RangeInputs;

    const TITLE: &'static str = "Range";
    const ACTION: &'static str = "Analyse sensitivity";
    const EXPORT_NAME: &'static str = "range_sensitivity";

    fn calculate(inputs: &RangeInputs, app_data: &ApplicationData) -> powertrain::Result<Outcome> {
        let analysis = analyse_range(inputs, &app_data.range_sweep())?;
        Ok(Outcome { report: analysis.to_string(), chart: Some(range_chart(&analysis)?) })
    }
}

pub type RangeTab = CalculatorTab<RangeCalculation>;

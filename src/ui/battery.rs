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

use powertrain::battery::{BatterySizingInputs, CellModel, size_battery};
use powertrain::chart::battery_chart;
use crate::ui::ApplicationData;
use crate::ui::calculator::{Calculation, CalculatorTab, ModelChoice, Outcome};

pub struct BatteryCalculation;

impl Calculation for BatteryCalculation {
    type Inputs = BatterySizingInputs;

    const TITLE: &'static str = "Battery";
    const ACTION: &'static str = "Size battery";
    const EXPORT_NAME: &'static str = "battery_sizing";
    const MODEL_TITLE: &'static str = "Cell";

    fn calculate(inputs: &BatterySizingInputs, _app_data: &ApplicationData) -> powertrain::Result<Outcome> {
        let sizing = size_battery(inputs);
        Ok(Outcome { report: sizing.to_string(), chart: Some(battery_chart(&sizing)?) })
    }

    fn models() -> Vec<ModelChoice> {
        CellModel::ALL.iter().map(|model| ModelChoice::Cell(*model)).collect()
    }

    fn model(inputs: &BatterySizingInputs) -> Option<ModelChoice> {
        Some(ModelChoice::Cell(inputs.cell_model))
    }

    fn set_model(inputs: &mut BatterySizingInputs, model: ModelChoice) {
        if let ModelChoice::Cell(model) = model {
            inputs.cell_model = model;
        }
    }
}

pub type BatteryTab = CalculatorTab<BatteryCalculation>;

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

use powertrain::motor::{MotorModel, MotorSizingInputs, size_motor};
use crate::ui::ApplicationData;
use crate::ui::calculator::{Calculation, CalculatorTab, ModelChoice, Outcome};

pub struct MotorCalculation;

impl Calculation for MotorCalculation {
    type Inputs = MotorSizingInputs;

    const TITLE: &'static str = "Motor";
    const ACTION: &'static str = "Size motor";
    const EXPORT_NAME: &'static str = "motor_sizing";
    const MODEL_TITLE: &'static str = "Motor model";

    fn calculate(inputs: &MotorSizingInputs, _app_data: &ApplicationData) -> powertrain::Result<Outcome> {
        Ok(Outcome { report: size_motor(inputs).to_string(), chart: None })
    }

    fn models() -> Vec<ModelChoice> {
        MotorModel::ALL.iter().map(|model| ModelChoice::Motor(*model)).collect()
    }

    fn model(inputs: &MotorSizingInputs) -> Option<ModelChoice> {
        Some(ModelChoice::Motor(inputs.model))
    }

    fn set_model(inputs: &mut MotorSizingInputs, model: ModelChoice) {
        if let ModelChoice::Motor(model) = model {
            inputs.model = model;
        }
    }
}

pub type MotorTab = CalculatorTab<MotorCalculation>;

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

use powertrain::chart::gear_chart;
use powertrain::drivetrain::{DrivetrainInputs, size_drivetrain};
use crate::ui::ApplicationData;
use crate::ui::calculator::{Calculation, CalculatorTab, Outcome};

pub struct DrivetrainCalculation;

impl Calculation for DrivetrainCalculation {
    type Inputs = DrivetrainInputs;

    const TITLE: &'static str = "Drivetrain";
    const ACTION: &'static str = "Size gears";
    const EXPORT_NAME: &'static str = "drivetrain_sizing";

    fn calculate(inputs: &DrivetrainInputs, _app_data: &ApplicationData) -> powertrain::Result<Outcome> {
        let sizing = size_drivetrain(inputs)?;
        Ok(Outcome { report: sizing.to_string(), chart: Some(gear_chart(&sizing)?) })
    }
}

pub type DrivetrainTab = CalculatorTab<DrivetrainCalculation>;

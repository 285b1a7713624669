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

use std::fmt::{Display, Formatter};
use iced::{Alignment, Element, Length, Padding, theme};
use iced::widget::{Button, Column, Row, scrollable, Text, text_input};
use iced_native::svg::Handle;
use iced_native::widget::Svg;
use itertools::Itertools;
use tracing::{error, info, span, Level};
use powertrain::battery::CellModel;
use powertrain::motor::MotorModel;
use powertrain::params::{DesignInputs, ParamSpec};
use crate::export::{export_results, ExportError};
use crate::ui::{ApplicationData, Tab};
use crate::ui::elements::{create_drop_down_list, fail_red_colour, success_green_colour};

const GROUP_HEADER_SIZE: u16 = 20;
const LABEL_WIDTH: u16 = 250;
const INPUT_WIDTH: u16 = 110;
const FORM_WIDTH: u16 = 520;
const CHART_HEIGHT: u16 = 560;

/// Text report and optional SVG chart produced by a calculation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub report: String,
    pub chart: Option<String>
}

/// The entries of a tab's drop-down list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    Motor(MotorModel),
    Cell(CellModel)
}

impl Display for ModelChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelChoice::Motor(model) => write!(f, "{}", model),
            ModelChoice::Cell(model) => write!(f, "{}", model)
        }
    }
}

/// One of the sizing or analysis tabs: a set of inputs and the function that turns them
/// into a report
pub trait Calculation {
    type Inputs: DesignInputs + Default + Clone;

    const TITLE: &'static str;
    const ACTION: &'static str;
    const EXPORT_NAME: &'static str;
    const MODEL_TITLE: &'static str = "Model";

    fn calculate(inputs: &Self::Inputs, app_data: &ApplicationData) -> powertrain::Result<Outcome>;

    fn models() -> Vec<ModelChoice> {
        Vec::new()
    }

    fn model(_inputs: &Self::Inputs) -> Option<ModelChoice> {
        None
    }

    fn set_model(_inputs: &mut Self::Inputs, _model: ModelChoice) {}
}

#[derive(Debug, Clone)]
pub enum CalcMessage {
    FieldChanged(usize, String),
    ModelSelected(ModelChoice),
    Calculate,
    Reset,
    Export
}

#[derive(Debug, Clone, PartialEq)]
enum Status {
    Success(String),
    Failure(String)
}

#[derive(Debug, Clone, PartialEq)]
struct FieldState {
    text: String,
    error: Option<String>
}

pub struct CalculatorTab<C: Calculation> {
    inputs: C::Inputs,
    fields: Vec<FieldState>,
    models: Vec<ModelChoice>,
    outcome: Option<Outcome>,
    chart: Option<Handle>,
    status: Option<Status>
}

impl<C: Calculation> CalculatorTab<C> {
    pub fn new() -> Self {
        let inputs = C::Inputs::default();
        let fields = C::Inputs::param_specs().iter().map(|spec| {
            FieldState {
                text: spec.format(inputs.get(spec.key).unwrap_or(spec.min)),
                error: None
            }
        }).collect();
        CalculatorTab {
            inputs,
            fields,
            models: C::models(),
            outcome: None,
            chart: None,
            status: None
        }
    }

    pub fn update(&mut self, message: CalcMessage, app_data: &ApplicationData) {
        match message {
            CalcMessage::FieldChanged(idx, text) => self.edit_field(idx, text),
            CalcMessage::ModelSelected(model) => C::set_model(&mut self.inputs, model),
            CalcMessage::Calculate => self.calculate(app_data),
            CalcMessage::Reset => *self = CalculatorTab::new(),
            CalcMessage::Export => self.export(app_data)
        }
    }

    fn edit_field(&mut self, idx: usize, text: String) {
        let specs = C::Inputs::param_specs();
        let (Some(spec), Some(field)) = (specs.get(idx), self.fields.get_mut(idx)) else {
            return;
        };
        field.error = match spec.parse(&text).and_then(|value| self.inputs.set(spec.key, value)) {
            Ok(_) => None,
            Err(e) => Some(e.to_string())
        };
        field.text = text;
    }

    fn calculate(&mut self, app_data: &ApplicationData) {
        let specs = C::Inputs::param_specs();
        if let Some((spec, _)) = specs.iter().zip(&self.fields).find(|(_, field)| field.error.is_some()) {
            self.status = Some(Status::Failure(format!("{} is invalid", spec.display_label())));
            return;
        }
        if let Err(e) = self.inputs.validate() {
            self.status = Some(Status::Failure(e.to_string()));
            return;
        }

        let span = span!(Level::INFO, "Calculating", tab = C::TITLE);
        let _enter = span.enter();
        match C::calculate(&self.inputs, app_data) {
            Ok(outcome) => {
                info!("{} complete", C::TITLE);
                self.chart = outcome.chart.as_ref().map(|svg| Handle::from_memory(svg.clone().into_bytes()));
                self.outcome = Some(outcome);
                self.status = Some(Status::Success(String::from("Calculation complete")));
            }
            Err(e) => {
                error!("{} failed. {}", C::TITLE, e);
                self.outcome = None;
                self.chart = None;
                self.status = Some(Status::Failure(e.to_string()));
            }
        }
    }

    fn export(&mut self, app_data: &ApplicationData) {
        let Some(outcome) = &self.outcome else {
            self.status = Some(Status::Failure(ExportError::NothingToExport.to_string()));
            return;
        };
        self.status = match export_results(&app_data.export_path(),
                                           C::EXPORT_NAME,
                                           &outcome.report,
                                           outcome.chart.as_deref()) {
            Ok(paths) => {
                Some(Status::Success(format!("Exported {}", paths.iter().map(|path| path.display()).join(", "))))
            }
            Err(e) => {
                error!("Export failed. {}", e);
                Some(Status::Failure(e.to_string()))
            }
        };
    }

    fn field_row<'a>(&'a self, idx: usize, spec: &ParamSpec, field: &'a FieldState) -> Row<'a, CalcMessage> {
        let mut row = Row::new()
            .spacing(8)
            .align_items(Alignment::Center)
            .push(Text::new(spec.display_label()).width(Length::Units(LABEL_WIDTH)))
            .push(text_input("", &field.text, move |text| CalcMessage::FieldChanged(idx, text))
                .padding(4)
                .width(Length::Units(INPUT_WIDTH)));
        if let Some(error) = &field.error {
            row = row.push(Text::new(error).size(14).style(fail_red_colour()));
        }
        row
    }

    fn form(&self) -> Column<'_, CalcMessage> {
        let mut form = Column::new().spacing(6).width(Length::Units(FORM_WIDTH));
        if !self.models.is_empty() {
            form = form.push(create_drop_down_list(C::MODEL_TITLE,
                                                   &self.models,
                                                   C::model(&self.inputs),
                                                   CalcMessage::ModelSelected));
        }
        let specs = C::Inputs::param_specs();
        let groups = specs.iter().zip(&self.fields).enumerate().chunk_by(|(_, (spec, _))| spec.group);
        for (group, members) in &groups {
            form = form.push(Text::new(group).size(GROUP_HEADER_SIZE));
            for (idx, (spec, field)) in members {
                form = form.push(self.field_row(idx, spec, field));
            }
        }
        form
    }

    fn results(&self) -> Column<'_, CalcMessage> {
        let buttons = Row::new()
            .spacing(10)
            .push(Button::new(Text::new(C::ACTION)).on_press(CalcMessage::Calculate).style(theme::Button::Primary))
            .push(Button::new(Text::new("Export")).on_press(CalcMessage::Export).style(theme::Button::Positive))
            .push(Button::new(Text::new("Reset")).on_press(CalcMessage::Reset).style(theme::Button::Secondary));
        let mut column = Column::new().spacing(12).width(Length::Fill).push(buttons);
        match &self.status {
            Some(Status::Success(msg)) => column = column.push(Text::new(msg).style(success_green_colour())),
            Some(Status::Failure(msg)) => column = column.push(Text::new(msg).style(fail_red_colour())),
            None => {}
        }
        if let Some(outcome) = &self.outcome {
            column = column.push(Text::new(&outcome.report).size(16));
        }
        if let Some(handle) = &self.chart {
            column = column.push(Svg::new(handle.clone()).width(Length::Fill).height(Length::Units(CHART_HEIGHT)));
        }
        column
    }
}

impl<C: Calculation> Tab for CalculatorTab<C> {
    type Message = CalcMessage;

    fn title(&self) -> String {
        String::from(C::TITLE)
    }

    fn content<'a, 'b>(
        &'a self,
        _app_data: &'b ApplicationData
    ) -> Element<'_, Self::Message>
    where 'b: 'a
    {
        let layout = Row::new()
            .spacing(20)
            .push(self.form())
            .push(self.results());
        scrollable(Column::new().push(layout).padding(Padding::from([0, 12, 12, 0])))
            .height(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use powertrain::motor::MotorModel;
    use crate::settings::GlobalSettings;
    use crate::ui::ApplicationData;
    use crate::ui::calculator::{CalcMessage, CalculatorTab, ModelChoice, Status};
    use crate::ui::motor::MotorCalculation;
    use crate::ui::performance::PerformanceCalculation;

    fn app_data() -> ApplicationData {
        ApplicationData { settings: GlobalSettings::default() }
    }

    #[test]
    fn fields_start_with_defaults() {
        let tab = CalculatorTab::<MotorCalculation>::new();
        assert_eq!(tab.fields[0].text, "4200.00");
        assert!(tab.fields.iter().all(|field| field.error.is_none()));
        assert_eq!(tab.models.len(), 3);
    }

    #[test]
    fn invalid_field_blocks_calculation() {
        let data = app_data();
        let mut tab = CalculatorTab::<MotorCalculation>::new();
        tab.update(CalcMessage::FieldChanged(0, String::from("heavy")), &data);
        assert!(tab.fields[0].error.is_some());
        tab.update(CalcMessage::Calculate, &data);
        assert!(matches!(tab.status, Some(Status::Failure(_))));
        assert!(tab.outcome.is_none());

        tab.update(CalcMessage::FieldChanged(0, String::from("50000")), &data);
        assert!(tab.fields[0].error.is_some());
        assert_eq!(tab.inputs.mass, 4200.0);

        tab.update(CalcMessage::FieldChanged(0, String::from("3000")), &data);
        assert!(tab.fields[0].error.is_none());
        assert_eq!(tab.inputs.mass, 3000.0);
    }

    #[test]
    fn calculation_produces_report() {
        let data = app_data();
        let mut tab = CalculatorTab::<MotorCalculation>::new();
        tab.update(CalcMessage::ModelSelected(ModelChoice::Motor(MotorModel::ModelS)), &data);
        tab.update(CalcMessage::Calculate, &data);
        assert!(matches!(tab.status, Some(Status::Success(_))));
        let report = &tab.outcome.as_ref().unwrap().report;
        assert!(report.contains("P_m1 (top speed): 57.70 kW"));
        assert!(report.contains("Model: Model S motor"));

        tab.update(CalcMessage::Reset, &data);
        assert!(tab.outcome.is_none());
        assert_eq!(tab.inputs.model, MotorModel::Sd290HighVoltage);
    }

    #[test]
    fn calculation_errors_are_shown() {
        let data = app_data();
        let mut tab = CalculatorTab::<PerformanceCalculation>::new();
        let ratio_idx = 12;
        let speed_idx = 13;
        tab.update(CalcMessage::FieldChanged(ratio_idx, String::from("20")), &data);
        tab.update(CalcMessage::FieldChanged(speed_idx, String::from("100")), &data);
        tab.update(CalcMessage::Calculate, &data);
        match &tab.status {
            Some(Status::Failure(msg)) => assert!(msg.contains("cannot accelerate")),
            other => panic!("expected failure, got {:?}", other)
        }
        assert!(tab.chart.is_none());
    }

    #[test]
    fn export_needs_a_result() {
        let data = app_data();
        let mut tab = CalculatorTab::<MotorCalculation>::new();
        tab.update(CalcMessage::Export, &data);
        assert!(matches!(tab.status, Some(Status::Failure(_))));
    }
}

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
use iced::{Alignment, Element, Length, Padding, theme};
use iced::widget::{Button, Column, Container, Row, Text, text_input};
use crate::settings::GlobalSettings;
use crate::ui::{ApplicationData, Tab};
use crate::ui::elements::{fail_red_colour, success_green_colour};

const MAX_SWEEP_POINTS: u64 = 100_000;
const MAX_SWEEP_TOP_SPEED_KMH: f64 = 400.0;

#[derive(Debug, Clone)]
pub enum SettingsMessage {
    ExportPathChanged(String),
    TopSpeedChanged(String),
    PerformancePointsChanged(String),
    RangePointsChanged(String),
    Save,
    RevertToDefault
}

pub struct SettingsTab {
    export_path: String,
    top_speed: String,
    performance_points: String,
    range_points: String,
    status: Option<Result<String, String>>
}

fn parse_points(name: &str, text: &str) -> Result<u64, String> {
    match text.trim().parse::<u64>() {
        Ok(points) if (2..=MAX_SWEEP_POINTS).contains(&points) => Ok(points),
        _ => Err(format!("{} must be a whole number between 2 and {}", name, MAX_SWEEP_POINTS))
    }
}

impl SettingsTab {
    pub(crate) fn new(app_data: &ApplicationData) -> Self {
        let mut tab = SettingsTab {
            export_path: String::new(),
            top_speed: String::new(),
            performance_points: String::new(),
            range_points: String::new(),
            status: None
        };
        tab.load_from(&app_data.settings);
        tab
    }

    fn load_from(&mut self, settings: &GlobalSettings) {
        self.export_path = settings.export_path().display().to_string();
        self.top_speed = settings.sweep_top_speed_kmh().to_string();
        self.performance_points = settings.performance_sweep_points().to_string();
        self.range_points = settings.range_sweep_points().to_string();
    }

    /// Builds the settings the fields describe, starting from `current`
    fn parse(&self, current: &GlobalSettings) -> Result<GlobalSettings, String> {
        let export_path = self.export_path.trim();
        if export_path.is_empty() {
            return Err(String::from("Export path must not be empty"));
        }
        let top_speed = match self.top_speed.trim().parse::<f64>() {
            Ok(speed) if speed > 0.0 && speed <= MAX_SWEEP_TOP_SPEED_KMH => speed,
            _ => return Err(format!("Sweep top speed must be between 0 and {} km/h", MAX_SWEEP_TOP_SPEED_KMH))
        };
        let performance_points = parse_points("Performance sweep points", &self.performance_points)?;
        let range_points = parse_points("Range sweep points", &self.range_points)?;

        let mut settings = current.clone();
        settings.set_export_path(&PathBuf::from(export_path));
        settings.set_sweeps(top_speed, performance_points, range_points);
        Ok(settings)
    }

    /// Returns the new settings when the user saved or reverted them
    pub fn update(&mut self, message: SettingsMessage, app_data: &ApplicationData) -> Option<GlobalSettings> {
        match message {
            SettingsMessage::ExportPathChanged(text) => self.export_path = text,
            SettingsMessage::TopSpeedChanged(text) => self.top_speed = text,
            SettingsMessage::PerformancePointsChanged(text) => self.performance_points = text,
            SettingsMessage::RangePointsChanged(text) => self.range_points = text,
            SettingsMessage::Save => {
                return match self.parse(&app_data.settings) {
                    Ok(settings) => {
                        self.status = Some(Ok(String::from("Settings saved")));
                        Some(settings)
                    }
                    Err(e) => {
                        self.status = Some(Err(e));
                        None
                    }
                };
            }
            SettingsMessage::RevertToDefault => {
                let defaults = GlobalSettings::default();
                self.load_from(&defaults);
                self.status = Some(Ok(String::from("Settings reverted to default")));
                return Some(defaults);
            }
        }
        None
    }
}

fn setting_row<'a>(title: &'static str,
                   value: &'a str,
                   on_change: fn(String) -> SettingsMessage) -> Column<'a, SettingsMessage> {
    Column::new()
        .spacing(4)
        .push(Text::new(title))
        .push(text_input("", value, on_change).padding(4).width(Length::Units(480)))
}

impl Tab for SettingsTab {
    type Message = SettingsMessage;

    fn title(&self) -> String {
        String::from("Settings")
    }

    fn content<'a, 'b>(
        &'a self,
        _app_data: &'b ApplicationData
    ) -> Element<'_, Self::Message>
    where 'b: 'a
    {
        let buttons = Row::new()
            .spacing(10)
            .align_items(Alignment::Center)
            .push(Button::new(Text::new("Save")).on_press(SettingsMessage::Save).style(theme::Button::Primary))
            .push(Button::new(Text::new("Revert to default"))
                .on_press(SettingsMessage::RevertToDefault)
                .style(theme::Button::Destructive));

        let mut column = Column::new()
            .spacing(25)
            .padding(Padding::from([15, 3, 0, 3]))
            .push(setting_row("Export path", &self.export_path, SettingsMessage::ExportPathChanged))
            .push(setting_row("Performance sweep top speed (km/h)", &self.top_speed, SettingsMessage::TopSpeedChanged))
            .push(setting_row("Performance sweep points", &self.performance_points, SettingsMessage::PerformancePointsChanged))
            .push(setting_row("Range sweep points", &self.range_points, SettingsMessage::RangePointsChanged))
            .push(buttons);
        match &self.status {
            Some(Ok(msg)) => column = column.push(Text::new(msg).style(success_green_colour())),
            Some(Err(msg)) => column = column.push(Text::new(msg).style(fail_red_colour())),
            None => {}
        }
        Container::new(column).into()
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::GlobalSettings;
    use crate::ui::ApplicationData;
    use crate::ui::settings::{SettingsMessage, SettingsTab};

    #[test]
    fn save_parses_fields() {
        let data = ApplicationData { settings: GlobalSettings::default() };
        let mut tab = SettingsTab::new(&data);
        assert_eq!(tab.top_speed, "150");
        assert_eq!(tab.performance_points, "1000");

        assert!(tab.update(SettingsMessage::TopSpeedChanged(String::from("180")), &data).is_none());
        tab.update(SettingsMessage::RangePointsChanged(String::from("50")), &data);
        let saved = tab.update(SettingsMessage::Save, &data).unwrap();
        assert_eq!(saved.sweep_top_speed_kmh(), 180.0);
        assert_eq!(saved.range_sweep_points(), 50);
        assert_eq!(saved.performance_sweep_points(), 1000);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let data = ApplicationData { settings: GlobalSettings::default() };
        let mut tab = SettingsTab::new(&data);
        tab.update(SettingsMessage::PerformancePointsChanged(String::from("1")), &data);
        assert!(tab.update(SettingsMessage::Save, &data).is_none());
        assert!(matches!(tab.status, Some(Err(_))));

        tab.update(SettingsMessage::PerformancePointsChanged(String::from("200")), &data);
        tab.update(SettingsMessage::TopSpeedChanged(String::from("fast")), &data);
        assert!(tab.update(SettingsMessage::Save, &data).is_none());

        tab.update(SettingsMessage::TopSpeedChanged(String::from("120")), &data);
        tab.update(SettingsMessage::ExportPathChanged(String::from("  ")), &data);
        assert!(tab.update(SettingsMessage::Save, &data).is_none());
    }

    #[test]
    fn revert_restores_defaults() {
        let data = ApplicationData { settings: GlobalSettings::default() };
        let mut tab = SettingsTab::new(&data);
        tab.update(SettingsMessage::TopSpeedChanged(String::from("99")), &data);
        let reverted = tab.update(SettingsMessage::RevertToDefault, &data).unwrap();
        assert_eq!(reverted, GlobalSettings::default());
        assert_eq!(tab.top_speed, "150");
    }
}

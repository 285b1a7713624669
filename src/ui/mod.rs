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

mod battery;
mod calculator;
mod data;
mod drivetrain;
mod elements;
mod motor;
mod performance;
mod range;
mod settings;

use iced::{Element, Sandbox, Error, Settings, Padding, theme};
use iced::widget::{Button, Column, Container, Row, Text};
use iced::alignment::{Horizontal, Vertical};
use tracing::{span, Level, info};
use battery::BatteryTab;
use calculator::CalcMessage;
use drivetrain::DrivetrainTab;
use motor::MotorTab;
use performance::PerformanceTab;
use range::RangeTab;
use settings::{SettingsMessage, SettingsTab};
pub use data::ApplicationData;

const HEADER_SIZE: u16 = 32;
const TAB_PADDING: u16 = 16;

pub fn launch() -> Result<(), Error> {
    UIMain::run(Settings::default())
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(usize),
    Motor(CalcMessage),
    Battery(CalcMessage),
    Drivetrain(CalcMessage),
    Performance(CalcMessage),
    Range(CalcMessage),
    Settings(SettingsMessage),
}

pub struct UIMain {
    app_data: ApplicationData,
    active_tab: usize,
    motor_tab: MotorTab,
    battery_tab: BatteryTab,
    drivetrain_tab: DrivetrainTab,
    performance_tab: PerformanceTab,
    range_tab: RangeTab,
    settings_tab: SettingsTab
}

impl UIMain {
    fn tab_titles(&self) -> [String; 6] {
        [
            self.motor_tab.title(),
            self.battery_tab.title(),
            self.drivetrain_tab.title(),
            self.performance_tab.title(),
            self.range_tab.title(),
            self.settings_tab.title()
        ]
    }

    fn tab_bar(&self) -> Row<'_, Message> {
        self.tab_titles().into_iter().enumerate().fold(Row::new().spacing(2), |row, (idx, title)| {
            let style = match idx == self.active_tab {
                true => theme::Button::Primary,
                false => theme::Button::Secondary
            };
            row.push(Button::new(Text::new(title))
                .padding(Padding::from([8, 16]))
                .style(style)
                .on_press(Message::TabSelected(idx)))
        })
    }
}

impl Sandbox for UIMain {
    type Message = Message;

    fn new() -> Self {
        let span = span!(Level::INFO, "Creating UIMain");
        let _enter = span.enter();
        let app_data = ApplicationData::new();
        info!("Initialised settings successfully");
        let settings_tab = SettingsTab::new(&app_data);
        info!("Created settings tab");
        UIMain {
            app_data,
            active_tab: 0,
            motor_tab: MotorTab::new(),
            battery_tab: BatteryTab::new(),
            drivetrain_tab: DrivetrainTab::new(),
            performance_tab: PerformanceTab::new(),
            range_tab: RangeTab::new(),
            settings_tab
        }
    }

    fn title(&self) -> String {
        String::from("EV Powertrain Designer")
    }

    fn update(&mut self, message: Self::Message) {
        match message {
            Message::TabSelected(selected) => self.active_tab = selected,
            Message::Motor(message) => self.motor_tab.update(message, &self.app_data),
            Message::Battery(message) => self.battery_tab.update(message, &self.app_data),
            Message::Drivetrain(message) => self.drivetrain_tab.update(message, &self.app_data),
            Message::Performance(message) => self.performance_tab.update(message, &self.app_data),
            Message::Range(message) => self.range_tab.update(message, &self.app_data),
            Message::Settings(message) => {
                if let Some(settings) = self.settings_tab.update(message, &self.app_data) {
                    self.app_data.update_settings(settings);
                }
            }
        }
    }

    fn view(&self) -> Element<'_, Self::Message> {
        let content = match self.active_tab {
            0 => self.motor_tab.view(&self.app_data).map(Message::Motor),
            1 => self.battery_tab.view(&self.app_data).map(Message::Battery),
            2 => self.drivetrain_tab.view(&self.app_data).map(Message::Drivetrain),
            3 => self.performance_tab.view(&self.app_data).map(Message::Performance),
            4 => self.range_tab.view(&self.app_data).map(Message::Range),
            _ => self.settings_tab.view(&self.app_data).map(Message::Settings)
        };
        Column::new()
            .push(self.tab_bar())
            .push(content)
            .into()
    }
}

trait Tab {
    type Message;

    fn title(&self) -> String;

    fn view<'a, 'b>(
        &'a self,
        app_data: &'b ApplicationData
    ) -> Element<'_, Self::Message>
    where 'b: 'a
    {
        let column = Column::new()
            .spacing(5)
            .push(Text::new(self.title()).size(HEADER_SIZE))
            .push(self.content(app_data));

        Container::new(column)
            .align_x(Horizontal::Left)
            .align_y(Vertical::Top)
            .padding(Padding::from([TAB_PADDING*2, TAB_PADDING, TAB_PADDING, TAB_PADDING]))
            .into()
    }

    fn content<'a, 'b>(
        &'a self,
        app_data: &'b ApplicationData
    ) -> Element<'_, Self::Message>
    where 'b: 'a;
}

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

use iced::{Alignment, Color};
use iced::widget::{Column, pick_list, Text};

pub fn create_drop_down_list<'a, T, M>(title: &'static str,
                                       options: &'a [T],
                                       current_selection: Option<T>,
                                       on_select: fn(T) -> M) -> Column<'a, M>
where
    T: ToString + Eq + Clone + 'static,
    M: 'a
{
    let picklist = pick_list(options, current_selection, on_select);
    Column::new()
        .align_items(Alignment::Start)
        .push(Text::new(title))
        .push(picklist)
}

pub fn success_green_colour() -> Color {
    Color::from_rgb8(75, 181, 67)
}

pub fn fail_red_colour() -> Color {
    Color::from_rgb8(237, 67, 55)
}

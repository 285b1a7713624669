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

//! SVG charts for the sizing and analysis results.
//!
//! Every renderer returns the finished SVG document as a string so it can be shown in
//! the UI and written to disk unchanged.

use std::f64::consts::PI;
use std::ops::Range;
use itertools::Itertools;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use crate::{Error, Result};
use crate::battery::BatterySizing;
use crate::drivetrain::{DrivetrainSizing, GearPair};
use crate::performance::PerformanceAnalysis;
use crate::range::{Factor, RangeAnalysis};

pub const CHART_SIZE: (u32, u32) = (1000, 800);
pub const GEAR_CHART_SIZE: (u32, u32) = (1000, 500);

/// Grade the performance chart marks as the design requirement
pub const GRADE_REQUIREMENT_PERCENT: f64 = 20.0;

const FONT: &str = "sans-serif";
const DARK_GREY: RGBColor = RGBColor(51, 51, 51);
const GREY: RGBColor = RGBColor(102, 102, 102);
const LIGHT_GREY: RGBColor = RGBColor(153, 153, 153);
const CIRCLE_SEGMENTS: usize = 180;

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;
type Chart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn chart_error<E: std::error::Error>(err: E) -> Error {
    Error::Chart(err.to_string())
}

fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String>
    where F: FnOnce(&DrawingArea<SVGBackend, Shift>) -> DrawResult
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        draw(&root).map_err(|err| Error::Chart(err.to_string()))?;
        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

/// Span of `values` widened by `pad_fraction` of its width on both sides
fn padded_range(values: impl IntoIterator<Item = f64>, pad_fraction: f64) -> Range<f64> {
    match values.into_iter().filter(|v| v.is_finite()).minmax().into_option() {
        Some((low, high)) if high > low => {
            let pad = (high - low) * pad_fraction;
            (low - pad)..(high + pad)
        }
        Some((low, _)) => (low - 1.0)..(low + 1.0),
        None => 0.0..1.0
    }
}

fn max_of(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().filter(|v| v.is_finite()).fold(0.0, f64::max)
}

fn plot_line<'a>(chart: &mut Chart<'a, 'a>,
             points: Vec<(f64, f64)>,
             colour: RGBColor,
             label: &str) -> DrawResult {
    chart.draw_series(LineSeries::new(points, colour.stroke_width(2)))?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2)));
    Ok(())
}

fn plot_marker<'a>(chart: &mut Chart<'a, 'a>, from: (f64, f64), to: (f64, f64), colour: RGBColor) -> DrawResult {
    chart.draw_series(LineSeries::new(vec![from, to], colour.stroke_width(1)))?;
    Ok(())
}

fn draw_legend<'a>(chart: &mut Chart<'a, 'a>, position: SeriesLabelPosition) -> DrawResult {
    chart.configure_series_labels()
        .position(position)
        .label_font((FONT, 13))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn zip_points<'a>(x: impl IntoIterator<Item = &'a f64>, y: impl IntoIterator<Item = &'a f64>) -> Vec<(f64, f64)> {
    x.into_iter().copied().zip(y.into_iter().copied()).collect()
}

/// Bar chart of the series and parallel cell counts
pub fn battery_chart(sizing: &BatterySizing) -> Result<String> {
    render_svg(CHART_SIZE, |root| draw_battery(root, sizing))
}

fn draw_battery(root: &DrawingArea<SVGBackend, Shift>, sizing: &BatterySizing) -> DrawResult {
    let counts = [("Series", sizing.series_count as f64, DARK_GREY), ("Parallel", sizing.parallel_count as f64, LIGHT_GREY)];
    let total: f64 = counts.iter().map(|(_, count, _)| count).sum();
    let y_max = max_of(counts.iter().map(|(_, count, _)| *count)) * 1.15;
    let caption = format!("Pack composition {}S{}P, {:.2} kWh, {:.1} kg",
                          sizing.series_count, sizing.parallel_count, sizing.energy_kwh, sizing.mass_kg);
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(caption, (FONT, 22))
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..counts.len() as f64, 0f64..y_max.max(1.0))?;
    chart.configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc("Cells")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(idx, (_, count, colour))| {
        let left = idx as f64;
        Rectangle::new([(left + 0.2, 0.0), (left + 0.8, *count)], colour.filled())
    }))?;
    chart.draw_series(counts.iter().enumerate().map(|(idx, (name, count, _))| {
        let share = match total > 0.0 {
            true => count / total * 100.0,
            false => 0.0
        };
        Text::new(format!("{}: {} ({:.1}%)", name, count, share),
                  (idx as f64 + 0.25, count + y_max * 0.06),
                  (FONT, 18))
    }))?;
    Ok(())
}

/// Both gear stages, each drawn as its pair of touching pitch circles
pub fn gear_chart(sizing: &DrivetrainSizing) -> Result<String> {
    render_svg(GEAR_CHART_SIZE, |root| {
        let areas = root.split_evenly((1, 2));
        draw_gear_pair(&areas[0], "First stage", &sizing.first_stage)?;
        draw_gear_pair(&areas[1], "Second stage", &sizing.second_stage)
    })
}

fn circle_points(centre: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    (0..=CIRCLE_SEGMENTS)
        .map(|idx| {
            let angle = 2.0 * PI * idx as f64 / CIRCLE_SEGMENTS as f64;
            (centre.0 + radius * angle.cos(), centre.1 + radius * angle.sin())
        })
        .collect()
}

fn draw_gear_pair(area: &DrawingArea<SVGBackend, Shift>, title: &str, pair: &GearPair) -> DrawResult {
    let pinion_radius = pair.pinion.pitch_diameter_mm / 2.0;
    let wheel_radius = pair.wheel.pitch_diameter_mm / 2.0;
    let margin = 0.1 * (pinion_radius + wheel_radius);
    let x_range = (-pinion_radius - margin)..(pair.centre_distance_mm + wheel_radius + margin);
    let half_height = (x_range.end - x_range.start) / 2.0;
    let caption = format!("{} ({}:{}, m = {} mm, β = {:.1}°)",
                          title, pair.pinion.teeth, pair.wheel.teeth, pair.module_mm, pair.helix_angle_deg);
    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .caption(caption, (FONT, 16))
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, -half_height..half_height)?;
    chart.configure_mesh().x_desc("mm").draw()?;

    plot_line(&mut chart, circle_points((0.0, 0.0), pinion_radius), BLACK,
              &format!("Pinion z = {}, d = {:.1} mm", pair.pinion.teeth, pair.pinion.pitch_diameter_mm))?;
    plot_line(&mut chart, circle_points((pair.centre_distance_mm, 0.0), wheel_radius), GREY,
              &format!("Wheel z = {}, d = {:.1} mm", pair.wheel.teeth, pair.wheel.pitch_diameter_mm))?;
    plot_marker(&mut chart, (0.0, 0.0), (pair.centre_distance_mm, 0.0), LIGHT_GREY)?;
    chart.draw_series([(0.0, 0.0), (pair.centre_distance_mm, 0.0)]
        .into_iter()
        .map(|centre| Circle::new(centre, 3, BLACK.filled())))?;
    chart.draw_series(std::iter::once(Text::new(format!("a = {:.0} mm", pair.centre_distance_mm),
                                                (pair.centre_distance_mm * 0.3, -half_height * 0.1),
                                                (FONT, 14))))?;
    draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
}

/// Force balance, grade, acceleration and motor torque in a 2x2 grid
pub fn performance_chart(analysis: &PerformanceAnalysis) -> Result<String> {
    render_svg(CHART_SIZE, |root| {
        let areas = root.split_evenly((2, 2));
        draw_force_balance(&areas[0], analysis)?;
        draw_grade(&areas[1], analysis)?;
        draw_acceleration(&areas[2], analysis)?;
        draw_torque_curve(&areas[3], analysis)
    })
}

fn sweep_end(analysis: &PerformanceAnalysis) -> f64 {
    analysis.speed_kmh.last().copied().unwrap_or(1.0).max(1.0)
}

fn draw_force_balance(area: &DrawingArea<SVGBackend, Shift>, analysis: &PerformanceAnalysis) -> DrawResult {
    let speed_end = sweep_end(analysis);
    let force_max = max_of(analysis.drive_force_n.iter().chain(analysis.resistance_force_n.iter()).copied()).max(1.0) * 1.1;
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("(a) Drive force and resistance", (FONT, 16))
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..speed_end, 0f64..force_max)?;
    chart.configure_mesh().x_desc("Speed (km/h)").y_desc("Force (N)").draw()?;

    let speeds = &analysis.speed_kmh;
    plot_line(&mut chart, zip_points(speeds, &analysis.drive_force_n), BLACK, "Drive force")?;
    plot_line(&mut chart, zip_points(speeds, &analysis.rolling_force_n), GREY, "Rolling resistance")?;
    plot_line(&mut chart, zip_points(speeds, &analysis.aero_force_n), LIGHT_GREY, "Aerodynamic drag")?;
    plot_line(&mut chart, zip_points(speeds, &analysis.resistance_force_n), DARK_GREY, "Total resistance")?;
    plot_line(&mut chart,
              vec![(analysis.top_speed_kmh, 0.0), (analysis.top_speed_kmh, force_max)],
              RED,
              &format!("Top speed {:.1} km/h", analysis.top_speed_kmh))?;
    draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
}

fn draw_grade(area: &DrawingArea<SVGBackend, Shift>, analysis: &PerformanceAnalysis) -> DrawResult {
    let speed_end = sweep_end(analysis);
    let grade_max = (max_of(analysis.grade_percent.iter().copied()) * 1.2).clamp(GRADE_REQUIREMENT_PERCENT * 1.2, 60.0);
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("(b) Gradeability", (FONT, 16))
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..speed_end, 0f64..grade_max)?;
    chart.configure_mesh().x_desc("Speed (km/h)").y_desc("Grade (%)").draw()?;

    plot_line(&mut chart, zip_points(&analysis.speed_kmh, &analysis.grade_percent), BLACK, "Maximum grade")?;
    plot_line(&mut chart,
              vec![(0.0, GRADE_REQUIREMENT_PERCENT), (speed_end, GRADE_REQUIREMENT_PERCENT)],
              GREY,
              &format!("Requirement {:.0}%", GRADE_REQUIREMENT_PERCENT))?;
    plot_line(&mut chart,
              vec![(analysis.grade_test_speed_kmh, 0.0), (analysis.grade_test_speed_kmh, grade_max)],
              RED,
              &format!("{:.1}% at {:.0} km/h", analysis.grade_at_test_speed_percent, analysis.grade_test_speed_kmh))?;
    draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
}

fn draw_acceleration(area: &DrawingArea<SVGBackend, Shift>, analysis: &PerformanceAnalysis) -> DrawResult {
    let speed_end = sweep_end(analysis).min(100.0);
    let visible_accel = analysis.speed_kmh.iter()
        .zip(analysis.acceleration_ms2.iter())
        .filter(|(speed, _)| **speed <= speed_end)
        .map(|(speed, accel)| (*speed, *accel))
        .collect_vec();
    let accel_range = padded_range(visible_accel.iter().map(|(_, accel)| *accel), 0.05);
    let time_max = max_of(analysis.elapsed_time_s.iter().copied()).max(0.1) * 1.1;
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("(c) Acceleration", (FONT, 16))
        .x_label_area_size(35)
        .y_label_area_size(55)
        .right_y_label_area_size(55)
        .build_cartesian_2d(0f64..speed_end, accel_range)?
        .set_secondary_coord(0f64..speed_end, 0f64..time_max);
    chart.configure_mesh().x_desc("Speed (km/h)").y_desc("Acceleration (m/s²)").draw()?;
    chart.configure_secondary_axes().y_desc("Elapsed time (s)").draw()?;

    plot_line(&mut chart, visible_accel, BLACK, "Acceleration")?;
    chart.draw_secondary_series(LineSeries::new(zip_points(&analysis.speed_kmh, &analysis.elapsed_time_s),
                                                GREY.stroke_width(2)))?
        .label(format!("Time to {:.0} km/h: {:.1} s", analysis.accel_test_speed_kmh, analysis.accel_time_s))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREY.stroke_width(2)));
    chart.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 13))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_torque_curve(area: &DrawingArea<SVGBackend, Shift>, analysis: &PerformanceAnalysis) -> DrawResult {
    let rpm_end = max_of(analysis.motor_rpm.iter().copied()).max(analysis.max_rpm) * 1.05;
    let torque_max = analysis.peak_torque_nm * 1.1;
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("(d) Motor torque", (FONT, 16))
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(0f64..rpm_end, 0f64..torque_max)?;
    chart.configure_mesh().x_desc("Motor speed (rpm)").y_desc("Torque (N·m)").draw()?;

    plot_line(&mut chart, zip_points(&analysis.motor_rpm, &analysis.motor_torque_nm), BLACK, "Torque")?;
    plot_line(&mut chart,
              vec![(analysis.rated_rpm, 0.0), (analysis.rated_rpm, torque_max)],
              GREY,
              &format!("Rated speed {:.0} rpm", analysis.rated_rpm))?;
    plot_line(&mut chart,
              vec![(analysis.max_rpm, 0.0), (analysis.max_rpm, torque_max)],
              LIGHT_GREY,
              &format!("Maximum speed {:.0} rpm", analysis.max_rpm))?;
    draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
}

/// Range against each factor in a 2x2 grid, the mass plot also carrying motor efficiency
pub fn range_chart(analysis: &RangeAnalysis) -> Result<String> {
    render_svg(CHART_SIZE, |root| {
        let areas = root.split_evenly((2, 2));
        draw_range_vs_mass(&areas[0], analysis)?;
        draw_range_vs(&areas[1], analysis, Factor::RollingCoefficient, "(b) Rolling resistance", "Rolling coefficient (×10⁻³)", 1000.0, GREY)?;
        draw_range_vs(&areas[2], analysis, Factor::DragCoefficient, "(c) Drag coefficient", "Drag coefficient", 1.0, DARK_GREY)?;
        draw_range_vs(&areas[3], analysis, Factor::FrontalArea, "(d) Frontal area", "Frontal area (m²)", 1.0, LIGHT_GREY)
    })
}

fn draw_range_vs_mass(area: &DrawingArea<SVGBackend, Shift>, analysis: &RangeAnalysis) -> DrawResult {
    let sweep = analysis.sweep(Factor::Mass).ok_or("mass sweep missing")?;
    let mass_range = padded_range(sweep.values.iter().copied(), 0.0);
    let efficiency = analysis.motor_efficiency.mapv(|eta| eta * 100.0);
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption("(a) Vehicle mass", (FONT, 16))
        .x_label_area_size(35)
        .y_label_area_size(55)
        .right_y_label_area_size(55)
        .build_cartesian_2d(mass_range.clone(), padded_range(sweep.range_km.iter().copied(), 0.05))?
        .set_secondary_coord(mass_range, padded_range(efficiency.iter().copied(), 0.05));
    chart.configure_mesh().x_desc("Vehicle mass (kg)").y_desc("Range (km)").draw()?;
    chart.configure_secondary_axes().y_desc("Motor efficiency (%)").draw()?;

    plot_line(&mut chart, zip_points(&sweep.values, &sweep.range_km), BLACK, "Range")?;
    chart.draw_secondary_series(LineSeries::new(zip_points(&sweep.values, &efficiency), GREY.stroke_width(2)))?
        .label("Motor efficiency")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREY.stroke_width(2)));
    chart.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 13))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_range_vs(area: &DrawingArea<SVGBackend, Shift>,
                 analysis: &RangeAnalysis,
                 factor: Factor,
                 title: &str,
                 x_desc: &str,
                 x_scale: f64,
                 colour: RGBColor) -> DrawResult {
    let sweep = analysis.sweep(factor).ok_or("sweep missing")?;
    let values = sweep.values.mapv(|value| value * x_scale);
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(title, (FONT, 16))
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(padded_range(values.iter().copied(), 0.0),
                            padded_range(sweep.range_km.iter().copied(), 0.05))?;
    chart.configure_mesh().x_desc(x_desc).y_desc("Range (km)").draw()?;
    plot_line(&mut chart, zip_points(&values, &sweep.range_km), colour, "Range")?;
    draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
}

#[cfg(test)]
mod tests {
    use crate::battery::{BatterySizingInputs, size_battery};
    use crate::chart::{battery_chart, gear_chart, padded_range, performance_chart, range_chart};
    use crate::drivetrain::{DrivetrainInputs, size_drivetrain};
    use crate::performance::{analyse_performance, PerformanceInputs, PerformanceSweep};
    use crate::range::{analyse_range, RangeInputs, RangeSweep};

    #[test]
    fn axis_ranges() {
        assert_eq!(padded_range([1.0, 3.0], 0.5), 0.0..4.0);
        assert_eq!(padded_range([2.0, 2.0], 0.5), 1.0..3.0);
        assert_eq!(padded_range([f64::NAN], 0.5), 0.0..1.0);
    }

    #[test]
    fn charts_render_to_svg() {
        let battery = battery_chart(&size_battery(&BatterySizingInputs::default())).unwrap();
        assert!(battery.contains("<svg"));
        assert!(battery.contains("181S21P"));

        let gears = gear_chart(&size_drivetrain(&DrivetrainInputs::default()).unwrap()).unwrap();
        assert!(gears.contains("</svg>"));

        let performance = analyse_performance(&PerformanceInputs::default(), &PerformanceSweep::default()).unwrap();
        assert!(performance_chart(&performance).unwrap().contains("Gradeability"));

        let range = analyse_range(&RangeInputs::default(), &RangeSweep::default()).unwrap();
        assert!(range_chart(&range).unwrap().contains("Frontal area"));
    }
}

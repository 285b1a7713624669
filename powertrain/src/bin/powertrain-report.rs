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

use std::fs;
use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use powertrain::battery::size_battery;
use powertrain::chart::{battery_chart, gear_chart, performance_chart, range_chart};
use powertrain::design::DesignFile;
use powertrain::drivetrain::size_drivetrain;
use powertrain::motor::size_motor;
use powertrain::performance::analyse_performance;
use powertrain::range::analyse_range;
use utils::filesystem::unique_file_path;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Analysis {
    Motor,
    Battery,
    Drivetrain,
    Performance,
    Range
}

#[derive(Parser, Debug)]
#[command(
    name = "powertrain-report",
    version = env!("CARGO_PKG_VERSION"),
    about = "Size an EV powertrain from a TOML design file and print the results",
    long_about = None,
)]
struct Cli {
    /// Design file. Sections and fields that are left out use the default values
    design: Option<PathBuf>,
    /// Analyses to run. All of them when not given
    #[arg(short, long, value_enum, value_delimiter = ',')]
    analysis: Vec<Analysis>,
    /// Write an SVG chart for each analysis that has one into this directory
    #[arg(short, long)]
    chart_dir: Option<PathBuf>,
    /// Print a complete design file filled with the default values and exit
    #[arg(long)]
    dump_defaults: bool,
    /// Highest speed (km/h) of the performance sweep
    #[arg(long)]
    sweep_top_speed: Option<f64>,
    /// Number of points in the performance sweep
    #[arg(long)]
    sweep_points: Option<usize>,
    /// Number of points in each range sensitivity sweep
    #[arg(long)]
    range_points: Option<usize>,
    /// Log level written to stderr
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

fn write_chart(dir: &Path, name: &str, svg: &str) -> powertrain::Result<()> {
    let path = unique_file_path(dir, name, "svg");
    fs::write(&path, svg)?;
    info!("Wrote {}", path.display());
    println!("Chart written to {}", path.display());
    Ok(())
}

fn run(cli: &Cli, mut design: DesignFile) -> powertrain::Result<()> {
    if let Some(top_speed) = cli.sweep_top_speed {
        design.performance_sweep.top_speed_kmh = top_speed;
    }
    if let Some(points) = cli.sweep_points {
        design.performance_sweep.points = points;
    }
    if let Some(points) = cli.range_points {
        design.range_sweep.points = points;
    }
    design.validate()?;

    let selected = match cli.analysis.is_empty() {
        true => Analysis::value_variants().to_vec(),
        false => cli.analysis.clone()
    };
    if let Some(dir) = &cli.chart_dir {
        fs::create_dir_all(dir)?;
    }

    for analysis in selected {
        info!("Running {:?} analysis", analysis);
        let chart = match analysis {
            Analysis::Motor => {
                println!("{}", size_motor(&design.motor));
                None
            }
            Analysis::Battery => {
                let sizing = size_battery(&design.battery);
                println!("{}", sizing);
                Some(("battery", battery_chart(&sizing)?))
            }
            Analysis::Drivetrain => {
                let sizing = size_drivetrain(&design.drivetrain)?;
                println!("{}", sizing);
                Some(("drivetrain", gear_chart(&sizing)?))
            }
            Analysis::Performance => {
                let result = analyse_performance(&design.performance, &design.performance_sweep)?;
                println!("{}", result);
                Some(("performance", performance_chart(&result)?))
            }
            Analysis::Range => {
                let result = analyse_range(&design.range, &design.range_sweep)?;
                println!("{}", result);
                Some(("range", range_chart(&result)?))
            }
        };
        if let (Some(dir), Some((name, svg))) = (&cli.chart_dir, chart) {
            write_chart(dir, name, &svg)?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(cli.log_level)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to init logging. {}", e);
    }

    if cli.dump_defaults {
        match DesignFile::default().to_toml() {
            Ok(text) => print!("{}", text),
            Err(e) => {
                error!("Failed to write default design. {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let design = match &cli.design {
        Some(path) => match DesignFile::load(path) {
            Ok(design) => design,
            Err(e) => {
                error!("Failed to load {}. {}", path.display(), e);
                eprintln!("Failed to load {}. {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => DesignFile::default()
    };

    if let Err(e) = run(&cli, design) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

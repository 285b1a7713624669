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
use tracing::info;
use utils::filesystem::unique_file_path;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("nothing to export, run the calculation first")]
    NothingToExport,
    #[error("couldn't create export directory {path}. {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("failed to write {path}. {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error
    }
}

fn write_file(path: PathBuf, contents: &str) -> Result<PathBuf, ExportError> {
    match fs::write(&path, contents) {
        Ok(_) => {
            info!("Exported {}", path.display());
            Ok(path)
        }
        Err(source) => Err(ExportError::Write { path, source })
    }
}

/// Writes `report` as `<name>.txt` and, when there is one, `chart` as `<name>.svg` into `dir`.
/// Existing files are never overwritten.
pub fn export_results(dir: &Path,
                      name: &str,
                      report: &str,
                      chart: Option<&str>) -> Result<Vec<PathBuf>, ExportError> {
    if report.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir { path: dir.to_path_buf(), source })?;

    let mut written = vec![write_file(unique_file_path(dir, name, "txt"), report)?];
    if let Some(svg) = chart {
        written.push(write_file(unique_file_path(dir, name, "svg"), svg)?);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use crate::export::{export_results, ExportError};

    #[test]
    fn exports_report_and_chart() {
        let dir = std::env::temp_dir()
            .join(format!("ev-designer-export-test-{}", std::process::id()))
            .join("nested");

        let written = export_results(&dir, "battery sizing", "report", Some("<svg></svg>")).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].file_name().unwrap(), "battery_sizing.txt");
        assert_eq!(written[1].file_name().unwrap(), "battery_sizing.svg");
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "report");

        let again = export_results(&dir, "battery sizing", "second", None).unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].file_name().unwrap(), "battery_sizing2.txt");

        assert!(matches!(export_results(&dir, "empty", "", None), Err(ExportError::NothingToExport)));
        fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }
}

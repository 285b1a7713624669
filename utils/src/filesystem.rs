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

use std::path::{Path, PathBuf};

/// Turns `name` into a filename inside `dir` that is safe to write to.
///
/// Characters that can't appear in a path are stripped and spaces become underscores.
/// If the resulting file already exists a number is appended, starting at 2, until the
/// name no longer clashes with anything in `dir`. i.e. with `motor.txt` already present the
/// next call returns `motor2.txt`.
pub fn unique_file_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    let sanitized_name = sanitize_filename::sanitize(name).replace(' ', "_");
    let stem = match sanitized_name.is_empty() {
        true => String::from("export"),
        false => sanitized_name
    };
    let mut file_path = dir.join(format!("{}.{}", stem, extension));
    let mut extra_num = 2;
    while file_path.exists() {
        file_path = dir.join(format!("{}{}.{}", stem, extra_num, extension));
        extra_num += 1;
    }
    file_path
}

#[cfg(test)]
mod tests {
    use std::fs;
    use crate::filesystem::unique_file_path;

    #[test]
    fn unique_names_do_not_clash() {
        let dir = std::env::temp_dir().join(format!("ev-designer-fs-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let first = unique_file_path(&dir, "motor sizing", "txt");
        assert_eq!(first.file_name().unwrap(), "motor_sizing.txt");
        fs::write(&first, "x").unwrap();

        let second = unique_file_path(&dir, "motor sizing", "txt");
        assert_eq!(second.file_name().unwrap(), "motor_sizing2.txt");

        let fallback = unique_file_path(&dir, "/", "svg");
        assert_eq!(fallback.file_name().unwrap(), "export.svg");

        fs::remove_dir_all(&dir).unwrap();
    }
}

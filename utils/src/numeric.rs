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

/// Round `val` up to a whole count, e.g. the number of cells needed to reach a voltage.
/// Non-positive and non-finite values give 0.
pub fn ceil_count(val: f64) -> u32 {
    if !val.is_finite() || val <= 0.0 {
        return 0;
    }
    val.ceil() as u32
}

/// Snap `val` to the nearest member of the series `min, min+step, ..., max`.
///
/// When `val` sits exactly between two members the lower one wins.
pub fn nearest_in_stepped_series(val: f64, min: f64, max: f64, step: f64) -> f64 {
    if val <= min || step <= 0.0 {
        return min;
    }
    if val >= max {
        return max;
    }
    let steps_below = ((val - min) / step).floor();
    let lower = min + steps_below * step;
    let upper = (lower + step).min(max);
    if (val - lower) <= (upper - val) {
        lower
    } else {
        upper
    }
}

/// Change from `base` to `new` as a percentage of `base`
pub fn percent_change(base: f64, new: f64) -> f64 {
    (new - base) / base * 100.0
}

#[cfg(test)]
mod tests {
    use crate::numeric::{ceil_count, nearest_in_stepped_series, percent_change};

    #[test]
    fn ceil_count_tests()  {
        assert_eq!(ceil_count(0.0), 0);
        assert_eq!(ceil_count(-3.0), 0);
        assert_eq!(ceil_count(f64::NAN), 0);
        assert_eq!(ceil_count(1.0), 1);
        assert_eq!(ceil_count(1.0001), 2);
        assert_eq!(ceil_count(650.0 / 3.6), 181);
    }

    #[test]
    fn stepped_series_tests()  {
        assert_eq!(nearest_in_stepped_series(10.0, 50.0, 200.0, 5.0), 50.0);
        assert_eq!(nearest_in_stepped_series(250.0, 50.0, 200.0, 5.0), 200.0);
        assert_eq!(nearest_in_stepped_series(90.24, 50.0, 200.0, 5.0), 90.0);
        assert_eq!(nearest_in_stepped_series(141.31, 50.0, 200.0, 5.0), 140.0);
        assert_eq!(nearest_in_stepped_series(143.0, 50.0, 200.0, 5.0), 145.0);
        assert_eq!(nearest_in_stepped_series(72.5, 50.0, 200.0, 5.0), 70.0);
    }

    #[test]
    fn percent_change_tests()  {
        assert_eq!(percent_change(200.0, 250.0), 25.0);
        assert_eq!(percent_change(200.0, 150.0), -25.0);
        assert_eq!(percent_change(200.0, 200.0), 0.0);
    }
}

//! Most recently closed fiscal quarter
//!
//! Quarters are assumed to end on calendar quarter boundaries
//! (Mar/Jun/Sep/Dec). Companies with other fiscal calendars get the
//! calendar answer.

use chrono::{Datelike, Local, NaiveDate};

/// Label of the last fully closed quarter before `today`, e.g. `2024Q4`
pub fn most_recent_quarter(today: NaiveDate) -> String {
    let year = today.year();
    let (year, quarter) = match today.month() {
        1..=3 => (year - 1, 4),
        4..=6 => (year, 1),
        7..=9 => (year, 2),
        _ => (year, 3),
    };
    format!("{year}Q{quarter}")
}

/// [`most_recent_quarter`] for the local current date
pub fn current_quarter() -> String {
    most_recent_quarter(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_quarter_rolls_back_a_year() {
        assert_eq!(most_recent_quarter(date(2025, 1, 1)), "2024Q4");
        assert_eq!(most_recent_quarter(date(2025, 3, 31)), "2024Q4");
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(most_recent_quarter(date(2025, 4, 1)), "2025Q1");
        assert_eq!(most_recent_quarter(date(2025, 6, 30)), "2025Q1");
        assert_eq!(most_recent_quarter(date(2025, 7, 1)), "2025Q2");
        assert_eq!(most_recent_quarter(date(2025, 9, 30)), "2025Q2");
        assert_eq!(most_recent_quarter(date(2025, 10, 1)), "2025Q3");
        assert_eq!(most_recent_quarter(date(2025, 12, 31)), "2025Q3");
    }

    #[test]
    fn test_current_quarter_shape() {
        let label = current_quarter();
        assert_eq!(label.len(), 6);
        assert_eq!(&label[4..5], "Q");
    }
}

//! Unit tests for the DateRange type

use chrono::NaiveDate;
use core_kernel::temporal::{DateRange, TemporalError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod creation {
    use super::*;

    #[test]
    fn test_single_day_range_is_valid() {
        let range = DateRange::new(date(2024, 3, 15), date(2024, 3, 15)).unwrap();
        assert_eq!(range.days(), 1);
        assert!(range.contains(date(2024, 3, 15)));
    }

    #[test]
    fn test_start_after_end_fails() {
        let result = DateRange::new(date(2024, 12, 31), date(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_from_bounds_open_ends() {
        let range = DateRange::from_bounds(None, Some(date(2024, 1, 31))).unwrap();
        assert!(range.is_open_start());
        assert!(range.contains(date(1900, 1, 1)));
        assert!(!range.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_unbounded_contains_everything() {
        let range = DateRange::unbounded();
        assert!(range.contains(date(1, 1, 1)));
        assert!(range.contains(date(9999, 12, 31)));
        assert_eq!(DateRange::default(), range);
    }
}

mod months {
    use super::*;

    #[test]
    fn test_month_covers_first_to_last_day() {
        let range = DateRange::month(2024, 4).unwrap();
        assert_eq!(range.start, date(2024, 4, 1));
        assert_eq!(range.end, date(2024, 4, 30));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let range = DateRange::month(2023, 12).unwrap();
        assert_eq!(range.end, date(2023, 12, 31));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert_eq!(
            DateRange::month(2024, 13),
            Err(TemporalError::InvalidMonth { year: 2024, month: 13 })
        );
    }

    #[test]
    fn test_month_of_date() {
        let range = DateRange::month_of(date(2024, 2, 10));
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_range_serializes_iso_dates() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["start"], "2024-01-01");
        assert_eq!(json["end"], "2024-01-31");
    }
}

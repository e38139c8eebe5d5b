use chrono::{Datelike, Days, Months, NaiveDate};
use configuration::Bucketing;

/// Maps a date to the last day of the period containing it.
///
/// All dates of one period share the same key, so grouping by it buckets sales
/// regardless of their day within the period.
pub fn period_end(bucketing: Bucketing, date: NaiveDate) -> NaiveDate {
    match bucketing {
        Bucketing::Day => date,
        Bucketing::Week => {
            let to_sunday = 6 - u64::from(date.weekday().num_days_from_monday());
            date.checked_add_days(Days::new(to_sunday)).unwrap_or(date)
        }
        Bucketing::Month => month_end(date.year(), date.month()).unwrap_or(date),
        Bucketing::Quarter => {
            let last_month = (date.month() - 1) / 3 * 3 + 3;
            month_end(date.year(), last_month).unwrap_or(date)
        }
        Bucketing::Year => month_end(date.year(), 12).unwrap_or(date),
    }
}

// `None` only at the upper edge of chrono's calendar.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(period_end(Bucketing::Month, date(2024, 1, 3)), date(2024, 1, 31));
        assert_eq!(period_end(Bucketing::Month, date(2024, 1, 31)), date(2024, 1, 31));
        assert_eq!(period_end(Bucketing::Month, date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(period_end(Bucketing::Month, date(2023, 2, 10)), date(2023, 2, 28));
        assert_eq!(period_end(Bucketing::Month, date(2024, 12, 1)), date(2024, 12, 31));
    }

    #[test]
    fn test_week_ends_on_sunday() {
        // 2024-01-03 is a Wednesday, 2024-01-07 a Sunday.
        assert_eq!(period_end(Bucketing::Week, date(2024, 1, 3)), date(2024, 1, 7));
        assert_eq!(period_end(Bucketing::Week, date(2024, 1, 7)), date(2024, 1, 7));
        assert_eq!(period_end(Bucketing::Week, date(2024, 1, 8)), date(2024, 1, 14));
    }

    #[test]
    fn test_quarter_and_year() {
        assert_eq!(period_end(Bucketing::Quarter, date(2024, 1, 15)), date(2024, 3, 31));
        assert_eq!(period_end(Bucketing::Quarter, date(2024, 6, 30)), date(2024, 6, 30));
        assert_eq!(period_end(Bucketing::Quarter, date(2024, 11, 2)), date(2024, 12, 31));
        assert_eq!(period_end(Bucketing::Year, date(2024, 5, 5)), date(2024, 12, 31));
        assert_eq!(period_end(Bucketing::Day, date(2024, 5, 5)), date(2024, 5, 5));
    }
}

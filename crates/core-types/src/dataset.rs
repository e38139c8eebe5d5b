use crate::structs::SalesRow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Counters describing how many sales survived the reference joins.
///
/// Sales whose good, category or store cannot be resolved are left out of the
/// dataset. They are counted here so the loss is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub sales_read: usize,
    pub joined: usize,
    pub unknown_good: usize,
    pub unknown_category: usize,
    pub unknown_stock: usize,
}

impl JoinReport {
    /// Total number of sales dropped by the joins.
    pub fn dropped(&self) -> usize {
        self.unknown_good + self.unknown_category + self.unknown_stock
    }

    pub fn is_complete(&self) -> bool {
        self.dropped() == 0
    }
}

/// An immutable snapshot of the denormalized sales table.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Identity of the data source this snapshot was read from.
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub rows: Vec<SalesRow>,
    pub join_report: JoinReport,
}

impl Dataset {
    pub fn new(source: impl Into<String>, rows: Vec<SalesRow>, join_report: JoinReport) -> Self {
        Self {
            source: source.into(),
            loaded_at: Utc::now(),
            rows,
            join_report,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The earliest and latest sale date, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?.date;
        Some(self.rows.iter().fold((first, first), |(min, max), row| {
            (min.min(row.date), max.max(row.date))
        }))
    }

    /// Distinct store descriptions in order of first appearance.
    pub fn store_names(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|row| row.store.as_str()))
    }

    /// Distinct category descriptions in order of first appearance.
    pub fn category_names(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|row| row.category.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(date: (i32, u32, u32), store: &str, category: &str) -> SalesRow {
        SalesRow {
            sale_id: 1,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            good_num: "1".into(),
            product: "P".into(),
            category_num: "1".into(),
            category: category.into(),
            stock_num: "1".into(),
            store: store.into(),
            quantity: dec!(1),
            price: dec!(1),
            sales_sum: dec!(1),
        }
    }

    #[test]
    fn test_date_bounds_and_distinct_names() {
        let dataset = Dataset::new(
            "memory",
            vec![
                row((2024, 3, 1), "B", "Y"),
                row((2024, 1, 9), "A", "X"),
                row((2024, 5, 2), "B", "X"),
            ],
            JoinReport::default(),
        );

        let (min, max) = dataset.date_bounds().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(dataset.store_names(), vec!["B", "A"]);
        assert_eq!(dataset.category_names(), vec!["Y", "X"]);
    }

    #[test]
    fn test_empty_dataset_has_no_bounds() {
        let dataset = Dataset::new("memory", Vec::new(), JoinReport::default());
        assert!(dataset.is_empty());
        assert_eq!(dataset.date_bounds(), None);
    }

    #[test]
    fn test_join_report_dropped() {
        let report = JoinReport {
            sales_read: 10,
            joined: 6,
            unknown_good: 2,
            unknown_category: 1,
            unknown_stock: 1,
        };
        assert_eq!(report.dropped(), 4);
        assert!(!report.is_complete());
    }
}

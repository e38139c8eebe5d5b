use chrono::NaiveDate;
use core_types::{Dataset, SalesRow};
use serde::Serialize;
use std::collections::BTreeSet;

/// Which stores a filter lets through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreSelection {
    #[default]
    All,
    /// Only the named stores. An empty set matches nothing.
    Only(BTreeSet<String>),
}

impl StoreSelection {
    pub fn only<I, S>(stores: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StoreSelection::Only(stores.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, store: &str) -> bool {
        match self {
            StoreSelection::All => true,
            StoreSelection::Only(stores) => stores.contains(store),
        }
    }
}

/// The date range and store selection of one dashboard view.
///
/// Both date bounds are inclusive. A missing bound is open, which for a given
/// dataset is the same as its earliest or latest sale date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub stores: StoreSelection,
}

impl SalesFilter {
    pub fn new(date_from: NaiveDate, date_to: NaiveDate, stores: StoreSelection) -> Self {
        Self {
            date_from: Some(date_from),
            date_to: Some(date_to),
            stores,
        }
    }

    /// The default view of a dataset: its full date range and every store.
    pub fn spanning(dataset: &Dataset) -> Self {
        let bounds = dataset.date_bounds();
        Self {
            date_from: bounds.map(|(min, _)| min),
            date_to: bounds.map(|(_, max)| max),
            stores: StoreSelection::All,
        }
    }

    pub fn with_date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn with_date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn with_stores(mut self, stores: StoreSelection) -> Self {
        self.stores = stores;
        self
    }

    pub fn matches(&self, row: &SalesRow) -> bool {
        self.date_from.is_none_or(|from| row.date >= from)
            && self.date_to.is_none_or(|to| row.date <= to)
            && self.stores.contains(&row.store)
    }

    /// Returns the rows that pass the filter, in their original order.
    ///
    /// An inverted range (`date_from > date_to`) simply matches nothing.
    pub fn apply(&self, rows: &[SalesRow]) -> Vec<SalesRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::JoinReport;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(id: i64, date: NaiveDate, store: &str) -> SalesRow {
        SalesRow {
            sale_id: id,
            date,
            good_num: "1".into(),
            product: "P1".into(),
            category_num: "1".into(),
            category: "X".into(),
            stock_num: store.into(),
            store: store.into(),
            quantity: dec!(1),
            price: dec!(10),
            sales_sum: dec!(10),
        }
    }

    fn rows() -> Vec<SalesRow> {
        vec![
            row(1, date(2024, 1, 1), "A"),
            row(2, date(2024, 1, 31), "B"),
            row(3, date(2024, 2, 1), "A"),
            row(4, date(2024, 3, 15), "C"),
        ]
    }

    fn ids(rows: &[SalesRow]) -> Vec<i64> {
        rows.iter().map(|r| r.sale_id).collect()
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let filter = SalesFilter::new(date(2024, 1, 1), date(2024, 1, 31), StoreSelection::All);
        assert_eq!(ids(&filter.apply(&rows())), vec![1, 2]);
    }

    #[test]
    fn test_store_subset() {
        let filter = SalesFilter::default().with_stores(StoreSelection::only(["A", "C"]));
        assert_eq!(ids(&filter.apply(&rows())), vec![1, 3, 4]);
    }

    #[test]
    fn test_empty_store_selection_matches_nothing() {
        let filter = SalesFilter::default().with_stores(StoreSelection::only(Vec::<String>::new()));
        assert!(filter.apply(&rows()).is_empty());
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let filter = SalesFilter::new(date(2024, 3, 1), date(2024, 1, 1), StoreSelection::All);
        assert!(filter.apply(&rows()).is_empty());
    }

    #[test]
    fn test_out_of_range_bounds_are_not_clamped() {
        let filter = SalesFilter::new(date(2020, 1, 1), date(2030, 1, 1), StoreSelection::All);
        assert_eq!(filter.apply(&rows()).len(), 4);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = SalesFilter::new(
            date(2024, 1, 15),
            date(2024, 3, 31),
            StoreSelection::only(["A", "B"]),
        );
        let once = filter.apply(&rows());
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
        assert_eq!(ids(&once), vec![2, 3]);
    }

    #[test]
    fn test_spanning_covers_whole_dataset() {
        let dataset = Dataset::new("memory", rows(), JoinReport::default());
        let filter = SalesFilter::spanning(&dataset);

        assert_eq!(filter.date_from, Some(date(2024, 1, 1)));
        assert_eq!(filter.date_to, Some(date(2024, 3, 15)));
        assert_eq!(filter.apply(&dataset.rows), dataset.rows);
    }
}

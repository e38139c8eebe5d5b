use crate::bucket::period_end;
use crate::filter::SalesFilter;
use crate::report::{CategoryTotals, DashboardReport, ProductTotal, SalesSummary, TrendPoint};
use chrono::NaiveDate;
use configuration::{AnalyticsSettings, RankOrder};
use core_types::SalesRow;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A stateless calculator for the dashboard views of a filtered row set.
///
/// Every method is independent and side-effect free. An empty slice yields
/// empty collections and zero totals.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    settings: AnalyticsSettings,
}

impl AnalyticsEngine {
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// Computes every view for `rows`, which must already be filtered by `filter`.
    pub fn build_report(&self, filter: &SalesFilter, rows: &[SalesRow]) -> DashboardReport {
        let report = DashboardReport {
            filter: filter.clone(),
            summary: self.summary(rows),
            trend: self.top_category_trend(rows),
            category_totals: self.category_totals(rows),
            top_products: self.top_products(rows),
        };

        tracing::debug!(
            rows = rows.len(),
            trend_points = report.trend.len(),
            categories = report.category_totals.len(),
            "Dashboard report computed."
        );
        report
    }

    /// The best-selling categories by total revenue, largest first.
    ///
    /// At most `top_categories` entries; equal totals keep first-appearance order.
    pub fn top_categories(&self, rows: &[SalesRow]) -> Vec<(String, Decimal)> {
        let mut totals = totals_by(rows, |row| &row.category);
        rank_descending(&mut totals);
        totals.truncate(self.settings.top_categories);
        totals
            .into_iter()
            .map(|(category, total)| (category.to_string(), total))
            .collect()
    }

    /// Revenue per period for each of the top categories.
    ///
    /// The top categories are chosen over the whole row set. Points are ordered
    /// by period, then by category rank; empty periods are not emitted.
    pub fn top_category_trend(&self, rows: &[SalesRow]) -> Vec<TrendPoint> {
        let top = self.top_categories(rows);
        let rank: HashMap<&str, usize> = top
            .iter()
            .enumerate()
            .map(|(i, (category, _))| (category.as_str(), i))
            .collect();

        let mut buckets: BTreeMap<(NaiveDate, usize), Decimal> = BTreeMap::new();
        for row in rows {
            if let Some(&position) = rank.get(row.category.as_str()) {
                let key = (period_end(self.settings.bucketing, row.date), position);
                *buckets.entry(key).or_default() += row.sales_sum;
            }
        }

        buckets
            .into_iter()
            .map(|((end, position), sales)| TrendPoint {
                period_end: end,
                category: top[position].0.clone(),
                sales,
            })
            .collect()
    }

    /// Revenue of every category present in `rows`.
    pub fn category_totals(&self, rows: &[SalesRow]) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        for row in rows {
            totals.add(&row.category, row.sales_sum);
        }
        totals
    }

    /// Products ranked by revenue.
    ///
    /// The ranking is always taken from the largest totals down and cut to the
    /// configured limit; `product_order` only changes how the kept entries are listed.
    pub fn top_products(&self, rows: &[SalesRow]) -> Vec<ProductTotal> {
        let mut totals = totals_by(rows, |row| &row.product);
        rank_descending(&mut totals);
        if let Some(limit) = self.settings.product_limit() {
            totals.truncate(limit);
        }
        if self.settings.product_order == RankOrder::Ascending {
            totals.reverse();
        }

        totals
            .into_iter()
            .map(|(product, sales)| ProductTotal {
                product: product.to_string(),
                sales,
            })
            .collect()
    }

    pub fn summary(&self, rows: &[SalesRow]) -> SalesSummary {
        let mut stores = HashSet::new();
        let mut summary = SalesSummary {
            row_count: rows.len(),
            ..SalesSummary::default()
        };

        for row in rows {
            summary.total_revenue += row.sales_sum;
            summary.total_units += row.quantity;
            stores.insert(row.store.as_str());
            summary.first_sale = Some(summary.first_sale.map_or(row.date, |d| d.min(row.date)));
            summary.last_sale = Some(summary.last_sale.map_or(row.date, |d| d.max(row.date)));
        }

        summary.store_count = stores.len();
        summary
    }
}

/// Sums `sales_sum` per key, keeping keys in order of first appearance.
fn totals_by<'a>(
    rows: &'a [SalesRow],
    key: impl Fn(&'a SalesRow) -> &'a String,
) -> Vec<(&'a str, Decimal)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(&str, Decimal)> = Vec::new();

    for row in rows {
        let k = key(row).as_str();
        match positions.get(k) {
            Some(&i) => totals[i].1 += row.sales_sum,
            None => {
                positions.insert(k, totals.len());
                totals.push((k, row.sales_sum));
            }
        }
    }
    totals
}

// `sort_by` is stable, so equal totals stay in first-appearance order.
fn rank_descending(totals: &mut [(&str, Decimal)]) {
    totals.sort_by(|a, b| b.1.cmp(&a.1));
}

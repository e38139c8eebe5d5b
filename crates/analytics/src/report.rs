use crate::filter::SalesFilter;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Sales of one top category within one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// Last day of the period the sales were bucketed into.
    pub period_end: NaiveDate,
    pub category: String,
    pub sales: Decimal,
}

/// Revenue per category, keyed and ordered by category name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals {
    totals: BTreeMap<String, Decimal>,
}

/// A category's revenue and its share of the grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: Decimal,
    /// `None` when the grand total is zero.
    pub share_pct: Option<Decimal>,
}

impl CategoryTotals {
    pub(crate) fn add(&mut self, category: &str, amount: Decimal) {
        match self.totals.get_mut(category) {
            Some(total) => *total += amount,
            None => {
                self.totals.insert(category.to_string(), amount);
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.totals.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn grand_total(&self) -> Decimal {
        self.totals.values().sum()
    }

    /// Each category's percentage of the grand total.
    pub fn shares(&self) -> Vec<CategoryShare> {
        let grand_total = self.grand_total();
        self.iter()
            .map(|(category, total)| CategoryShare {
                category: category.to_string(),
                total,
                share_pct: (!grand_total.is_zero())
                    .then(|| total / grand_total * Decimal::ONE_HUNDRED),
            })
            .collect()
    }
}

/// A product and the revenue it brought in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductTotal {
    pub product: String,
    pub sales: Decimal,
}

/// Scalar statistics of a filtered row set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub row_count: usize,
    /// Number of distinct stores with at least one sale.
    pub store_count: usize,
    pub total_revenue: Decimal,
    pub total_units: Decimal,
    pub first_sale: Option<NaiveDate>,
    pub last_sale: Option<NaiveDate>,
}

/// Every view of the dashboard for one filter, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub filter: SalesFilter,
    pub summary: SalesSummary,
    pub trend: Vec<TrendPoint>,
    pub category_totals: CategoryTotals,
    pub top_products: Vec<ProductTotal>,
}

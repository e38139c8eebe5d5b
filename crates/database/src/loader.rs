use crate::{DbError, DbRepository};
use core_types::{Category, Dataset, Good, JoinReport, SaleRecord, SalesRow, Stock};
use std::collections::HashMap;

/// Reads the four relations and joins them into a fresh `Dataset`.
///
/// Any failure aborts the load; there is no partial result.
pub async fn load_dataset(repo: &DbRepository) -> Result<Dataset, DbError> {
    repo.ensure_schema().await?;

    let sales = repo.fetch_sales().await?;
    let goods = repo.fetch_goods().await?;
    let categories = repo.fetch_categories().await?;
    let stocks = repo.fetch_stocks().await?;

    let dataset = join_relations(repo.source(), &sales, &goods, &categories, &stocks)?;
    let report = dataset.join_report;

    if !report.is_complete() {
        tracing::warn!(
            dropped = report.dropped(),
            unknown_good = report.unknown_good,
            unknown_category = report.unknown_category,
            unknown_stock = report.unknown_stock,
            "Sales with unresolved references were left out of the dataset."
        );
    }
    tracing::info!(
        source = %dataset.source,
        sales = report.sales_read,
        rows = report.joined,
        "Sales dataset loaded."
    );

    Ok(dataset)
}

/// Joins sales to goods, goods to categories and sales to stores, in that order.
///
/// Each join is an inner join: a sale whose reference cannot be resolved is
/// dropped and counted against the first join that failed. Sales keep their
/// storage order. A key that appears twice in a reference table is an error,
/// since it would make the joined row ambiguous.
pub fn join_relations(
    source: &str,
    sales: &[SaleRecord],
    goods: &[Good],
    categories: &[Category],
    stocks: &[Stock],
) -> Result<Dataset, DbError> {
    let goods_by_key = index_by_key("goods", goods, |g| &g.good_num)?;
    let categories_by_key = index_by_key("categs", categories, |c| &c.category_num)?;
    let stocks_by_key = index_by_key("stocks", stocks, |s| &s.stock_num)?;

    let mut report = JoinReport {
        sales_read: sales.len(),
        ..JoinReport::default()
    };
    let mut rows = Vec::with_capacity(sales.len());

    for sale in sales {
        let Some(good) = goods_by_key.get(sale.good_num.as_str()) else {
            report.unknown_good += 1;
            continue;
        };
        let Some(category) = categories_by_key.get(good.category_num.as_str()) else {
            report.unknown_category += 1;
            continue;
        };
        let Some(stock) = stocks_by_key.get(sale.stock_num.as_str()) else {
            report.unknown_stock += 1;
            continue;
        };

        let row = SalesRow::join(sale, good, category, stock).map_err(DbError::invalid("sales"))?;
        rows.push(row);
    }

    report.joined = rows.len();
    Ok(Dataset::new(source, rows, report))
}

fn index_by_key<'a, T>(
    table: &'static str,
    items: &'a [T],
    key: impl Fn(&'a T) -> &'a String,
) -> Result<HashMap<&'a str, &'a T>, DbError> {
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        let k = key(item).as_str();
        if index.insert(k, item).is_some() {
            return Err(DbError::DuplicateKey {
                table,
                key: k.to_string(),
            });
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sale(id: i64, good: &str, stock: &str, day: u32) -> SaleRecord {
        SaleRecord {
            sale_id: id,
            good_num: good.into(),
            stock_num: stock.into(),
            doc_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            quantity: dec!(2),
            price: dec!(10),
        }
    }

    fn goods() -> Vec<Good> {
        vec![
            Good {
                good_num: "100".into(),
                category_num: "1".into(),
                description: "Aspirin".into(),
            },
            Good {
                good_num: "200".into(),
                category_num: "9".into(),
                description: "Orphan".into(),
            },
        ]
    }

    fn categories() -> Vec<Category> {
        vec![Category {
            category_num: "1".into(),
            description: "Analgesics".into(),
        }]
    }

    fn stocks() -> Vec<Stock> {
        vec![Stock {
            stock_num: "A".into(),
            description: "Central".into(),
        }]
    }

    #[test]
    fn test_join_keeps_resolved_sales_in_order() {
        let sales = vec![sale(1, "100", "A", 5), sale(2, "100", "A", 3)];
        let dataset = join_relations("test", &sales, &goods(), &categories(), &stocks()).unwrap();

        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0].sale_id, 1);
        assert_eq!(dataset.rows[1].sale_id, 2);
        assert_eq!(dataset.rows[0].sales_sum, dec!(20));
        assert_eq!(dataset.rows[0].category, "Analgesics");
        assert_eq!(dataset.rows[0].store, "Central");
        assert!(dataset.join_report.is_complete());
    }

    #[test]
    fn test_join_drops_and_counts_orphans() {
        let sales = vec![
            sale(1, "100", "A", 1),
            sale(2, "999", "A", 2), // unknown good
            sale(3, "200", "A", 3), // good with unknown category
            sale(4, "100", "Z", 4), // unknown store
            sale(5, "999", "Z", 5), // counted against the first failed join
        ];
        let dataset = join_relations("test", &sales, &goods(), &categories(), &stocks()).unwrap();

        assert_eq!(dataset.rows.len(), 1);
        assert_eq!(
            dataset.join_report,
            JoinReport {
                sales_read: 5,
                joined: 1,
                unknown_good: 2,
                unknown_category: 1,
                unknown_stock: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_reference_key_fails() {
        let mut stocks = stocks();
        stocks.push(Stock {
            stock_num: "A".into(),
            description: "Central (copy)".into(),
        });

        let err = join_relations("test", &[], &goods(), &categories(), &stocks).unwrap_err();
        assert!(matches!(err, DbError::DuplicateKey { table: "stocks", .. }));
    }
}

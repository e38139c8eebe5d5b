use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line of the `sales` relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub sale_id: i64,
    pub good_num: String,
    pub stock_num: String,
    pub doc_date: NaiveDate,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// A product from the `goods` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Good {
    pub good_num: String,
    pub category_num: String,
    pub description: String,
}

/// A product category from the `categs` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_num: String,
    pub description: String,
}

/// A store (pharmacy) from the `stocks` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub stock_num: String,
    pub description: String,
}

/// One sale enriched with the descriptions of its product, category and store.
///
/// This is the unit every filter and aggregation works on. The serialized
/// field names follow the column names of the source tables so that an export
/// of filtered rows reads the same as the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRow {
    #[serde(rename = "SaleId")]
    pub sale_id: i64,
    #[serde(rename = "DocDate")]
    pub date: NaiveDate,
    #[serde(rename = "GoodNum")]
    pub good_num: String,
    #[serde(rename = "GoodDesc")]
    pub product: String,
    #[serde(rename = "ProductCatNum")]
    pub category_num: String,
    #[serde(rename = "ProductCatDesc")]
    pub category: String,
    #[serde(rename = "StockNum")]
    pub stock_num: String,
    #[serde(rename = "StockDesc")]
    pub store: String,
    #[serde(rename = "Quant")]
    pub quantity: Decimal,
    #[serde(rename = "Price")]
    pub price: Decimal,
    #[serde(rename = "SalesSum")]
    pub sales_sum: Decimal,
}

impl SalesRow {
    /// Builds the denormalized row for a sale and its resolved references.
    ///
    /// The caller is responsible for having matched the keys; this only
    /// copies the descriptions and derives `sales_sum = quantity * price`.
    pub fn join(
        sale: &SaleRecord,
        good: &Good,
        category: &Category,
        stock: &Stock,
    ) -> Result<Self, CoreError> {
        let sales_sum = sale.quantity.checked_mul(sale.price).ok_or_else(|| {
            CoreError::Calculation(format!(
                "sales sum overflows for sale {} ({} x {})",
                sale.sale_id, sale.quantity, sale.price
            ))
        })?;

        Ok(Self {
            sale_id: sale.sale_id,
            date: sale.doc_date,
            good_num: good.good_num.clone(),
            product: good.description.clone(),
            category_num: category.category_num.clone(),
            category: category.description.clone(),
            stock_num: stock.stock_num.clone(),
            store: stock.description.clone(),
            quantity: sale.quantity,
            price: sale.price,
            sales_sum,
        })
    }
}

use crate::DbError;
use core_types::{parse_amount, parse_doc_date, Category, Good, SaleRecord, Stock};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// The relations the loader needs. Their names are part of the data contract.
pub const REQUIRED_TABLES: [&str; 4] = ["sales", "goods", "categs", "stocks"];

/// The `DbRepository` provides a high-level, application-specific interface
/// to the sales database. It encapsulates all SQL queries and data access logic.
///
/// Keys are read as canonical text (see `key_column`) so integer, whole-number
/// real and text key columns join the same way.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
    source: String,
}

impl DbRepository {
    /// Creates a new `DbRepository` over a connection pool.
    ///
    /// `source` identifies the database (usually its file path) and is carried
    /// into every `Dataset` loaded through this repository.
    pub fn new(pool: SqlitePool, source: impl Into<String>) -> Self {
        Self {
            pool,
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Verifies that every required table exists.
    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        let present: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type IN ('table', 'view')")
                .fetch_all(&self.pool)
                .await?;

        for table in REQUIRED_TABLES {
            // SQLite resolves table names case-insensitively.
            if !present.iter().any(|name| name.eq_ignore_ascii_case(table)) {
                return Err(DbError::MissingTable(table.to_string()));
            }
        }
        Ok(())
    }

    /// Fetches every line of the `sales` relation in storage order.
    pub async fn fetch_sales(&self) -> Result<Vec<SaleRecord>, DbError> {
        let sql = format!(
            r#"
            SELECT
                rowid AS sale_id,
                {good_num},
                {stock_num},
                CAST(DocDate AS TEXT) AS doc_date,
                CAST(Quant AS TEXT) AS quant,
                CAST(Price AS TEXT) AS price
            FROM sales
            ORDER BY rowid ASC
            "#,
            good_num = key_column("GoodNum", "good_num"),
            stock_num = key_column("StockNum", "stock_num"),
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(sale_from_row).collect()
    }

    /// Fetches the `goods` relation.
    pub async fn fetch_goods(&self) -> Result<Vec<Good>, DbError> {
        let sql = format!(
            r#"
            SELECT
                {good_num},
                {category_num},
                COALESCE(CAST(GoodDesc AS TEXT), '') AS description
            FROM goods
            "#,
            good_num = key_column("GoodNum", "good_num"),
            category_num = key_column("ProductCatNum", "category_num"),
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Good, DbError> {
                Ok(Good {
                    good_num: row.try_get("good_num")?,
                    category_num: row.try_get("category_num")?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }

    /// Fetches the `categs` relation.
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, DbError> {
        let sql = format!(
            r#"
            SELECT
                {category_num},
                COALESCE(CAST(ProductCatDesc AS TEXT), '') AS description
            FROM categs
            "#,
            category_num = key_column("ProductCatNum", "category_num"),
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Category, DbError> {
                Ok(Category {
                    category_num: row.try_get("category_num")?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }

    /// Fetches the `stocks` relation.
    pub async fn fetch_stocks(&self) -> Result<Vec<Stock>, DbError> {
        let sql = format!(
            r#"
            SELECT
                {stock_num},
                COALESCE(CAST(StockDesc AS TEXT), '') AS description
            FROM stocks
            "#,
            stock_num = key_column("StockNum", "stock_num"),
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Stock, DbError> {
                Ok(Stock {
                    stock_num: row.try_get("stock_num")?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }
}

/// Selects a key column as text. A whole-number REAL (`1.0`) is rendered as its
/// integer form (`1`) so it matches an INTEGER key; NULL becomes `''`.
fn key_column(column: &str, alias: &str) -> String {
    format!(
        "CASE WHEN typeof({column}) = 'real' AND {column} = CAST({column} AS INTEGER) \
         THEN CAST(CAST({column} AS INTEGER) AS TEXT) \
         ELSE COALESCE(CAST({column} AS TEXT), '') END AS {alias}"
    )
}

fn sale_from_row(row: &SqliteRow) -> Result<SaleRecord, DbError> {
    let sale_id: i64 = row.try_get("sale_id")?;
    let doc_date = required_text(row, "doc_date", "DocDate", sale_id)?;
    let quant = required_text(row, "quant", "Quant", sale_id)?;
    let price = required_text(row, "price", "Price", sale_id)?;

    Ok(SaleRecord {
        sale_id,
        good_num: row.try_get("good_num")?,
        stock_num: row.try_get("stock_num")?,
        doc_date: parse_doc_date("DocDate", &doc_date).map_err(DbError::invalid("sales"))?,
        quantity: parse_amount("Quant", &quant).map_err(DbError::invalid("sales"))?,
        price: parse_amount("Price", &price).map_err(DbError::invalid("sales"))?,
    })
}

fn required_text(
    row: &SqliteRow,
    alias: &str,
    column: &str,
    sale_id: i64,
) -> Result<String, DbError> {
    let value: Option<String> = row.try_get(alias)?;
    value.ok_or_else(|| {
        DbError::invalid("sales")(core_types::CoreError::InvalidInput(
            column.to_string(),
            format!("missing value in sale {sale_id}"),
        ))
    })
}

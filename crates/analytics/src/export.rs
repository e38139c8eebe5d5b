use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::SalesRow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header of the export, matching the serialized field names of `SalesRow`.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "SaleId",
    "DocDate",
    "GoodNum",
    "GoodDesc",
    "ProductCatNum",
    "ProductCatDesc",
    "StockNum",
    "StockDesc",
    "Quant",
    "Price",
    "SalesSum",
];

/// Default name of an export file, e.g. `sales_data_20240131.csv`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!("sales_data_{}.csv", date.format("%Y%m%d"))
}

/// Writes `rows` as comma-separated text with a header line.
///
/// The header is written even when there are no rows. Returns the number of
/// data rows written.
pub fn write_csv<W: Write>(rows: &[SalesRow], writer: W) -> Result<usize, AnalyticsError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(EXPORT_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;

    Ok(rows.len())
}

/// Creates (or truncates) `path` and writes the export into it.
pub fn export_csv(rows: &[SalesRow], path: &Path) -> Result<usize, AnalyticsError> {
    let file = File::create(path)?;
    let written = write_csv(rows, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), rows = written, "Exported filtered sales.");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_row() -> SalesRow {
        SalesRow {
            sale_id: 42,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            good_num: "10".into(),
            product: "Aspirin, 500mg".into(),
            category_num: "1".into(),
            category: "Analgesics".into(),
            stock_num: "3".into(),
            store: "Central".into(),
            quantity: dec!(2),
            price: dec!(10.50),
            sales_sum: dec!(21.00),
        }
    }

    #[test]
    fn test_write_csv_header_and_row() {
        let mut buffer = Vec::new();
        let written = write_csv(&[sample_row()], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(written, 1);
        assert_eq!(
            lines[0],
            "SaleId,DocDate,GoodNum,GoodDesc,ProductCatNum,ProductCatDesc,StockNum,StockDesc,Quant,Price,SalesSum"
        );
        assert_eq!(
            lines[1],
            "42,2024-01-05,10,\"Aspirin, 500mg\",1,Analgesics,3,Central,2,10.50,21.00"
        );
    }

    #[test]
    fn test_write_csv_empty_still_has_header() {
        let mut buffer = Vec::new();
        assert_eq!(write_csv(&[], &mut buffer).unwrap(), 0);
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("SaleId,"));
    }

    #[test]
    fn test_export_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_file_name(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));

        export_csv(&[sample_row(), sample_row()], &path).unwrap();

        assert!(path.ends_with("sales_data_20240131.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}

use analytics::export::{default_file_name, export_csv};
use analytics::{AnalyticsEngine, DashboardReport, SalesFilter, StoreSelection};
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use configuration::{AnalyticsSettings, Bucketing, RankOrder};
use core_types::Dataset;
use database::{connect, DatasetCache, DbRepository};
use rust_decimal::{Decimal, RoundingStrategy};
use std::path::PathBuf;

/// The main entry point for the Salesboard sales analytics tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment overrides from a .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => configuration::load_config_from(path)?,
        None => configuration::load_config()?,
    };
    if let Some(db) = &cli.db {
        config.data_source.path = db.clone();
    }
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Load the sales snapshot once; every command works on it
    let source = config.data_source.path.display().to_string();
    let pool = connect(&config.data_source.path)
        .await
        .with_context(|| format!("Failed to open sales database '{source}'"))?;
    let cache = DatasetCache::new(DbRepository::new(pool, source));
    let dataset = cache.get().await.context("Failed to load the sales dataset")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, &dataset, config.analytics),
        Commands::Export(args) => handle_export(args, &dataset),
        Commands::Stores => handle_stores(&dataset),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Sales analytics over a pharmacy sales database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite sales database. Overrides `data_source.path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Configuration file to use instead of ./config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sales statistics, the top-category trend, category shares and top products.
    Report(ReportArgs),
    /// Write the filtered sales rows to a CSV file.
    Export(ExportArgs),
    /// List the stores and the date range of the loaded data.
    Stores,
}

#[derive(Args)]
struct FilterArgs {
    /// First day of the period, inclusive (format: YYYY-MM-DD). Defaults to the earliest sale.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the period, inclusive (format: YYYY-MM-DD). Defaults to the latest sale.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// A store to include. Repeat for several; all stores when omitted.
    #[arg(long = "store", value_name = "STORE")]
    stores: Vec<String>,

    /// Select no store at all.
    #[arg(long, conflicts_with = "stores")]
    no_stores: bool,
}

impl FilterArgs {
    fn to_filter(&self, dataset: &Dataset) -> SalesFilter {
        let mut filter = SalesFilter::spanning(dataset);
        if let Some(from) = self.from {
            filter = filter.with_date_from(from);
        }
        if let Some(to) = self.to {
            filter = filter.with_date_to(to);
        }

        let stores = if self.no_stores {
            StoreSelection::only(Vec::<String>::new())
        } else if self.stores.is_empty() {
            StoreSelection::All
        } else {
            let known = dataset.store_names();
            for store in self.stores.iter().filter(|s| !known.contains(*s)) {
                tracing::warn!(store = %store, "Store does not appear in the sales data.");
            }
            StoreSelection::only(self.stores.iter().cloned())
        };
        filter.with_stores(stores)
    }
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Period used to group the trend.
    #[arg(long, value_enum)]
    bucketing: Option<Bucketing>,

    /// Number of categories followed by the trend.
    #[arg(long)]
    top_categories: Option<usize>,

    /// Number of products to rank; 0 lists every product.
    #[arg(long)]
    top_products: Option<usize>,

    /// Order in which ranked products are listed.
    #[arg(long, value_enum)]
    product_order: Option<RankOrder>,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Output file. Defaults to sales_data_YYYYMMDD.csv in the current directory.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(
    args: ReportArgs,
    dataset: &Dataset,
    mut settings: AnalyticsSettings,
) -> anyhow::Result<()> {
    if let Some(bucketing) = args.bucketing {
        settings.bucketing = bucketing;
    }
    if let Some(top_categories) = args.top_categories {
        if top_categories == 0 {
            bail!("--top-categories must be at least 1");
        }
        settings.top_categories = top_categories;
    }
    if let Some(top_products) = args.top_products {
        settings.top_products = top_products;
    }
    if let Some(order) = args.product_order {
        settings.product_order = order;
    }

    let filter = args.filter.to_filter(dataset);
    let rows = filter.apply(&dataset.rows);
    let engine = AnalyticsEngine::new(settings);
    let report = engine.build_report(&filter, &rows);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, dataset, engine.settings());
    }
    Ok(())
}

fn handle_export(args: ExportArgs, dataset: &Dataset) -> anyhow::Result<()> {
    let filter = args.filter.to_filter(dataset);
    let rows = filter.apply(&dataset.rows);
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(Local::now().date_naive())));

    let written = export_csv(&rows, &path)
        .with_context(|| format!("Failed to export to '{}'", path.display()))?;
    println!("Wrote {} rows to {}", written, path.display());
    Ok(())
}

fn handle_stores(dataset: &Dataset) -> anyhow::Result<()> {
    match dataset.date_bounds() {
        Some((first, last)) => println!("Sales from {first} to {last} ({} rows)", dataset.rows.len()),
        None => println!("The sales database holds no joinable sales."),
    }

    let mut table = new_table(vec!["Store"]);
    for store in dataset.store_names() {
        table.add_row(vec![Cell::new(store)]);
    }
    println!("{table}");

    let mut categories = new_table(vec!["Category"]);
    for category in dataset.category_names() {
        categories.add_row(vec![Cell::new(category)]);
    }
    println!("{categories}");

    let joins = dataset.join_report;
    if !joins.is_complete() {
        println!(
            "{} of {} sales were left out: {} unknown good, {} unknown category, {} unknown store",
            joins.dropped(),
            joins.sales_read,
            joins.unknown_good,
            joins.unknown_category,
            joins.unknown_stock,
        );
    }
    Ok(())
}

// ==============================================================================
// Presentation
// ==============================================================================

fn print_report(report: &DashboardReport, dataset: &Dataset, settings: &AnalyticsSettings) {
    let filter = &report.filter;
    let summary = &report.summary;
    let store_count = match &filter.stores {
        StoreSelection::All => dataset.store_names().len(),
        StoreSelection::Only(stores) => stores.len(),
    };

    let mut stats = new_table(vec!["Statistic", "Value"]);
    stats.add_row(vec![Cell::new("Start"), Cell::new(format_date(filter.date_from))]);
    stats.add_row(vec![Cell::new("End"), Cell::new(format_date(filter.date_to))]);
    stats.add_row(vec![Cell::new("Stores"), Cell::new(store_count)]);
    stats.add_row(vec![Cell::new("Total revenue"), money_cell(summary.total_revenue)]);
    stats.add_row(vec![
        Cell::new("Units sold"),
        Cell::new(format_units(summary.total_units)).set_alignment(CellAlignment::Right),
    ]);
    println!("Statistics for the period\n{stats}\n");

    let mut trend = new_table(vec!["Period end", "Category", "Sales"]);
    for point in &report.trend {
        trend.add_row(vec![
            Cell::new(point.period_end),
            Cell::new(&point.category),
            money_cell(point.sales),
        ]);
    }
    println!(
        "Top {} categories by {:?}\n{trend}\n",
        settings.top_categories, settings.bucketing
    );

    let mut shares = new_table(vec!["Category", "Revenue", "Share"]);
    for share in report.category_totals.shares() {
        let pct = share
            .share_pct
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "-".to_string());
        shares.add_row(vec![
            Cell::new(&share.category),
            money_cell(share.total),
            Cell::new(pct).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Revenue by category\n{shares}\n");

    let mut products = new_table(vec!["#", "Product", "Sales"]);
    for (i, product) in report.top_products.iter().enumerate() {
        products.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&product.product),
            money_cell(product.sales),
        ]);
    }
    let heading = match settings.product_limit() {
        Some(limit) => format!("Top {limit} products by revenue"),
        None => "Products by revenue".to_string(),
    };
    println!("{heading}\n{products}");
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn money_cell(value: Decimal) -> Cell {
    Cell::new(format_amount(value)).set_alignment(CellAlignment::Right)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Formats a decimal with two places and comma thousands separators, e.g. `1,234,567.80`.
fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded);
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("{sign}{}.{fraction}", group_thousands(integer))
}

/// Formats a quantity with comma thousands separators and only the decimal
/// places it needs, e.g. `12` or `1,234.5`.
fn format_units(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    match unsigned.split_once('.') {
        Some((integer, fraction)) => format!("{sign}{}.{fraction}", group_thousands(integer)),
        None => format!("{sign}{}", group_thousands(unsigned)),
    }
}

fn group_thousands(integer: &str) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{JoinReport, SalesRow};

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(Decimal::new(999, 0)), "999.00");
        assert_eq!(format_amount(Decimal::new(123456780, 2)), "1,234,567.80");
        assert_eq!(format_amount(Decimal::new(-100050, 2)), "-1,000.50");
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
    }

    #[test]
    fn test_format_units_keeps_whole_counts_whole() {
        assert_eq!(format_units(Decimal::new(12, 0)), "12");
        assert_eq!(format_units(Decimal::new(1200, 2)), "12");
        assert_eq!(format_units(Decimal::new(1234567, 0)), "1,234,567");
        assert_eq!(format_units(Decimal::new(12345, 1)), "1,234.5");
        assert_eq!(format_units(Decimal::ZERO), "0");
    }

    fn dataset() -> Dataset {
        let row = |id: i64, day: u32, store: &str| SalesRow {
            sale_id: id,
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            good_num: "1".into(),
            product: "P".into(),
            category_num: "1".into(),
            category: "X".into(),
            stock_num: store.into(),
            store: store.into(),
            quantity: Decimal::ONE,
            price: Decimal::TEN,
            sales_sum: Decimal::TEN,
        };
        Dataset::new(
            "memory",
            vec![row(1, 2, "A"), row(2, 20, "B")],
            JoinReport::default(),
        )
    }

    #[test]
    fn test_filter_args_default_to_dataset_span() {
        let args = FilterArgs {
            from: None,
            to: None,
            stores: Vec::new(),
            no_stores: false,
        };
        let filter = args.to_filter(&dataset());
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2024, 1, 20));
        assert_eq!(filter.stores, StoreSelection::All);
    }

    #[test]
    fn test_filter_args_store_selection() {
        let args = FilterArgs {
            from: NaiveDate::from_ymd_opt(2024, 1, 10),
            to: None,
            stores: vec!["B".into()],
            no_stores: false,
        };
        let data = dataset();
        let rows = args.to_filter(&data).apply(&data.rows);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].store, "B");

        let none = FilterArgs {
            from: None,
            to: None,
            stores: Vec::new(),
            no_stores: true,
        };
        assert!(none.to_filter(&data).apply(&data.rows).is_empty());
    }

    #[test]
    fn test_cli_parses_report_flags() {
        let cli = Cli::try_parse_from([
            "salesboard",
            "--db",
            "sales.db",
            "report",
            "--from",
            "2024-01-01",
            "--store",
            "A",
            "--store",
            "B",
            "--bucketing",
            "week",
            "--product-order",
            "ascending",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("sales.db")));
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(args.filter.stores, vec!["A", "B"]);
                assert_eq!(args.bucketing, Some(Bucketing::Week));
                assert_eq!(args.product_order, Some(RankOrder::Ascending));
            }
            _ => panic!("expected the report command"),
        }
    }
}

use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_source: DataSource,
    pub analytics: AnalyticsSettings,
    pub logging: LoggingConfig,
}

/// Where the sales database lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSource {
    /// Path to the SQLite file holding `sales`, `goods`, `categs` and `stocks`.
    pub path: PathBuf,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/sales.db"),
        }
    }
}

/// Parameters of the aggregation stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// How many categories the trend view follows.
    pub top_categories: usize,
    /// How many products the product ranking keeps. `0` keeps all of them.
    pub top_products: usize,
    /// Presentation order of the product ranking.
    pub product_order: RankOrder,
    /// Period used to group the trend view.
    pub bucketing: Bucketing,
}

impl AnalyticsSettings {
    /// The product limit as an option, `None` meaning unlimited.
    pub fn product_limit(&self) -> Option<usize> {
        (self.top_products > 0).then_some(self.top_products)
    }
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            top_categories: 3,
            top_products: 5,
            product_order: RankOrder::Descending,
            bucketing: Bucketing::Month,
        }
    }
}

/// Calendar period a sale is grouped into for trend views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Bucketing {
    Day,
    /// Weeks end on Sunday.
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Largest total first.
    #[default]
    Descending,
    /// Smallest total first.
    Ascending,
}

/// Logging output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    /// Directory for daily-rolling log files. Console only when absent.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

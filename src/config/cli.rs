use crate::config::toml_config::StorefrontConfig;
use crate::core::catalog::{CarFilter, SortOrder};
use crate::domain::model::{Condition, StockType};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Browse, compare and price cars from the marketplace API")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "storefront.toml")]
    pub config: PathBuf,

    /// Override api.base_url from the config file
    #[arg(long)]
    pub api_url: Option<String>,

    /// Display currency; skips detection
    #[arg(long)]
    pub currency: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List cars matching the filters
    Cars(CarsArgs),
    /// Show a single listing
    Show { id: String },
    /// Compare listings side by side
    Compare {
        #[arg(value_delimiter = ',', required = true)]
        ids: Vec<String>,
        /// Write the comparison as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    #[command(subcommand)]
    Currency(CurrencyCommand),
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Ask the marketplace to source a car from abroad
    Import {
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        year: u16,
        #[arg(long)]
        vin: Option<String>,
        #[arg(long)]
        budget: f64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Attach a document to a financing application
    Upload {
        #[arg(long)]
        application: String,
        #[arg(long, default_value = "supporting")]
        document_type: String,
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum CurrencyCommand {
    /// Detect the display currency from IP or locale
    Detect,
    /// Format an amount in a currency
    Format { amount: f64, code: String },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    List,
    Add { id: String },
    Remove { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    PriceAsc,
    PriceDesc,
    Newest,
    Mileage,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StockArg {
    Local,
    Import,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConditionArg {
    New,
    Used,
    Certified,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct CarsArgs {
    #[arg(long)]
    pub make: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
    #[arg(long)]
    pub min_year: Option<u16>,
    #[arg(long)]
    pub max_year: Option<u16>,
    #[arg(long)]
    pub max_mileage: Option<u32>,
    #[arg(long, value_enum)]
    pub condition: Option<ConditionArg>,
    #[arg(long, value_enum)]
    pub stock: Option<StockArg>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::PriceAsc => SortOrder::PriceAsc,
            SortArg::PriceDesc => SortOrder::PriceDesc,
            SortArg::Newest => SortOrder::Newest,
            SortArg::Mileage => SortOrder::LowestMileage,
        }
    }
}

impl CarsArgs {
    pub fn filter(&self) -> CarFilter {
        CarFilter {
            min_price: self.min_price,
            max_price: self.max_price,
            min_year: self.min_year,
            max_year: self.max_year,
            max_mileage: self.max_mileage,
            condition: self.condition.map(|c| match c {
                ConditionArg::New => Condition::New,
                ConditionArg::Used => Condition::Used,
                ConditionArg::Certified => Condition::Certified,
            }),
            stock_type: self.stock.map(|s| match s {
                StockArg::Local => StockType::Local,
                StockArg::Import => StockType::Import,
            }),
            search: self.search.clone(),
            ..CarFilter::default()
        }
        .with_make(self.make.clone())
        .with_model(self.model.clone())
    }
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    pub fn load_config(&self) -> crate::Result<StorefrontConfig> {
        let mut config = if self.config.exists() {
            StorefrontConfig::from_file(&self.config)?
        } else {
            tracing::debug!("{} not found, using defaults", self.config.display());
            StorefrontConfig::default()
        };

        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(code) = &self.currency {
            config.currency.default = code.to_ascii_uppercase();
            config.currency.detect = false;
        }
        if self.json_logs {
            config.logging.json = true;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare_ids() {
        let cli = Cli::parse_from(["storefront", "compare", "a,b,c", "-o", "out.csv"]);
        match cli.command {
            Command::Compare { ids, output } => {
                assert_eq!(ids, vec!["a", "b", "c"]);
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cars_args_build_cascading_filter() {
        let cli = Cli::parse_from([
            "storefront",
            "cars",
            "--model",
            "Prado",
            "--stock",
            "import",
            "--sort",
            "price-desc",
        ]);
        let Command::Cars(args) = cli.command else {
            panic!("expected cars command");
        };

        let filter = args.filter();
        // model without make is dropped
        assert_eq!(filter.model, None);
        assert_eq!(filter.stock_type, Some(StockType::Import));
        assert_eq!(args.sort.map(SortOrder::from), Some(SortOrder::PriceDesc));
    }

    #[test]
    fn test_overrides_apply_to_defaults() {
        let cli = Cli::parse_from([
            "storefront",
            "--config",
            "/nonexistent/storefront.toml",
            "--api-url",
            "https://cars.example.com",
            "--currency",
            "eur",
            "logout",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.api.base_url, "https://cars.example.com");
        assert_eq!(config.currency.default, "EUR");
        assert!(!config.currency.detect);
    }
}

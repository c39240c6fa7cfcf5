//! smart-parser - store scraper with a self-learning selector fallback

use anyhow::Result;
use clap::{Parser, Subcommand};
use smart_parser::commands::{PatternsCommand, ProductCommand, SearchCommand};
use smart_parser::config::{Config, OutputFormat};
use smart_parser::SmartParser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "smart-parser",
    version,
    about = "Store scraper with a self-learning selector fallback",
    long_about = "Parses LUGI product pages with hard-coded selectors and falls back to locators learned from earlier pages when the markup changes."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json, markdown)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Pattern store file
    #[arg(long, global = true, env = "SMART_PATTERNS")]
    patterns: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "SMART_PROXY")]
    proxy: Option<String>,

    /// Store base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Do not learn from successful parses
    #[arg(long, global = true)]
    no_learn: bool,

    /// Only learn locators that reproduce the parsed values
    #[arg(long, global = true)]
    verify_learned: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and parse product pages
    #[command(alias = "p")]
    Product {
        /// Product URL(s), absolute or relative to the store
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Search the store for products
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Parse a saved product page
    Parse {
        /// HTML file
        file: PathBuf,

        /// URL to report for the page
        #[arg(long)]
        url: Option<String>,
    },

    /// Inspect and train the pattern store
    Patterns {
        #[command(subcommand)]
        action: PatternsAction,
    },
}

#[derive(Subcommand)]
enum PatternsAction {
    /// List stored locators
    Show,

    /// List locators a page would add, without saving
    Discover {
        /// HTML file
        file: PathBuf,
    },

    /// Extract fields from a page with stored locators only
    Extract {
        /// HTML file
        file: PathBuf,
    },

    /// Learn locators from a page and save them
    Learn {
        /// HTML file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(patterns) = cli.patterns {
        config.patterns_path = patterns;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if cli.no_learn {
        config.learning = false;
    }
    if cli.verify_learned {
        config.verify_learned = true;
    }

    match cli.command {
        Commands::Product { urls } => {
            let output = ProductCommand::new(config).execute(&urls).await?;
            println!("{}", output);
        }

        Commands::Search { query, max } => {
            if let Some(max) = max {
                config.max_results = max;
            }

            let output = SearchCommand::new(config).execute(&query).await?;
            println!("{}", output);
        }

        Commands::Parse { file, url } => {
            let smart = SmartParser::new(&config);
            let output = ProductCommand::new(config).execute_file(&smart, &file, url.as_deref())?;
            println!("{}", output);
        }

        Commands::Patterns { action } => {
            let smart = SmartParser::new(&config);
            let cmd = PatternsCommand::new(config);

            let output = match action {
                PatternsAction::Show => cmd.show(&smart),
                PatternsAction::Discover { file } => cmd.discover(&smart, &file)?,
                PatternsAction::Extract { file } => cmd.extract(&smart, &file)?,
                PatternsAction::Learn { file } => cmd.learn(&smart, &file)?,
            };
            println!("{}", output);
        }
    }

    Ok(())
}

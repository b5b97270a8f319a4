mod collect;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sfcat")]
#[command(about = "Storefront catalog scraper")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk the catalog's collection listings and export every product variant
    Collect {
        /// Collection URL to scrape instead of the catalog file's list (repeatable)
        #[arg(long = "collection")]
        collections: Vec<String>,

        /// First listing page to visit
        #[arg(long)]
        start_page: Option<u32>,

        /// Last listing page to visit
        #[arg(long)]
        end_page: Option<u32>,

        /// Output file (.xlsx or .csv); defaults to SFCAT_OUTPUT_PATH
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print what would be scraped without starting a browser
        #[arg(long)]
        dry_run: bool,
    },
    /// Scrape specific product pages
    Product {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output file (.xlsx or .csv); defaults to SFCAT_OUTPUT_PATH
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the output column header, one name per line
    Columns,
}

impl Commands {
    /// Whether the command reads `SFCAT_*` settings or drives a browser.
    fn needs_config(&self) -> bool {
        !matches!(self, Commands::Columns)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("sfcat: no command given; see --help");
        return Ok(());
    };
    if !command.needs_config() {
        for column in sfcat_core::COLUMNS {
            println!("{column}");
        }
        return Ok(());
    }

    dotenvy::dotenv().ok();
    let config = sfcat_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Collect {
            collections,
            start_page,
            end_page,
            output,
            dry_run,
        } => {
            let overrides = collect::CollectOverrides {
                collections,
                start_page,
                end_page,
                output,
            };
            let plan = collect::plan_collect(&config, overrides)?;
            if dry_run {
                collect::print_plan(&plan);
            } else {
                collect::run_collect(&config, &plan).await?;
            }
        }
        Commands::Product { urls, output } => {
            let output = output.unwrap_or_else(|| config.output_path.clone());
            collect::run_products(&config, &urls, &output).await?;
        }
        Commands::Columns => {}
    }

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;
use meal_import::{
    pipelines, CanonicalMeal, ErrorBody, ImportConfig, ImportError, MealBatch, OcrDraft,
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "meal-import")]
#[command(about = "Import recipes from web pages, Paprika exports and OCR text", long_about = None)]
struct Cli {
    /// Page fetch timeout in seconds (overrides config.toml / MEAL_IMPORT__TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one meal from a recipe page
    Url {
        /// Page address
        url: String,
    },
    /// Import every recipe from a Paprika export file
    Paprika {
        /// .paprikarecipes, .paprikarecipe, .json or .xml export
        file: PathBuf,
    },
    /// Turn recognized text from a recipe photo into a draft meal
    Ocr {
        /// Text file, or `-` for stdin
        file: String,
        /// Print the full meal instead of the OCR draft
        #[arg(long)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("import failed with status {}", e.status_code());
            let body = ErrorBody::from(&e);
            match serde_json::to_string(&body) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{e}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, ImportError> {
    match cli.command {
        Commands::Url { url } => {
            let mut config = ImportConfig::load()?;
            if let Some(timeout) = cli.timeout {
                config.set_timeout_secs(timeout);
            }
            let meal = pipelines::url::process(&url, &config).await?;
            to_json(&meal)
        }
        Commands::Paprika { file } => {
            let bytes = tokio::fs::read(&file).await?;
            let meals = pipelines::paprika::process(&bytes)?;
            to_json(&MealBatch { meals })
        }
        Commands::Ocr { file, full } => {
            let text = read_text(&file).await?;
            let meal: CanonicalMeal = pipelines::ocr::process(&text);
            if full {
                to_json(&meal)
            } else {
                to_json(&OcrDraft::from(&meal))
            }
        }
    }
}

async fn read_text(file: &str) -> Result<String, ImportError> {
    if file == "-" {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(text);
    }
    Ok(tokio::fs::read_to_string(file).await?)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ImportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub mod builder;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod normalize;
pub mod pipelines;

// Re-export commonly used types
pub use builder::{ImportResult, InputSource, MealImporter, MealImporterBuilder};
pub use config::ImportConfig;
pub use error::{ErrorBody, ImportError};
pub use model::{CanonicalMeal, Ingredient, MealBatch, OcrDraft, Provenance, UNTITLED_RECIPE};
pub use normalize::{parse_duration_to_minutes, split_ingredient_block, split_instruction_block};

use std::time::Duration;

/// Import one meal from a recipe page, using settings from `config.toml`
/// and `MEAL_IMPORT__*` environment variables.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), meal_import::ImportError> {
/// let meal = meal_import::import_url("https://example.com/recipe").await?;
/// println!("{} ({} min)", meal.name, meal.estimated_minutes);
/// # Ok(())
/// # }
/// ```
pub async fn import_url(url: &str) -> Result<CanonicalMeal, ImportError> {
    let config = ImportConfig::load()?;
    import_url_with_config(url, &config).await
}

/// Import one meal from a recipe page with an explicit fetch timeout.
pub async fn import_url_with_timeout(
    url: &str,
    timeout: Option<Duration>,
) -> Result<CanonicalMeal, ImportError> {
    let mut config = ImportConfig::load()?;
    if let Some(timeout) = timeout {
        config.set_timeout_secs(timeout.as_secs());
    }
    import_url_with_config(url, &config).await
}

pub async fn import_url_with_config(
    url: &str,
    config: &ImportConfig,
) -> Result<CanonicalMeal, ImportError> {
    pipelines::url::process(url, config).await
}

/// Import every recipe in a Paprika export (archive, JSON or XML).
pub fn import_paprika(bytes: &[u8]) -> Result<Vec<CanonicalMeal>, ImportError> {
    pipelines::paprika::process(bytes)
}

/// Segment OCR output into a draft meal. Never fails.
pub fn import_ocr_text(text: &str) -> CanonicalMeal {
    pipelines::ocr::process(text)
}

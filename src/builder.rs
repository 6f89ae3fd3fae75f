use std::time::Duration;

use crate::{pipelines, CanonicalMeal, ImportConfig, ImportError};

/// Represents the input source for an import
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Fetch and scrape a recipe page
    Url(String),
    /// Raw bytes of a Paprika export (archive, JSON or XML)
    Paprika(Vec<u8>),
    /// Text recognized from a photographed recipe
    OcrText(String),
}

/// Result of an import operation
#[derive(Debug, Clone)]
pub enum ImportResult {
    /// A single meal (URL and OCR imports)
    Meal(CanonicalMeal),
    /// A batch of meals in export order (Paprika imports)
    Meals(Vec<CanonicalMeal>),
}

impl ImportResult {
    /// All meals in the result, in order.
    pub fn into_meals(self) -> Vec<CanonicalMeal> {
        match self {
            ImportResult::Meal(meal) => vec![meal],
            ImportResult::Meals(meals) => meals,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ImportResult::Meal(_) => 1,
            ImportResult::Meals(meals) => meals.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for configuring and executing meal imports
#[derive(Debug, Default)]
pub struct MealImporterBuilder {
    source: Option<InputSource>,
    config: Option<ImportConfig>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl MealImporterBuilder {
    /// Set the input source to a URL
    ///
    /// # Example
    /// ```
    /// use meal_import::MealImporter;
    ///
    /// let builder = MealImporter::builder()
    ///     .url("https://example.com/recipe");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(InputSource::Url(url.into()));
        self
    }

    /// Set the input source to the bytes of a Paprika export
    ///
    /// Accepts `.paprikarecipes` archives, single `.paprikarecipe` files,
    /// JSON exports and the legacy XML export.
    ///
    /// # Example
    /// ```
    /// use meal_import::MealImporter;
    ///
    /// let export = br#"[{"name": "Toast", "ingredients": "bread\nbutter"}]"#;
    /// let builder = MealImporter::builder()
    ///     .paprika(export.to_vec());
    /// ```
    pub fn paprika(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.source = Some(InputSource::Paprika(bytes.into()));
        self
    }

    /// Set the input source to text recognized from a recipe photo
    ///
    /// # Example
    /// ```
    /// use meal_import::MealImporter;
    ///
    /// let builder = MealImporter::builder()
    ///     .ocr_text("Pancakes\nIngredients\n2 eggs\nMethod\nWhisk and fry");
    /// ```
    pub fn ocr_text(mut self, text: impl Into<String>) -> Self {
        self.source = Some(InputSource::OcrText(text.into()));
        self
    }

    /// Set a timeout for page fetches
    ///
    /// # Example
    /// ```
    /// use meal_import::MealImporter;
    /// use std::time::Duration;
    ///
    /// let builder = MealImporter::builder()
    ///     .url("https://example.com/recipe")
    ///     .timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Override the user agent sent with page fetches
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use explicit settings instead of loading `config.toml` and the
    /// environment. `.timeout()` and `.user_agent()` still take precedence.
    pub fn config(mut self, config: ImportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build and execute the import operation
    ///
    /// # Errors
    /// Returns `ImportError` if:
    /// - No input source was specified
    /// - The configuration cannot be loaded
    /// - The page fetch fails
    /// - A Paprika payload is in no recognized format
    ///
    /// # Example
    /// ```no_run
    /// # use meal_import::MealImporter;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let result = MealImporter::builder()
    ///     .url("https://example.com/recipe")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<ImportResult, ImportError> {
        let source = self.source.ok_or_else(|| {
            ImportError::BuilderError(
                "No input source specified. Use .url(), .paprika() or .ocr_text()".to_string(),
            )
        })?;

        match source {
            InputSource::Url(url) => {
                let mut config = match self.config {
                    Some(config) => config,
                    None => ImportConfig::load()?,
                };
                if let Some(timeout) = self.timeout {
                    config.set_timeout_secs(timeout.as_secs());
                }
                if let Some(user_agent) = self.user_agent {
                    config.user_agent = user_agent;
                }
                let meal = pipelines::url::process(&url, &config).await?;
                Ok(ImportResult::Meal(meal))
            }
            InputSource::Paprika(bytes) => {
                if bytes.is_empty() {
                    return Err(ImportError::InvalidInput(
                        "Paprika export is empty".to_string(),
                    ));
                }
                let meals = pipelines::paprika::process(&bytes)?;
                Ok(ImportResult::Meals(meals))
            }
            InputSource::OcrText(text) => Ok(ImportResult::Meal(pipelines::ocr::process(&text))),
        }
    }
}

/// Main entry point for the builder API
pub struct MealImporter;

impl MealImporter {
    /// Creates a new builder for importing meals
    ///
    /// # Example
    /// ```
    /// use meal_import::MealImporter;
    ///
    /// let builder = MealImporter::builder();
    /// ```
    pub fn builder() -> MealImporterBuilder {
        MealImporterBuilder::default()
    }
}

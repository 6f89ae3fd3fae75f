use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::extractors::{self, ParsingContext, ScrapedRecipe};
use crate::fetchers::RequestFetcher;
use crate::model::{CanonicalMeal, Ingredient, MealDraft, Provenance};
use crate::normalize::{parse_duration_to_minutes, DurationInput};
use log::debug;
use reqwest::Url;
use serde_json::Value;

/// Import one meal from a recipe web page.
///
/// This pipeline:
/// 1. Fetches the page once with a browser-like user agent
/// 2. Runs the extraction chain (json_ld, microdata, html_class) until one answers
/// 3. Fills fields the winning strategy lacked from the page itself
/// 4. Normalizes durations, ingredients and steps into a [`CanonicalMeal`]
///
/// # Errors
/// Only an empty URL or a failed fetch is an error. A reachable page with
/// nothing recognizable on it yields a sparse meal.
pub async fn process(url: &str, config: &ImportConfig) -> Result<CanonicalMeal, ImportError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ImportError::InvalidInput("URL is required".to_string()));
    }

    let fetcher = RequestFetcher::new(Some(config.timeout_duration()), &config.user_agent)?;
    let html = fetcher.fetch(url).await?;
    Ok(extract_meal(&html, url))
}

/// Run the extraction chain over an already fetched page.
pub fn extract_meal(html: &str, url: &str) -> CanonicalMeal {
    let context = ParsingContext::new(url, html);
    let recipe = run_chain(&context);
    assemble(recipe, &context)
}

fn run_chain(context: &ParsingContext) -> ScrapedRecipe {
    for extractor in extractors::default_chain() {
        if let Some(recipe) = extractor.extract(context) {
            debug!("URL pipeline: {} extracted {}", extractor.name(), context.url);
            return recipe;
        }
        debug!("URL pipeline: {} declined {}", extractor.name(), context.url);
    }
    ScrapedRecipe::default()
}

fn assemble(recipe: ScrapedRecipe, context: &ParsingContext) -> CanonicalMeal {
    let document = &context.document;
    let estimated_minutes = total_minutes(&recipe);

    let ingredients = recipe.ingredients.unwrap_or_else(|| {
        extractors::ingredient_lines(document)
            .into_iter()
            .map(Ingredient::new)
            .collect()
    });
    let instructions = recipe
        .instructions
        .unwrap_or_else(|| extractors::instruction_lines(document));

    let name = recipe
        .name
        .or_else(|| extractors::first_heading(document))
        .or_else(|| extractors::document_title(document));

    let photo_reference = recipe
        .image
        .or_else(|| extractors::og_image(document))
        .or_else(|| extractors::first_image(document))
        .and_then(|src| absolute_url(&context.url, &src));

    MealDraft {
        name,
        photo_reference,
        estimated_minutes,
        ingredients,
        instructions,
        tags: recipe.tags,
    }
    .into_meal(Provenance::Url {
        source_url: context.url.clone(),
        raw_payload: recipe.raw,
    })
}

/// Explicit total time wins; otherwise prep and cook are added up.
fn total_minutes(recipe: &ScrapedRecipe) -> u32 {
    let minutes = |value: &Option<Value>| {
        value
            .as_ref()
            .and_then(DurationInput::from_json)
            .map(parse_duration_to_minutes)
            .unwrap_or(0)
    };

    match minutes(&recipe.total_time) {
        0 => minutes(&recipe.prep_time).saturating_add(minutes(&recipe.cook_time)),
        total => total,
    }
}

fn absolute_url(page_url: &str, src: &str) -> Option<String> {
    if let Ok(url) = Url::parse(src) {
        return Some(url.to_string());
    }
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(|url| url.to_string())
        .ok()
}

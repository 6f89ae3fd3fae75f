use crate::model::Ingredient;
use scraper::{ElementRef, Html};
use serde_json::Value;

mod html_class;
mod json_ld;
mod microdata;

pub use html_class::HtmlClassExtractor;
pub use json_ld::JsonLdExtractor;
pub use microdata::MicroDataExtractor;

pub(crate) use html_class::{
    document_title, first_heading, first_image, ingredient_lines, instruction_lines, og_image,
};

pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }
}

/// Recipe fields recovered by one extraction strategy, before normalization.
///
/// `ingredients` / `instructions` are `None` when the source carried no such
/// field at all, which lets the URL pipeline fill them from the page markup.
#[derive(Debug, Clone, Default)]
pub struct ScrapedRecipe {
    pub name: Option<String>,
    pub image: Option<String>,
    pub total_time: Option<Value>,
    pub prep_time: Option<Value>,
    pub cook_time: Option<Value>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<String>>,
    pub tags: Vec<String>,
    /// Unprocessed source record, kept for provenance.
    pub raw: Value,
}

/// One step of the URL extraction chain.
pub trait Extractor {
    fn name(&self) -> &'static str;
    /// `None` hands over to the next strategy.
    fn extract(&self, context: &ParsingContext) -> Option<ScrapedRecipe>;
}

/// Strategies in the order they are tried. The last one never declines.
pub fn default_chain() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(JsonLdExtractor),
        Box::new(MicroDataExtractor),
        Box::new(HtmlClassExtractor),
    ]
}

pub(crate) fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn non_empty(text: String) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

use super::{element_text, non_empty, Extractor, ParsingContext, ScrapedRecipe};
use crate::model::Ingredient;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Item-level ingredient markers: schema itemprops, the generic
/// `.ingredient` / `.ingredients li` convention, and common recipe-card plugins.
const INGREDIENT_SELECTORS: &[&str] = &[
    "[itemprop='recipeIngredient']",
    "[itemprop='ingredients']",
    ".ingredient",
    ".ingredients li",
    ".wprm-recipe-ingredient",
    ".tasty-recipes-ingredients li",
    ".mv-create-ingredients li",
    ".recipe-ingredients li",
    ".structured-ingredients li",
    ".wpzoom-recipe-ingredients li",
];

const INSTRUCTION_SELECTORS: &[&str] = &[
    "[itemprop='recipeInstructions'] li",
    ".instructions li",
    ".steps li",
    ".wprm-recipe-instruction",
    ".tasty-recipes-instructions li",
    ".mv-create-instructions li",
    ".recipe-instructions li",
    ".recipe-directions li",
    ".directions li",
    ".structured-instructions li",
    ".wpzoom-recipe-instructions li",
];

const TOTAL_TIME_CLASSES: &[&str] = &[
    "wprm-recipe-total_time",
    "wprm-recipe-total-time",
    "tasty-recipes-total-time",
    "mv-create-time-total",
    "recipe-total-time",
    "total-time",
];

const PREP_TIME_CLASSES: &[&str] = &[
    "wprm-recipe-prep_time",
    "wprm-recipe-prep-time",
    "tasty-recipes-prep-time",
    "mv-create-time-prep",
    "recipe-prep-time",
    "prep-time",
];

const COOK_TIME_CLASSES: &[&str] = &[
    "wprm-recipe-cook_time",
    "wprm-recipe-cook-time",
    "tasty-recipes-cook-time",
    "mv-create-time-active",
    "recipe-cook-time",
    "cook-time",
];

/// Last-resort DOM heuristics. Always returns a (possibly empty) recipe.
pub struct HtmlClassExtractor;

impl Extractor for HtmlClassExtractor {
    fn name(&self) -> &'static str {
        "html_class"
    }

    fn extract(&self, context: &ParsingContext) -> Option<ScrapedRecipe> {
        debug!("Attempting to extract recipe using HTML class matchers");
        let document = &context.document;

        let name = first_heading(document).or_else(|| document_title(document));
        let image = og_image(document).or_else(|| first_image(document));
        let ingredients = ingredient_lines(document);
        let instructions = instruction_lines(document);
        let total_time = find_by_class(document, TOTAL_TIME_CLASSES);
        let prep_time = find_by_class(document, PREP_TIME_CLASSES);
        let cook_time = find_by_class(document, COOK_TIME_CLASSES);

        debug!("Recipe name: {:?}", name);
        debug!("Ingredients count: {}", ingredients.len());
        debug!("Instructions count: {}", instructions.len());

        let raw = json!({
            "extractor": "html_class",
            "name": name,
            "image": image,
            "totalTime": total_time,
            "prepTime": prep_time,
            "cookTime": cook_time,
            "ingredients": ingredients,
            "instructions": instructions,
        });

        Some(ScrapedRecipe {
            name,
            image,
            total_time: total_time.map(Value::String),
            prep_time: prep_time.map(Value::String),
            cook_time: cook_time.map(Value::String),
            ingredients: Some(ingredients.into_iter().map(Ingredient::new).collect()),
            instructions: Some(instructions),
            tags: Vec::new(),
            raw,
        })
    }
}

pub(crate) fn first_heading(document: &Html) -> Option<String> {
    let selector = Selector::parse("h1").expect("h1 selector");
    document
        .select(&selector)
        .next()
        .and_then(|el| non_empty(element_text(el)))
}

pub(crate) fn document_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").expect("title selector");
    document
        .select(&selector)
        .next()
        .and_then(|el| non_empty(element_text(el)))
}

pub(crate) fn og_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[property='og:image']").expect("og:image selector");
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .find_map(|content| non_empty(content.to_string()))
}

pub(crate) fn first_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("img[src]").expect("img selector");
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .find_map(|src| non_empty(src.to_string()))
}

pub(crate) fn ingredient_lines(document: &Html) -> Vec<String> {
    marked_lines(document, INGREDIENT_SELECTORS)
}

pub(crate) fn instruction_lines(document: &Html) -> Vec<String> {
    marked_lines(document, INSTRUCTION_SELECTORS)
}

/// Text of every element matching any marker, in document order.
///
/// An element nested inside another match (a `.ingredient` span inside an
/// `.ingredients li`) is skipped so each line is reported once.
fn marked_lines(document: &Html, markers: &[&str]) -> Vec<String> {
    let Ok(selector) = Selector::parse(&markers.join(", ")) else {
        return Vec::new();
    };

    let matches: Vec<ElementRef> = document.select(&selector).collect();
    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();

    matches
        .into_iter()
        .filter(|el| !el.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn find_by_class(document: &Html, classes: &[&str]) -> Option<String> {
    classes.iter().find_map(|class_name| {
        let selector = Selector::parse(&format!(".{class_name}")).ok()?;
        let text = document.select(&selector).next().map(element_text)?;
        let text = non_empty(text)?;
        debug!("Found time using class: {}", class_name);
        Some(text)
    })
}

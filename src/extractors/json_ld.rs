use super::{non_empty, Extractor, ParsingContext, ScrapedRecipe};
use crate::model::Ingredient;
use crate::normalize::{decode_html_symbols, split_instruction_block};
use log::debug;
use scraper::Selector;
use serde_json::Value;

/// Schema.org `Recipe` nodes embedded as `application/ld+json`.
///
/// Blocks are scanned in document order and the first Recipe node wins.
/// A block that does not parse is skipped, not fatal.
pub struct JsonLdExtractor;

impl Extractor for JsonLdExtractor {
    fn name(&self) -> &'static str {
        "json_ld"
    }

    fn extract(&self, context: &ParsingContext) -> Option<ScrapedRecipe> {
        debug!("JsonLdExtractor: Starting parse for URL: {}", context.url);
        let selector =
            Selector::parse("script[type='application/ld+json']").expect("JSON-LD selector");

        for (index, script) in context.document.select(&selector).enumerate() {
            let Some(json_ld) = parse_block(&script.inner_html()) else {
                debug!("JsonLdExtractor: Skipping malformed JSON-LD block {}", index);
                continue;
            };

            match find_recipe_node(&json_ld) {
                Some(recipe) => {
                    debug!("JsonLdExtractor: Found Recipe in block {}", index);
                    return Some(convert_to_recipe(recipe));
                }
                None => debug!("JsonLdExtractor: No Recipe in block {}", index),
            }
        }

        debug!("JsonLdExtractor: No valid recipe found in any JSON-LD script");
        None
    }
}

fn parse_block(raw_json: &str) -> Option<Value> {
    serde_json::from_str(raw_json)
        .or_else(|_| serde_json::from_str(&sanitize_json(raw_json)))
        .ok()
}

/// Escape raw control characters that some sites leave inside JSON strings.
fn sanitize_json(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    result.push(c);
                }
                '\\' => {
                    escaped = true;
                    result.push(c);
                }
                '"' => {
                    in_string = false;
                    result.push(c);
                }
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                c if c.is_control() => {}
                _ => result.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        }
    }

    result
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// The block root, an element of a top-level array, or an `@graph` member.
fn find_recipe_node(value: &Value) -> Option<&Value> {
    if is_recipe_type(value) {
        return Some(value);
    }
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe_node),
        Value::Object(obj) => obj.get("@graph").and_then(find_recipe_node),
        _ => None,
    }
}

fn convert_to_recipe(recipe: &Value) -> ScrapedRecipe {
    let field = |key: &str| recipe.get(key).filter(|v| !v.is_null());

    ScrapedRecipe {
        name: field("name")
            .and_then(Value::as_str)
            .map(decode_html_symbols)
            .and_then(non_empty),
        image: field("image")
            .and_then(image_url)
            .map(|url| decode_html_symbols(&url)),
        total_time: duration_field(recipe, "totalTime"),
        prep_time: duration_field(recipe, "prepTime"),
        cook_time: duration_field(recipe, "cookTime"),
        ingredients: field("recipeIngredient")
            .or_else(|| field("ingredients"))
            .map(ingredient_list),
        instructions: field("recipeInstructions").map(instruction_steps),
        tags: field("recipeCategory").map(category_list).unwrap_or_default(),
        raw: recipe.clone(),
    }
}

fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) => non_empty(url.clone()),
        Value::Array(images) => images.iter().find_map(image_url),
        Value::Object(obj) => obj
            .get("url")
            .or_else(|| obj.get("contentUrl"))
            .and_then(Value::as_str)
            .and_then(|url| non_empty(url.to_string())),
        _ => None,
    }
}

fn duration_field(recipe: &Value, key: &str) -> Option<Value> {
    recipe
        .get(key)
        .filter(|v| match v {
            Value::String(s) => !s.trim().is_empty(),
            Value::Number(_) => true,
            _ => false,
        })
        .cloned()
}

/// `recipeIngredient` is already one entry per ingredient; never split further.
fn ingredient_list(value: &Value) -> Vec<Ingredient> {
    match value {
        Value::Array(items) => items.iter().map(ingredient_entry).collect(),
        Value::String(s) => vec![Ingredient::new(decode_html_symbols(s))],
        _ => Vec::new(),
    }
}

fn ingredient_entry(item: &Value) -> Ingredient {
    match item {
        Value::String(s) => Ingredient::new(decode_html_symbols(s)),
        Value::Object(obj) => {
            let name = obj
                .get("name")
                .or_else(|| obj.get("text"))
                .and_then(Value::as_str);
            match name {
                Some(name) => {
                    let ingredient = Ingredient::new(decode_html_symbols(name));
                    match obj.get("amount").and_then(Value::as_str) {
                        Some(amount) => ingredient.with_amount(decode_html_symbols(amount)),
                        None => ingredient,
                    }
                }
                None => Ingredient::new(item.to_string()),
            }
        }
        other => Ingredient::new(other.to_string()),
    }
}

/// Flatten every `recipeInstructions` shape into ordered step strings.
fn instruction_steps(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => split_instruction_block(&decode_html_symbols(s)),
        _ => step_texts(value),
    }
}

fn step_texts(item: &Value) -> Vec<String> {
    match item {
        Value::String(s) => vec![decode_html_symbols(s)],
        Value::Array(items) => items.iter().flat_map(step_texts).collect(),
        Value::Object(obj) => {
            // HowToSection
            if let Some(steps) = obj.get("itemListElement") {
                return step_texts(steps);
            }
            // HowToStep: prefer text over name
            match obj
                .get("text")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)
            {
                Some(text) => vec![decode_html_symbols(text)],
                None => vec![item.to_string()],
            }
        }
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn category_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split(',').map(decode_html_symbols).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(decode_html_symbols)
            .collect(),
        _ => Vec::new(),
    }
}

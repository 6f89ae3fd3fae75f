use super::{element_text, non_empty, Extractor, ParsingContext, ScrapedRecipe};
use crate::model::Ingredient;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};

pub struct MicroDataExtractor;

impl MicroDataExtractor {
    fn find_recipe_container<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        // Look for elements with itemscope and itemtype containing "Recipe"
        let selector = Selector::parse("[itemscope]").expect("itemscope selector");
        document.select(&selector).find(|element| {
            element.value().attr("itemtype").is_some_and(|itemtype| {
                itemtype.contains("schema.org/Recipe")
                    || itemtype.contains("data-vocabulary.org/Recipe")
            })
        })
    }

    fn get_itemprop(&self, root: ElementRef, prop: &str) -> Option<String> {
        let selector = Selector::parse(&format!("[itemprop='{prop}']")).ok()?;
        root.select(&selector).find_map(|el| {
            // <time datetime> and <meta content> carry the machine value
            el.value()
                .attr("content")
                .or_else(|| el.value().attr("datetime"))
                .map(str::to_string)
                .or_else(|| Some(element_text(el)))
                .and_then(non_empty)
        })
    }

    fn get_itemprop_list(&self, root: ElementRef, prop: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(&format!("[itemprop='{prop}']")) else {
            return Vec::new();
        };
        root.select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn get_image(&self, root: ElementRef) -> Option<String> {
        let selector = Selector::parse("[itemprop='image']").expect("image selector");
        let img = root.select(&selector).next()?;
        img.value()
            .attr("src")
            .or_else(|| img.value().attr("content"))
            .map(str::to_string)
            .or_else(|| Some(element_text(img)))
            .and_then(non_empty)
    }
}

impl Extractor for MicroDataExtractor {
    fn name(&self) -> &'static str {
        "microdata"
    }

    fn extract(&self, context: &ParsingContext) -> Option<ScrapedRecipe> {
        debug!("Attempting to extract recipe using MicroData extractor");

        // Only a scoped Recipe item counts; page-wide itemprops pick up
        // unrelated site titles and author bios.
        let container = self.find_recipe_container(&context.document)?;

        let name = self.get_itemprop(container, "name");

        let mut ingredients = self.get_itemprop_list(container, "recipeIngredient");
        if ingredients.is_empty() {
            ingredients = self.get_itemprop_list(container, "ingredients");
        }

        let mut instructions = self.get_itemprop_list(container, "recipeInstructions");
        if instructions.is_empty() {
            instructions = self.get_itemprop_list(container, "instructions");
        }

        if name.is_none() && ingredients.is_empty() && instructions.is_empty() {
            debug!("MicroData Recipe container has no usable content");
            return None;
        }

        let image = self.get_image(container);
        let total_time = self.get_itemprop(container, "totalTime");
        let prep_time = self.get_itemprop(container, "prepTime");
        let cook_time = self.get_itemprop(container, "cookTime");
        let category = self.get_itemprop(container, "recipeCategory");

        let raw = json!({
            "extractor": "microdata",
            "name": name,
            "image": image,
            "totalTime": total_time,
            "prepTime": prep_time,
            "cookTime": cook_time,
            "recipeCategory": category,
            "recipeIngredient": ingredients,
            "recipeInstructions": instructions,
        });

        debug!(
            "MicroData: {} ingredients, {} instructions",
            ingredients.len(),
            instructions.len()
        );

        Some(ScrapedRecipe {
            name,
            image,
            total_time: total_time.map(Value::String),
            prep_time: prep_time.map(Value::String),
            cook_time: cook_time.map(Value::String),
            ingredients: (!ingredients.is_empty())
                .then(|| ingredients.into_iter().map(Ingredient::new).collect()),
            instructions: (!instructions.is_empty()).then_some(instructions),
            tags: category.into_iter().collect(),
            raw,
        })
    }
}

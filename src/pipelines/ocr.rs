use crate::model::{CanonicalMeal, Ingredient, MealDraft, Provenance};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

const MAX_NAME_CHARS: usize = 100;
const MAX_GUESSED_INGREDIENTS: usize = 20;
const MIN_FALLBACK_STEP_CHARS: usize = 10;
const MAX_HEADER_CHARS: usize = 40;

/// Keyword at the start of a line; group 1 is whatever follows it.
static INGREDIENTS_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[#*•\s-]*ingredients?\b(.*)$").expect("ingredients header regex")
});

static INSTRUCTIONS_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[#*•\s-]*(?:instructions?|directions?|method|steps?|preparation)\b(.*)$")
        .expect("instructions header regex")
});

/// Labels that sit between sections on a cookbook page and are never content.
static OTHER_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[#*•\s-]*(?:nutrition|serves|servings|yield|(?:prep|cook|cooking|total)\s+time)\b")
        .expect("section label regex")
});

static NAME_REJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[/.]").expect("name reject regex"));

static NUMBERED_STEP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d{1,2}[.)](?:\D|$)|step\s+\d+)").expect("numbered step regex")
});

static STEP_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d{1,2}[.)]\s*|step\s+\d+\s*[:.)\-]?\s*)").expect("step prefix regex")
});

static INGREDIENT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[•*-]+\s*|\d+[.)]\s+)").expect("ingredient prefix regex")
});

static UNIT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:cups?|tbsps?|tsps?|oz|lbs?|grams?|kg|ml|l|pounds?|ounces?|teaspoons?|tablespoons?)\b",
    )
    .expect("unit token regex")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(min(?:ute)?s?|h(?:ou)?rs?)\b").expect("time regex")
});

/// Turn raw recognized text into a draft meal.
///
/// Never fails. Whatever comes out is meant to be corrected by a person
/// before it is saved, so every branch returns something editable.
pub fn process(text: &str) -> CanonicalMeal {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let name = lines
        .first()
        .filter(|first| first.chars().count() < MAX_NAME_CHARS && !NAME_REJECT_RE.is_match(first))
        .map(|first| first.to_string());

    let ingredients_at = find_header(&lines, &INGREDIENTS_HEADER_RE);
    let instructions_at = find_header(&lines, &INSTRUCTIONS_HEADER_RE);
    debug!(
        "OCR: {} lines, ingredients header {:?}, instructions header {:?}",
        lines.len(),
        ingredients_at,
        instructions_at
    );

    let mut ingredients: Vec<String> = match ingredients_at {
        Some(start) => section(&lines, start, instructions_at)
            .iter()
            .filter(|line| !is_header(line))
            .map(|line| strip(&INGREDIENT_PREFIX_RE, line))
            .filter(|line| !line.is_empty())
            .collect(),
        None => guess_ingredients(&lines),
    };

    let mut instructions: Vec<String> = match instructions_at {
        Some(start) => section(&lines, start, ingredients_at)
            .iter()
            .filter(|line| {
                !is_section_header(&INGREDIENTS_HEADER_RE, line) && !OTHER_LABEL_RE.is_match(line)
            })
            .map(|line| strip_step(line))
            .filter(|line| !line.is_empty())
            .collect(),
        None => lines
            .iter()
            .filter(|line| NUMBERED_STEP_RE.is_match(line))
            .map(|line| strip_step(line))
            .filter(|line| !line.is_empty())
            .collect(),
    };

    // Crude last resort: top half ingredients, bottom half steps.
    if ingredients.is_empty() && instructions.is_empty() && !lines.is_empty() {
        debug!("OCR: no sections recognized, splitting lines at the midpoint");
        let (top, bottom) = lines.split_at(lines.len() / 2);
        ingredients = top
            .iter()
            .filter(|line| line.chars().count() < MAX_NAME_CHARS)
            .map(|line| line.to_string())
            .collect();
        instructions = bottom
            .iter()
            .filter(|line| line.chars().count() > MIN_FALLBACK_STEP_CHARS)
            .map(|line| line.to_string())
            .collect();
    }

    MealDraft {
        name,
        photo_reference: None,
        estimated_minutes: cooking_minutes(text),
        ingredients: ingredients.into_iter().map(Ingredient::new).collect(),
        instructions,
        tags: Vec::new(),
    }
    .into_meal(Provenance::Ocr)
}

/// Lines after the header at `start`, up to the other header when that one
/// comes later on the page.
fn section<'a>(lines: &'a [&'a str], start: usize, other: Option<usize>) -> &'a [&'a str] {
    let end = other.filter(|&o| o > start).unwrap_or(lines.len());
    &lines[start + 1..end]
}

/// Text after a section keyword, when `line` is a short heading that starts
/// with it. `Step 1: ...` is a step, not a heading.
fn header_tail<'a>(header: &Regex, line: &'a str) -> Option<&'a str> {
    if line.chars().count() > MAX_HEADER_CHARS {
        return None;
    }
    let tail = header.captures(line)?.get(1).map_or("", |m| m.as_str());
    if tail.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(tail)
}

fn is_section_header(header: &Regex, line: &str) -> bool {
    header_tail(header, line).is_some()
}

/// The first line is usually the title, so it only counts as a heading when
/// it is the bare keyword (`Ingredients:`), not `Steps to Perfect Pancakes`.
fn find_header(lines: &[&str], header: &Regex) -> Option<usize> {
    lines.iter().enumerate().find_map(|(i, line)| {
        let tail = header_tail(header, line)?;
        let bare = tail
            .trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-')
            .is_empty();
        (i > 0 || bare).then_some(i)
    })
}

fn is_header(line: &str) -> bool {
    is_section_header(&INGREDIENTS_HEADER_RE, line)
        || is_section_header(&INSTRUCTIONS_HEADER_RE, line)
        || OTHER_LABEL_RE.is_match(line)
}

fn guess_ingredients(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !NUMBERED_STEP_RE.is_match(line))
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()) || UNIT_TOKEN_RE.is_match(line))
        .take(MAX_GUESSED_INGREDIENTS)
        .map(|line| strip(&INGREDIENT_PREFIX_RE, line))
        .filter(|line| !line.is_empty())
        .collect()
}

fn strip(prefix: &Regex, line: &str) -> String {
    prefix.replace(line, "").trim().to_string()
}

/// Drop `1.`, `2)` or `Step 3:` numbering; `1.5 cups ...` is left alone.
fn strip_step(line: &str) -> String {
    if NUMBERED_STEP_RE.is_match(line) {
        strip(&STEP_PREFIX_RE, line)
    } else {
        line.trim().to_string()
    }
}

fn cooking_minutes(text: &str) -> u32 {
    let Some(caps) = TIME_RE.captures(text) else {
        return 0;
    };
    let amount: u32 = caps[1].parse().unwrap_or(0);
    if caps[2].to_ascii_lowercase().starts_with('h') {
        amount.saturating_mul(60)
    } else {
        amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNTITLED_RECIPE;

    fn names(meal: &CanonicalMeal) -> Vec<&str> {
        meal.ingredients.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_empty_text() {
        let meal = process("");
        assert_eq!(meal.name, UNTITLED_RECIPE);
        assert!(meal.ingredients.is_empty());
        assert!(meal.instructions.is_empty());
        assert_eq!(meal.estimated_minutes, 0);
        assert_eq!(meal.provenance, Provenance::Ocr);
        assert!(meal.tags.is_empty());
    }

    #[test]
    fn test_page_with_headers() {
        let text = "Lemon Bars\n\
                    Serves 12\n\
                    Ingredients:\n\
                    • 1 cup butter\n\
                    - 2 cups flour\n\
                    4 eggs\n\
                    Method\n\
                    1. Heat oven to 350F.\n\
                    2) Press crust into the pan and bake 20 minutes.\n\
                    Nutrition: 210 kcal\n";
        let meal = process(text);

        assert_eq!(meal.name, "Lemon Bars");
        assert_eq!(names(&meal), vec!["1 cup butter", "2 cups flour", "4 eggs"]);
        assert_eq!(
            meal.instructions,
            vec!["Heat oven to 350F.", "Press crust into the pan and bake 20 minutes."]
        );
        assert_eq!(meal.estimated_minutes, 20);
    }

    #[test]
    fn test_instructions_before_ingredients() {
        let text = "Flatbread\nDirections\nMix everything.\nBake hot.\nIngredients\n2 cups flour\n1 tsp salt";
        let meal = process(text);
        assert_eq!(meal.instructions, vec!["Mix everything.", "Bake hot."]);
        assert_eq!(names(&meal), vec!["2 cups flour", "1 tsp salt"]);
    }

    #[test]
    fn test_step_lines_are_not_headers() {
        let text = "Pancakes\n2 eggs\n1 cup milk\nStep 1: Whisk the batter\nStep 2: Fry in butter";
        let meal = process(text);
        assert_eq!(names(&meal), vec!["2 eggs", "1 cup milk"]);
        assert_eq!(meal.instructions, vec!["Whisk the batter", "Fry in butter"]);
    }

    #[test]
    fn test_guessing_without_headers() {
        let text = "Quick Salad\n1.5 cups quinoa\nsalt, 1 tbsp\nToss with dressing\n1. Cook quinoa\n2. Toss";
        let meal = process(text);
        assert_eq!(names(&meal), vec!["1.5 cups quinoa", "salt, 1 tbsp"]);
        assert_eq!(meal.instructions, vec!["Cook quinoa", "Toss"]);
    }

    #[test]
    fn test_headings_with_trailing_words() {
        let text = "Apple Pie\n\
                    Ingredients for the filling:\n\
                    6 apples, sliced\n\
                    sugar and cinnamon\n\
                    butter\n\
                    Method\n\
                    Slice the apples.\n\
                    Bake for 45 minutes.";
        let meal = process(text);
        assert_eq!(names(&meal), vec!["6 apples, sliced", "sugar and cinnamon", "butter"]);
        assert_eq!(meal.instructions, vec!["Slice the apples.", "Bake for 45 minutes."]);
        assert_eq!(meal.estimated_minutes, 45);

        let meal = process("Broth\nINGREDIENTS FOR 4\nwater\nsalt\nDIRECTIONS\nBoil.");
        assert_eq!(names(&meal), vec!["water", "salt"]);
        assert_eq!(meal.instructions, vec!["Boil."]);
    }

    #[test]
    fn test_title_starting_with_keyword_is_not_a_heading() {
        let meal = process("Steps to Perfect Pancakes\n2 eggs\n1 cup milk\n1. Whisk\n2. Fry");
        assert_eq!(meal.name, "Steps to Perfect Pancakes");
        assert_eq!(names(&meal), vec!["2 eggs", "1 cup milk"]);
        assert_eq!(meal.instructions, vec!["Whisk", "Fry"]);
    }

    #[test]
    fn test_numbered_steps_without_spaces() {
        let meal = process("Toast\n1.Toast the bread until golden\n2.Butter it generously");
        assert!(meal.ingredients.is_empty());
        assert_eq!(
            meal.instructions,
            vec!["Toast the bread until golden", "Butter it generously"]
        );
    }

    #[test]
    fn test_midpoint_fallback() {
        let text = "Grandma's Soup\nonion and carrot\nsimmer everything slowly\nserve";
        let meal = process(text);
        assert_eq!(meal.name, "Grandma's Soup");
        assert_eq!(names(&meal), vec!["Grandma's Soup", "onion and carrot"]);
        assert_eq!(meal.instructions, vec!["simmer everything slowly"]);
    }

    #[test]
    fn test_numeric_first_line_is_not_a_name() {
        let meal = process("1/2 cup sugar\n2 eggs");
        assert_eq!(meal.name, UNTITLED_RECIPE);
    }

    #[test]
    fn test_hours_are_converted() {
        assert_eq!(cooking_minutes("Roast for 2 hours"), 120);
        assert_eq!(cooking_minutes("ready in 3 hrs"), 180);
        assert_eq!(cooking_minutes("45 mins total"), 45);
        assert_eq!(cooking_minutes("no time given"), 0);
    }
}

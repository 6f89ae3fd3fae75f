//! Pure conversions shared by every importer: durations to minutes and
//! free-text ingredient/instruction blocks to clean line lists.

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;
use serde_json::Value;

/// `PT1H30M`, `PT5400S`, `P1DT2H`
static ISO_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("ISO duration regex")
});

static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*h").expect("hours regex"));

static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*m").expect("minutes regex"));

static INGREDIENT_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n|[•◦▪‣]").expect("ingredient split regex"));

static LEADING_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]+\s*").expect("bullet regex"));

/// Newlines, or a one/two digit step number (`1.`, `12)`) at a line start
/// or after whitespace. Matches followed by a digit (`1.5`) are not splits.
static INSTRUCTION_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)\r?\n|(?:^|\s)\d{1,2}[.)]").expect("instruction split regex")
});

/// A duration as it shows up in source data: already minutes, or free text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationInput<'a> {
    Minutes(f64),
    Text(&'a str),
}

impl<'a> DurationInput<'a> {
    /// Numbers and strings are durations; anything else is not.
    pub fn from_json(value: &'a Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(DurationInput::Minutes),
            Value::String(s) => Some(DurationInput::Text(s)),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for DurationInput<'a> {
    fn from(text: &'a str) -> Self {
        DurationInput::Text(text)
    }
}

impl<'a> From<&'a String> for DurationInput<'a> {
    fn from(text: &'a String) -> Self {
        DurationInput::Text(text)
    }
}

macro_rules! minutes_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DurationInput<'_> {
                fn from(minutes: $ty) -> Self {
                    DurationInput::Minutes(minutes as f64)
                }
            }
        )*
    };
}

minutes_from_number!(i32, i64, u32, u64, f64);

/// Convert a duration into whole minutes.
///
/// Numbers pass through (rounded, negatives clamp to 0). ISO-8601 durations
/// are read field by field. Any other text is scanned independently for an
/// hour count (`1.5 hours` allowed) and a minute count, combined as
/// `hours * 60 + minutes` and rounded.
/// Nothing recognizable yields 0.
pub fn parse_duration_to_minutes<'a>(input: impl Into<DurationInput<'a>>) -> u32 {
    match input.into() {
        DurationInput::Minutes(minutes) => clamp_minutes(minutes),
        DurationInput::Text(text) => {
            let text = text.trim();
            if let Some(minutes) = parse_iso_duration(text) {
                return minutes;
            }
            let hours = first_number(&HOURS_RE, text);
            let minutes = first_number(&MINUTES_RE, text);
            clamp_minutes(hours * 60.0 + minutes)
        }
    }
}

fn clamp_minutes(minutes: f64) -> u32 {
    if !minutes.is_finite() || minutes <= 0.0 {
        0
    } else if minutes >= u32::MAX as f64 {
        u32::MAX
    } else {
        minutes.round() as u32
    }
}

fn first_number(re: &Regex, text: &str) -> f64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

fn parse_iso_duration(text: &str) -> Option<u32> {
    let caps = ISO_DURATION_RE.captures(text)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());

    let (days, hours, minutes, seconds) = (field(1), field(2), field(3), field(4));
    if days.is_none() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }

    let total = days.unwrap_or(0.0) * 1440.0
        + hours.unwrap_or(0.0) * 60.0
        + minutes.unwrap_or(0.0)
        + seconds.unwrap_or(0.0) / 60.0;
    Some(clamp_minutes(total))
}

/// Split a free-text ingredient block into one entry per ingredient.
///
/// Breaks on newlines and bullet glyphs; a leading `-` or `*` bullet is
/// stripped. Entries are trimmed and blanks dropped.
pub fn split_ingredient_block(text: &str) -> Vec<String> {
    INGREDIENT_SPLIT_RE
        .split(text)
        .map(|line| LEADING_BULLET_RE.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Split a free-text instruction block into ordered steps, removing step numbering.
///
/// `1. Mix`, `1.Mix` and `1) Mix` all start a step; `1.5 cups` does not.
pub fn split_instruction_block(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for boundary in INSTRUCTION_SPLIT_RE.find_iter(text) {
        if text[boundary.end()..].starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        pieces.push(&text[start..boundary.start()]);
        start = boundary.end();
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn decode_html_symbols(text: &str) -> String {
    // some sites double-encode entities (&amp;amp;)
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_duration_text() {
        assert_eq!(parse_duration_to_minutes("1h 30m"), 90);
        assert_eq!(parse_duration_to_minutes("45 minutes"), 45);
        assert_eq!(parse_duration_to_minutes("90 minutes"), 90);
        assert_eq!(parse_duration_to_minutes("1 hour 30 minutes"), 90);
        assert_eq!(parse_duration_to_minutes("2 hrs"), 120);
        assert_eq!(parse_duration_to_minutes("1.5 hours"), 90);
        assert_eq!(parse_duration_to_minutes("2.25 h 5 min"), 140);
        assert_eq!(parse_duration_to_minutes(""), 0);
        assert_eq!(parse_duration_to_minutes("a while"), 0);
    }

    #[test]
    fn test_parse_duration_numbers() {
        assert_eq!(parse_duration_to_minutes(90), 90);
        assert_eq!(parse_duration_to_minutes(0), 0);
        assert_eq!(parse_duration_to_minutes(-5), 0);
        assert_eq!(parse_duration_to_minutes(12.6), 13);
        assert_eq!(parse_duration_to_minutes(f64::NAN), 0);
    }

    #[test]
    fn test_parse_duration_iso() {
        assert_eq!(parse_duration_to_minutes("PT30M"), 30);
        assert_eq!(parse_duration_to_minutes("PT1H30M"), 90);
        assert_eq!(parse_duration_to_minutes("PT5400S"), 90);
        assert_eq!(parse_duration_to_minutes("PT5400.0S"), 90);
        assert_eq!(parse_duration_to_minutes("P1DT2H"), 1560);
        assert_eq!(parse_duration_to_minutes("PT150M"), 150);
        // ranges are not ISO; the free-text scan picks up the upper bound
        assert_eq!(parse_duration_to_minutes("PT15-20M"), 20);
    }

    #[test]
    fn test_duration_from_json() {
        let number = json!(25);
        let text = json!("1 hr 5 min");
        let other = json!(["PT5M"]);
        assert_eq!(
            DurationInput::from_json(&number).map(parse_duration_to_minutes),
            Some(25)
        );
        assert_eq!(
            DurationInput::from_json(&text).map(parse_duration_to_minutes),
            Some(65)
        );
        assert_eq!(DurationInput::from_json(&other), None);
    }

    #[test]
    fn test_split_ingredient_block() {
        assert_eq!(
            split_ingredient_block("2 eggs\n• 1 cup flour\n- pinch salt"),
            vec!["2 eggs", "1 cup flour", "pinch salt"]
        );
    }

    #[test]
    fn test_split_ingredient_block_keeps_inner_hyphens() {
        assert_eq!(
            split_ingredient_block("2 cups all-purpose flour\r\n\n* 1 tsp salt\n   \n"),
            vec!["2 cups all-purpose flour", "1 tsp salt"]
        );
        assert!(split_ingredient_block("").is_empty());
    }

    #[test]
    fn test_split_instruction_block() {
        assert_eq!(
            split_instruction_block("1. Mix flour\n2. Bake for 1.5 hours\n\n"),
            vec!["Mix flour", "Bake for 1.5 hours"]
        );
        assert_eq!(
            split_instruction_block("1. Whisk the eggs. 2. Fry them. 3. Serve at 350 degrees."),
            vec!["Whisk the eggs.", "Fry them.", "Serve at 350 degrees."]
        );
        assert_eq!(
            split_instruction_block("Just stir it."),
            vec!["Just stir it."]
        );
    }

    #[test]
    fn test_split_instruction_block_without_space_after_number() {
        assert_eq!(
            split_instruction_block("1.Preheat the oven.\n2.Mix the batter.\n3)Bake"),
            vec!["Preheat the oven.", "Mix the batter.", "Bake"]
        );
        assert_eq!(
            split_instruction_block("1.Add 1.5 cups stock. 2.Simmer 10 min."),
            vec!["Add 1.5 cups stock.", "Simmer 10 min."]
        );
    }

    #[test]
    fn test_decode_html_symbols() {
        assert_eq!(decode_html_symbols("Mac &amp;amp; Cheese"), "Mac & Cheese");
        assert_eq!(decode_html_symbols("Cr&egrave;me"), "Crème");
    }
}

use crate::error::ImportError;
use crate::model::{CanonicalMeal, Ingredient, MealDraft, Provenance};
use crate::normalize::{
    decode_html_symbols, parse_duration_to_minutes, split_ingredient_block,
    split_instruction_block, DurationInput,
};
use flate2::read::GzDecoder;
use log::{debug, warn};
use regex::Regex;
use serde_json::{Map, Value};
use std::io::{Cursor, Read};
use std::sync::LazyLock;
use zip::ZipArchive;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ARCHIVE_ENTRY_SUFFIX: &str = ".paprikarecipe";

/// Child tags read from each legacy XML `<recipe>` block.
const XML_FIELDS: [&str; 6] = [
    "name",
    "image",
    "total_time",
    "ingredients",
    "directions",
    "categories",
];

static RECIPE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<recipe(?:\s[^>]*)?>(.*?)</recipe\s*>").expect("recipe block regex")
});

static XML_FIELD_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    XML_FIELDS
        .iter()
        .map(|tag| {
            let re = Regex::new(&format!(r"(?is)<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>"))
                .expect("XML field regex");
            (*tag, re)
        })
        .collect()
});

static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!\[CDATA\[(.*)\]\]>$").expect("CDATA regex"));

/// Import every recipe from a Paprika export.
///
/// Accepts the `.paprikarecipes` zip archive, a single gzipped
/// `.paprikarecipe`, a JSON export (bare array or `{ "recipes": [...] }`),
/// or the legacy XML export. Output order follows the export.
///
/// # Errors
/// `FormatError` when the payload is not any of those shapes or holds no
/// recipes. Individual bad records never fail the batch.
pub fn process(bytes: &[u8]) -> Result<Vec<CanonicalMeal>, ImportError> {
    let records = read_records(bytes)?;
    debug!("Paprika: normalizing {} records", records.len());
    Ok(records.into_iter().map(normalize_record).collect())
}

fn read_records(bytes: &[u8]) -> Result<Vec<Value>, ImportError> {
    if bytes.starts_with(ZIP_MAGIC) {
        debug!("Paprika: detected zip archive");
        return read_archive(bytes);
    }
    if bytes.starts_with(GZIP_MAGIC) {
        debug!("Paprika: detected single gzipped recipe");
        let json = gunzip(bytes)?;
        return match serde_json::from_str::<Value>(&json) {
            Ok(Value::Object(obj)) if !obj.contains_key("recipes") => Ok(vec![Value::Object(obj)]),
            Ok(value) => records_from_json(value),
            Err(e) => Err(ImportError::FormatError(format!(
                "compressed recipe is not JSON: {e}"
            ))),
        };
    }

    let text = String::from_utf8_lossy(bytes);
    parse_text(text.trim_start_matches('\u{feff}'))
}

/// Detect the dialect of a textual export and return its raw recipe records.
pub fn parse_text(text: &str) -> Result<Vec<Value>, ImportError> {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => records_from_json(json),
        Err(e) => {
            debug!("Paprika: payload is not JSON ({}), trying XML", e);
            parse_xml(text)
        }
    }
}

fn records_from_json(json: Value) -> Result<Vec<Value>, ImportError> {
    match json {
        Value::Array(records) => Ok(records),
        Value::Object(mut obj) => match obj.remove("recipes") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(ImportError::FormatError(
                "unrecognized Paprika JSON shape".to_string(),
            )),
        },
        _ => Err(ImportError::FormatError(
            "unrecognized Paprika JSON shape".to_string(),
        )),
    }
}

/// Tag-boundary scan of the legacy flat XML export.
///
/// Each `<recipe>` block becomes an object of its known child tags' inner
/// text; missing children are empty strings.
fn parse_xml(xml: &str) -> Result<Vec<Value>, ImportError> {
    let records: Vec<Value> = RECIPE_BLOCK_RE
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|block| {
            let fields: Map<String, Value> = XML_FIELD_RES
                .iter()
                .map(|(tag, re)| {
                    let value = re
                        .captures(block.as_str())
                        .and_then(|caps| caps.get(1))
                        .map(|m| xml_text(m.as_str()))
                        .unwrap_or_default();
                    (tag.to_string(), Value::String(value))
                })
                .collect();
            Value::Object(fields)
        })
        .collect();

    if records.is_empty() {
        return Err(ImportError::FormatError("no recipes found".to_string()));
    }
    debug!("Paprika: found {} XML recipe blocks", records.len());
    Ok(records)
}

fn xml_text(inner: &str) -> String {
    let inner = inner.trim();
    match CDATA_RE.captures(inner).and_then(|caps| caps.get(1)) {
        Some(cdata) => cdata.as_str().trim().to_string(),
        None => decode_html_symbols(inner),
    }
}

fn read_archive(bytes: &[u8]) -> Result<Vec<Value>, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ImportError::FormatError(format!("unreadable Paprika archive: {e}")))?;

    let mut records = Vec::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Paprika: skipping unreadable archive entry {}: {}", i, e);
                continue;
            }
        };
        let entry_name = entry.name().to_string();
        if !entry_name.ends_with(ARCHIVE_ENTRY_SUFFIX) {
            debug!("Paprika: ignoring archive entry {}", entry_name);
            continue;
        }

        let mut compressed = Vec::new();
        if let Err(e) = entry.read_to_end(&mut compressed) {
            warn!("Paprika: skipping {}: {}", entry_name, e);
            continue;
        }

        let parsed = gunzip(&compressed).and_then(|json| {
            serde_json::from_str::<Value>(&json).map_err(ImportError::from)
        });
        match parsed {
            Ok(record) => records.push(record),
            Err(e) => warn!("Paprika: skipping {}: {}", entry_name, e),
        }
    }

    if records.is_empty() {
        return Err(ImportError::FormatError("no recipes found".to_string()));
    }
    Ok(records)
}

fn gunzip(bytes: &[u8]) -> Result<String, ImportError> {
    let mut json = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut json)
        .map_err(|e| ImportError::FormatError(format!("failed to decompress recipe: {e}")))?;
    Ok(json)
}

/// Map one export record onto a meal. Never fails: unknown shapes just
/// leave fields empty.
fn normalize_record(record: Value) -> CanonicalMeal {
    let name = first_field(&record, &["name", "Name"]).and_then(as_text);
    let photo_reference = first_field(&record, &["image_url", "image", "Image"]).and_then(as_text);
    let estimated_minutes = first_field(&record, &["total_time", "TotalTime", "cook_time", "CookTime"])
        .and_then(DurationInput::from_json)
        .map(parse_duration_to_minutes)
        .unwrap_or(0);
    let ingredients = first_field(&record, &["ingredients", "Ingredients"])
        .map(ingredients_from)
        .unwrap_or_default();
    let instructions = first_field(
        &record,
        &["directions", "Directions", "instructions", "Instructions"],
    )
    .map(instructions_from)
    .unwrap_or_default();
    let tags = first_field(&record, &["categories"])
        .map(tags_from)
        .unwrap_or_default();

    MealDraft {
        name,
        photo_reference,
        estimated_minutes,
        ingredients,
        instructions,
        tags,
    }
    .into_meal(Provenance::Paprika {
        raw_payload: record,
    })
}

/// First key holding a meaningful value; exports disagree on key casing.
fn first_field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| is_present(value))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ingredients_from(value: &Value) -> Vec<Ingredient> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ingredient::new(s.as_str()),
                Value::Object(obj) => obj
                    .get("name")
                    .filter(|v| is_present(v))
                    .or_else(|| obj.get("text"))
                    .and_then(Value::as_str)
                    .map(Ingredient::new)
                    .unwrap_or_else(|| Ingredient::new(item.to_string())),
                other => Ingredient::new(other.to_string()),
            })
            .collect(),
        Value::String(block) => split_ingredient_block(block)
            .into_iter()
            .map(Ingredient::new)
            .collect(),
        _ => Vec::new(),
    }
}

fn instructions_from(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(block) => split_instruction_block(block),
        _ => Vec::new(),
    }
}

fn tags_from(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        other => as_text(other).into_iter().collect(),
    }
}

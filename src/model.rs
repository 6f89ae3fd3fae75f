use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name given to a meal when no title can be recovered from the source.
pub const UNTITLED_RECIPE: &str = "Untitled Recipe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Ingredient {
            name: name.into(),
            amount: None,
            unit: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        let amount = amount.into();
        self.amount = if amount.trim().is_empty() {
            None
        } else {
            Some(amount.trim().to_string())
        };
        self
    }
}

/// Which importer produced a meal, with the untouched source record for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provenance {
    Url {
        #[serde(rename = "sourceUrl")]
        source_url: String,
        #[serde(rename = "rawPayload")]
        raw_payload: Value,
    },
    Paprika {
        #[serde(rename = "rawPayload")]
        raw_payload: Value,
    },
    Ocr,
    /// Entered by hand; never produced by an importer.
    Manual,
}

/// The normalized recipe every importer converges on.
///
/// Build one through [`MealDraft::into_meal`], which enforces the
/// non-empty name and drops blank ingredient and instruction entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMeal {
    pub name: String,
    pub photo_reference: String,
    /// Total prep + cook time. 0 means unknown.
    pub estimated_minutes: u32,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub provenance: Provenance,
    pub tags: Vec<String>,
}

/// Loose, partially filled meal assembled by an importer before it is frozen.
#[derive(Debug, Clone, Default)]
pub struct MealDraft {
    pub name: Option<String>,
    pub photo_reference: Option<String>,
    pub estimated_minutes: u32,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
}

impl MealDraft {
    pub fn into_meal(self, provenance: Provenance) -> CanonicalMeal {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNTITLED_RECIPE.to_string());

        let ingredients = self
            .ingredients
            .into_iter()
            .filter_map(|mut ing| {
                ing.name = ing.name.trim().to_string();
                (!ing.name.is_empty()).then_some(ing)
            })
            .collect();

        CanonicalMeal {
            name,
            photo_reference: self
                .photo_reference
                .map(|p| p.trim().to_string())
                .unwrap_or_default(),
            estimated_minutes: self.estimated_minutes,
            ingredients,
            instructions: non_blank(self.instructions),
            provenance,
            tags: non_blank(self.tags),
        }
    }
}

fn non_blank(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Response shape of the OCR importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrDraft {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub estimated_cooking_time: u32,
}

impl From<&CanonicalMeal> for OcrDraft {
    fn from(meal: &CanonicalMeal) -> Self {
        OcrDraft {
            name: meal.name.clone(),
            ingredients: meal.ingredients.iter().map(|i| i.name.clone()).collect(),
            instructions: meal.instructions.clone(),
            estimated_cooking_time: meal.estimated_minutes,
        }
    }
}

/// Response envelope of the Paprika importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealBatch {
    pub meals: Vec<CanonicalMeal>,
}

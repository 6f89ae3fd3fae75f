//! One module per input source. Each turns raw input into [`CanonicalMeal`]s
//! and shares nothing with the others beyond `normalize` and `model`.
//!
//! [`CanonicalMeal`]: crate::model::CanonicalMeal

pub mod ocr;
pub mod paprika;
pub mod url;

use std::fmt;

use catalog_core::CatalogError;
use serde::{Deserialize, Deserializer, Serialize};

use super::Manufacturer;

/// A catalog product as served by the collection resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,

    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: u32,

    pub price: Price,
    pub manufacturer_id: u64,

    #[serde(default)]
    pub photo_url: String,
}

/// Prices arrive either as JSON numbers or as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    /// Numeric value, when the text form parses.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Price::Number(n) => Some(*n),
            Price::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Numbers render with two decimals; strings render verbatim.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{:.2}", n),
            Price::Text(s) => f.write_str(s),
        }
    }
}

fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ── Forms ───────────────────────────────────────────────────────────

/// Creation form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub photo_url: String,
    pub manufacturer_id: u64,
}

impl ProductDraft {
    /// Local checks run before anything is sent.
    pub fn validate(&self, manufacturers: &[Manufacturer]) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("name is required".into()));
        }
        validate_price(&self.price)?;
        if !manufacturers.iter().any(|m| m.id == self.manufacturer_id) {
            return Err(CatalogError::Validation(
                "choose a manufacturer from the list".into(),
            ));
        }
        Ok(())
    }
}

/// Edit form. Sent as JSON, or as multipart when an image accompanies it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub manufacturer_id: u64,
}

impl ProductPatch {
    /// Pre-fill the edit form from the current record.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            quantity: product.quantity,
            price: product.price.to_string(),
            manufacturer_id: product.manufacturer_id,
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("name is required".into()));
        }
        validate_price(&self.price)
    }
}

/// Image file accompanying an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn validate_price(price: &str) -> Result<(), CatalogError> {
    match price.trim().parse::<f64>() {
        Ok(p) if p.is_finite() && p >= 0.0 => Ok(()),
        _ => Err(CatalogError::Validation(format!(
            "price must be a non-negative number, got {:?}",
            price
        ))),
    }
}

//! Data models for LUGI products and search hits.

use crate::smart::Source;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fully assembled product record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product title
    pub title: String,
    /// Product page URL
    pub url: String,
    /// Current price
    pub price: Option<Price>,
    /// Description text
    pub description: String,
    /// Image URLs, main image first
    pub images: Vec<String>,
    /// Specification table (name -> value)
    pub specifications: BTreeMap<String, String>,
    /// Whether the product can be bought
    pub available: bool,
    /// Brand, when the page labels one
    pub brand: Option<String>,
    /// Model number or SKU, when the page labels one
    pub model: Option<String>,
    /// Which selectors produced the core fields
    pub source: Source,
}

impl Product {
    /// Returns the price value if available.
    pub fn current_price(&self) -> Option<f64> {
        self.price.as_ref().map(|p| p.value)
    }
}

/// Price with currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in whole currency units
    pub value: f64,
    /// Currency code
    pub currency: String,
}

impl Price {
    /// Creates a price in hryvnias.
    pub fn uah(value: f64) -> Self {
        Self { value, currency: "UAH".to_string() }
    }
}

/// One product card from a search results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Absolute product URL
    pub url: String,
    /// Card title
    pub name: Option<String>,
    /// Card price
    pub price: Option<f64>,
}

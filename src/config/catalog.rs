//! Product catalog entries read from config.toml.
//!
//! The `[[products]]` tables list the products and price variants offered on estimate and
//! invoice lines. They are seeded into the database at startup; products already present by
//! name are left alone.

use serde::Deserialize;

/// A catalog product and its variants
#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    /// Display name, unique within the catalog
    pub name: String,
    /// Price variants; a product may have none
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
}

/// A priced variant of a product
#[derive(Debug, Clone, Deserialize)]
pub struct VariantConfig {
    /// Variant name, unique within its product
    pub name: String,
    /// Price for customers without a membership
    pub price_general: i64,
    /// Price for members
    pub price_member: i64,
}

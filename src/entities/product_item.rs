//! Product item entity - A catalog product that estimate and invoice lines can reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_items")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name, unique in the catalog
    pub name: String,
    /// Inactive products are hidden from the catalog but stay referenced by old documents
    pub is_active: bool,
}

/// Defines relationships between a product and its variants
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many priced variants
    #[sea_orm(has_many = "super::product_variant::Entity")]
    Variants,
}

impl Related<super::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

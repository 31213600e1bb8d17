//! Estimate item entity - One priced line on an estimate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Estimate line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "estimate_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning estimate
    pub estimate_id: i64,
    /// Catalog product, absent for free-form lines
    pub product_item_id: Option<i64>,
    /// Catalog variant of the product
    pub product_variant_id: Option<i64>,
    /// Free text shown on the line
    pub description: Option<String>,
    /// Unit price for non-members
    pub unit_price_general: i64,
    /// Unit price for members
    pub unit_price_member: i64,
    /// Quantity
    pub qty: i32,
    /// Line total as supplied by the caller (not recomputed from price and quantity)
    pub amount: i64,
    /// Display order within the document
    pub sort_no: i32,
}

/// Defines relationships between an estimate line and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning estimate; lines are deleted with it
    #[sea_orm(
        belongs_to = "super::estimate::Entity",
        from = "Column::EstimateId",
        to = "super::estimate::Column::Id",
        on_delete = "Cascade"
    )]
    Estimate,
    /// Optional catalog product
    #[sea_orm(
        belongs_to = "super::product_item::Entity",
        from = "Column::ProductItemId",
        to = "super::product_item::Column::Id"
    )]
    ProductItem,
    /// Optional catalog variant
    #[sea_orm(
        belongs_to = "super::product_variant::Entity",
        from = "Column::ProductVariantId",
        to = "super::product_variant::Column::Id"
    )]
    ProductVariant,
}

impl Related<super::estimate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Estimate.def()
    }
}

impl Related<super::product_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductItem.def()
    }
}

impl Related<super::product_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductVariant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

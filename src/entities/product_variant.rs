//! Product variant entity - A priced grade of a catalog product.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product variant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    /// Unique identifier for the variant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning product
    pub product_item_id: i64,
    /// Variant name
    pub name: String,
    /// Price for non-members
    pub price_general: i64,
    /// Price for members
    pub price_member: i64,
    /// Inactive variants are hidden from the catalog
    pub is_active: bool,
}

/// Defines relationships between a variant and its product
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Owning product; variants are deleted with it
    #[sea_orm(
        belongs_to = "super::product_item::Entity",
        from = "Column::ProductItemId",
        to = "super::product_item::Column::Id",
        on_delete = "Cascade"
    )]
    ProductItem,
}

impl Related<super::product_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

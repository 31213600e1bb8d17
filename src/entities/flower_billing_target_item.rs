//! Join row linking one flower to the billing target it is currently grouped under.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Target/flower link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flower_billing_target_items")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Target the flower is grouped under
    pub flower_billing_target_id: i64,
    /// Linked flower
    pub flower_id: i64,
}

/// Defines relationships of the flower-to-target join table
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The target; links are deleted with it
    #[sea_orm(
        belongs_to = "super::flower_billing_target::Entity",
        from = "Column::FlowerBillingTargetId",
        to = "super::flower_billing_target::Column::Id",
        on_delete = "Cascade"
    )]
    FlowerBillingTarget,
    /// The linked flower
    #[sea_orm(
        belongs_to = "super::flower::Entity",
        from = "Column::FlowerId",
        to = "super::flower::Column::Id"
    )]
    Flower,
}

impl Related<super::flower_billing_target::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowerBillingTarget.def()
    }
}

impl Related<super::flower::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flower.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Flower entity - A single floral offering ordered for a case.
//!
//! The bill-to name, address, and phone decide which billing target the order is grouped under.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Flower order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flowers")]
pub struct Model {
    /// Unique identifier for the flower order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Case the offering is for
    pub customer_id: i64,
    /// Person who requested the offering
    pub requester_name: String,
    /// Name printed on the label
    pub label_name: Option<String>,
    /// Additional names for joint offerings
    pub joint_names: Option<String>,
    /// Who pays for the offering
    pub bill_to_name: String,
    /// Payer's address
    pub bill_to_address: String,
    /// Payer's phone
    pub bill_to_tel: Option<String>,
    /// Delivery destination
    pub delivery_to: Option<String>,
    /// Price in yen
    pub amount: i64,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Flower and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Case the offering is for
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Join rows tying the flower to its billing target
    #[sea_orm(has_many = "super::flower_billing_target_item::Entity")]
    BillingTargetItems,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::flower_billing_target_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingTargetItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

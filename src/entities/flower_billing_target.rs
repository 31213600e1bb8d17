//! Flower billing target entity - One payer identity within a case.
//!
//! Unique per `(customer_id, bill_to_key)`; the key is a SHA-256 digest of the bill-to fields.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Billing target database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flower_billing_targets")]
pub struct Model {
    /// Unique identifier for the billing target
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning case
    pub customer_id: i64,
    /// Bill-to fields captured from the first flower that produced this key
    pub bill_to_name: String,
    /// Bill-to address
    pub bill_to_address: String,
    /// Bill-to phone, `None` when the key was built without one
    pub bill_to_tel: Option<String>,
    /// Hex SHA-256 of `name|address|tel`
    pub bill_to_key: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between a billing target and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Case the target groups flowers for
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Join rows naming the grouped flowers
    #[sea_orm(has_many = "super::flower_billing_target_item::Entity")]
    Items,
    /// Ledger rows recorded against this target
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::flower_billing_target_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Payment entity - Append-only ledger of PAID and CANCELLED events.
//!
//! Exactly one of `invoice_id` / `flower_billing_target_id` is set, matching `target_type`.
//! Rows are never updated or deleted; the current status of a target is the status of its
//! newest row.

use super::sea_orm_active_enums::{PaymentStatus, PaymentTargetType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment ledger row database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Autoincrement id, also the tiebreaker for rows created in the same instant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Case the target belongs to
    pub customer_id: i64,
    /// Which of `invoice_id` and `flower_billing_target_id` is set
    pub target_type: PaymentTargetType,
    /// PAID or CANCELLED
    pub status: PaymentStatus,
    /// Set for invoice payments
    pub invoice_id: Option<i64>,
    /// Set for flower target payments
    pub flower_billing_target_id: Option<i64>,
    /// When the money moved (as reported by staff)
    pub paid_at: DateTimeUtc,
    /// Yen received, or reversed for CANCELLED rows
    pub amount: i64,
    /// Free-form note
    pub memo: Option<String>,
    /// Authenticated subject that recorded the row
    pub created_by_id: Option<i64>,
    /// Ledger append time
    pub created_at: DateTimeUtc,
}

/// Defines relationships between a ledger row and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Case the payment belongs to
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Paid invoice, for invoice rows
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
    /// Paid billing target, for flower rows
    #[sea_orm(
        belongs_to = "super::flower_billing_target::Entity",
        from = "Column::FlowerBillingTargetId",
        to = "super::flower_billing_target::Column::Id"
    )]
    FlowerBillingTarget,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::flower_billing_target::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowerBillingTarget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

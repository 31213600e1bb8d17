//! Invoice entity - A bill issued for a case.
//!
//! Structurally the same as an estimate. An invoice converted from an estimate records the
//! source in `from_estimate_id`; the copy is a snapshot and is not kept in sync.

use super::sea_orm_active_enums::{AltarPlaceType, CremationProcessType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice header database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning case
    pub customer_id: i64,
    /// Document number, assigned when issued
    pub doc_no: Option<String>,
    /// Free-form status label, `DRAFT` on creation
    pub status: String,
    /// Sum of line amounts
    pub subtotal: i64,
    /// Consumption tax on the subtotal
    pub tax: i64,
    /// Subtotal plus tax
    pub total: i64,
    /// Membership prepayment deducted at the time of the last save
    pub membership_paid_amount: i64,
    /// Amount due after the membership deduction, never negative
    pub grand_total: i64,
    /// Estimate this invoice was generated from, if any
    pub from_estimate_id: Option<i64>,
    /// Who carries out the cremation procedure
    pub cremation_process_type: Option<CremationProcessType>,
    /// Where the altar is set up
    pub altar_place_type: Option<AltarPlaceType>,
    /// Ceiling height of the altar room
    pub ceiling_height: Option<String>,
    /// Staff member who drew up the estimate
    pub estimate_staff: Option<String>,
    /// Staff member running the ceremony
    pub ceremony_staff: Option<String>,
    /// Staff member handling transport
    pub transport_staff: Option<String>,
    /// Staff member handling decoration
    pub decoration_staff: Option<String>,
    /// Staff member handling returns
    pub return_staff: Option<String>,
    /// Issue date printed on the document
    pub issued_at: Option<DateTimeUtc>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The case being billed
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    /// Source estimate of a converted invoice
    #[sea_orm(
        belongs_to = "super::estimate::Entity",
        from = "Column::FromEstimateId",
        to = "super::estimate::Column::Id"
    )]
    FromEstimate,
    /// Line items, replaced wholesale on every update
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    Items,
    /// Ledger rows recorded against this invoice
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::estimate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FromEstimate.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
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

//! Customer membership entity - A prepaid membership plan row attached to a case.
//!
//! A case carries at most three rows, numbered 1 to 3. Only `payment_amount` feeds billing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership row database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_memberships")]
pub struct Model {
    /// Unique identifier for the membership row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning case
    pub customer_id: i64,
    /// Row number on the intake form, 1 through 3
    pub row_no: i32,
    /// Membership number
    pub member_no: Option<String>,
    /// Enrolment date
    pub joined_at: Option<DateTimeUtc>,
    /// Name the membership is held under
    pub member_name: Option<String>,
    /// Number of course units bought
    pub course_units: Option<i32>,
    /// Amount the plan pays out at maturity
    pub maturity_amount: Option<i64>,
    /// Instalments paid so far
    pub payment_times: Option<i32>,
    /// Yen already paid into the plan; deducted from estimates and invoices
    pub payment_amount: Option<i64>,
    /// Staff member who sold the membership
    pub sales_staff_name: Option<String>,
    /// Member's relation to the deceased
    pub relation_to_deceased: Option<String>,
}

/// Defines relationships between a membership row and its case
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one case; deleted with it
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

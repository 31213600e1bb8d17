//! Customer entity - One funeral case.
//!
//! Holds the deceased's details, chief mourner and payer contacts, and the funeral schedule.
//! Memberships, estimates, invoices, and flower orders all hang off a customer.

use super::sea_orm_active_enums::Gender;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer (case) database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    /// Unique identifier for the case
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the deceased
    pub deceased_name: String,
    /// Family name of the deceased
    pub deceased_last_name: Option<String>,
    /// Given name of the deceased
    pub deceased_first_name: Option<String>,
    /// Coerced gender, `None` when unrecognised
    pub gender: Option<Gender>,
    /// Age at death
    pub age: Option<i32>,
    /// Religion or sect
    pub religion: Option<String>,
    /// When the case was taken in
    pub reception_at: Option<DateTimeUtc>,
    /// Chief mourner's name
    pub chief_mourner_name: Option<String>,
    /// Chief mourner's relation to the deceased
    pub chief_mourner_relation: Option<String>,
    /// Reference into the city lookup table (maintained elsewhere)
    pub chief_mourner_city_id: Option<i64>,
    /// Reference into the town lookup table (maintained elsewhere)
    pub chief_mourner_town_id: Option<i64>,
    /// Chief mourner's street address
    pub chief_mourner_address: Option<String>,
    /// Chief mourner's phone
    pub chief_mourner_tel: Option<String>,
    /// Person paying for the funeral
    pub payer_name: Option<String>,
    /// Payer's relation to the deceased
    pub payer_relation: Option<String>,
    /// Payer's address
    pub payer_address: Option<String>,
    /// Payer's phone
    pub payer_tel: Option<String>,
    /// Where the body is collected
    pub pickup_place: Option<String>,
    /// Wake start
    pub wake_at: Option<DateTimeUtc>,
    /// Wake venue
    pub wake_place: Option<String>,
    /// Departure time
    pub departure_at: Option<DateTimeUtc>,
    /// Departure venue
    pub departure_place: Option<String>,
    /// Funeral start
    pub funeral_from: Option<DateTimeUtc>,
    /// Funeral end
    pub funeral_to: Option<DateTimeUtc>,
    /// Funeral venue
    pub funeral_place: Option<String>,
    /// Return time
    pub return_at: Option<DateTimeUtc>,
    /// Return venue
    pub return_place: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Note about the member card
    pub member_card_note: Option<String>,
    /// When the case was created
    pub created_at: DateTimeUtc,
    /// When the case was last saved
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Customer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Up to three prepaid membership rows
    #[sea_orm(has_many = "super::customer_membership::Entity")]
    Memberships,
    /// Quotations drawn up for the case
    #[sea_orm(has_many = "super::estimate::Entity")]
    Estimates,
    /// Invoices issued for the case
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
    /// Flower offerings ordered for the funeral
    #[sea_orm(has_many = "super::flower::Entity")]
    Flowers,
    /// Bill-to groups for those flowers
    #[sea_orm(has_many = "super::flower_billing_target::Entity")]
    FlowerBillingTargets,
}

impl Related<super::customer_membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::estimate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Estimates.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::flower::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flowers.def()
    }
}

impl Related<super::flower_billing_target::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowerBillingTargets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

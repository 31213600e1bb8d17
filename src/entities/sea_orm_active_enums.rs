//! Enumerations stored as short strings and exchanged at the JSON boundary.
//!
//! Each enum also accepts lenient input through [`coerce`]: unknown or absent values become
//! `None` instead of an error.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gender of the deceased
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    /// Male
    #[sea_orm(string_value = "MALE")]
    Male,
    /// Female
    #[sea_orm(string_value = "FEMALE")]
    Female,
    /// Other / unspecified
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Who carries out the cremation procession
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CremationProcessType {
    /// Family only
    #[sea_orm(string_value = "FAMILY")]
    Family,
    /// Neighbourhood association
    #[sea_orm(string_value = "NEIGHBORHOOD")]
    Neighborhood,
    /// Company funeral
    #[sea_orm(string_value = "COMPANY")]
    Company,
}

/// Where the altar is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AltarPlaceType {
    /// At the family home
    #[sea_orm(string_value = "HOME")]
    Home,
    /// At the funeral hall
    #[sea_orm(string_value = "FUNERAL_HALL")]
    FuneralHall,
}

/// Ledger event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Money received
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Reversal of an earlier PAID row
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// What a payment row is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTargetType {
    /// `payments.invoice_id` is set
    #[sea_orm(string_value = "INVOICE")]
    Invoice,
    /// `payments.flower_billing_target_id` is set
    #[sea_orm(string_value = "FLOWER_TARGET")]
    FlowerTarget,
}

/// Parses a raw boundary value into an enum, mapping unknown or empty input to `None`.
#[must_use]
pub fn coerce<E>(raw: Option<&str>) -> Option<E>
where
    E: ActiveEnum<Value = String>,
{
    raw.and_then(|value| E::try_from_value(&value.to_string()).ok())
}

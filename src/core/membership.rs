//! Membership ledger - prepaid membership rows and the prepaid total they add up to.
//!
//! A case carries up to three membership rows (row numbers 1–3). Their `payment_amount`s sum
//! to the prepaid figure deducted from every estimate and invoice. The figure is read fresh on
//! each document write and never cached on the case.

use crate::{
    core::{ids::CustomerId, input::non_empty, money::Yen},
    entities::{CustomerMembership, customer_membership},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Lowest valid membership row number
pub const FIRST_ROW_NO: i32 = 1;
/// Highest valid membership row number
pub const LAST_ROW_NO: i32 = 3;

/// One membership row as submitted on the case form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MembershipInput {
    /// Row on the form; rows outside 1–3 are ignored
    pub row_no: i32,
    /// Membership number
    pub member_no: Option<String>,
    /// Enrolment date
    pub joined_at: Option<DateTime<Utc>>,
    /// Name the membership is held under
    pub member_name: Option<String>,
    /// Number of course units bought
    pub course_units: Option<i32>,
    /// Amount the plan pays out at maturity
    pub maturity_amount: Option<i64>,
    /// Instalments paid so far
    pub payment_times: Option<i32>,
    /// Amount paid in so far; this is what gets deducted
    pub payment_amount: Option<i64>,
    /// Staff member who sold the membership
    pub sales_staff_name: Option<String>,
    /// Member's relation to the deceased
    pub relation_to_deceased: Option<String>,
}

/// Sums the prepaid amounts of a case's membership rows, treating missing amounts as zero.
///
/// # Errors
/// Returns [`Error::AmountOutOfRange`] if the sum does not fit in an `i64`.
pub fn total_prepaid(memberships: &[customer_membership::Model]) -> Result<Yen> {
    let amounts = memberships
        .iter()
        .map(|m| Yen::new(m.payment_amount.unwrap_or(0)));
    Yen::checked_sum(amounts).ok_or_else(|| Error::AmountOutOfRange {
        what: "membership prepaid".to_string(),
    })
}

/// Loads a case's membership rows ordered by row number.
pub async fn get_memberships<C>(
    db: &C,
    customer_id: CustomerId,
) -> Result<Vec<customer_membership::Model>>
where
    C: ConnectionTrait,
{
    CustomerMembership::find()
        .filter(customer_membership::Column::CustomerId.eq(customer_id.get()))
        .order_by_asc(customer_membership::Column::RowNo)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Reads the current prepaid total for a case straight from its membership rows.
pub async fn prepaid_for_customer<C>(db: &C, customer_id: CustomerId) -> Result<Yen>
where
    C: ConnectionTrait,
{
    let memberships = get_memberships(db, customer_id).await?;
    total_prepaid(&memberships)
}

/// Keeps rows 1–3 only, first submission per row number winning.
fn select_rows(inputs: &[MembershipInput]) -> Vec<&MembershipInput> {
    let mut by_row: BTreeMap<i32, &MembershipInput> = BTreeMap::new();
    for input in inputs
        .iter()
        .filter(|m| (FIRST_ROW_NO..=LAST_ROW_NO).contains(&m.row_no))
    {
        by_row.entry(input.row_no).or_insert(input);
    }
    by_row.into_values().collect()
}

/// Replaces every membership row of a case with the submitted set.
///
/// Must be called inside the transaction that saves the case so readers never see the case
/// between the delete and the inserts.
pub async fn replace_memberships<C>(
    db: &C,
    customer_id: CustomerId,
    inputs: &[MembershipInput],
) -> Result<Vec<customer_membership::Model>>
where
    C: ConnectionTrait,
{
    let deleted = CustomerMembership::delete_many()
        .filter(customer_membership::Column::CustomerId.eq(customer_id.get()))
        .exec(db)
        .await?;

    let mut inserted = Vec::new();
    for input in select_rows(inputs) {
        let row = customer_membership::ActiveModel {
            customer_id: Set(customer_id.get()),
            row_no: Set(input.row_no),
            member_no: Set(non_empty(input.member_no.clone())),
            joined_at: Set(input.joined_at),
            member_name: Set(non_empty(input.member_name.clone())),
            course_units: Set(input.course_units),
            maturity_amount: Set(input.maturity_amount),
            payment_times: Set(input.payment_times),
            payment_amount: Set(input.payment_amount),
            sales_staff_name: Set(non_empty(input.sales_staff_name.clone())),
            relation_to_deceased: Set(non_empty(input.relation_to_deceased.clone())),
            ..Default::default()
        };
        inserted.push(row.insert(db).await?);
    }

    debug!(
        customer_id = %customer_id,
        removed = deleted.rows_affected,
        inserted = inserted.len(),
        "Replaced membership rows"
    );
    Ok(inserted)
}

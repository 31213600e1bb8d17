//! Case intake - creating, editing, and listing funeral cases.
//!
//! A case save writes the case row and, when the form carries membership rows, replaces them
//! wholesale. Both happen in one transaction.

use crate::{
    core::{
        ids::{CityId, CustomerId, InvoiceId, TownId},
        input::non_empty,
        membership::{self, MembershipInput},
        money::Yen,
    },
    entities::{
        Customer, Estimate, Invoice, Payment, customer, customer_membership, estimate, invoice,
        payment,
        sea_orm_active_enums::{self, Gender, PaymentStatus, PaymentTargetType},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

/// Case form payload. Empty strings are stored as `NULL`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    /// Full name of the deceased
    pub deceased_name: String,
    /// Family name, used by the list search
    pub deceased_last_name: Option<String>,
    /// Given name, used by the list search
    pub deceased_first_name: Option<String>,
    /// `MALE`, `FEMALE`, or `OTHER`; anything else is stored as `NULL`
    pub gender: Option<String>,
    /// Age at death
    pub age: Option<i32>,
    /// Religion or sect
    pub religion: Option<String>,
    /// When the case was taken in
    pub reception_at: Option<DateTime<Utc>>,
    /// Chief mourner's name
    pub chief_mourner_name: Option<String>,
    /// Chief mourner's relation to the deceased
    pub chief_mourner_relation: Option<String>,
    /// Chief mourner's city
    pub chief_mourner_city_id: Option<CityId>,
    /// Chief mourner's town
    pub chief_mourner_town_id: Option<TownId>,
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
    pub wake_at: Option<DateTime<Utc>>,
    /// Wake venue
    pub wake_place: Option<String>,
    /// Departure time
    pub departure_at: Option<DateTime<Utc>>,
    /// Departure venue
    pub departure_place: Option<String>,
    /// Funeral start
    pub funeral_from: Option<DateTime<Utc>>,
    /// Funeral end
    pub funeral_to: Option<DateTime<Utc>>,
    /// Funeral venue
    pub funeral_place: Option<String>,
    /// Return time
    pub return_at: Option<DateTime<Utc>>,
    /// Return venue
    pub return_place: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Note about the member card
    pub member_card_note: Option<String>,
    /// When present, replaces all membership rows; when absent, rows are left alone
    pub memberships: Option<Vec<MembershipInput>>,
}

/// A case together with its membership rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    /// The case row
    pub customer: customer::Model,
    /// Ordered by row number
    pub memberships: Vec<customer_membership::Model>,
    /// Sum of the membership payment amounts
    pub membership_prepaid: Yen,
}

/// Paid-state filter for the case list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaidFilter {
    /// No filtering
    #[default]
    Any,
    /// Only cases whose invoice is currently paid
    Paid,
    /// Cases without an invoice, or whose invoice is not currently paid
    Unpaid,
}

impl PaidFilter {
    /// Builds the filter from the two list-screen checkboxes; `paid` wins when both are set.
    #[must_use]
    pub const fn from_flags(paid: bool, unpaid: bool) -> Self {
        if paid {
            Self::Paid
        } else if unpaid {
            Self::Unpaid
        } else {
            Self::Any
        }
    }
}

/// Search conditions for the case list.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Chief mourner's city
    pub city_id: Option<CityId>,
    /// Chief mourner's town
    pub town_id: Option<TownId>,
    /// Substring of the deceased's family name (OR-combined with `first_name`)
    pub last_name: Option<String>,
    /// Substring of the deceased's given name (OR-combined with `last_name`)
    pub first_name: Option<String>,
    /// Earliest reception time, inclusive
    pub reception_from: Option<DateTime<Utc>>,
    /// Latest reception time, inclusive
    pub reception_to: Option<DateTime<Utc>>,
    /// Earliest funeral start, inclusive
    pub funeral_from: Option<DateTime<Utc>>,
    /// Latest funeral start, inclusive
    pub funeral_to: Option<DateTime<Utc>>,
    /// Paid-state restriction
    pub paid: PaidFilter,
}

/// One row of the case list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    /// Case id
    pub id: CustomerId,
    /// Full name of the deceased
    pub deceased_name: String,
    /// Age at death
    pub age: Option<i32>,
    /// Chief mourner's address, empty when unknown
    pub address: String,
    /// When the case was taken in
    pub reception_at: Option<DateTime<Utc>>,
    /// Funeral start
    pub funeral_from: Option<DateTime<Utc>>,
    /// At least one estimate exists
    pub has_estimate: bool,
    /// At least one invoice exists
    pub has_invoice: bool,
    /// The case's first invoice, which decides `is_paid`
    pub invoice_id: Option<InvoiceId>,
    /// Latest ledger row of `invoice_id` is PAID
    pub is_paid: bool,
}

fn apply_input(model: &mut customer::ActiveModel, input: CustomerInput) {
    model.deceased_name = Set(input.deceased_name);
    model.deceased_last_name = Set(non_empty(input.deceased_last_name));
    model.deceased_first_name = Set(non_empty(input.deceased_first_name));
    model.gender = Set(sea_orm_active_enums::coerce::<Gender>(input.gender.as_deref()));
    model.age = Set(input.age);
    model.religion = Set(non_empty(input.religion));
    model.reception_at = Set(input.reception_at);
    model.chief_mourner_name = Set(non_empty(input.chief_mourner_name));
    model.chief_mourner_relation = Set(non_empty(input.chief_mourner_relation));
    model.chief_mourner_city_id = Set(input.chief_mourner_city_id.map(CityId::get));
    model.chief_mourner_town_id = Set(input.chief_mourner_town_id.map(TownId::get));
    model.chief_mourner_address = Set(non_empty(input.chief_mourner_address));
    model.chief_mourner_tel = Set(non_empty(input.chief_mourner_tel));
    model.payer_name = Set(non_empty(input.payer_name));
    model.payer_relation = Set(non_empty(input.payer_relation));
    model.payer_address = Set(non_empty(input.payer_address));
    model.payer_tel = Set(non_empty(input.payer_tel));
    model.pickup_place = Set(non_empty(input.pickup_place));
    model.wake_at = Set(input.wake_at);
    model.wake_place = Set(non_empty(input.wake_place));
    model.departure_at = Set(input.departure_at);
    model.departure_place = Set(non_empty(input.departure_place));
    model.funeral_from = Set(input.funeral_from);
    model.funeral_to = Set(input.funeral_to);
    model.funeral_place = Set(non_empty(input.funeral_place));
    model.return_at = Set(input.return_at);
    model.return_place = Set(non_empty(input.return_place));
    model.notes = Set(non_empty(input.notes));
    model.member_card_note = Set(non_empty(input.member_card_note));
    model.updated_at = Set(Utc::now());
}

/// Loads a case or fails with [`Error::CustomerNotFound`].
pub async fn find_customer<C>(db: &C, customer_id: CustomerId) -> Result<customer::Model>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id.get())
        .one(db)
        .await?
        .ok_or_else(|| Error::CustomerNotFound {
            id: customer_id.to_string(),
        })
}

/// Creates a case and its membership rows.
#[instrument(skip(db, input))]
pub async fn create_customer(
    db: &DatabaseConnection,
    mut input: CustomerInput,
) -> Result<CustomerDetail> {
    let memberships_input = input.memberships.take();

    let txn = db.begin().await?;

    let mut model = customer::ActiveModel {
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    apply_input(&mut model, input);
    let customer = model.insert(&txn).await?;
    let customer_id = CustomerId::new(customer.id);

    let memberships = match memberships_input {
        Some(rows) => membership::replace_memberships(&txn, customer_id, &rows).await?,
        None => Vec::new(),
    };
    let membership_prepaid = membership::total_prepaid(&memberships)?;

    txn.commit().await?;

    info!(customer_id = %customer_id, memberships = memberships.len(), "Created case");
    Ok(CustomerDetail {
        customer,
        memberships,
        membership_prepaid,
    })
}

/// Overwrites a case; replaces its membership rows only when the input carries them.
#[instrument(skip(db, input))]
pub async fn update_customer(
    db: &DatabaseConnection,
    customer_id: CustomerId,
    mut input: CustomerInput,
) -> Result<CustomerDetail> {
    let memberships_input = input.memberships.take();

    let txn = db.begin().await?;

    let existing = find_customer(&txn, customer_id).await?;
    let mut model: customer::ActiveModel = existing.into();
    apply_input(&mut model, input);
    let customer = model.update(&txn).await?;

    if let Some(rows) = memberships_input {
        membership::replace_memberships(&txn, customer_id, &rows).await?;
    }
    let memberships = membership::get_memberships(&txn, customer_id).await?;
    let membership_prepaid = membership::total_prepaid(&memberships)?;

    txn.commit().await?;

    info!(customer_id = %customer_id, "Updated case");
    Ok(CustomerDetail {
        customer,
        memberships,
        membership_prepaid,
    })
}

/// Loads a case with its membership rows.
pub async fn get_customer(
    db: &DatabaseConnection,
    customer_id: CustomerId,
) -> Result<CustomerDetail> {
    let customer = find_customer(db, customer_id).await?;
    let memberships = membership::get_memberships(db, customer_id).await?;
    let membership_prepaid = membership::total_prepaid(&memberships)?;
    Ok(CustomerDetail {
        customer,
        memberships,
        membership_prepaid,
    })
}

fn search_condition(filter: &CaseFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(city_id) = filter.city_id {
        condition = condition.add(customer::Column::ChiefMournerCityId.eq(city_id.get()));
    }
    if let Some(town_id) = filter.town_id {
        condition = condition.add(customer::Column::ChiefMournerTownId.eq(town_id.get()));
    }

    let last_name = filter.last_name.as_deref().filter(|s| !s.is_empty());
    let first_name = filter.first_name.as_deref().filter(|s| !s.is_empty());
    if last_name.is_some() || first_name.is_some() {
        let mut names = Condition::any();
        if let Some(last_name) = last_name {
            names = names.add(customer::Column::DeceasedLastName.contains(last_name));
        }
        if let Some(first_name) = first_name {
            names = names.add(customer::Column::DeceasedFirstName.contains(first_name));
        }
        condition = condition.add(names);
    }

    if let Some(from) = filter.reception_from {
        condition = condition.add(customer::Column::ReceptionAt.gte(from));
    }
    if let Some(to) = filter.reception_to {
        condition = condition.add(customer::Column::ReceptionAt.lte(to));
    }
    if let Some(from) = filter.funeral_from {
        condition = condition.add(customer::Column::FuneralFrom.gte(from));
    }
    if let Some(to) = filter.funeral_to {
        condition = condition.add(customer::Column::FuneralFrom.lte(to));
    }

    condition
}

/// Lists cases for the case screen, newest reception first.
///
/// A case's paid state comes from its first invoice (lowest id): paid when that invoice's
/// latest ledger row is PAID. Cases without an invoice count as unpaid.
#[instrument(skip(db))]
pub async fn list_cases(db: &DatabaseConnection, filter: &CaseFilter) -> Result<Vec<CaseSummary>> {
    let customers = Customer::find()
        .filter(search_condition(filter))
        .order_by_desc(customer::Column::ReceptionAt)
        .order_by_desc(customer::Column::CreatedAt)
        .all(db)
        .await?;

    if customers.is_empty() {
        return Ok(Vec::new());
    }
    let customer_ids: Vec<i64> = customers.iter().map(|c| c.id).collect();

    let with_estimates: HashSet<i64> = Estimate::find()
        .select_only()
        .column(estimate::Column::CustomerId)
        .filter(estimate::Column::CustomerId.is_in(customer_ids.clone()))
        .into_tuple::<i64>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let mut first_invoice: HashMap<i64, i64> = HashMap::new();
    for inv in Invoice::find()
        .filter(invoice::Column::CustomerId.is_in(customer_ids))
        .order_by_asc(invoice::Column::Id)
        .all(db)
        .await?
    {
        first_invoice.entry(inv.customer_id).or_insert(inv.id);
    }

    // Newest row first, so the first status seen per invoice is its current one
    let mut invoice_status: HashMap<i64, PaymentStatus> = HashMap::new();
    if !first_invoice.is_empty() {
        let invoice_ids: Vec<i64> = first_invoice.values().copied().collect();
        let payments = Payment::find()
            .filter(payment::Column::TargetType.eq(PaymentTargetType::Invoice))
            .filter(payment::Column::InvoiceId.is_in(invoice_ids))
            .order_by_desc(payment::Column::CreatedAt)
            .order_by_desc(payment::Column::Id)
            .all(db)
            .await?;
        for row in payments {
            if let Some(invoice_id) = row.invoice_id {
                invoice_status.entry(invoice_id).or_insert(row.status);
            }
        }
    }

    let summaries = customers
        .into_iter()
        .map(|c| {
            let invoice_id = first_invoice.get(&c.id).copied();
            let is_paid = invoice_id
                .and_then(|id| invoice_status.get(&id))
                .is_some_and(|status| *status == PaymentStatus::Paid);
            CaseSummary {
                id: CustomerId::new(c.id),
                has_estimate: with_estimates.contains(&c.id),
                has_invoice: invoice_id.is_some(),
                invoice_id: invoice_id.map(InvoiceId::new),
                is_paid,
                deceased_name: c.deceased_name,
                age: c.age,
                address: c.chief_mourner_address.unwrap_or_default(),
                reception_at: c.reception_at,
                funeral_from: c.funeral_from,
            }
        })
        .filter(|summary| match filter.paid {
            PaidFilter::Any => true,
            PaidFilter::Paid => summary.is_paid,
            PaidFilter::Unpaid => !summary.is_paid,
        })
        .collect();

    Ok(summaries)
}

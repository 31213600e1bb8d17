//! Payment ledger - append-only PAID / CANCELLED events per billable target.
//!
//! Rows are only ever inserted. The current status of a target is the status of its newest row,
//! ordered by `created_at` with the autoincrement id breaking ties. A cancellation appends a row
//! that reverses the amount of the PAID row it cancels.

use crate::{
    core::{
        flower,
        ids::{CustomerId, FlowerBillingTargetId, InvoiceId, UserId},
        input::non_empty,
        invoice,
        money::Yen,
    },
    entities::{
        Payment, payment,
        sea_orm_active_enums::{PaymentStatus, PaymentTargetType},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use std::fmt;
use tracing::{info, instrument};

/// Memo written on cancellation rows when none is given
pub const CANCELLATION_MEMO: &str = "入金取消";

/// Something a payment can be recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentTarget {
    /// A funeral invoice
    Invoice(InvoiceId),
    /// A flower billing target
    FlowerTarget(FlowerBillingTargetId),
}

impl PaymentTarget {
    /// The ledger's discriminator for this target.
    #[must_use]
    pub const fn target_type(self) -> PaymentTargetType {
        match self {
            Self::Invoice(_) => PaymentTargetType::Invoice,
            Self::FlowerTarget(_) => PaymentTargetType::FlowerTarget,
        }
    }

    fn condition(self) -> Condition {
        let by_id = match self {
            Self::Invoice(id) => payment::Column::InvoiceId.eq(id.get()),
            Self::FlowerTarget(id) => payment::Column::FlowerBillingTargetId.eq(id.get()),
        };
        Condition::all()
            .add(payment::Column::TargetType.eq(self.target_type()))
            .add(by_id)
    }
}

impl fmt::Display for PaymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invoice(id) => write!(f, "invoice {id}"),
            Self::FlowerTarget(id) => write!(f, "flower billing target {id}"),
        }
    }
}

/// A ledger row about to be appended.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Case the target belongs to
    pub customer_id: CustomerId,
    /// What is being paid or cancelled
    pub target: PaymentTarget,
    /// PAID or CANCELLED
    pub status: PaymentStatus,
    /// When the money moved, as entered by staff
    pub paid_at: DateTime<Utc>,
    /// Amount received; a cancellation repeats the cancelled amount
    pub amount: Yen,
    /// Free-form note
    pub memo: Option<String>,
    /// Staff user who recorded the row
    pub created_by: Option<UserId>,
}

/// Appends one row to the ledger. Never touches existing rows.
pub async fn record_payment<C>(db: &C, new: NewPayment) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    let (invoice_id, flower_billing_target_id) = match new.target {
        PaymentTarget::Invoice(id) => (Some(id.get()), None),
        PaymentTarget::FlowerTarget(id) => (None, Some(id.get())),
    };

    let row = payment::ActiveModel {
        customer_id: Set(new.customer_id.get()),
        target_type: Set(new.target.target_type()),
        status: Set(new.status),
        invoice_id: Set(invoice_id),
        flower_billing_target_id: Set(flower_billing_target_id),
        paid_at: Set(new.paid_at),
        amount: Set(new.amount.get()),
        memo: Set(non_empty(new.memo)),
        created_by_id: Set(new.created_by.map(UserId::get)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        payment_id = row.id,
        target = %new.target,
        status = ?row.status,
        amount = row.amount,
        "Recorded payment"
    );
    Ok(row)
}

/// The newest ledger row for a target, if any.
pub async fn latest<C>(db: &C, target: PaymentTarget) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(target.condition())
        .order_by_desc(payment::Column::CreatedAt)
        .order_by_desc(payment::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Current status of a target; `None` when nothing has been recorded.
pub async fn current_status<C>(db: &C, target: PaymentTarget) -> Result<Option<PaymentStatus>>
where
    C: ConnectionTrait,
{
    Ok(latest(db, target).await?.map(|row| row.status))
}

/// Every ledger row of a target, oldest first.
pub async fn payment_history(
    db: &DatabaseConnection,
    target: PaymentTarget,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(target.condition())
        .order_by_asc(payment::Column::CreatedAt)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Appends a CANCELLED row reversing the target's latest PAID row.
///
/// Fails with [`Error::NoPaidRecord`] unless the target is currently PAID.
async fn cancel_latest<C>(
    db: &C,
    customer_id: CustomerId,
    target: PaymentTarget,
    paid_at: DateTime<Utc>,
    memo: Option<String>,
    created_by: Option<UserId>,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    let paid = latest(db, target)
        .await?
        .filter(|row| row.status == PaymentStatus::Paid)
        .ok_or_else(|| Error::NoPaidRecord {
            target: target.to_string(),
        })?;

    record_payment(
        db,
        NewPayment {
            customer_id,
            target,
            status: PaymentStatus::Cancelled,
            paid_at,
            amount: Yen::new(paid.amount),
            memo: Some(non_empty(memo).unwrap_or_else(|| CANCELLATION_MEMO.to_string())),
            created_by,
        },
    )
    .await
}

/// Records an invoice as paid with the amount reported by staff.
#[instrument(skip(db, memo))]
pub async fn mark_invoice_paid(
    db: &DatabaseConnection,
    invoice_id: InvoiceId,
    amount: Yen,
    paid_at: DateTime<Utc>,
    memo: Option<String>,
    created_by: Option<UserId>,
) -> Result<payment::Model> {
    let invoice = invoice::find_invoice(db, invoice_id).await?;
    record_payment(
        db,
        NewPayment {
            customer_id: CustomerId::new(invoice.customer_id),
            target: PaymentTarget::Invoice(invoice_id),
            status: PaymentStatus::Paid,
            paid_at,
            amount,
            memo,
            created_by,
        },
    )
    .await
}

/// Cancels an invoice's current payment.
#[instrument(skip(db, memo))]
pub async fn cancel_invoice_payment(
    db: &DatabaseConnection,
    invoice_id: InvoiceId,
    paid_at: DateTime<Utc>,
    memo: Option<String>,
    created_by: Option<UserId>,
) -> Result<payment::Model> {
    let txn = db.begin().await?;
    let invoice = invoice::find_invoice(&txn, invoice_id).await?;
    let row = cancel_latest(
        &txn,
        CustomerId::new(invoice.customer_id),
        PaymentTarget::Invoice(invoice_id),
        paid_at,
        memo,
        created_by,
    )
    .await?;
    txn.commit().await?;
    Ok(row)
}

/// Records a flower billing target as paid now, for the current sum of its flowers.
#[instrument(skip(db))]
pub async fn mark_flower_target_paid(
    db: &DatabaseConnection,
    target_id: FlowerBillingTargetId,
    created_by: Option<UserId>,
) -> Result<payment::Model> {
    let txn = db.begin().await?;
    let target = flower::find_billing_target(&txn, target_id).await?;
    let amount = flower::target_total(&txn, target_id).await?;
    let row = record_payment(
        &txn,
        NewPayment {
            customer_id: CustomerId::new(target.customer_id),
            target: PaymentTarget::FlowerTarget(target_id),
            status: PaymentStatus::Paid,
            paid_at: Utc::now(),
            amount,
            memo: None,
            created_by,
        },
    )
    .await?;
    txn.commit().await?;
    Ok(row)
}

/// Cancels a flower billing target's current payment.
#[instrument(skip(db))]
pub async fn cancel_flower_target_payment(
    db: &DatabaseConnection,
    target_id: FlowerBillingTargetId,
    created_by: Option<UserId>,
) -> Result<payment::Model> {
    let txn = db.begin().await?;
    let target = flower::find_billing_target(&txn, target_id).await?;
    let row = cancel_latest(
        &txn,
        CustomerId::new(target.customer_id),
        PaymentTarget::FlowerTarget(target_id),
        Utc::now(),
        None,
        created_by,
    )
    .await?;
    txn.commit().await?;
    Ok(row)
}

//! Shared test utilities.
//!
//! Provides the in-memory database setup used by every database test and fixture builders with
//! sensible defaults for cases, documents, and flowers.

use crate::{
    core::{
        customer::{self, CustomerInput},
        document::{DocumentInput, LineItemInput},
        flower::FlowerInput,
        membership::MembershipInput,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a case with only the deceased's name filled in.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::customer::Model> {
    let detail = customer::create_customer(
        db,
        CustomerInput {
            deceased_name: name.to_string(),
            ..Default::default()
        },
    )
    .await?;
    Ok(detail.customer)
}

/// Creates a case with one membership row per amount, numbered from 1.
pub async fn create_customer_with_prepaid(
    db: &DatabaseConnection,
    name: &str,
    amounts: &[i64],
) -> Result<entities::customer::Model> {
    let memberships = (1..)
        .zip(amounts)
        .map(|(row_no, &amount)| membership_input(row_no, amount))
        .collect();
    let detail = customer::create_customer(
        db,
        CustomerInput {
            deceased_name: name.to_string(),
            memberships: Some(memberships),
            ..Default::default()
        },
    )
    .await?;
    Ok(detail.customer)
}

/// A membership row with only its number and payment amount set.
#[must_use]
pub fn membership_input(row_no: i32, payment_amount: i64) -> MembershipInput {
    MembershipInput {
        row_no,
        member_no: Some(format!("M-{row_no:03}")),
        payment_amount: Some(payment_amount),
        ..Default::default()
    }
}

/// A freeform line of quantity 1 priced at `amount`.
#[must_use]
pub fn line_item(amount: i64) -> LineItemInput {
    LineItemInput {
        description: Some("Service".to_string()),
        unit_price_general: Some(amount),
        unit_price_member: Some(amount),
        qty: Some(1),
        amount: Some(amount),
        ..Default::default()
    }
}

/// A document payload with one [`line_item`] per amount and no descriptive fields.
#[must_use]
pub fn document_input(amounts: &[i64]) -> DocumentInput {
    DocumentInput {
        items: amounts.iter().copied().map(line_item).collect(),
        ..Default::default()
    }
}

/// A flower billed to `bill_to_name` at a fixed address without a phone number.
#[must_use]
pub fn flower_input(bill_to_name: &str, amount: i64) -> FlowerInput {
    FlowerInput {
        requester_name: format!("{bill_to_name} family"),
        label_name: Some(bill_to_name.to_string()),
        bill_to_name: bill_to_name.to_string(),
        bill_to_address: "Tokyo".to_string(),
        amount: Some(amount),
        ..Default::default()
    }
}

//! Invoice lifecycle - standalone invoices and invoices converted from an estimate.
//!
//! Invoices follow the same write rules as estimates. A converted invoice is a deep copy of the
//! estimate at that moment; later estimate edits do not reach it.

use crate::{
    core::{
        customer,
        document::{DEFAULT_STATUS, DocumentInput, LineDraft, apply_document_fields},
        estimate::{find_estimate, get_estimate_items},
        ids::{CustomerId, EstimateId, InvoiceId},
        membership,
        money::Yen,
        payment::{self, PaymentTarget},
        totals::compute_totals,
    },
    entities::{Invoice, InvoiceItem, invoice, invoice_item, sea_orm_active_enums::PaymentStatus},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// An invoice with its line items and payment state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    /// Header with stored totals
    pub invoice: invoice::Model,
    /// Ordered by `sort_no`
    pub items: Vec<invoice_item::Model>,
    /// The case's prepaid total as of this read
    pub current_membership_prepaid: Yen,
    /// Status of the newest ledger row, `None` if nothing was recorded
    pub payment_status: Option<PaymentStatus>,
}

/// Loads an invoice header or fails with [`Error::InvoiceNotFound`].
pub async fn find_invoice<C>(db: &C, invoice_id: InvoiceId) -> Result<invoice::Model>
where
    C: ConnectionTrait,
{
    Invoice::find_by_id(invoice_id.get())
        .one(db)
        .await?
        .ok_or_else(|| Error::InvoiceNotFound {
            id: invoice_id.to_string(),
        })
}

/// Loads an invoice's lines in display order.
pub async fn get_invoice_items<C>(db: &C, invoice_id: InvoiceId) -> Result<Vec<invoice_item::Model>>
where
    C: ConnectionTrait,
{
    InvoiceItem::find()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id.get()))
        .order_by_asc(invoice_item::Column::SortNo)
        .order_by_asc(invoice_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn insert_items<C>(
    db: &C,
    invoice_id: i64,
    lines: Vec<LineDraft>,
) -> Result<Vec<invoice_item::Model>>
where
    C: ConnectionTrait,
{
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = invoice_item::ActiveModel {
            invoice_id: Set(invoice_id),
            product_item_id: Set(line.product_item_id),
            product_variant_id: Set(line.product_variant_id),
            description: Set(line.description),
            unit_price_general: Set(line.unit_price_general),
            unit_price_member: Set(line.unit_price_member),
            qty: Set(line.qty),
            amount: Set(line.amount),
            sort_no: Set(line.sort_no),
            ..Default::default()
        };
        items.push(item.insert(db).await?);
    }
    items.sort_by_key(|item| (item.sort_no, item.id));
    Ok(items)
}

/// Creates a standalone invoice for a case.
#[instrument(skip(db, input))]
pub async fn create_invoice(
    db: &DatabaseConnection,
    customer_id: CustomerId,
    input: DocumentInput,
) -> Result<InvoiceDetail> {
    let txn = db.begin().await?;

    customer::find_customer(&txn, customer_id).await?;
    let prepaid = membership::prepaid_for_customer(&txn, customer_id).await?;
    let lines = input.line_drafts();
    let totals = compute_totals(&lines, prepaid)?;

    let mut model = invoice::ActiveModel {
        customer_id: Set(customer_id.get()),
        status: Set(input.status.clone().unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        from_estimate_id: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    apply_document_fields!(model, input.descriptive_fields(), totals);
    let invoice = model.insert(&txn).await?;
    let items = insert_items(&txn, invoice.id, lines).await?;

    txn.commit().await?;

    info!(
        invoice_id = invoice.id,
        customer_id = %customer_id,
        items = items.len(),
        grand_total = %totals.grand_total,
        "Created invoice"
    );
    Ok(InvoiceDetail {
        invoice,
        items,
        current_membership_prepaid: prepaid,
        payment_status: None,
    })
}

/// Overwrites an invoice and replaces all of its lines.
#[instrument(skip(db, input))]
pub async fn update_invoice(
    db: &DatabaseConnection,
    invoice_id: InvoiceId,
    input: DocumentInput,
) -> Result<InvoiceDetail> {
    let txn = db.begin().await?;

    let existing = find_invoice(&txn, invoice_id).await?;
    let customer_id = CustomerId::new(existing.customer_id);
    let prepaid = membership::prepaid_for_customer(&txn, customer_id).await?;
    let lines = input.line_drafts();
    let totals = compute_totals(&lines, prepaid)?;

    let mut model: invoice::ActiveModel = existing.into();
    if let Some(status) = input.status.clone() {
        model.status = Set(status);
    }
    apply_document_fields!(model, input.descriptive_fields(), totals);
    let invoice = model.update(&txn).await?;

    InvoiceItem::delete_many()
        .filter(invoice_item::Column::InvoiceId.eq(invoice_id.get()))
        .exec(&txn)
        .await?;
    let items = insert_items(&txn, invoice.id, lines).await?;
    let payment_status = payment::current_status(&txn, PaymentTarget::Invoice(invoice_id)).await?;

    txn.commit().await?;

    info!(
        invoice_id = %invoice_id,
        items = items.len(),
        grand_total = %totals.grand_total,
        "Updated invoice"
    );
    Ok(InvoiceDetail {
        invoice,
        items,
        current_membership_prepaid: prepaid,
        payment_status,
    })
}

/// Generates an invoice from an estimate of the same case.
///
/// Descriptive fields and every line are copied; totals are recomputed with the case's current
/// prepayment rather than the figure stored on the estimate. The new invoice has no document
/// number or issue date and starts as `DRAFT`.
#[instrument(skip(db))]
pub async fn create_invoice_from_estimate(
    db: &DatabaseConnection,
    customer_id: CustomerId,
    estimate_id: EstimateId,
) -> Result<InvoiceDetail> {
    let txn = db.begin().await?;

    let source = find_estimate(&txn, estimate_id).await?;
    if source.customer_id != customer_id.get() {
        return Err(Error::CaseMismatch {
            estimate_id: estimate_id.to_string(),
            expected: customer_id.to_string(),
            actual: source.customer_id.to_string(),
        });
    }

    let prepaid = membership::prepaid_for_customer(&txn, customer_id).await?;
    let lines: Vec<LineDraft> = get_estimate_items(&txn, estimate_id)
        .await?
        .iter()
        .map(LineDraft::from)
        .collect();
    let totals = compute_totals(&lines, prepaid)?;

    let now = Utc::now();
    let invoice = invoice::ActiveModel {
        customer_id: Set(customer_id.get()),
        doc_no: Set(None),
        status: Set(DEFAULT_STATUS.to_string()),
        subtotal: Set(totals.subtotal.get()),
        tax: Set(totals.tax.get()),
        total: Set(totals.total.get()),
        membership_paid_amount: Set(totals.membership_paid_amount.get()),
        grand_total: Set(totals.grand_total.get()),
        from_estimate_id: Set(Some(source.id)),
        cremation_process_type: Set(source.cremation_process_type),
        altar_place_type: Set(source.altar_place_type),
        ceiling_height: Set(source.ceiling_height),
        estimate_staff: Set(source.estimate_staff),
        ceremony_staff: Set(source.ceremony_staff),
        transport_staff: Set(source.transport_staff),
        decoration_staff: Set(source.decoration_staff),
        return_staff: Set(source.return_staff),
        issued_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    let items = insert_items(&txn, invoice.id, lines).await?;

    txn.commit().await?;

    info!(
        invoice_id = invoice.id,
        estimate_id = %estimate_id,
        items = items.len(),
        grand_total = %totals.grand_total,
        "Converted estimate to invoice"
    );
    Ok(InvoiceDetail {
        invoice,
        items,
        current_membership_prepaid: prepaid,
        payment_status: None,
    })
}

/// Loads an invoice with its lines, the case's current prepaid total, and its payment status.
pub async fn get_invoice(db: &DatabaseConnection, invoice_id: InvoiceId) -> Result<InvoiceDetail> {
    let invoice = find_invoice(db, invoice_id).await?;
    let items = get_invoice_items(db, invoice_id).await?;
    let current_membership_prepaid =
        membership::prepaid_for_customer(db, CustomerId::new(invoice.customer_id)).await?;
    let payment_status = payment::current_status(db, PaymentTarget::Invoice(invoice_id)).await?;
    Ok(InvoiceDetail {
        invoice,
        items,
        current_membership_prepaid,
        payment_status,
    })
}

/// Lists invoice headers, newest first, optionally for one case.
pub async fn list_invoices(
    db: &DatabaseConnection,
    customer_id: Option<CustomerId>,
) -> Result<Vec<invoice::Model>> {
    let mut query = Invoice::find();
    if let Some(customer_id) = customer_id {
        query = query.filter(invoice::Column::CustomerId.eq(customer_id.get()));
    }
    query
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::customer::{CustomerInput, update_customer};
    use crate::core::estimate::{create_estimate, update_estimate};
    use crate::core::ids::ProductVariantId;
    use crate::entities::sea_orm_active_enums::CremationProcessType;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_get_invoice() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_customer_with_prepaid(&db, "Invoice Case", &[5_000]).await?;

        let created =
            create_invoice(&db, CustomerId::new(customer.id), document_input(&[10_000])).await?;
        assert_eq!(created.invoice.total, 11_000);
        assert_eq!(created.invoice.membership_paid_amount, 5_000);
        assert_eq!(created.invoice.grand_total, 6_000);
        assert_eq!(created.invoice.from_estimate_id, None);

        let detail = get_invoice(&db, InvoiceId::new(created.invoice.id)).await?;
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.current_membership_prepaid, Yen::new(5_000));
        assert_eq!(detail.payment_status, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_invoice() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_invoice(&db, InvoiceId::new(1)).await;
        assert!(matches!(result, Err(Error::InvoiceNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_invoice_replaces_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Invoice Update").await?;
        let created = create_invoice(
            &db,
            CustomerId::new(customer.id),
            document_input(&[1_000, 2_000, 3_000]),
        )
        .await?;
        let old_ids: Vec<i64> = created.items.iter().map(|i| i.id).collect();

        let mut input = document_input(&[9_999]);
        input.status = Some("ISSUED".to_string());
        let updated = update_invoice(&db, InvoiceId::new(created.invoice.id), input).await?;

        assert_eq!(updated.items.len(), 1);
        assert!(!old_ids.contains(&updated.items[0].id));
        assert_eq!(updated.invoice.status, "ISSUED");
        assert_eq!(updated.invoice.tax, 1_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Invoice Rollback").await?;
        let created = create_invoice(
            &db,
            CustomerId::new(customer.id),
            document_input(&[1_000, 2_000, 3_000]),
        )
        .await?;
        let invoice_id = InvoiceId::new(created.invoice.id);

        let mut input = document_input(&[4_000, 5_000, 6_000]);
        input.items[2].product_variant_id = Some(ProductVariantId::new(404));
        let result = update_invoice(&db, invoice_id, input).await;
        assert!(matches!(result, Err(Error::Database(_))));

        let detail = get_invoice(&db, invoice_id).await?;
        let ids: Vec<i64> = detail.items.iter().map(|i| i.id).collect();
        let old_ids: Vec<i64> = created.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, old_ids);
        assert_eq!(detail.invoice.subtotal, 6_000);
        assert_eq!(detail.invoice.grand_total, 6_600);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_estimate_copies_a_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Snapshot Case").await?;
        let customer_id = CustomerId::new(customer.id);

        let mut input = document_input(&[10_000, 5_000, 2_500]);
        input.doc_no = Some("E-0001".to_string());
        input.cremation_process_type = Some("NEIGHBORHOOD".to_string());
        input.ceremony_staff = Some("Suzuki".to_string());
        input.items[0].description = Some("Altar".to_string());
        input.items[1].sort_no = Some(7);
        let estimate = create_estimate(&db, customer_id, input).await?;
        let estimate_id = EstimateId::new(estimate.estimate.id);

        let converted = create_invoice_from_estimate(&db, customer_id, estimate_id).await?;
        let invoice = &converted.invoice;
        assert_eq!(invoice.from_estimate_id, Some(estimate.estimate.id));
        assert_eq!(invoice.doc_no, None);
        assert_eq!(invoice.status, "DRAFT");
        assert_eq!(invoice.issued_at, None);
        assert_eq!(
            invoice.cremation_process_type,
            Some(CremationProcessType::Neighborhood)
        );
        assert_eq!(invoice.ceremony_staff.as_deref(), Some("Suzuki"));
        assert_eq!(invoice.subtotal, 17_500);
        assert_eq!(invoice.grand_total, estimate.estimate.grand_total);

        // Mutating the estimate afterwards must not reach the invoice
        update_estimate(&db, estimate_id, document_input(&[1])).await?;

        let items = get_invoice_items(&db, InvoiceId::new(invoice.id)).await?;
        assert_eq!(items.len(), 3);
        let sort_nos: Vec<i32> = items.iter().map(|i| i.sort_no).collect();
        assert_eq!(sort_nos, vec![0, 2, 7]);
        assert_eq!(items[0].description.as_deref(), Some("Altar"));
        let amounts: Vec<i64> = items.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![10_000, 2_500, 5_000]);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_uses_current_prepaid() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Prepaid Later").await?;
        let customer_id = CustomerId::new(customer.id);
        let estimate = create_estimate(&db, customer_id, document_input(&[20_000])).await?;
        assert_eq!(estimate.estimate.membership_paid_amount, 0);

        update_customer(
            &db,
            customer_id,
            CustomerInput {
                deceased_name: "Prepaid Later".to_string(),
                memberships: Some(vec![membership_input(2, 50_000)]),
                ..Default::default()
            },
        )
        .await?;

        let converted =
            create_invoice_from_estimate(&db, customer_id, EstimateId::new(estimate.estimate.id))
                .await?;
        assert_eq!(converted.invoice.membership_paid_amount, 50_000);
        assert_eq!(converted.invoice.grand_total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_convert_rejects_case_mismatch() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_customer(&db, "Owner").await?;
        let other = create_test_customer(&db, "Other").await?;
        let estimate =
            create_estimate(&db, CustomerId::new(owner.id), document_input(&[1_000])).await?;

        let result = create_invoice_from_estimate(
            &db,
            CustomerId::new(other.id),
            EstimateId::new(estimate.estimate.id),
        )
        .await;
        assert!(matches!(result, Err(Error::CaseMismatch { .. })));
        assert!(list_invoices(&db, None).await?.is_empty());

        let missing =
            create_invoice_from_estimate(&db, CustomerId::new(owner.id), EstimateId::new(999))
                .await;
        assert!(matches!(missing, Err(Error::EstimateNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_invoice_reports_payment_status() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Status Case").await?;
        let created =
            create_invoice(&db, CustomerId::new(customer.id), document_input(&[1_000])).await?;
        let invoice_id = InvoiceId::new(created.invoice.id);

        payment::mark_invoice_paid(&db, invoice_id, Yen::new(1_100), Utc::now(), None, None)
            .await?;

        let detail = get_invoice(&db, invoice_id).await?;
        assert_eq!(detail.payment_status, Some(PaymentStatus::Paid));

        Ok(())
    }
}

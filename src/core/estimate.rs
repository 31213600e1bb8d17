//! Estimate lifecycle - create, update, and read estimates for a case.
//!
//! Every write recomputes the totals from the submitted lines and the case's current membership
//! prepayment, then replaces the whole line set inside the same transaction.

use crate::{
    core::{
        customer,
        document::{DEFAULT_STATUS, DocumentInput, LineDraft, apply_document_fields},
        ids::{CustomerId, EstimateId},
        membership,
        money::Yen,
        totals::compute_totals,
    },
    entities::{Estimate, EstimateItem, estimate, estimate_item},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// An estimate with its line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateDetail {
    /// Header with stored totals
    pub estimate: estimate::Model,
    /// Ordered by `sort_no`
    pub items: Vec<estimate_item::Model>,
    /// The case's prepaid total as of this read
    pub current_membership_prepaid: Yen,
}

/// Loads an estimate header or fails with [`Error::EstimateNotFound`].
pub async fn find_estimate<C>(db: &C, estimate_id: EstimateId) -> Result<estimate::Model>
where
    C: ConnectionTrait,
{
    Estimate::find_by_id(estimate_id.get())
        .one(db)
        .await?
        .ok_or_else(|| Error::EstimateNotFound {
            id: estimate_id.to_string(),
        })
}

/// Loads an estimate's lines in display order.
pub async fn get_estimate_items<C>(
    db: &C,
    estimate_id: EstimateId,
) -> Result<Vec<estimate_item::Model>>
where
    C: ConnectionTrait,
{
    EstimateItem::find()
        .filter(estimate_item::Column::EstimateId.eq(estimate_id.get()))
        .order_by_asc(estimate_item::Column::SortNo)
        .order_by_asc(estimate_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn insert_items<C>(
    db: &C,
    estimate_id: i64,
    lines: Vec<LineDraft>,
) -> Result<Vec<estimate_item::Model>>
where
    C: ConnectionTrait,
{
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = estimate_item::ActiveModel {
            estimate_id: Set(estimate_id),
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

/// Creates an estimate for a case.
#[instrument(skip(db, input))]
pub async fn create_estimate(
    db: &DatabaseConnection,
    customer_id: CustomerId,
    input: DocumentInput,
) -> Result<EstimateDetail> {
    let txn = db.begin().await?;

    customer::find_customer(&txn, customer_id).await?;
    let prepaid = membership::prepaid_for_customer(&txn, customer_id).await?;
    let lines = input.line_drafts();
    let totals = compute_totals(&lines, prepaid)?;

    let now = Utc::now();
    let mut model = estimate::ActiveModel {
        customer_id: Set(customer_id.get()),
        status: Set(input.status.clone().unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        created_at: Set(now),
        ..Default::default()
    };
    apply_document_fields!(model, input.descriptive_fields(), totals);
    let estimate = model.insert(&txn).await?;
    let items = insert_items(&txn, estimate.id, lines).await?;

    txn.commit().await?;

    info!(
        estimate_id = estimate.id,
        customer_id = %customer_id,
        items = items.len(),
        grand_total = %totals.grand_total,
        "Created estimate"
    );
    Ok(EstimateDetail {
        estimate,
        items,
        current_membership_prepaid: prepaid,
    })
}

/// Overwrites an estimate and replaces all of its lines.
///
/// Line ids are not preserved: the previous lines are deleted and the submitted ones inserted
/// fresh. Totals use the case's prepayment as it stands now.
#[instrument(skip(db, input))]
pub async fn update_estimate(
    db: &DatabaseConnection,
    estimate_id: EstimateId,
    input: DocumentInput,
) -> Result<EstimateDetail> {
    let txn = db.begin().await?;

    let existing = find_estimate(&txn, estimate_id).await?;
    let customer_id = CustomerId::new(existing.customer_id);
    let prepaid = membership::prepaid_for_customer(&txn, customer_id).await?;
    let lines = input.line_drafts();
    let totals = compute_totals(&lines, prepaid)?;

    let mut model: estimate::ActiveModel = existing.into();
    if let Some(status) = input.status.clone() {
        model.status = Set(status);
    }
    apply_document_fields!(model, input.descriptive_fields(), totals);
    let estimate = model.update(&txn).await?;

    EstimateItem::delete_many()
        .filter(estimate_item::Column::EstimateId.eq(estimate_id.get()))
        .exec(&txn)
        .await?;
    let items = insert_items(&txn, estimate.id, lines).await?;

    txn.commit().await?;

    info!(
        estimate_id = %estimate_id,
        items = items.len(),
        grand_total = %totals.grand_total,
        "Updated estimate"
    );
    Ok(EstimateDetail {
        estimate,
        items,
        current_membership_prepaid: prepaid,
    })
}

/// Loads an estimate with its lines and the case's current prepaid total.
pub async fn get_estimate(
    db: &DatabaseConnection,
    estimate_id: EstimateId,
) -> Result<EstimateDetail> {
    let estimate = find_estimate(db, estimate_id).await?;
    let items = get_estimate_items(db, estimate_id).await?;
    let current_membership_prepaid =
        membership::prepaid_for_customer(db, CustomerId::new(estimate.customer_id)).await?;
    Ok(EstimateDetail {
        estimate,
        items,
        current_membership_prepaid,
    })
}

/// Lists estimate headers, newest first, optionally for one case.
pub async fn list_estimates(
    db: &DatabaseConnection,
    customer_id: Option<CustomerId>,
) -> Result<Vec<estimate::Model>> {
    let mut query = Estimate::find();
    if let Some(customer_id) = customer_id {
        query = query.filter(estimate::Column::CustomerId.eq(customer_id.get()));
    }
    query
        .order_by_desc(estimate::Column::CreatedAt)
        .order_by_desc(estimate::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::customer::{CustomerInput, update_customer};
    use crate::core::ids::ProductItemId;
    use crate::entities::sea_orm_active_enums::{AltarPlaceType, CremationProcessType};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_estimate_computes_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Estimate Case").await?;

        let detail =
            create_estimate(&db, CustomerId::new(customer.id), document_input(&[10_000, 5_000]))
                .await?;

        let estimate = &detail.estimate;
        assert_eq!(estimate.status, "DRAFT");
        assert_eq!(estimate.subtotal, 15_000);
        assert_eq!(estimate.tax, 1_500);
        assert_eq!(estimate.total, 16_500);
        assert_eq!(estimate.membership_paid_amount, 0);
        assert_eq!(estimate.grand_total, 16_500);
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].sort_no, 0);
        assert_eq!(detail.items[1].sort_no, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_estimate_with_prepaid_exceeding_total() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_customer_with_prepaid(&db, "Prepaid Case", &[12_000, 8_000]).await?;

        let detail =
            create_estimate(&db, CustomerId::new(customer.id), document_input(&[10_000, 5_000]))
                .await?;

        assert_eq!(detail.estimate.membership_paid_amount, 20_000);
        assert_eq!(detail.estimate.grand_total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_estimate_for_missing_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_estimate(&db, CustomerId::new(99), document_input(&[1_000])).await;
        assert!(matches!(result, Err(Error::CustomerNotFound { .. })));
        assert!(list_estimates(&db, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_enum_values_are_stored_as_null() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Enum Case").await?;

        let mut input = document_input(&[1_000]);
        input.cremation_process_type = Some("FAMILY".to_string());
        input.altar_place_type = Some("GARDEN".to_string());
        let detail = create_estimate(&db, CustomerId::new(customer.id), input).await?;

        assert_eq!(
            detail.estimate.cremation_process_type,
            Some(CremationProcessType::Family)
        );
        assert_eq!(detail.estimate.altar_place_type, None);

        let mut input = document_input(&[1_000]);
        input.altar_place_type = Some("FUNERAL_HALL".to_string());
        let updated = update_estimate(&db, EstimateId::new(detail.estimate.id), input).await?;
        assert_eq!(updated.estimate.cremation_process_type, None);
        assert_eq!(
            updated.estimate.altar_place_type,
            Some(AltarPlaceType::FuneralHall)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_lines_with_fresh_ids() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Replace Case").await?;
        let created = create_estimate(
            &db,
            CustomerId::new(customer.id),
            document_input(&[1_000, 2_000, 3_000]),
        )
        .await?;
        let old_ids: Vec<i64> = created.items.iter().map(|i| i.id).collect();
        let estimate_id = EstimateId::new(created.estimate.id);

        let updated = update_estimate(&db, estimate_id, document_input(&[4_000])).await?;

        let stored = get_estimate_items(&db, estimate_id).await?;
        assert_eq!(stored.len(), 1);
        assert!(!old_ids.contains(&stored[0].id));
        assert_eq!(stored[0].amount, 4_000);
        assert_eq!(updated.estimate.subtotal, 4_000);
        assert_eq!(updated.estimate.total, 4_400);
        // Status was not supplied, so it is kept
        assert_eq!(updated.estimate.status, "DRAFT");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_picks_up_membership_changes() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Late Member").await?;
        let customer_id = CustomerId::new(customer.id);
        let created = create_estimate(&db, customer_id, document_input(&[100_000])).await?;
        assert_eq!(created.estimate.grand_total, 110_000);

        update_customer(
            &db,
            customer_id,
            CustomerInput {
                deceased_name: "Late Member".to_string(),
                memberships: Some(vec![membership_input(1, 30_000)]),
                ..Default::default()
            },
        )
        .await?;

        let updated = update_estimate(
            &db,
            EstimateId::new(created.estimate.id),
            document_input(&[100_000]),
        )
        .await?;
        assert_eq!(updated.estimate.membership_paid_amount, 30_000);
        assert_eq!(updated.estimate.grand_total, 80_000);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_estimate() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_estimate(&db, EstimateId::new(5), document_input(&[])).await;
        assert!(matches!(result, Err(Error::EstimateNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_leaves_estimate_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Rollback Case").await?;
        let created = create_estimate(
            &db,
            CustomerId::new(customer.id),
            document_input(&[1_000, 2_000, 3_000]),
        )
        .await?;
        let estimate_id = EstimateId::new(created.estimate.id);

        // The second line points at a product that does not exist, so its insert fails after
        // the header and the first new line have been written
        let mut input = document_input(&[7_000, 8_000, 9_000]);
        input.status = Some("ISSUED".to_string());
        input.items[1].product_item_id = Some(ProductItemId::new(999));
        let result = update_estimate(&db, estimate_id, input).await;
        assert!(matches!(result, Err(Error::Database(_))));

        let detail = get_estimate(&db, estimate_id).await?;
        let amounts: Vec<i64> = detail.items.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![1_000, 2_000, 3_000]);
        assert_eq!(detail.estimate.subtotal, 6_000);
        assert_eq!(detail.estimate.total, 6_600);
        assert_eq!(detail.estimate.status, "DRAFT");

        Ok(())
    }

    #[tokio::test]
    async fn test_huge_line_amount_keeps_exact_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Large Case").await?;
        let customer_id = CustomerId::new(customer.id);

        let detail =
            create_estimate(&db, customer_id, document_input(&[500_000_000_000_000_000])).await?;
        assert_eq!(detail.estimate.tax, 50_000_000_000_000_000);
        assert_eq!(detail.estimate.total, 550_000_000_000_000_000);

        let result = create_estimate(&db, customer_id, document_input(&[i64::MAX, 1])).await;
        assert!(matches!(result, Err(Error::AmountOutOfRange { .. })));
        assert_eq!(list_estimates(&db, Some(customer_id)).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_estimate_orders_items_by_sort_no() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Order Case").await?;

        let mut input = document_input(&[100, 200, 300]);
        input.items[0].sort_no = Some(3);
        input.items[1].sort_no = Some(1);
        input.items[2].sort_no = Some(2);
        let created = create_estimate(&db, CustomerId::new(customer.id), input).await?;

        let detail = get_estimate(&db, EstimateId::new(created.estimate.id)).await?;
        let amounts: Vec<i64> = detail.items.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![200, 300, 100]);

        let listed = list_estimates(&db, Some(CustomerId::new(customer.id))).await?;
        assert_eq!(listed.len(), 1);

        Ok(())
    }
}

//! Flower orders and their consolidation into billing targets.
//!
//! Each flower is grouped under the billing target whose key matches its bill-to fields. A target
//! is created the first time a key is seen for a case and is never removed afterwards, even when
//! no flower points at it any more.

use crate::{
    core::{
        customer,
        ids::{CustomerId, FlowerBillingTargetId, FlowerId},
        input::non_empty,
        money::Yen,
        payment::{self, PaymentTarget},
    },
    entities::{
        Flower, FlowerBillingTarget, FlowerBillingTargetItem, flower, flower_billing_target,
        flower_billing_target_item, sea_orm_active_enums::PaymentStatus,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    JoinType, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Computes the billing key for a bill-to identity.
///
/// Hex SHA-256 of `name|address|tel`, with an empty string standing in for a missing phone.
#[must_use]
pub fn billing_key(name: &str, address: &str, tel: Option<&str>) -> String {
    let data = format!("{name}|{address}|{}", tel.unwrap_or(""));
    hex::encode(Sha256::digest(data.as_bytes()))
}

/// Flower form payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowerInput {
    /// Who ordered the flowers
    pub requester_name: String,
    /// Name printed on the tag
    pub label_name: Option<String>,
    /// Additional names for a joint offering
    pub joint_names: Option<String>,
    /// Bill-to name; part of the billing key
    pub bill_to_name: String,
    /// Bill-to address; part of the billing key
    pub bill_to_address: String,
    /// Bill-to phone; part of the billing key, empty when absent
    pub bill_to_tel: Option<String>,
    /// Delivery destination
    pub delivery_to: Option<String>,
    /// Yen; 0 when absent
    pub amount: Option<i64>,
}

impl FlowerInput {
    fn billing_key(&self) -> String {
        billing_key(
            &self.bill_to_name,
            &self.bill_to_address,
            self.bill_to_tel.as_deref(),
        )
    }

    fn apply(self, model: &mut flower::ActiveModel) {
        model.requester_name = Set(self.requester_name);
        model.label_name = Set(non_empty(self.label_name));
        model.joint_names = Set(non_empty(self.joint_names));
        model.bill_to_name = Set(self.bill_to_name);
        model.bill_to_address = Set(self.bill_to_address);
        model.bill_to_tel = Set(non_empty(self.bill_to_tel));
        model.delivery_to = Set(non_empty(self.delivery_to));
        model.amount = Set(self.amount.unwrap_or(0));
        model.updated_at = Set(Utc::now());
    }
}

/// A flower together with the target it is currently grouped under.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowerDetail {
    /// The flower row
    pub flower: flower::Model,
    /// `None` only if the flower lost its link
    pub billing_target: Option<flower_billing_target::Model>,
}

/// One billing unit of the grouped flower read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingTargetGroup {
    /// The persisted target
    pub target: flower_billing_target::Model,
    /// Newest first
    pub flowers: Vec<flower::Model>,
    /// Sum of the grouped flowers' amounts
    pub total: Yen,
    /// Status of the target's newest ledger row
    pub payment_status: Option<PaymentStatus>,
}

/// Loads a flower or fails with [`Error::FlowerNotFound`].
pub async fn find_flower<C>(db: &C, flower_id: FlowerId) -> Result<flower::Model>
where
    C: ConnectionTrait,
{
    Flower::find_by_id(flower_id.get())
        .one(db)
        .await?
        .ok_or_else(|| Error::FlowerNotFound {
            id: flower_id.to_string(),
        })
}

/// Loads a billing target or fails with [`Error::BillingTargetNotFound`].
pub async fn find_billing_target<C>(
    db: &C,
    target_id: FlowerBillingTargetId,
) -> Result<flower_billing_target::Model>
where
    C: ConnectionTrait,
{
    FlowerBillingTarget::find_by_id(target_id.get())
        .one(db)
        .await?
        .ok_or_else(|| Error::BillingTargetNotFound {
            id: target_id.to_string(),
        })
}

async fn find_target_by_key<C>(
    db: &C,
    customer_id: CustomerId,
    key: &str,
) -> Result<Option<flower_billing_target::Model>>
where
    C: ConnectionTrait,
{
    FlowerBillingTarget::find()
        .filter(flower_billing_target::Column::CustomerId.eq(customer_id.get()))
        .filter(flower_billing_target::Column::BillToKey.eq(key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the case's target for the given bill-to identity, creating it if needed.
///
/// The insert is `ON CONFLICT (customer_id, bill_to_key) DO NOTHING`, so an existing or
/// concurrently written row never fails the caller's transaction. The row is then read back by key.
pub async fn upsert_billing_target<C>(
    db: &C,
    customer_id: CustomerId,
    name: &str,
    address: &str,
    tel: Option<&str>,
) -> Result<flower_billing_target::Model>
where
    C: ConnectionTrait,
{
    let key = billing_key(name, address, tel);
    let candidate = flower_billing_target::ActiveModel {
        customer_id: Set(customer_id.get()),
        bill_to_name: Set(name.to_string()),
        bill_to_address: Set(address.to_string()),
        bill_to_tel: Set(tel.filter(|t| !t.is_empty()).map(str::to_string)),
        bill_to_key: Set(key.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = FlowerBillingTarget::insert(candidate)
        .on_conflict(
            OnConflict::columns([
                flower_billing_target::Column::CustomerId,
                flower_billing_target::Column::BillToKey,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let target = find_target_by_key(db, customer_id, &key)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("billing target {key} for case {customer_id}"))
        })?;
    if inserted > 0 {
        debug!(target_id = target.id, customer_id = %customer_id, "Created billing target");
    }
    Ok(target)
}

async fn link_flower<C>(db: &C, target_id: i64, flower_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    flower_billing_target_item::ActiveModel {
        flower_billing_target_id: Set(target_id),
        flower_id: Set(flower_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn unlink_flower<C>(db: &C, flower_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = FlowerBillingTargetItem::delete_many()
        .filter(flower_billing_target_item::Column::FlowerId.eq(flower_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Records a flower order and groups it under its billing target.
#[instrument(skip(db, input))]
pub async fn create_flower(
    db: &DatabaseConnection,
    customer_id: CustomerId,
    input: FlowerInput,
) -> Result<FlowerDetail> {
    let txn = db.begin().await?;

    customer::find_customer(&txn, customer_id).await?;
    let target = upsert_billing_target(
        &txn,
        customer_id,
        &input.bill_to_name,
        &input.bill_to_address,
        input.bill_to_tel.as_deref(),
    )
    .await?;

    let mut model = flower::ActiveModel {
        customer_id: Set(customer_id.get()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    input.apply(&mut model);
    let flower = model.insert(&txn).await?;
    link_flower(&txn, target.id, flower.id).await?;

    txn.commit().await?;

    info!(
        flower_id = flower.id,
        target_id = target.id,
        amount = flower.amount,
        "Created flower"
    );
    Ok(FlowerDetail {
        flower,
        billing_target: Some(target),
    })
}

/// Overwrites a flower and re-links it to the target matching its new bill-to fields.
///
/// The previous target is left in place even when it no longer groups any flower.
#[instrument(skip(db, input))]
pub async fn update_flower(
    db: &DatabaseConnection,
    flower_id: FlowerId,
    input: FlowerInput,
) -> Result<FlowerDetail> {
    let txn = db.begin().await?;

    let existing = find_flower(&txn, flower_id).await?;
    let customer_id = CustomerId::new(existing.customer_id);
    let key_changed = billing_key(
        &existing.bill_to_name,
        &existing.bill_to_address,
        existing.bill_to_tel.as_deref(),
    ) != input.billing_key();

    let target = upsert_billing_target(
        &txn,
        customer_id,
        &input.bill_to_name,
        &input.bill_to_address,
        input.bill_to_tel.as_deref(),
    )
    .await?;

    let mut model: flower::ActiveModel = existing.into();
    input.apply(&mut model);
    let flower = model.update(&txn).await?;

    unlink_flower(&txn, flower.id).await?;
    link_flower(&txn, target.id, flower.id).await?;

    txn.commit().await?;

    if key_changed {
        info!(
            flower_id = %flower_id,
            target_id = target.id,
            "Moved flower to another billing target"
        );
    } else {
        info!(flower_id = %flower_id, "Updated flower");
    }
    Ok(FlowerDetail {
        flower,
        billing_target: Some(target),
    })
}

/// Deletes a flower after removing its target links.
#[instrument(skip(db))]
pub async fn delete_flower(db: &DatabaseConnection, flower_id: FlowerId) -> Result<()> {
    let txn = db.begin().await?;

    find_flower(&txn, flower_id).await?;
    let unlinked = unlink_flower(&txn, flower_id.get()).await?;
    Flower::delete_by_id(flower_id.get()).exec(&txn).await?;

    txn.commit().await?;

    info!(flower_id = %flower_id, links = unlinked, "Deleted flower");
    Ok(())
}

/// Loads a flower with the target it is linked to.
pub async fn get_flower(db: &DatabaseConnection, flower_id: FlowerId) -> Result<FlowerDetail> {
    let flower = find_flower(db, flower_id).await?;
    let billing_target = FlowerBillingTarget::find()
        .join(
            JoinType::InnerJoin,
            flower_billing_target::Relation::Items.def(),
        )
        .filter(flower_billing_target_item::Column::FlowerId.eq(flower.id))
        .one(db)
        .await?;
    if billing_target.is_none() {
        warn!(flower_id = %flower_id, "Flower has no billing target link");
    }
    Ok(FlowerDetail {
        flower,
        billing_target,
    })
}

/// Lists a case's flowers, newest first.
pub async fn list_flowers<C>(db: &C, customer_id: CustomerId) -> Result<Vec<flower::Model>>
where
    C: ConnectionTrait,
{
    Flower::find()
        .filter(flower::Column::CustomerId.eq(customer_id.get()))
        .order_by_desc(flower::Column::CreatedAt)
        .order_by_desc(flower::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Ensures a persisted target exists for every bill-to key among `flowers`.
///
/// Returns the targets keyed by billing key. All flowers must belong to `customer_id`.
pub async fn materialize_billing_targets<C>(
    db: &C,
    customer_id: CustomerId,
    flowers: &[flower::Model],
) -> Result<HashMap<String, flower_billing_target::Model>>
where
    C: ConnectionTrait,
{
    let mut targets = HashMap::new();
    for flower in flowers {
        let key = billing_key(
            &flower.bill_to_name,
            &flower.bill_to_address,
            flower.bill_to_tel.as_deref(),
        );
        if targets.contains_key(&key) {
            continue;
        }
        let target = upsert_billing_target(
            db,
            customer_id,
            &flower.bill_to_name,
            &flower.bill_to_address,
            flower.bill_to_tel.as_deref(),
        )
        .await?;
        targets.insert(key, target);
    }
    debug!(customer_id = %customer_id, targets = targets.len(), "Materialized billing targets");
    Ok(targets)
}

/// Groups a case's flowers by billing target.
///
/// Targets appear in the order their key is first met while walking the flowers newest first.
/// Every returned target is persisted before this returns.
#[instrument(skip(db))]
pub async fn list_billing_targets(
    db: &DatabaseConnection,
    customer_id: CustomerId,
) -> Result<Vec<BillingTargetGroup>> {
    let txn = db.begin().await?;
    let flowers = list_flowers(&txn, customer_id).await?;
    let mut targets = materialize_billing_targets(&txn, customer_id, &flowers).await?;
    txn.commit().await?;

    let mut groups: Vec<BillingTargetGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for flower in flowers {
        let key = billing_key(
            &flower.bill_to_name,
            &flower.bill_to_address,
            flower.bill_to_tel.as_deref(),
        );
        let index = match positions.get(&key).copied() {
            Some(index) => index,
            None => {
                let Some(target) = targets.remove(&key) else {
                    continue;
                };
                groups.push(BillingTargetGroup {
                    target,
                    flowers: Vec::new(),
                    total: Yen::ZERO,
                    payment_status: None,
                });
                positions.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[index].flowers.push(flower);
    }

    for group in &mut groups {
        group.total = flowers_total(&group.flowers)?;
        group.payment_status = payment::current_status(
            db,
            PaymentTarget::FlowerTarget(FlowerBillingTargetId::new(group.target.id)),
        )
        .await?;
    }

    Ok(groups)
}

/// Loads one target with the flowers currently linked to it.
pub async fn get_billing_target(
    db: &DatabaseConnection,
    target_id: FlowerBillingTargetId,
) -> Result<BillingTargetGroup> {
    let target = find_billing_target(db, target_id).await?;
    let flowers = linked_flowers(db, target_id).await?;
    let total = flowers_total(&flowers)?;
    let payment_status =
        payment::current_status(db, PaymentTarget::FlowerTarget(target_id)).await?;
    Ok(BillingTargetGroup {
        target,
        flowers,
        total,
        payment_status,
    })
}

async fn linked_flowers<C>(db: &C, target_id: FlowerBillingTargetId) -> Result<Vec<flower::Model>>
where
    C: ConnectionTrait,
{
    Flower::find()
        .join(JoinType::InnerJoin, flower::Relation::BillingTargetItems.def())
        .filter(flower_billing_target_item::Column::FlowerBillingTargetId.eq(target_id.get()))
        .order_by_desc(flower::Column::CreatedAt)
        .order_by_desc(flower::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

fn flowers_total(flowers: &[flower::Model]) -> Result<Yen> {
    let amounts = flowers.iter().map(|f| Yen::new(f.amount));
    Yen::checked_sum(amounts).ok_or_else(|| Error::AmountOutOfRange {
        what: "flower billing total".to_string(),
    })
}

/// Sums the amounts of the flowers currently linked to a target.
pub async fn target_total<C>(db: &C, target_id: FlowerBillingTargetId) -> Result<Yen>
where
    C: ConnectionTrait,
{
    flowers_total(&linked_flowers(db, target_id).await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_billing_key_is_stable() {
        let a = billing_key("Yamada", "Shibuya 1-2-3", Some("03-0000-0000"));
        let b = billing_key("Yamada", "Shibuya 1-2-3", Some("03-0000-0000"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_billing_key_changes_with_each_field() {
        let base = billing_key("Yamada", "Shibuya", Some("03"));
        assert_ne!(base, billing_key("Yamada Co", "Shibuya", Some("03")));
        assert_ne!(base, billing_key("Yamada", "Shinjuku", Some("03")));
        assert_ne!(base, billing_key("Yamada", "Shibuya", Some("04")));
        assert_ne!(base, billing_key("Yamada", "Shibuya", None));
    }

    #[test]
    fn test_billing_key_treats_missing_tel_as_empty() {
        assert_eq!(
            billing_key("Yamada", "Shibuya", None),
            billing_key("Yamada", "Shibuya", Some(""))
        );
        // sha256("a|b|")
        assert_eq!(
            billing_key("a", "b", None),
            hex::encode(Sha256::digest(b"a|b|"))
        );
    }

    #[tokio::test]
    async fn test_same_bill_to_groups_into_one_target() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Flower Case").await?;
        let customer_id = CustomerId::new(customer.id);

        let first = create_flower(&db, customer_id, flower_input("Yamada", 15_000)).await?;
        let second = create_flower(&db, customer_id, flower_input("Yamada", 20_000)).await?;
        create_flower(&db, customer_id, flower_input("Suzuki", 10_000)).await?;

        assert_eq!(
            first.billing_target.as_ref().map(|t| t.id),
            second.billing_target.as_ref().map(|t| t.id)
        );

        let groups = list_billing_targets(&db, customer_id).await?;
        assert_eq!(groups.len(), 2);
        // Suzuki's flower is the newest, so its key is seen first
        assert_eq!(groups[0].target.bill_to_name, "Suzuki");
        assert_eq!(groups[1].target.bill_to_name, "Yamada");
        assert_eq!(groups[1].flowers.len(), 2);
        assert_eq!(groups[1].flowers[0].id, second.flower.id);
        assert_eq!(groups[1].total, Yen::new(35_000));
        assert_eq!(groups[1].payment_status, None);

        let stored = FlowerBillingTarget::find().all(&db).await?;
        assert_eq!(stored.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_flower_amount_defaults_to_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Zero Case").await?;

        let mut input = flower_input("Kimura", 0);
        input.amount = None;
        input.label_name = Some(String::new());
        let created = create_flower(&db, CustomerId::new(customer.id), input).await?;

        assert_eq!(created.flower.amount, 0);
        assert_eq!(created.flower.label_name, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_moves_flower_and_keeps_orphan_target() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Move Case").await?;
        let customer_id = CustomerId::new(customer.id);

        let created = create_flower(&db, customer_id, flower_input("Old Payer", 8_000)).await?;
        let old_target = created.billing_target.unwrap();

        let updated = update_flower(
            &db,
            FlowerId::new(created.flower.id),
            flower_input("New Payer", 9_000),
        )
        .await?;
        let new_target = updated.billing_target.unwrap();
        assert_ne!(old_target.id, new_target.id);

        let old_id = FlowerBillingTargetId::new(old_target.id);
        let new_id = FlowerBillingTargetId::new(new_target.id);
        assert_eq!(target_total(&db, old_id).await?, Yen::ZERO);
        assert_eq!(target_total(&db, new_id).await?, Yen::new(9_000));

        // The emptied target still exists
        let orphan = get_billing_target(&db, old_id).await?;
        assert!(orphan.flowers.is_empty());

        let links = FlowerBillingTargetItem::find()
            .filter(flower_billing_target_item::Column::FlowerId.eq(created.flower.id))
            .all(&db)
            .await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].flower_billing_target_id, new_target.id);

        let detail = get_flower(&db, FlowerId::new(created.flower.id)).await?;
        assert_eq!(detail.billing_target.map(|t| t.id), Some(new_target.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_flower_removes_links() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Delete Case").await?;
        let created =
            create_flower(&db, CustomerId::new(customer.id), flower_input("Ono", 5_000)).await?;
        let flower_id = FlowerId::new(created.flower.id);

        delete_flower(&db, flower_id).await?;

        assert!(matches!(
            get_flower(&db, flower_id).await,
            Err(Error::FlowerNotFound { .. })
        ));
        assert!(FlowerBillingTargetItem::find().all(&db).await?.is_empty());
        assert!(matches!(
            delete_flower(&db, flower_id).await,
            Err(Error::FlowerNotFound { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_flower_for_missing_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_flower(&db, CustomerId::new(77), flower_input("Nobody", 1)).await;
        assert!(matches!(result, Err(Error::CustomerNotFound { .. })));
        assert!(FlowerBillingTarget::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_billing_target_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Upsert Case").await?;
        let customer_id = CustomerId::new(customer.id);

        let a = upsert_billing_target(&db, customer_id, "Hayashi", "Nerima", None).await?;
        let b = upsert_billing_target(&db, customer_id, "Hayashi", "Nerima", Some("")).await?;
        assert_eq!(a.id, b.id);
        assert_eq!(a.bill_to_tel, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_target_total_overflow_is_an_error() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Overflow Case").await?;
        let customer_id = CustomerId::new(customer.id);
        let first = create_flower(&db, customer_id, flower_input("Ueda", i64::MAX)).await?;
        create_flower(&db, customer_id, flower_input("Ueda", 1)).await?;

        let target_id = FlowerBillingTargetId::new(first.billing_target.unwrap().id);
        assert!(matches!(
            target_total(&db, target_id).await,
            Err(Error::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            list_billing_targets(&db, customer_id).await,
            Err(Error::AmountOutOfRange { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_conflict_keeps_transaction_usable() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Conflict Case").await?;
        let customer_id = CustomerId::new(customer.id);
        let flower = create_flower(&db, customer_id, flower_input("Mori", 3_000)).await?;
        let existing = flower.billing_target.unwrap();

        let txn = db.begin().await?;
        let again = upsert_billing_target(&txn, customer_id, "Mori", "Tokyo", None).await?;
        assert_eq!(again.id, existing.id);
        assert_eq!(again.created_at, existing.created_at);

        // Later statements in the same transaction still run after the conflicting insert
        let other = upsert_billing_target(&txn, customer_id, "Sato", "Tokyo", None).await?;
        unlink_flower(&txn, flower.flower.id).await?;
        link_flower(&txn, other.id, flower.flower.id).await?;
        txn.commit().await?;

        assert_eq!(FlowerBillingTarget::find().all(&db).await?.len(), 2);
        let moved = FlowerId::new(flower.flower.id);
        let detail = get_flower(&db, moved).await?;
        assert_eq!(detail.billing_target.map(|t| t.id), Some(other.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_leaves_flower_and_link_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Flower Rollback").await?;
        let customer_id = CustomerId::new(customer.id);
        let created = create_flower(&db, customer_id, flower_input("Kato", 4_000)).await?;
        let flower_id = FlowerId::new(created.flower.id);
        let old_target = created.billing_target.unwrap();

        // Reject every new link so the update fails only after the flower row and its old link
        // have been changed
        db.execute_unprepared(
            "CREATE TRIGGER reject_links BEFORE INSERT ON flower_billing_target_items \
             BEGIN SELECT RAISE(ABORT, 'link rejected'); END",
        )
        .await?;

        let result = update_flower(&db, flower_id, flower_input("Endo", 9_000)).await;
        assert!(matches!(result, Err(Error::Database(_))));

        let detail = get_flower(&db, flower_id).await?;
        assert_eq!(detail.flower.bill_to_name, "Kato");
        assert_eq!(detail.flower.amount, 4_000);
        assert_eq!(detail.billing_target.map(|t| t.id), Some(old_target.id));
        let targets = FlowerBillingTarget::find().all(&db).await?;
        assert_eq!(targets.len(), 1);
        assert_eq!(
            target_total(&db, FlowerBillingTargetId::new(old_target.id)).await?,
            Yen::new(4_000)
        );

        Ok(())
    }
}

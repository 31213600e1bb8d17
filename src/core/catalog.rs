//! Product catalog - the products and price variants estimate lines can reference.
//!
//! Products are seeded from config.toml. Lines keep their own copy of description and prices,
//! so deactivating a product never changes existing documents.

use crate::{
    config::catalog::ProductConfig,
    core::ids::ProductItemId,
    entities::{ProductItem, ProductVariant, product_item, product_variant},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// A product with its active variants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithVariants {
    /// The catalog product
    pub product: product_item::Model,
    /// Active variants, ordered by id
    pub variants: Vec<product_variant::Model>,
}

/// Inserts configured products whose names are not in the catalog yet.
///
/// Returns how many products were added. Running it again with the same configuration adds
/// nothing.
#[instrument(skip(db, products))]
pub async fn seed_catalog(db: &DatabaseConnection, products: &[ProductConfig]) -> Result<usize> {
    info!(
        "Seeding product catalog. Found {} products in configuration.",
        products.len()
    );
    let txn = db.begin().await?;

    let mut added = 0;
    for config in products {
        let exists = ProductItem::find()
            .filter(product_item::Column::Name.eq(config.name.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            debug!("Product '{}' already in catalog. Skipping.", config.name);
            continue;
        }

        let product = product_item::ActiveModel {
            name: Set(config.name.clone()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for variant in &config.variants {
            product_variant::ActiveModel {
                product_item_id: Set(product.id),
                name: Set(variant.name.clone()),
                price_general: Set(variant.price_general),
                price_member: Set(variant.price_member),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        debug!(
            "Added product '{}' with {} variants",
            config.name,
            config.variants.len()
        );
        added += 1;
    }

    txn.commit().await?;
    info!("Product catalog seeded: {added} added");
    Ok(added)
}

/// Lists active products ordered by name, each with its active variants.
///
/// `name_filter` matches a substring of the product name.
pub async fn list_products(
    db: &DatabaseConnection,
    name_filter: Option<&str>,
) -> Result<Vec<ProductWithVariants>> {
    let mut query = ProductItem::find().filter(product_item::Column::IsActive.eq(true));
    if let Some(name) = name_filter.filter(|s| !s.is_empty()) {
        query = query.filter(product_item::Column::Name.contains(name));
    }

    let rows = query
        .order_by_asc(product_item::Column::Name)
        .order_by_asc(product_item::Column::Id)
        .find_with_related(ProductVariant)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(product, variants)| {
            let mut variants: Vec<_> = variants.into_iter().filter(|v| v.is_active).collect();
            variants.sort_by_key(|v| v.id);
            ProductWithVariants { product, variants }
        })
        .collect())
}

/// Lists the active variants of one product.
pub async fn list_variants(
    db: &DatabaseConnection,
    product_item_id: ProductItemId,
) -> Result<Vec<product_variant::Model>> {
    ProductVariant::find()
        .filter(product_variant::Column::ProductItemId.eq(product_item_id.get()))
        .filter(product_variant::Column::IsActive.eq(true))
        .order_by_asc(product_variant::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are generated from
//! the entity definitions with `Schema::create_table_from_entity`, so the schema always matches the
//! Rust models. The two natural keys the business rules rely on are added as unique indexes.

use super::settings::DatabaseSettings;
use crate::entities::{
    Customer, CustomerMembership, Estimate, EstimateItem, Flower, FlowerBillingTarget,
    FlowerBillingTargetItem, Invoice, InvoiceItem, Payment, ProductItem, ProductVariant,
    customer_membership, flower_billing_target,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::info;

/// Used when neither `DATABASE_URL` nor config.toml names a database
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/funeral_backoffice.sqlite?mode=rwc";

/// Resolves the database URL: `DATABASE_URL`, then the settings file, then the default path.
#[must_use]
pub fn get_database_url(settings: &DatabaseSettings) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| settings.url.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    info!("Connected to database");
    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table and unique index that does not exist yet.
///
/// Parents are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Customer).await?;
    create_table(db, &schema, CustomerMembership).await?;
    create_table(db, &schema, ProductItem).await?;
    create_table(db, &schema, ProductVariant).await?;
    create_table(db, &schema, Estimate).await?;
    create_table(db, &schema, EstimateItem).await?;
    create_table(db, &schema, Invoice).await?;
    create_table(db, &schema, InvoiceItem).await?;
    create_table(db, &schema, Flower).await?;
    create_table(db, &schema, FlowerBillingTarget).await?;
    create_table(db, &schema, FlowerBillingTargetItem).await?;
    create_table(db, &schema, Payment).await?;

    let membership_row = Index::create()
        .name("idx_customer_memberships_customer_row")
        .table(CustomerMembership)
        .col(customer_membership::Column::CustomerId)
        .col(customer_membership::Column::RowNo)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&membership_row)).await?;

    let billing_key = Index::create()
        .name("idx_flower_billing_targets_customer_key")
        .table(FlowerBillingTarget)
        .col(flower_billing_target::Column::CustomerId)
        .col(flower_billing_target::Column::BillToKey)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&billing_key)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        customer, customer_membership::Model as MembershipModel, invoice::Model as InvoiceModel,
        payment::Model as PaymentModel,
    };
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, QuerySelect, Set};

    #[test]
    fn test_settings_url_used_without_env() {
        let settings = DatabaseSettings {
            url: Some("sqlite::memory:".to_string()),
        };
        let url = get_database_url(&settings);
        match std::env::var("DATABASE_URL") {
            Ok(env_url) => assert_eq!(url, env_url),
            Err(_) => assert_eq!(url, "sqlite::memory:"),
        }
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<MembershipModel> = CustomerMembership::find().limit(1).all(&db).await?;
        let _: Vec<InvoiceModel> = Invoice::find().limit(1).all(&db).await?;
        let _: Vec<PaymentModel> = Payment::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_membership_row_is_unique_per_customer() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let now = Utc::now();
        let case = customer::ActiveModel {
            deceased_name: Set("Index Case".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let row = |row_no: i32| customer_membership::ActiveModel {
            customer_id: Set(case.id),
            row_no: Set(row_no),
            ..Default::default()
        };
        row(1).insert(&db).await?;
        row(2).insert(&db).await?;
        assert!(row(1).insert(&db).await.is_err());

        Ok(())
    }
}

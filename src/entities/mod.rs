//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod customer;
pub mod customer_membership;
pub mod estimate;
pub mod estimate_item;
pub mod flower;
pub mod flower_billing_target;
pub mod flower_billing_target_item;
pub mod invoice;
pub mod invoice_item;
pub mod payment;
pub mod product_item;
pub mod product_variant;
pub mod sea_orm_active_enums;

// Re-export specific types to avoid conflicts
pub use customer::{Column as CustomerColumn, Entity as Customer, Model as CustomerModel};
pub use customer_membership::{
    Column as CustomerMembershipColumn, Entity as CustomerMembership,
    Model as CustomerMembershipModel,
};
pub use estimate::{Column as EstimateColumn, Entity as Estimate, Model as EstimateModel};
pub use estimate_item::{
    Column as EstimateItemColumn, Entity as EstimateItem, Model as EstimateItemModel,
};
pub use flower::{Column as FlowerColumn, Entity as Flower, Model as FlowerModel};
pub use flower_billing_target::{
    Column as FlowerBillingTargetColumn, Entity as FlowerBillingTarget,
    Model as FlowerBillingTargetModel,
};
pub use flower_billing_target_item::{
    Column as FlowerBillingTargetItemColumn, Entity as FlowerBillingTargetItem,
    Model as FlowerBillingTargetItemModel,
};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use invoice_item::{
    Column as InvoiceItemColumn, Entity as InvoiceItem, Model as InvoiceItemModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use product_item::{
    Column as ProductItemColumn, Entity as ProductItem, Model as ProductItemModel,
};
pub use product_variant::{
    Column as ProductVariantColumn, Entity as ProductVariant, Model as ProductVariantModel,
};

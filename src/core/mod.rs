/// Product catalog seeding and lookup
pub mod catalog;

/// Case intake and the case list
pub mod customer;

/// Payload types shared by estimates and invoices
pub mod document;

/// Estimate lifecycle
pub mod estimate;

/// Flower orders and billing-target consolidation
pub mod flower;

/// Typed identifiers
pub mod ids;

/// Form input normalisation
pub mod input;

/// Invoice lifecycle and estimate conversion
pub mod invoice;

/// Membership rows and the prepaid total
pub mod membership;

/// Integer yen amounts
pub mod money;

/// Append-only payment ledger
pub mod payment;

/// Document totals calculation
pub mod totals;

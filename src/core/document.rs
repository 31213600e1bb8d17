//! Payload types and helpers shared by estimates and invoices.
//!
//! Both documents carry the same descriptive fields and the same kind of line items; the
//! helpers here normalise a form payload once so both lifecycles store it the same way.

use crate::{
    core::{
        ids::{ProductItemId, ProductVariantId},
        input::non_empty,
        money::Yen,
        totals::LineAmount,
    },
    entities::{
        estimate_item,
        sea_orm_active_enums::{self, AltarPlaceType, CremationProcessType},
    },
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Status given to documents created without one
pub const DEFAULT_STATUS: &str = "DRAFT";

/// One line of an estimate or invoice as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemInput {
    /// Catalog product, absent for freeform lines
    pub product_item_id: Option<ProductItemId>,
    /// Catalog variant of that product
    pub product_variant_id: Option<ProductVariantId>,
    /// Free text shown on the line
    pub description: Option<String>,
    /// Unit price for non-members; 0 when absent
    pub unit_price_general: Option<i64>,
    /// Unit price for members; 0 when absent
    pub unit_price_member: Option<i64>,
    /// Quantity; 0 when absent
    pub qty: Option<i32>,
    /// Line total computed by the client; stored as supplied
    pub amount: Option<i64>,
    /// Display order; defaults to the line's position in the payload
    pub sort_no: Option<i32>,
}

/// Estimate or invoice form payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentInput {
    /// Document number printed on the form
    pub doc_no: Option<String>,
    /// Free-form status; `DRAFT` on create when absent, unchanged on update when absent
    pub status: Option<String>,
    /// `FAMILY`, `NEIGHBORHOOD`, or `COMPANY`; anything else is stored as `NULL`
    pub cremation_process_type: Option<String>,
    /// `HOME` or `FUNERAL_HALL`; anything else is stored as `NULL`
    pub altar_place_type: Option<String>,
    /// Ceiling height of the altar room, free text
    pub ceiling_height: Option<String>,
    /// Staff member who drew up the estimate
    pub estimate_staff: Option<String>,
    /// Staff member running the ceremony
    pub ceremony_staff: Option<String>,
    /// Staff member handling transport
    pub transport_staff: Option<String>,
    /// Staff member handling decoration
    pub decoration_staff: Option<String>,
    /// Staff member handling returns
    pub return_staff: Option<String>,
    /// Issue date printed on the document
    pub issued_at: Option<DateTime<Utc>>,
    /// Lines in payload order; they replace any stored lines
    pub items: Vec<LineItemInput>,
}

/// Normalised, storable descriptive fields of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptiveFields {
    /// Document number, `None` when blank
    pub doc_no: Option<String>,
    /// Coerced cremation process, `None` when unrecognised
    pub cremation_process_type: Option<CremationProcessType>,
    /// Coerced altar place, `None` when unrecognised
    pub altar_place_type: Option<AltarPlaceType>,
    /// Ceiling height of the altar room
    pub ceiling_height: Option<String>,
    /// Estimate staff
    pub estimate_staff: Option<String>,
    /// Ceremony staff
    pub ceremony_staff: Option<String>,
    /// Transport staff
    pub transport_staff: Option<String>,
    /// Decoration staff
    pub decoration_staff: Option<String>,
    /// Return staff
    pub return_staff: Option<String>,
    /// Issue date
    pub issued_at: Option<DateTime<Utc>>,
}

impl DocumentInput {
    /// Coerces enum fields and drops empty strings.
    #[must_use]
    pub fn descriptive_fields(&self) -> DescriptiveFields {
        DescriptiveFields {
            doc_no: non_empty(self.doc_no.clone()),
            cremation_process_type: sea_orm_active_enums::coerce(
                self.cremation_process_type.as_deref(),
            ),
            altar_place_type: sea_orm_active_enums::coerce(self.altar_place_type.as_deref()),
            ceiling_height: non_empty(self.ceiling_height.clone()),
            estimate_staff: non_empty(self.estimate_staff.clone()),
            ceremony_staff: non_empty(self.ceremony_staff.clone()),
            transport_staff: non_empty(self.transport_staff.clone()),
            decoration_staff: non_empty(self.decoration_staff.clone()),
            return_staff: non_empty(self.return_staff.clone()),
            issued_at: self.issued_at,
        }
    }

    /// Resolves every line's defaults.
    #[must_use]
    pub fn line_drafts(&self) -> Vec<LineDraft> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| LineDraft {
                product_item_id: item.product_item_id.map(ProductItemId::get),
                product_variant_id: item.product_variant_id.map(ProductVariantId::get),
                description: item.description.clone(),
                unit_price_general: item.unit_price_general.unwrap_or(0),
                unit_price_member: item.unit_price_member.unwrap_or(0),
                qty: item.qty.unwrap_or(0),
                amount: item.amount.unwrap_or(0),
                sort_no: item
                    .sort_no
                    .unwrap_or_else(|| i32::try_from(index).unwrap_or(i32::MAX)),
            })
            .collect()
    }
}

/// A line ready to be inserted under either document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDraft {
    /// Raw catalog product id
    pub product_item_id: Option<i64>,
    /// Raw catalog variant id
    pub product_variant_id: Option<i64>,
    /// Free text shown on the line
    pub description: Option<String>,
    /// Non-member unit price
    pub unit_price_general: i64,
    /// Member unit price
    pub unit_price_member: i64,
    /// Quantity
    pub qty: i32,
    /// Line total as supplied
    pub amount: i64,
    /// Display order
    pub sort_no: i32,
}

impl LineAmount for LineDraft {
    fn line_amount(&self) -> Option<Yen> {
        Some(Yen::new(self.amount))
    }
}

impl From<&estimate_item::Model> for LineDraft {
    fn from(item: &estimate_item::Model) -> Self {
        Self {
            product_item_id: item.product_item_id,
            product_variant_id: item.product_variant_id,
            description: item.description.clone(),
            unit_price_general: item.unit_price_general,
            unit_price_member: item.unit_price_member,
            qty: item.qty,
            amount: item.amount,
            sort_no: item.sort_no,
        }
    }
}

/// Writes descriptive fields and computed totals onto an estimate or invoice `ActiveModel`.
macro_rules! apply_document_fields {
    ($model:expr, $fields:expr, $totals:expr) => {{
        let fields = $fields;
        let totals = $totals;
        $model.doc_no = ::sea_orm::ActiveValue::Set(fields.doc_no);
        $model.cremation_process_type = ::sea_orm::ActiveValue::Set(fields.cremation_process_type);
        $model.altar_place_type = ::sea_orm::ActiveValue::Set(fields.altar_place_type);
        $model.ceiling_height = ::sea_orm::ActiveValue::Set(fields.ceiling_height);
        $model.estimate_staff = ::sea_orm::ActiveValue::Set(fields.estimate_staff);
        $model.ceremony_staff = ::sea_orm::ActiveValue::Set(fields.ceremony_staff);
        $model.transport_staff = ::sea_orm::ActiveValue::Set(fields.transport_staff);
        $model.decoration_staff = ::sea_orm::ActiveValue::Set(fields.decoration_staff);
        $model.return_staff = ::sea_orm::ActiveValue::Set(fields.return_staff);
        $model.issued_at = ::sea_orm::ActiveValue::Set(fields.issued_at);
        $model.subtotal = ::sea_orm::ActiveValue::Set(totals.subtotal.get());
        $model.tax = ::sea_orm::ActiveValue::Set(totals.tax.get());
        $model.total = ::sea_orm::ActiveValue::Set(totals.total.get());
        $model.membership_paid_amount =
            ::sea_orm::ActiveValue::Set(totals.membership_paid_amount.get());
        $model.grand_total = ::sea_orm::ActiveValue::Set(totals.grand_total.get());
        $model.updated_at = ::sea_orm::ActiveValue::Set(chrono::Utc::now());
    }};
}

pub(crate) use apply_document_fields;

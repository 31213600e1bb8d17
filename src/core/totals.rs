//! Document totals calculation.
//!
//! The single place where subtotal, tax, total, and the amount due after the membership
//! deduction are worked out. Estimates and invoices call it identically on create, update,
//! and conversion.

use crate::core::money::Yen;
use crate::errors::{Error, Result};
use serde::Serialize;

/// Consumption tax rate, in percent
pub const TAX_RATE_PERCENT: i64 = 10;

/// Anything that contributes a line amount to a document.
pub trait LineAmount {
    /// The line total; `None` counts as zero.
    fn line_amount(&self) -> Option<Yen>;
}

/// Computed money fields of an estimate or invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    /// Sum of line amounts
    pub subtotal: Yen,
    /// Tax on the subtotal, rounded to the nearest yen
    pub tax: Yen,
    /// Subtotal plus tax
    pub total: Yen,
    /// Membership prepayment applied
    pub membership_paid_amount: Yen,
    /// Total minus prepayment, floored at zero
    pub grand_total: Yen,
}

fn out_of_range(what: &str) -> Error {
    Error::AmountOutOfRange {
        what: what.to_string(),
    }
}

/// Computes the totals of a document from its lines and the case's membership prepayment.
///
/// # Errors
/// Returns [`Error::AmountOutOfRange`] if the subtotal, tax, or total does not fit in an `i64`.
pub fn compute_totals<T: LineAmount>(
    items: &[T],
    membership_prepaid: Yen,
) -> Result<DocumentTotals> {
    let amounts = items
        .iter()
        .map(|item| item.line_amount().unwrap_or(Yen::ZERO));
    let subtotal = Yen::checked_sum(amounts).ok_or_else(|| out_of_range("subtotal"))?;
    let tax = subtotal
        .percent(TAX_RATE_PERCENT)
        .ok_or_else(|| out_of_range("tax"))?;
    let total = subtotal
        .checked_add(tax)
        .ok_or_else(|| out_of_range("total"))?;

    Ok(DocumentTotals {
        subtotal,
        tax,
        total,
        membership_paid_amount: membership_prepaid,
        grand_total: total.saturating_deduct(membership_prepaid),
    })
}

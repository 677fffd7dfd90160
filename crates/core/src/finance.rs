//! Money arithmetic for accounts payable/receivable and purchase orders.
//!
//! Stored amounts are `NUMERIC(14,2)` and quantities `NUMERIC(14,3)`; every
//! computed value is checked against those bounds before it reaches the
//! database.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CoreError;
use crate::lifecycle::{TransactionKind, TransactionStatus};
use crate::types::{Date, Money};

/// Decimal places kept for stored amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept for purchase order quantities.
pub const QUANTITY_SCALE: u32 = 3;

/// Prefix of generated purchase order numbers.
pub const PURCHASE_ORDER_PREFIX: &str = "PO";

/// Largest amount a money column holds: `999 999 999 999.99`.
pub fn max_amount() -> Money {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

/// Largest purchase order quantity: `99 999 999 999.999`.
pub fn max_quantity() -> Money {
    Decimal::new(99_999_999_999_999, QUANTITY_SCALE)
}

/// Round to cents, half away from zero.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Reject a computed amount that does not fit a money column.
///
/// `field` prefixes the error message.
fn ensure_storable(field: &str, value: Money) -> Result<Money, CoreError> {
    if value.abs() > max_amount() {
        return Err(CoreError::Validation(format!(
            "{field}: exceeds the maximum amount of {}",
            max_amount()
        )));
    }
    Ok(value)
}

/// Checked sum of two amounts, bounded by [`max_amount`].
pub fn checked_sum(field: &str, a: Money, b: Money) -> Result<Money, CoreError> {
    let sum = a.checked_add(b).ok_or_else(|| {
        CoreError::Validation(format!("{field}: exceeds the maximum amount of {}", max_amount()))
    })?;
    ensure_storable(field, sum)
}

/// Total of a single purchase order line.
pub fn line_total(quantity: Money, unit_price: Money) -> Result<Money, CoreError> {
    let product = quantity.checked_mul(unit_price).ok_or_else(|| {
        CoreError::Validation(format!(
            "line_total: exceeds the maximum amount of {}",
            max_amount()
        ))
    })?;
    ensure_storable("line_total", round_money(product))
}

/// Signed change applied to an account when a transaction is settled.
///
/// Receivables bring money in; payables take it out.
pub fn balance_delta(kind: TransactionKind, amount: Money) -> Money {
    match kind {
        TransactionKind::Receivable => amount,
        TransactionKind::Payable => -amount,
    }
}

/// A pending transaction whose due date is strictly before `today`.
pub fn is_overdue(status: TransactionStatus, due_date: Option<Date>, today: Date) -> bool {
    status == TransactionStatus::Pending && due_date.is_some_and(|due| due < today)
}

/// Format a per-company purchase order sequence number, e.g. `PO-000042`.
pub fn purchase_order_number(sequence: i64) -> String {
    format!("{PURCHASE_ORDER_PREFIX}-{sequence:06}")
}

/// Line totals and order total of a validated line set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLines {
    /// One entry per input line, in input order.
    pub line_totals: Vec<Money>,
    pub total: Money,
}

/// Validate a line set and compute its totals.
///
/// Quantities must be positive, prices non-negative, and every line total
/// as well as the order total must fit a money column.
pub fn price_order_lines<'a>(
    lines: impl IntoIterator<Item = (&'a Money, &'a Money)>,
) -> Result<PricedLines, CoreError> {
    let mut line_totals = Vec::new();
    let mut total = Decimal::ZERO;
    for (index, (qty, price)) in lines.into_iter().enumerate() {
        if qty.is_sign_negative() || qty.is_zero() {
            return Err(CoreError::Validation(format!(
                "lines[{index}].quantity: must be greater than zero"
            )));
        }
        if *qty > max_quantity() {
            return Err(CoreError::Validation(format!(
                "lines[{index}].quantity: must not exceed {}",
                max_quantity()
            )));
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(CoreError::Validation(format!(
                "lines[{index}].unit_price: must not be negative"
            )));
        }
        if *price > max_amount() {
            return Err(CoreError::Validation(format!(
                "lines[{index}].unit_price: must not exceed {}",
                max_amount()
            )));
        }
        let line = line_total(*qty, *price).map_err(|_| {
            CoreError::Validation(format!(
                "lines[{index}]: line total exceeds the maximum amount of {}",
                max_amount()
            ))
        })?;
        total = checked_sum("total", total, line)?;
        line_totals.push(line);
    }
    if line_totals.is_empty() {
        return Err(CoreError::Validation(
            "lines: a purchase order needs at least one line".into(),
        ));
    }
    Ok(PricedLines { line_totals, total })
}

//! Money helpers using decimal arithmetic.
//!
//! All amounts are US dollars held as [`Decimal`]. Anything that crosses a
//! boundary (gateway signing, display, notifications) goes through
//! [`format_amount`] so it always carries exactly two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places for currency amounts.
const CURRENCY_DP: u32 = 2;

/// Round an amount to cents, half away from zero.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two decimal places (e.g. `12.00`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = round_currency(amount);
    rounded.rescale(CURRENCY_DP);
    rounded.to_string()
}

/// Price of one order line: unit price times quantity.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

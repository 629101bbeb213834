//! Payable amount derivation
//!
//! All arithmetic is `rust_decimal::Decimal`; floats never touch money.
//! Tax is rounded to whole currency units before it is added, so the
//! quoted total is always the sum of a validated amount and a whole-unit
//! figure. The gateway takes minor units (1/100 of the currency).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use shared::models::PayableQuote;

/// 18% GST, applied on top of the staff-set base amount.
pub const TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Quote the payable total for a base service amount.
pub fn quote(base_amount: Decimal) -> PayableQuote {
    let tax = (base_amount * TAX_RATE)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    PayableQuote {
        base_amount,
        tax,
        total: base_amount + tax,
    }
}

/// Convert a major-unit total to the gateway's minor units. `None` only
/// when the scaled value leaves `i64`, which validated amounts never do.
pub fn to_minor_units(total: Decimal) -> Option<i64> {
    (total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn tax_is_rounded_before_adding() {
        let q = quote(Decimal::from(10000));
        assert_eq!(q.tax, Decimal::from(1800));
        assert_eq!(q.total, Decimal::from(11800));
        assert_eq!(to_minor_units(q.total), Some(1_180_000));
    }

    #[test]
    fn fractional_tax_rounds_half_away_from_zero() {
        // 18% of 2503 is 450.54, rounds to 451
        let q = quote(Decimal::from(2503));
        assert_eq!(q.tax, Decimal::from(451));
        assert_eq!(q.total, Decimal::from(2954));

        // 18% of 25 is exactly 4.5, rounds away from zero to 5
        let q = quote(Decimal::from(25));
        assert_eq!(q.tax, Decimal::from(5));
        assert_eq!(q.total, Decimal::from(30));
    }

    #[test]
    fn total_is_base_plus_rounded_tax() {
        for amount in [1, 25, 999, 2503, 5000, 10000, 123456] {
            let amount = Decimal::from(amount);
            let q = quote(amount);
            assert!(q.total >= amount);
            assert_eq!(q.total, q.base_amount + q.tax);
        }
    }

    #[test]
    fn fractional_amounts_convert_to_minor_units_exactly() {
        // 18% of 4999.99 is 899.9982; tax rounds to 900 and the total
        // keeps its two exact decimal places down to minor units.
        let q = quote(dec("4999.99"));
        assert_eq!(q.tax, Decimal::from(900));
        assert_eq!(q.total, dec("5899.99"));
        assert_eq!(to_minor_units(q.total), Some(589_999));

        assert_eq!(to_minor_units(Decimal::from(5900)), Some(590_000));
        assert_eq!(to_minor_units(dec("29.5")), Some(2950));
    }

    #[test]
    fn equal_totals_compare_equal_across_scales() {
        // A stored "5900" row must match a freshly quoted 5900.00
        assert_eq!(dec("5900"), dec("5900.00"));
        assert_ne!(dec("5900"), dec("5900.01"));
    }
}

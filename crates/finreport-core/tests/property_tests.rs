//! Property-based tests for finreport-core.
//!
//! Run with: cargo test -p finreport-core --test `property_tests`

use finreport_core::{FilterField, Movement, MovementTable, PeriodOptions};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_code() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("700".to_string()),
        Just("710".to_string()),
        Just("800".to_string()),
    ]
}

fn arb_movement() -> impl Strategy<Value = Movement> {
    (2020i32..2026i32, arb_decimal(), arb_code(), 1u32..13u32).prop_map(
        |(year, amount, code, period)| {
            Movement::new(year, amount)
                .with(FilterField::Code1, code)
                .with_period(period)
        },
    )
}

fn arb_table() -> impl Strategy<Value = MovementTable> {
    prop::collection::vec(arb_movement(), 0..40).prop_map(MovementTable::from)
}

// ============================================================================
// Table properties
// ============================================================================

proptest! {
    #[test]
    fn prop_filter_never_grows(table in arb_table(), code in arb_code()) {
        let filtered = table.filter(|m| m.field(FilterField::Code1) == Some(code.as_str()));
        prop_assert!(filtered.len() <= table.len());
        for m in &filtered {
            prop_assert_eq!(m.field(FilterField::Code1), Some(code.as_str()));
        }
    }

    #[test]
    fn prop_filter_is_idempotent(table in arb_table(), code in arb_code()) {
        let pred = |m: &Movement| m.field(FilterField::Code1) == Some(code.as_str());
        let once = table.filter(pred);
        let twice = once.filter(pred);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_years_cover_every_row(table in arb_table()) {
        let years = table.years();
        for m in &table {
            prop_assert!(years.contains(&m.year));
        }
        prop_assert!(years.len() <= table.len());
    }

    #[test]
    fn prop_period_options_sorted_unique(years in prop::collection::vec(2000i32..2030, 0..10)) {
        let opts = PeriodOptions::new(years.clone());
        let rendered = opts.years();
        prop_assert!(rendered.windows(2).all(|w| w[0] < w[1]));
        for y in &years {
            prop_assert!(rendered.contains(y));
        }
    }
}

//! Property-based tests for the filter engine.
//!
//! Run with: cargo test -p finreport-filter --test `filter_properties`

use finreport_core::{FilterField, FilterSpec, Movement, MovementTable};
use finreport_filter::{apply_filter, Filter};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Value};

// ============================================================================
// Generators
// ============================================================================

const CODES: [&str; 4] = ["700", "710", "800", "810"];
const NAMES: [&str; 3] = ["Sales", "Services", "Rent"];

fn arb_movement() -> impl Strategy<Value = Movement> {
    (
        2022i32..2025,
        -10_000i64..10_000,
        prop::sample::select(CODES.to_vec()),
        prop::sample::select(NAMES.to_vec()),
        100u32..300,
    )
        .prop_map(|(year, cents, code, name, account)| {
            Movement::new(year, Decimal::new(cents, 2))
                .with(FilterField::Code1, code)
                .with(FilterField::Name1, name)
                .with(FilterField::AccountCode, account.to_string())
        })
}

fn arb_table() -> impl Strategy<Value = MovementTable> {
    prop::collection::vec(arb_movement(), 0..50).prop_map(MovementTable::from)
}

fn arb_code_condition() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::sample::select(CODES.to_vec()).prop_map(|c| json!(c)),
        prop::sample::subsequence(CODES.to_vec(), 1..=3).prop_map(|cs| json!(cs)),
    ]
}

fn arb_range() -> impl Strategy<Value = Value> {
    (100u32..300, 0u32..100).prop_map(|(low, width)| json!({"gte": low, "lt": low + width}))
}

fn arb_spec() -> impl Strategy<Value = FilterSpec> {
    (
        prop::option::of(arb_code_condition()),
        prop::option::of(prop::sample::select(NAMES.to_vec())),
        prop::option::of(arb_range()),
    )
        .prop_map(|(code, name, range)| {
            let mut spec = FilterSpec::new();
            if let Some(code) = code {
                spec.insert("code1".to_string(), code);
            }
            if let Some(name) = name {
                spec.insert("name1".to_string(), json!(name));
            }
            if let Some(range) = range {
                spec.insert("account_code".to_string(), range);
            }
            spec
        })
}

/// Independent restatement of the matching rules for the generated specs.
fn satisfies(movement: &Movement, spec: &FilterSpec) -> bool {
    spec.iter().all(|(field, value)| {
        let field = FilterField::from_name(field).unwrap();
        let Some(actual) = movement.field(field) else {
            return false;
        };
        match value {
            Value::String(s) => actual == s,
            Value::Array(items) => items.iter().any(|v| v.as_str() == Some(actual)),
            Value::Object(range) => {
                let n: u64 = actual.parse().unwrap();
                range.iter().all(|(op, bound)| {
                    let b = bound.as_u64().unwrap();
                    match op.as_str() {
                        "gte" => n >= b,
                        "lt" => n < b,
                        _ => unreachable!(),
                    }
                })
            }
            _ => unreachable!(),
        }
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_every_returned_row_satisfies_spec(table in arb_table(), spec in arb_spec()) {
        let filtered = apply_filter(&table, &spec).unwrap();
        for m in &filtered {
            prop_assert!(satisfies(m, &spec));
        }
        let expected = table.iter().filter(|m| satisfies(m, &spec)).count();
        prop_assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn prop_result_never_larger_than_input(table in arb_table(), spec in arb_spec()) {
        let filtered = apply_filter(&table, &spec).unwrap();
        prop_assert!(filtered.len() <= table.len());
    }

    #[test]
    fn prop_filter_is_idempotent(table in arb_table(), spec in arb_spec()) {
        let once = apply_filter(&table, &spec).unwrap();
        let twice = apply_filter(&once, &spec).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_empty_spec_returns_all_rows(table in arb_table()) {
        prop_assert_eq!(apply_filter(&table, &FilterSpec::new()).unwrap(), table);
    }

    #[test]
    fn prop_compiled_filter_agrees_with_apply(table in arb_table(), spec in arb_spec()) {
        let filter = Filter::compile(&spec).unwrap();
        let by_filter: Vec<_> = table.iter().filter(|m| filter.matches(m)).cloned().collect();
        prop_assert_eq!(apply_filter(&table, &spec).unwrap().into_rows(), by_filter);
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_code1_filter_returns_matching_rows_in_order() {
    let table: MovementTable = ["700", "710", "700"]
        .iter()
        .enumerate()
        .map(|(i, code)| Movement::new(2024, Decimal::from(i as i64)).with(FilterField::Code1, *code))
        .collect();

    let mut spec = FilterSpec::new();
    spec.insert("code1".to_string(), json!("700"));
    let filtered = apply_filter(&table, &spec).unwrap();

    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered.rows()[0].amount, Some(Decimal::from(0)));
    assert_eq!(filtered.rows()[1].amount, Some(Decimal::from(2)));
}

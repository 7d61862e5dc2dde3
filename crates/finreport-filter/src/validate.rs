//! Static validation of filter specifications.

use finreport_core::{FilterField, FilterSpec, ValidationResult};
use serde_json::Value;

/// Range operators a range object may use.
pub const RANGE_OPERATORS: [&str; 4] = ["gte", "lte", "gt", "lt"];

/// Check a filter specification without touching any data.
///
/// Field paths in the result are relative to the specification: `code1`,
/// `code2[1]` for an array element, `account_code.gte` for a range bound.
pub fn validate_filter(spec: &FilterSpec) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (field, value) in spec {
        if FilterField::from_name(field).is_none() {
            result.error(
                field.as_str(),
                format!(
                    "Unknown filter field: {field}. Allowed fields: {}",
                    allowed_fields()
                ),
            );
            continue;
        }
        validate_value(field, value, &mut result);
    }

    result
}

fn validate_value(field: &str, value: &Value, result: &mut ValidationResult) {
    match value {
        Value::Null => result.error(field, "Filter value must not be null"),
        Value::Array(items) => {
            if items.is_empty() {
                result.error(field, "Filter array must not be empty");
            }
            for (i, item) in items.iter().enumerate() {
                let path = format!("{field}[{i}]");
                match item {
                    Value::Null => result.error(path, "Filter array must not contain null values"),
                    Value::Array(_) | Value::Object(_) => {
                        result.error(path, "Filter array values must be scalars");
                    }
                    _ => {}
                }
            }
        }
        Value::Object(range) => {
            if range.is_empty() {
                result.error(field, "Range filter must have at least one operator");
            }
            for (op, bound) in range {
                let path = format!("{field}.{op}");
                if !RANGE_OPERATORS.contains(&op.as_str()) {
                    result.error(
                        path,
                        format!(
                            "Unknown range operator: {op}. Allowed operators: {}",
                            RANGE_OPERATORS.join(", ")
                        ),
                    );
                    continue;
                }
                match bound {
                    Value::Null => result.error(path, "Range bound must not be null"),
                    Value::Array(_) | Value::Object(_) => {
                        result.error(path, "Range bound must be a scalar");
                    }
                    _ => {}
                }
            }
        }
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn allowed_fields() -> String {
    FilterField::ALL
        .iter()
        .map(FilterField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use finreport_core::definition::filter_spec;
    use serde_json::json;

    fn fields(result: &ValidationResult) -> Vec<&str> {
        let mut fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        fields.sort_unstable();
        fields
    }

    #[test]
    fn test_valid_specifications() {
        let spec = filter_spec([
            ("code1", json!("700")),
            ("code2", json!(["10", "20"])),
            ("account_code", json!({"gte": 100, "lt": 200})),
            ("statement_type", json!(true)),
        ]);
        assert!(validate_filter(&spec).is_valid());
        assert!(validate_filter(&FilterSpec::new()).is_valid());
    }

    #[test]
    fn test_unknown_field() {
        let result = validate_filter(&filter_spec([("amount", json!(5))]));
        assert_eq!(fields(&result), vec!["amount"]);
        assert!(result.errors[0].message.starts_with("Unknown filter field: amount"));
    }

    #[test]
    fn test_null_value() {
        let result = validate_filter(&filter_spec([("code1", json!(null))]));
        assert_eq!(result.error_messages(), vec!["Filter value must not be null"]);
    }

    #[test]
    fn test_array_rules() {
        let result = validate_filter(&filter_spec([
            ("code1", json!([])),
            ("code2", json!(["a", null, ["b"]])),
        ]));
        assert_eq!(fields(&result), vec!["code1", "code2[1]", "code2[2]"]);
    }

    #[test]
    fn test_range_rules() {
        let result = validate_filter(&filter_spec([
            ("code1", json!({})),
            ("account_code", json!({"gte": null, "between": 5, "lt": [1]})),
        ]));
        assert_eq!(
            fields(&result),
            vec!["account_code.between", "account_code.gte", "account_code.lt", "code1"]
        );
    }
}

//! Pure evaluation of [`ChainCondition`]s against a [`ChainDataBag`].

use crate::agent_chain::model::{ChainCondition, ChainDataBag};
use serde_json::Value;

/// Evaluate a single condition. Unknown `condition_type` values evaluate
/// to `false` rather than raising an error — see `CoreError::ConditionMalformed`
/// for the caller-facing diagnostic this quietly skips.
pub fn evaluate_condition(condition: &ChainCondition, bag: &ChainDataBag) -> bool {
    let value = bag.get(&condition.data_key);
    match condition.condition_type.as_str() {
        "exists" => value.is_some(),
        "not_exists" => value.is_none(),
        "equals" => value.map(|v| v == &condition.value).unwrap_or(false),
        "not_equals" => value.map(|v| v != &condition.value).unwrap_or(true),
        "contains" => match (value, condition.value.as_str()) {
            (Some(Value::String(haystack)), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        "greater_than" => compare_numeric(value, &condition.value, |a, b| a > b),
        "less_than" => compare_numeric(value, &condition.value, |a, b| a < b),
        "in" => match condition.value.as_array() {
            Some(items) => match value {
                Some(v) => items.iter().any(|item| item == v),
                None => false,
            },
            None => false,
        },
        _ => false,
    }
}

/// Evaluate a list of conditions with AND semantics. An empty list always
/// evaluates to `true` (an agent with no conditions always runs).
pub fn evaluate_conditions(conditions: &[ChainCondition], bag: &ChainDataBag) -> bool {
    conditions.iter().all(|c| evaluate_condition(c, bag))
}

fn compare_numeric(value: Option<&Value>, target: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (value.and_then(as_f64), as_f64(target)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag_with(key: &str, value: Value) -> ChainDataBag {
        let mut bag = ChainDataBag::new();
        bag.insert(key.to_string(), value);
        bag
    }

    #[test]
    fn exists_and_not_exists() {
        let bag = bag_with("a", json!("x"));
        assert!(evaluate_condition(&ChainCondition::new("exists", "a", Value::Null), &bag));
        assert!(!evaluate_condition(&ChainCondition::new("exists", "b", Value::Null), &bag));
        assert!(evaluate_condition(&ChainCondition::new("not_exists", "b", Value::Null), &bag));
    }

    #[test]
    fn equals_and_not_equals() {
        let bag = bag_with("a", json!("x"));
        assert!(evaluate_condition(&ChainCondition::new("equals", "a", json!("x")), &bag));
        assert!(!evaluate_condition(&ChainCondition::new("equals", "a", json!("y")), &bag));
        assert!(evaluate_condition(&ChainCondition::new("not_equals", "a", json!("y")), &bag));
    }

    #[test]
    fn contains_requires_strings() {
        let bag = bag_with("a", json!("hello world"));
        assert!(evaluate_condition(&ChainCondition::new("contains", "a", json!("world")), &bag));
        assert!(!evaluate_condition(&ChainCondition::new("contains", "a", json!(5)), &bag));
        let num_bag = bag_with("a", json!(5));
        assert!(!evaluate_condition(&ChainCondition::new("contains", "a", json!("5")), &num_bag));
    }

    #[test]
    fn numeric_compare_coerces_strings() {
        let bag = bag_with("a", json!("10"));
        assert!(evaluate_condition(&ChainCondition::new("greater_than", "a", json!(5)), &bag));
        assert!(!evaluate_condition(&ChainCondition::new("less_than", "a", json!(5)), &bag));
    }

    #[test]
    fn numeric_compare_false_on_non_numeric() {
        let bag = bag_with("a", json!("not a number"));
        assert!(!evaluate_condition(&ChainCondition::new("greater_than", "a", json!(5)), &bag));
    }

    #[test]
    fn in_requires_list_value() {
        let bag = bag_with("a", json!("b"));
        assert!(evaluate_condition(&ChainCondition::new("in", "a", json!(["a", "b", "c"])), &bag));
        assert!(!evaluate_condition(&ChainCondition::new("in", "a", json!("not a list")), &bag));
    }

    #[test]
    fn unknown_type_is_false() {
        let bag = bag_with("a", json!("x"));
        assert!(!evaluate_condition(&ChainCondition::new("nonsense", "a", Value::Null), &bag));
    }

    #[test]
    fn empty_list_is_true() {
        let bag = ChainDataBag::new();
        assert!(evaluate_conditions(&[], &bag));
    }

    #[test]
    fn and_semantics() {
        let bag = bag_with("a", json!("x"));
        let conditions = vec![
            ChainCondition::new("exists", "a", Value::Null),
            ChainCondition::new("equals", "a", json!("y")),
        ];
        assert!(!evaluate_conditions(&conditions, &bag));
    }
}

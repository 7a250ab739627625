use proptest::prelude::*;
use serde_json::json;

/// Strategy for generating valid dotted field names
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,15}", 1..4).prop_map(|parts| parts.join("."))
}

/// Strategy for generating field names carrying characters outside the identifier set
pub fn unsafe_field_strategy() -> impl Strategy<Value = String> {
    ("[a-z_]{0,8}", "[$\"{}:,;() \\-]", "[a-z_]{0,8}")
        .prop_map(|(head, bad, tail)| format!("{head}{bad}{tail}"))
}

/// Strategy for generating cpu levels used as process specs
pub fn cpu_level_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("low".to_string()),
        Just("medium".to_string()),
        Just("high".to_string()),
        "[a-z]{1,8}",
    ]
}

/// Strategy for generating a batch of process specs
pub fn spec_batch_strategy() -> impl Strategy<Value = Vec<serde_json::Value>> {
    prop::collection::vec(cpu_level_strategy().prop_map(|cpu| json!(cpu)), 0..12)
}

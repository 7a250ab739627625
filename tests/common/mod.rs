#![allow(dead_code)] // Each test binary uses a different subset of these helpers

pub mod doubles;
pub mod strategies;

pub use doubles::*;
pub use strategies::*;

use cmdb_core::models::{ProcessProperty, ProcessTemplateSpec};
use serde_json::{json, Value};

/// Process spec with a single `key: value` entry
pub fn spec_with(key: &str, value: Value) -> ProcessTemplateSpec {
    let mut property = ProcessProperty::new();
    property.insert(key, value);
    ProcessTemplateSpec { spec: property }
}

/// Process spec carrying a `cpu` level
pub fn cpu_spec(level: &str) -> ProcessTemplateSpec {
    spec_with("cpu", json!(level))
}

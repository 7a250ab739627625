use super::GroupField;
use crate::constants::fields;
use serde_json::{json, Map, Value};

/// One stage of an aggregation pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keep documents whose `field` equals `value`
    Match { field: GroupField, value: Value },
    /// Collapse documents sharing the runtime value of `key`
    Group { key: GroupField },
    /// Count documents per group into `output`
    Count { output: String },
}

/// Ordered aggregation pipeline executed by a document store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality match stage
    pub fn match_eq(mut self, field: GroupField, value: Value) -> Self {
        self.stages.push(Stage::Match { field, value });
        self
    }

    /// Add a group stage keyed on the value of `key`
    pub fn group_by(mut self, key: GroupField) -> Self {
        self.stages.push(Stage::Group { key });
        self
    }

    /// Add a per-group count emitted as `count`
    pub fn count(mut self) -> Self {
        self.stages.push(Stage::Count {
            output: fields::COUNT.to_string(),
        });
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn has_match_stage(&self) -> bool {
        self.stages
            .iter()
            .any(|stage| matches!(stage, Stage::Match { .. }))
    }

    /// Render as driver documents.
    ///
    /// A group stage directly followed by a count stage renders as a single
    /// `$group` document with a `$sum: 1` accumulator.
    pub fn to_documents(&self) -> Vec<Value> {
        let mut documents = Vec::with_capacity(self.stages.len());
        let mut stages = self.stages.iter().peekable();

        while let Some(stage) = stages.next() {
            match stage {
                Stage::Match { field, value } => {
                    let mut condition = Map::new();
                    condition.insert(field.as_str().to_string(), value.clone());
                    documents.push(json!({ "$match": condition }));
                }
                Stage::Group { key } => {
                    let mut group = Map::new();
                    group.insert(fields::GROUP_ID.to_string(), json!(key.variable()));
                    if let Some(Stage::Count { output }) = stages.peek() {
                        group.insert(output.clone(), json!({ "$sum": 1 }));
                        stages.next();
                    }
                    documents.push(json!({ "$group": group }));
                }
                Stage::Count { output } => {
                    documents.push(json!({ "$count": output }));
                }
            }
        }

        documents
    }
}

//! In-process store implementations.
//!
//! Each write is atomic on its own; nothing here spans records, matching the
//! per-document guarantees of the real backend.

use super::{DocumentStore, ProcessTemplateStore, StoreError, StoreResult};
use crate::constants::{collections, fields};
use crate::models::{
    ListProcessTemplatesOption, NewProcessTemplate, ProcessProperty, ProcessTemplate,
    ProcessTemplatePage,
};
use crate::query_builder::{Pipeline, Stage};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Default)]
struct TemplateTable {
    next_id: i64,
    rows: BTreeMap<i64, ProcessTemplate>,
}

/// Process template store backed by an ordered map
#[derive(Debug, Default)]
pub struct InMemoryProcessTemplateStore {
    table: RwLock<TemplateTable>,
}

impl InMemoryProcessTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found(id: i64) -> StoreError {
        StoreError::NotFound {
            collection: collections::PROCESS_TEMPLATE.to_string(),
            id,
        }
    }
}

fn compare_templates(a: &ProcessTemplate, b: &ProcessTemplate, field: &str) -> Ordering {
    let ordering = match field {
        "id" => a.id.cmp(&b.id),
        "bk_biz_id" => a.bk_biz_id.cmp(&b.bk_biz_id),
        "service_template_id" => a.service_template_id.cmp(&b.service_template_id),
        "create_time" => a.create_time.cmp(&b.create_time),
        "last_time" => a.last_time.cmp(&b.last_time),
        other => compare_values(a.property.get(other), b.property.get(other)),
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl ProcessTemplateStore for InMemoryProcessTemplateStore {
    async fn create_process_template(
        &self,
        template: NewProcessTemplate,
    ) -> StoreResult<ProcessTemplate> {
        let mut table = self.table.write();
        table.next_id += 1;
        let now = Utc::now();
        let record = ProcessTemplate {
            id: table.next_id,
            bk_biz_id: template.bk_biz_id,
            service_template_id: template.service_template_id,
            property: template.property,
            modifier: template.creator.clone(),
            creator: template.creator,
            create_time: now,
            last_time: now,
            bk_supplier_account: template.bk_supplier_account,
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_process_template(
        &self,
        id: i64,
        property: ProcessProperty,
        modifier: &str,
    ) -> StoreResult<ProcessTemplate> {
        let mut table = self.table.write();
        let record = table.rows.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        record.property.merge(property);
        record.modifier = modifier.to_string();
        record.last_time = Utc::now();
        Ok(record.clone())
    }

    async fn get_process_template(&self, id: i64) -> StoreResult<ProcessTemplate> {
        self.table
            .read()
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn list_process_templates(
        &self,
        option: &ListProcessTemplatesOption,
    ) -> StoreResult<ProcessTemplatePage> {
        let mut matched: Vec<ProcessTemplate> = self
            .table
            .read()
            .rows
            .values()
            .filter(|template| option.matches(template))
            .cloned()
            .collect();

        if let Some((field, _)) = option.page.sort_key() {
            matched.sort_by(|a, b| option.page.directed(compare_templates(a, b, field)));
        }

        let count = matched.len() as u64;
        Ok(ProcessTemplatePage {
            count,
            info: option.page.window(matched),
        })
    }

    async fn delete_process_template_batch(&self, ids: &[i64]) -> StoreResult<()> {
        let mut table = self.table.write();
        for id in ids {
            table.rows.remove(id);
        }
        Ok(())
    }
}

/// Document collections held in memory, with a small pipeline evaluator
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, document: Value) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    pub fn insert_many(&self, collection: &str, documents: impl IntoIterator<Item = Value>) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    fn snapshot(&self, collection: &str) -> Vec<Value> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

/// Resolve a dotted field path inside a document
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

fn matches_filter(document: &Value, filter: &Map<String, Value>) -> bool {
    filter
        .iter()
        .all(|(field, expected)| lookup(document, field) == Some(expected))
}

fn evaluate(documents: Vec<Value>, pipeline: &Pipeline) -> Vec<Value> {
    let mut current = documents;
    let mut stages = pipeline.stages().iter().peekable();

    while let Some(stage) = stages.next() {
        match stage {
            Stage::Match { field, value } => {
                current.retain(|document| lookup(document, field.as_str()) == Some(value));
            }
            Stage::Group { key } => {
                let output = match stages.peek() {
                    Some(Stage::Count { output }) => {
                        stages.next();
                        Some(output.clone())
                    }
                    _ => None,
                };

                let mut groups: Vec<(Value, u64)> = Vec::new();
                for document in &current {
                    let group_key = lookup(document, key.as_str())
                        .cloned()
                        .unwrap_or(Value::Null);
                    match groups.iter_mut().find(|(existing, _)| *existing == group_key) {
                        Some((_, n)) => *n += 1,
                        None => groups.push((group_key, 1)),
                    }
                }

                current = groups
                    .into_iter()
                    .map(|(group_key, n)| {
                        let mut row = Map::new();
                        row.insert(fields::GROUP_ID.to_string(), group_key);
                        if let Some(output) = &output {
                            row.insert(output.clone(), json!(n));
                        }
                        Value::Object(row)
                    })
                    .collect();
            }
            Stage::Count { output } => {
                let mut row = Map::new();
                row.insert(output.clone(), json!(current.len()));
                current = vec![Value::Object(row)];
            }
        }
    }

    current
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn count(&self, collection: &str, filter: &Map<String, Value>) -> StoreResult<u64> {
        let count = self
            .snapshot(collection)
            .iter()
            .filter(|document| matches_filter(document, filter))
            .count();
        Ok(count as u64)
    }

    async fn aggregate_all(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> StoreResult<Vec<Value>> {
        debug!(
            collection = %collection,
            stages = pipeline.len(),
            "Evaluating aggregation pipeline in memory"
        );
        Ok(evaluate(self.snapshot(collection), pipeline))
    }
}

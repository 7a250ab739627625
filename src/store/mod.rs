//! # Store Clients
//!
//! Persistence seams used by the services. The process template store
//! persists template records; the document store counts and aggregates over
//! the host and instance collections.
//!
//! Both are async traits so a real driver can be plugged in. The [`memory`]
//! module ships in-process implementations used by tests and local runs.

pub mod memory;

use crate::models::{
    ListProcessTemplatesOption, NewProcessTemplate, ProcessProperty, ProcessTemplate,
    ProcessTemplatePage,
};
use crate::query_builder::Pipeline;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::{InMemoryDocumentStore, InMemoryProcessTemplateStore};

/// Errors raised by store backends
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {collection} id {id}")]
    NotFound { collection: String, id: i64 },

    #[error("Database query error: {operation}: {message}")]
    Query { operation: String, message: String },

    #[error("Aggregation failed on {collection}: {message}")]
    Aggregation { collection: String, message: String },

    #[error("Result decode error: {message}")]
    Decode { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence client for process templates
#[async_trait]
pub trait ProcessTemplateStore: Send + Sync {
    /// Persist a new template and return it with its assigned id
    async fn create_process_template(
        &self,
        template: NewProcessTemplate,
    ) -> StoreResult<ProcessTemplate>;

    /// Replace the property of template `id` and return the stored result
    async fn update_process_template(
        &self,
        id: i64,
        property: ProcessProperty,
        modifier: &str,
    ) -> StoreResult<ProcessTemplate>;

    async fn get_process_template(&self, id: i64) -> StoreResult<ProcessTemplate>;

    async fn list_process_templates(
        &self,
        option: &ListProcessTemplatesOption,
    ) -> StoreResult<ProcessTemplatePage>;

    async fn delete_process_template_batch(&self, ids: &[i64]) -> StoreResult<()>;
}

/// Query and aggregation backend over document collections
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Count documents in `collection` whose fields equal every entry of `filter`
    async fn count(&self, collection: &str, filter: &Map<String, Value>) -> StoreResult<u64>;

    /// Run `pipeline` over `collection` and return every output row
    async fn aggregate_all(&self, collection: &str, pipeline: &Pipeline)
        -> StoreResult<Vec<Value>>;
}

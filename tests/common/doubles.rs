//! Recording test doubles around the in-memory backends.

use async_trait::async_trait;
use cmdb_core::auth::{AuthAction, AuthError, Authorizer};
use cmdb_core::context::RequestContext;
use cmdb_core::models::{
    ListProcessTemplatesOption, NewProcessTemplate, ProcessProperty, ProcessTemplate,
    ProcessTemplatePage,
};
use cmdb_core::query_builder::Pipeline;
use cmdb_core::store::{
    DocumentStore, InMemoryDocumentStore, InMemoryProcessTemplateStore, ProcessTemplateStore,
    StoreError, StoreResult,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Authorizer that records every call and answers with a fixed decision
#[derive(Debug, Default)]
pub struct RecordingAuthorizer {
    deny: bool,
    calls: Mutex<Vec<(AuthAction, Vec<i64>)>>,
}

impl RecordingAuthorizer {
    pub fn allowing() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<(AuthAction, Vec<i64>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Authorizer for RecordingAuthorizer {
    async fn authorize_by_service_template_id(
        &self,
        ctx: &RequestContext,
        action: AuthAction,
        service_template_ids: &[i64],
    ) -> Result<(), AuthError> {
        self.calls
            .lock()
            .push((action, service_template_ids.to_vec()));

        if self.deny {
            Err(AuthError::Denied {
                principal: ctx.user.clone(),
                action,
                denied_ids: service_template_ids.to_vec(),
            })
        } else {
            Ok(())
        }
    }
}

/// Template store that logs operation names and can fail the n-th create
#[derive(Debug, Default)]
pub struct RecordingTemplateStore {
    pub inner: InMemoryProcessTemplateStore,
    fail_on_create: Option<usize>,
    creates_attempted: Mutex<usize>,
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `k`-th create call (1-based)
    pub fn failing_on_create(k: usize) -> Self {
        Self {
            fail_on_create: Some(k),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn count_of(&self, operation: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == operation).count()
    }

    fn record(&self, operation: &'static str) {
        self.calls.lock().push(operation);
    }
}

#[async_trait]
impl ProcessTemplateStore for RecordingTemplateStore {
    async fn create_process_template(
        &self,
        template: NewProcessTemplate,
    ) -> StoreResult<ProcessTemplate> {
        self.record("create_process_template");
        let attempt = {
            let mut attempted = self.creates_attempted.lock();
            *attempted += 1;
            *attempted
        };
        if self.fail_on_create == Some(attempt) {
            return Err(StoreError::Query {
                operation: "create_process_template".to_string(),
                message: format!("duplicate key on attempt {attempt}"),
            });
        }
        self.inner.create_process_template(template).await
    }

    async fn update_process_template(
        &self,
        id: i64,
        property: ProcessProperty,
        modifier: &str,
    ) -> StoreResult<ProcessTemplate> {
        self.record("update_process_template");
        self.inner
            .update_process_template(id, property, modifier)
            .await
    }

    async fn get_process_template(&self, id: i64) -> StoreResult<ProcessTemplate> {
        self.record("get_process_template");
        self.inner.get_process_template(id).await
    }

    async fn list_process_templates(
        &self,
        option: &ListProcessTemplatesOption,
    ) -> StoreResult<ProcessTemplatePage> {
        self.record("list_process_templates");
        self.inner.list_process_templates(option).await
    }

    async fn delete_process_template_batch(&self, ids: &[i64]) -> StoreResult<()> {
        self.record("delete_process_template_batch");
        self.inner.delete_process_template_batch(ids).await
    }
}

/// Document store that captures every pipeline it is asked to run
#[derive(Debug, Default)]
pub struct RecordingDocumentStore {
    pub inner: InMemoryDocumentStore,
    failure: Option<StoreError>,
    pipelines: Mutex<Vec<(String, Pipeline)>>,
}

impl RecordingDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(error: StoreError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn pipelines(&self) -> Vec<(String, Pipeline)> {
        self.pipelines.lock().clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingDocumentStore {
    async fn count(&self, collection: &str, filter: &Map<String, Value>) -> StoreResult<u64> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.inner.count(collection, filter).await
    }

    async fn aggregate_all(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> StoreResult<Vec<Value>> {
        self.pipelines
            .lock()
            .push((collection.to_string(), pipeline.clone()));
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.inner.aggregate_all(collection, pipeline).await
    }
}

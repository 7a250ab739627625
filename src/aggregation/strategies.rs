//! Report strategies and the registry mapping each [`ReportType`] to one.

use super::{ChartConfig, ReportType};
use crate::config::CollectionsConfig;
use crate::constants::fields;
use crate::context::RequestContext;
use crate::error::{CmdbError, Result};
use crate::models::StringIdCount;
use crate::query_builder::{GroupField, Pipeline};
use crate::store::{DocumentStore, StoreError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// A grouping strategy producing per-key counts for one report type
#[async_trait]
pub trait ReportStrategy: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    async fn aggregate(
        &self,
        ctx: &RequestContext,
        store: &dyn DocumentStore,
        chart: &ChartConfig,
    ) -> Result<Vec<StringIdCount>>;
}

/// Where the group key of a [`GroupCountStrategy`] comes from
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// The field named by the request
    Requested,
    /// A field fixed by the strategy, ignoring the request
    Fixed(GroupField),
}

/// Group documents of one collection and count each group.
///
/// With an object filter the pipeline first matches documents whose object
/// type equals the request's `obj_id`.
#[derive(Debug, Clone)]
pub struct GroupCountStrategy {
    name: &'static str,
    collection: String,
    object_filter: Option<GroupField>,
    key: GroupKey,
}

impl GroupCountStrategy {
    /// Group `collection` by the requested field, no filtering
    pub fn by_requested_field(name: &'static str, collection: impl Into<String>) -> Self {
        Self {
            name,
            collection: collection.into(),
            object_filter: None,
            key: GroupKey::Requested,
        }
    }

    /// Group `collection` by a fixed field, no filtering
    pub fn by_fixed_field(
        name: &'static str,
        collection: impl Into<String>,
        key: GroupField,
    ) -> Self {
        Self {
            name,
            collection: collection.into(),
            object_filter: None,
            key: GroupKey::Fixed(key),
        }
    }

    /// Narrow to one object type on `object_field` before grouping
    pub fn with_object_filter(mut self, object_field: GroupField) -> Self {
        self.object_filter = Some(object_field);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Pipeline this strategy runs for `chart`
    pub fn pipeline(&self, chart: &ChartConfig) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();

        if let Some(object_field) = &self.object_filter {
            let obj_id = chart.obj_id.as_deref().ok_or_else(|| {
                CmdbError::input_invalid(
                    "common_aggregate",
                    format!("{} report requires obj_id", self.name),
                )
            })?;
            pipeline = pipeline.match_eq(object_field.clone(), json!(obj_id));
        }

        let key = match &self.key {
            GroupKey::Requested => chart.field.clone(),
            GroupKey::Fixed(field) => field.clone(),
        };

        Ok(pipeline.group_by(key).count())
    }
}

#[async_trait]
impl ReportStrategy for GroupCountStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn aggregate(
        &self,
        ctx: &RequestContext,
        store: &dyn DocumentStore,
        chart: &ChartConfig,
    ) -> Result<Vec<StringIdCount>> {
        let pipeline = self.pipeline(chart)?;

        debug!(
            request_id = %ctx.request_id,
            strategy = self.name,
            collection = %self.collection,
            pipeline = ?pipeline.to_documents(),
            "Running report pipeline"
        );

        let rows = ctx
            .run("aggregate_all", store.aggregate_all(&self.collection, &pipeline))
            .await?
            .map_err(|err| {
                error!(
                    request_id = %ctx.request_id,
                    strategy = self.name,
                    collection = %self.collection,
                    error = %err,
                    "Report aggregation failed"
                );
                err
            })?;

        rows.iter()
            .map(|row| {
                StringIdCount::from_group_row(row)
                    .map_err(|message| CmdbError::from(StoreError::Decode { message }))
            })
            .collect()
    }
}

/// Explicit report type to strategy table
#[derive(Clone, Default)]
pub struct ReportRegistry {
    strategies: HashMap<ReportType, Arc<dyn ReportStrategy>>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a strategy for every report type
    pub fn with_defaults(collections: &CollectionsConfig) -> Result<Self> {
        let field = |name: &str| {
            GroupField::new(name).map_err(|e| CmdbError::Configuration(e.to_string()))
        };

        let mut registry = Self::new();
        registry.register(
            ReportType::HostCloudChart,
            Arc::new(GroupCountStrategy::by_fixed_field(
                "host_cloud",
                &collections.host,
                field(fields::BK_CLOUD_ID)?,
            )),
        );
        registry.register(
            ReportType::HostBizChart,
            Arc::new(GroupCountStrategy::by_fixed_field(
                "host_biz",
                &collections.module_host,
                field(fields::BK_BIZ_ID)?,
            )),
        );
        registry.register(
            ReportType::HostOsChart,
            Arc::new(GroupCountStrategy::by_requested_field(
                "host_os",
                &collections.host,
            )),
        );
        registry.register(
            ReportType::ModelInstance,
            Arc::new(
                GroupCountStrategy::by_requested_field("model_instance", &collections.instance)
                    .with_object_filter(field(collections.object_id_field.as_str())?),
            ),
        );
        Ok(registry)
    }

    /// Register or replace the strategy for `report_type`
    pub fn register(&mut self, report_type: ReportType, strategy: Arc<dyn ReportStrategy>) {
        self.strategies.insert(report_type, strategy);
    }

    pub fn get(&self, report_type: ReportType) -> Option<Arc<dyn ReportStrategy>> {
        self.strategies.get(&report_type).cloned()
    }

    /// Report types without a registered strategy
    pub fn missing(&self) -> Vec<ReportType> {
        ReportType::ALL
            .into_iter()
            .filter(|report_type| !self.strategies.contains_key(report_type))
            .collect()
    }
}

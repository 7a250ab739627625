use super::{ChartConfig, ReportRegistry, ReportStrategy, ReportType};
use crate::config::CollectionsConfig;
use crate::context::RequestContext;
use crate::error::{CmdbError, Result};
use crate::logging::log_report_operation;
use crate::models::StringIdCount;
use crate::store::DocumentStore;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// Dispatches report requests to the registered grouping strategy
///
/// Holds no state between calls besides its collaborators. Pipeline failures
/// are returned unchanged; there is no retry and no partial result.
#[derive(Clone)]
pub struct AggregationEngine {
    store: Arc<dyn DocumentStore>,
    registry: ReportRegistry,
    collections: CollectionsConfig,
}

impl AggregationEngine {
    /// Engine with the default strategy for every report type
    pub fn new(store: Arc<dyn DocumentStore>, collections: CollectionsConfig) -> Result<Self> {
        let registry = ReportRegistry::with_defaults(&collections)?;
        Self::with_registry(store, collections, registry)
    }

    /// Engine over a caller-built registry, which must serve every report type
    pub fn with_registry(
        store: Arc<dyn DocumentStore>,
        collections: CollectionsConfig,
        registry: ReportRegistry,
    ) -> Result<Self> {
        let missing = registry.missing();
        if !missing.is_empty() {
            return Err(CmdbError::Configuration(format!(
                "no report strategy registered for {missing:?}"
            )));
        }
        Ok(Self {
            store,
            registry,
            collections,
        })
    }

    /// Replace the strategy serving `report_type`
    pub fn with_strategy(
        mut self,
        report_type: ReportType,
        strategy: Arc<dyn ReportStrategy>,
    ) -> Self {
        self.registry.register(report_type, strategy);
        self
    }

    pub fn registry(&self) -> &ReportRegistry {
        &self.registry
    }

    /// Group and count documents as selected by `chart.report_type`
    pub async fn common_aggregate(
        &self,
        ctx: &RequestContext,
        chart: &ChartConfig,
    ) -> Result<Vec<StringIdCount>> {
        chart.validate()?;

        let strategy = self.registry.get(chart.report_type).ok_or_else(|| {
            CmdbError::input_invalid(
                "common_aggregate",
                format!("no strategy registered for {}", chart.report_type),
            )
        })?;

        let counts = strategy
            .aggregate(ctx, self.store.as_ref(), chart)
            .await
            .map_err(|err| {
                error!(
                    request_id = %ctx.request_id,
                    report_type = %chart.report_type,
                    field = %chart.field,
                    strategy = strategy.name(),
                    error = %err,
                    "Search chart data failed"
                );
                err
            })?;

        log_report_operation(
            chart.report_type.as_str(),
            chart.field.as_str(),
            "success",
            Some(counts.len()),
            None,
        );
        Ok(counts)
    }

    /// Count instance documents matching every entry of `filter`
    pub async fn search_inst_count(
        &self,
        ctx: &RequestContext,
        filter: &Map<String, Value>,
    ) -> Result<u64> {
        let count = ctx
            .run(
                "search_inst_count",
                self.store.count(&self.collections.instance, filter),
            )
            .await?
            .map_err(|err| {
                error!(
                    request_id = %ctx.request_id,
                    collection = %self.collections.instance,
                    condition = ?filter,
                    error = %err,
                    "Query instance count failed"
                );
                err
            })?;

        debug!(
            request_id = %ctx.request_id,
            collection = %self.collections.instance,
            count = count,
            "Counted instances"
        );
        Ok(count)
    }

    /// Operation chart data. Not implemented yet; always returns no data.
    pub async fn search_operation_chart_data(
        &self,
        _ctx: &RequestContext,
        _filter: &Map<String, Value>,
    ) -> Result<Option<Value>> {
        Ok(None)
    }
}

use crate::constants::report_selectors;
use crate::error::{CmdbError, Result};
use crate::query_builder::GroupField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of report grouping strategies
///
/// Unknown or absent selectors fall through to [`ReportType::ModelInstance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ReportType {
    HostCloudChart,
    HostBizChart,
    HostOsChart,
    /// Per-object instance report
    #[default]
    ModelInstance,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::HostCloudChart,
        ReportType::HostBizChart,
        ReportType::HostOsChart,
        ReportType::ModelInstance,
    ];

    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(str::trim) {
            Some(report_selectors::HOST_CLOUD_CHART) => ReportType::HostCloudChart,
            Some(report_selectors::HOST_BIZ_CHART) => ReportType::HostBizChart,
            Some(report_selectors::HOST_OS_CHART) => ReportType::HostOsChart,
            _ => ReportType::ModelInstance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::HostCloudChart => report_selectors::HOST_CLOUD_CHART,
            ReportType::HostBizChart => report_selectors::HOST_BIZ_CHART,
            ReportType::HostOsChart => report_selectors::HOST_OS_CHART,
            ReportType::ModelInstance => report_selectors::MODEL_INSTANCE,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Option<String>> for ReportType {
    fn from(selector: Option<String>) -> Self {
        Self::from_selector(selector.as_deref())
    }
}

impl From<ReportType> for String {
    fn from(report_type: ReportType) -> Self {
        report_type.as_str().to_string()
    }
}

/// A report request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub report_type: ReportType,
    /// Field whose distinct values become the grouping keys
    pub field: GroupField,
    /// Object type narrowing the default instance report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj_id: Option<String>,
}

impl ChartConfig {
    pub fn new(report_type: ReportType, field: &str) -> Result<Self> {
        let field = GroupField::new(field)
            .map_err(|e| CmdbError::input_invalid("chart_config", e.to_string()))?;
        Ok(Self {
            report_type,
            field,
            obj_id: None,
        })
    }

    pub fn with_obj_id(mut self, obj_id: impl Into<String>) -> Self {
        self.obj_id = Some(obj_id.into());
        self
    }

    /// Object type id, required only by the default instance report
    pub fn validate(&self) -> Result<()> {
        if self.report_type == ReportType::ModelInstance
            && self.obj_id.as_deref().map_or(true, |id| id.trim().is_empty())
        {
            return Err(CmdbError::input_invalid(
                "common_aggregate",
                format!("obj_id is required for {} reports", self.report_type),
            ));
        }
        Ok(())
    }
}

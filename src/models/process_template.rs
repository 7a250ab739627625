use crate::query_builder::BasePage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form process configuration attached to a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessProperty(pub Map<String, Value>);

impl ProcessProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Overlay every key of `other` onto this property
    pub fn merge(&mut self, other: ProcessProperty) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ProcessProperty {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// ProcessTemplate describes how one process of a service template is run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessTemplate {
    pub id: i64,
    pub bk_biz_id: i64,
    pub service_template_id: i64,
    pub property: ProcessProperty,
    pub creator: String,
    pub modifier: String,
    pub create_time: DateTime<Utc>,
    pub last_time: DateTime<Utc>,
    pub bk_supplier_account: String,
}

/// New ProcessTemplate for creation (without store-assigned fields)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProcessTemplate {
    pub bk_biz_id: i64,
    pub service_template_id: i64,
    pub property: ProcessProperty,
    pub creator: String,
    pub bk_supplier_account: String,
}

/// One page of process templates plus the total match count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessTemplatePage {
    pub count: u64,
    pub info: Vec<ProcessTemplate>,
}

/// Store-side filter; every populated field must match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListProcessTemplatesOption {
    pub business_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_template_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_template_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub page: BasePage,
}

impl ListProcessTemplatesOption {
    pub fn matches(&self, template: &ProcessTemplate) -> bool {
        if template.bk_biz_id != self.business_id {
            return false;
        }
        if let Some(service_template_id) = self.service_template_id {
            if template.service_template_id != service_template_id {
                return false;
            }
        }
        if let Some(ids) = &self.process_template_ids {
            if !ids.contains(&template.id) {
                return false;
            }
        }
        true
    }
}

/// One process spec inside a batch create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessTemplateSpec {
    pub spec: ProcessProperty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProcessTemplateBatchInput {
    pub service_template_id: i64,
    pub processes: Vec<ProcessTemplateSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteProcessTemplateBatchInput {
    pub process_templates: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProcessTemplateInput {
    pub process_template_id: i64,
    #[serde(default)]
    pub process_property: Option<ProcessProperty>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListProcessTemplateWithServiceTemplateInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_template_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_template_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub page: BasePage,
}

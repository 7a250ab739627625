//! # Request Context
//!
//! Per-call business context: who is calling, under which business, and how
//! long the call may take. Every store and authorization call made by the
//! services runs through [`RequestContext::run`] so the caller's deadline is
//! honoured at each step.

use crate::constants::BIZ_ID_LABEL;
use crate::error::{CmdbError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Request metadata carrying the business scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub label: HashMap<String, String>,
}

impl Metadata {
    /// Metadata scoped to a single business
    pub fn with_business(biz_id: i64) -> Self {
        let mut label = HashMap::new();
        label.insert(BIZ_ID_LABEL.to_string(), biz_id.to_string());
        Self { label }
    }
}

/// Resolves the owning business id from request metadata
pub trait BizIdResolver: Send + Sync {
    fn resolve(&self, metadata: &Metadata) -> std::result::Result<i64, String>;
}

/// Reads the business id from the `bk_biz_id` metadata label
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelBizIdResolver;

impl BizIdResolver for LabelBizIdResolver {
    fn resolve(&self, metadata: &Metadata) -> std::result::Result<i64, String> {
        let raw = metadata
            .label
            .get(BIZ_ID_LABEL)
            .ok_or_else(|| format!("metadata label {BIZ_ID_LABEL} not found"))?;

        let biz_id: i64 = raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid {BIZ_ID_LABEL} '{raw}': {e}"))?;

        if biz_id <= 0 {
            return Err(format!("invalid {BIZ_ID_LABEL} '{raw}': must be positive"));
        }
        Ok(biz_id)
    }
}

/// Business context for a single call
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub user: String,
    pub supplier_account: String,
    pub metadata: Metadata,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(user: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user: user.into(),
            supplier_account: "0".to_string(),
            metadata,
            timeout: None,
            deadline: None,
        }
    }

    /// Context for `user` scoped to business `biz_id`
    pub fn for_business(user: impl Into<String>, biz_id: i64) -> Self {
        Self::new(user, Metadata::with_business(biz_id))
    }

    pub fn with_supplier_account(mut self, supplier_account: impl Into<String>) -> Self {
        self.supplier_account = supplier_account.into();
        self
    }

    /// Bound the whole call to `timeout`, measured from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drive `fut` to completion within whatever remains of the deadline.
    ///
    /// Without a deadline the future runs unbounded. No retry is attempted on
    /// expiry; the caller sees [`CmdbError::Timeout`].
    pub async fn run<F>(&self, operation: &str, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        let Some(deadline) = self.deadline else {
            return Ok(fut.await);
        };

        match tokio::time::timeout_at(deadline, fut).await {
            Ok(output) => Ok(output),
            Err(_) => Err(CmdbError::Timeout {
                operation: operation.to_string(),
                timeout_ms: self
                    .timeout
                    .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
                    .unwrap_or_default(),
            }),
        }
    }
}

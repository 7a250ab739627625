//! # Authorization
//!
//! The authorization gate decides whether the caller holds a capability over
//! a set of service templates. The decision itself belongs to an external
//! backend behind [`Authorizer`]; [`CapabilityGate`] owns the
//! resolve-owners-then-authorize ordering every mutation goes through.

pub mod static_authorizer;

use crate::context::RequestContext;
use crate::error::{CmdbError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub use static_authorizer::StaticAuthorizer;

/// Capability checked against service templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthAction {
    Update,
}

impl AuthAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthAction::Update => "update",
        }
    }
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization backend errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Permission denied: {principal} lacks {action} on service templates {denied_ids:?}")]
    Denied {
        principal: String,
        action: AuthAction,
        denied_ids: Vec<i64>,
    },

    #[error("Authorization backend error: {message}")]
    Backend { message: String },
}

/// Authorization primitive keyed by service template
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Allow or deny `action` by `ctx.user` over every id in `service_template_ids`
    async fn authorize_by_service_template_id(
        &self,
        ctx: &RequestContext,
        action: AuthAction,
        service_template_ids: &[i64],
    ) -> std::result::Result<(), AuthError>;
}

/// Drop repeated ids, keeping first-seen order
pub fn distinct_ids(ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Capability-check helper shared by every mutation
#[derive(Clone)]
pub struct CapabilityGate {
    authorizer: Arc<dyn Authorizer>,
}

impl CapabilityGate {
    pub fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        Self { authorizer }
    }

    /// Resolve owning service templates, then authorize `action` over all of
    /// them in a single backend call.
    ///
    /// Returns the distinct owner set that was authorized. Resolution errors
    /// abort before the authorization backend is contacted.
    pub async fn authorize_resolved<F, Fut>(
        &self,
        ctx: &RequestContext,
        action: AuthAction,
        resolve: F,
    ) -> Result<Vec<i64>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<i64>>>,
    {
        let owners = distinct_ids(resolve().await?);

        debug!(
            request_id = %ctx.request_id,
            user = %ctx.user,
            action = %action,
            service_template_ids = ?owners,
            "Authorizing by service template"
        );

        ctx.run(
            "authorize_by_service_template_id",
            self.authorizer
                .authorize_by_service_template_id(ctx, action, &owners),
        )
        .await?
        .map_err(|source| {
            warn!(
                request_id = %ctx.request_id,
                user = %ctx.user,
                action = %action,
                service_template_ids = ?owners,
                error = %source,
                "Authorization by service template failed"
            );
            CmdbError::AuthorizationFailed {
                action,
                service_template_ids: owners.clone(),
                source,
            }
        })?;

        Ok(owners)
    }
}

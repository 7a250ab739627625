//! # Error Types
//!
//! Structured errors for the process template gateway and the statistics engine.
//!
//! Store and authorization failures keep their own error enums
//! ([`StoreError`], [`AuthError`]); this module folds them into the
//! crate-wide [`CmdbError`] taxonomy without rewording them.

use crate::auth::{AuthAction, AuthError};
use crate::store::StoreError;
use thiserror::Error;

/// Crate-wide error taxonomy
#[derive(Error, Debug)]
pub enum CmdbError {
    /// Malformed or missing required input. Raised before any downstream call.
    #[error("Input invalid: {operation}: {reason}")]
    InputInvalid { operation: String, reason: String },

    /// The capability check denied the request or the authorization backend failed.
    #[error("Authorization failed: {action} on service templates {service_template_ids:?}: {source}")]
    AuthorizationFailed {
        action: AuthAction,
        service_template_ids: Vec<i64>,
        #[source]
        source: AuthError,
    },

    /// Store or pipeline execution failure, propagated verbatim.
    #[error(transparent)]
    Backend(#[from] StoreError),

    #[error("Timeout: {operation} did not complete within {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CmdbError {
    pub fn input_invalid(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InputInvalid {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn is_input_invalid(&self) -> bool {
        matches!(self, Self::InputInvalid { .. })
    }

    pub fn is_authorization_failed(&self) -> bool {
        matches!(self, Self::AuthorizationFailed { .. })
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    /// The underlying store error, when this is a backend failure
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for CmdbError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CmdbError>;

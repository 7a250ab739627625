//! # Configuration
//!
//! Layered configuration: built-in defaults, then an optional YAML file, then
//! `CMDB__*` environment overrides (`CMDB__REQUEST__TIMEOUT_MS=500`).
//!
//! ```rust,no_run
//! use cmdb_core::config::CmdbConfig;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CmdbConfig::load(Some(Path::new("config/cmdb.yaml")))?;
//! println!("host collection: {}", config.collections.host);
//! # Ok(())
//! # }
//! ```

use crate::constants::{collections, fields};
use crate::context::{Metadata, RequestContext};
use crate::error::{CmdbError, Result};
use crate::logging::{get_environment, get_log_level};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ENV_PREFIX: &str = "CMDB";
const ENV_SEPARATOR: &str = "__";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CmdbConfig {
    pub environment: String,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub collections: CollectionsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestConfig {
    /// Deadline given to contexts built by [`CmdbConfig::request_context`]
    pub timeout_ms: u64,
}

/// Collection and field names used by the statistics engine
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CollectionsConfig {
    pub host: String,
    pub instance: String,
    pub module_host: String,
    /// Instance field holding the object type id
    pub object_id_field: String,
}

impl Default for CmdbConfig {
    fn default() -> Self {
        let environment = get_environment();
        let level = get_log_level(&environment);
        Self {
            environment,
            logging: LoggingConfig { level, json: false },
            request: RequestConfig::default(),
            collections: CollectionsConfig::default(),
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 30_000 }
    }
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            host: collections::HOST_BASE.to_string(),
            instance: collections::OBJECT_BASE.to_string(),
            module_host: collections::MODULE_HOST_CONFIG.to_string(),
            object_id_field: fields::BK_OBJ_ID.to_string(),
        }
    }
}

impl CmdbConfig {
    /// Load defaults, an optional YAML file, and `CMDB__*` process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    ///
    /// Useful for testing without modifying global environment variables.
    pub fn load_with_env(
        path: Option<&Path>,
        env_overrides: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env_overrides),
        );

        let config: CmdbConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.request.timeout_ms == 0 {
            return Err(CmdbError::Configuration(
                "request.timeout_ms must be greater than zero".to_string(),
            ));
        }

        let names = [
            ("collections.host", &self.collections.host),
            ("collections.instance", &self.collections.instance),
            ("collections.module_host", &self.collections.module_host),
            ("collections.object_id_field", &self.collections.object_id_field),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(CmdbError::Configuration(format!("{key} must not be empty")));
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request.timeout_ms)
    }

    /// Context for one call, bounded by the configured request timeout
    pub fn request_context(&self, user: impl Into<String>, metadata: Metadata) -> RequestContext {
        RequestContext::new(user, metadata).with_timeout(self.request_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CmdbConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.collections.host, "cc_HostBase");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = CmdbConfig::default();
        config.request.timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(CmdbError::Configuration(_))
        ));
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut env = HashMap::new();
        env.insert("CMDB__REQUEST__TIMEOUT_MS".to_string(), "750".to_string());
        env.insert("CMDB__COLLECTIONS__HOST".to_string(), "hosts".to_string());

        let config = CmdbConfig::load_with_env(None, Some(env)).unwrap();

        assert_eq!(config.request.timeout_ms, 750);
        assert_eq!(config.collections.host, "hosts");
        assert_eq!(config.collections.instance, "cc_ObjectBase");
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_context_carries_configured_deadline() {
        let mut config = CmdbConfig::default();
        config.request.timeout_ms = 20;
        let ctx = config.request_context("admin", Metadata::with_business(3));

        let err = ctx
            .run("list_process_templates", tokio::time::sleep(Duration::from_secs(1)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CmdbError::Timeout { timeout_ms: 20, .. }
        ));
    }
}

#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # CMDB Core Rust
//!
//! Process template mutation gateway and statistics aggregation core for a
//! configuration-management backend.
//!
//! ## Overview
//!
//! Hosts, business units and service instances are organized under service
//! templates, each owning a set of process templates. This crate holds the two
//! pieces with decision logic:
//!
//! - **Template mutation gateway** ([`services::ProcessTemplateService`]):
//!   every create, update and delete of a process template is authorized
//!   against the owning service templates before the store is touched.
//! - **Statistics engine** ([`aggregation::AggregationEngine`]): report
//!   requests are dispatched to a registered grouping strategy and answered
//!   with per-key counts.
//!
//! Persistence and authorization are external collaborators reached through
//! the [`store::ProcessTemplateStore`], [`store::DocumentStore`] and
//! [`auth::Authorizer`] traits. In-memory implementations are included.
//!
//! ## Module Organization
//!
//! - [`services`] - Process template lifecycle operations
//! - [`aggregation`] - Report types, strategies and the dispatching engine
//! - [`auth`] - Authorization seam and the capability-check helper
//! - [`store`] - Store traits and in-memory backends
//! - [`query_builder`] - Pipelines, sanitized field references, pagination
//! - [`models`] - Process templates, list options, count results
//! - [`context`] - Per-call business context and deadlines
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdb_core::auth::StaticAuthorizer;
//! use cmdb_core::context::RequestContext;
//! use cmdb_core::models::{CreateProcessTemplateBatchInput, ProcessProperty, ProcessTemplateSpec};
//! use cmdb_core::services::ProcessTemplateService;
//! use cmdb_core::store::InMemoryProcessTemplateStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> cmdb_core::Result<()> {
//! let service = ProcessTemplateService::new(
//!     Arc::new(InMemoryProcessTemplateStore::new()),
//!     Arc::new(StaticAuthorizer::allow_all()),
//! );
//! let ctx = RequestContext::for_business("admin", 10);
//!
//! let ids = service
//!     .create_process_template_batch(
//!         &ctx,
//!         CreateProcessTemplateBatchInput {
//!             service_template_id: 5,
//!             processes: vec![ProcessTemplateSpec { spec: ProcessProperty::new() }],
//!         },
//!     )
//!     .await?;
//! assert_eq!(ids.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod auth;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod logging;
pub mod models;
pub mod query_builder;
pub mod services;
pub mod store;

pub use aggregation::{AggregationEngine, ChartConfig, ReportType};
pub use auth::{AuthAction, Authorizer, CapabilityGate};
pub use config::CmdbConfig;
pub use context::{Metadata, RequestContext};
pub use error::{CmdbError, Result};
pub use services::ProcessTemplateService;
pub use store::{DocumentStore, ProcessTemplateStore, StoreError};

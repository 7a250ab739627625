//! # Query Builder System
//!
//! Typed building blocks for store queries: pagination passed to the template
//! store and aggregation pipelines handed to the document store.
//!
//! ## Key Components
//!
//! - [`field`] - Sanitized field references used as pipeline variables
//! - [`pipeline`] - Match / group / count stages and their driver rendering
//! - [`pagination`] - Start/limit pagination with the "no limit" sentinel
//!
//! ## Example Usage
//!
//! ```rust
//! use cmdb_core::query_builder::{GroupField, Pipeline};
//! use serde_json::json;
//!
//! let pipeline = Pipeline::new()
//!     .match_eq(GroupField::new("bk_obj_id").unwrap(), json!("switch"))
//!     .group_by(GroupField::new("vendor").unwrap())
//!     .count();
//!
//! assert!(pipeline.has_match_stage());
//! assert_eq!(pipeline.to_documents().len(), 2);
//! ```

pub mod field;
pub mod pagination;
pub mod pipeline;

pub use field::{GroupField, InvalidField};
pub use pagination::BasePage;
pub use pipeline::{Pipeline, Stage};

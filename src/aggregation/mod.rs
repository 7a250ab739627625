//! # Statistics Aggregation
//!
//! Report requests select a grouping strategy by [`ReportType`]; the strategy
//! builds a pipeline over the host or instance collection and the document
//! store returns one count per distinct value of the grouped field.
//!
//! ## Report Types
//!
//! - `HostCloudChart` - hosts grouped by cloud area
//! - `HostBizChart` - host relations grouped by business
//! - `HostOsChart` - hosts grouped by the requested field, no filtering
//! - `ModelInstance` - instances of one object type grouped by the requested
//!   field; any unknown selector lands here
//!
//! Strategies live in a [`ReportRegistry`]; adding a report type means
//! registering a strategy, not editing the dispatcher.

pub mod engine;
pub mod report_type;
pub mod strategies;

pub use engine::AggregationEngine;
pub use report_type::{ChartConfig, ReportType};
pub use strategies::{GroupCountStrategy, GroupKey, ReportRegistry, ReportStrategy};

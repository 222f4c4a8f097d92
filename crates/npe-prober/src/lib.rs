//! Per-request probe orchestration.
//!
//! A probe takes a module definition and the request parameters, renders the
//! module's templated arguments into a concrete command line, executes the
//! plugin under the effective timeout, and records the outcome as gauges on
//! a per-probe registry.

pub mod builder;
pub mod context;
pub mod debug;
pub mod error;
pub mod log;
pub mod metrics;
pub mod probe;

pub use builder::PluginBuilder;
pub use context::RenderContext;
pub use error::ProbeError;
pub use log::ProbeLog;
pub use metrics::PluginMetrics;
pub use probe::{ProbeOptions, Prober};

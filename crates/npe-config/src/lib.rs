//! Configuration document model for the exporter.
//!
//! A configuration file declares named modules, each describing a plugin
//! executable, its templated argument schema, default variables, and
//! environment. The [`store::ConfigStore`] owns the loaded document and
//! supports atomic hot-reload.

pub mod custom;
pub mod error;
pub mod module;
pub mod store;

pub use custom::{BoolString, LazyArray, NumberDuration};
pub use error::ConfigError;
pub use module::{Argument, Config, Module};
pub use store::ConfigStore;

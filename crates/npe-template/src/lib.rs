//! Parameterised text templates for module configuration values.
//!
//! Module arguments, conditions, and environment entries may contain
//! minijinja expressions which are rendered against a per-probe context.
//! Compiled templates are memoised process-wide in a [`TemplateCache`].

pub mod cache;
pub mod error;
pub mod filters;

pub use cache::{TemplateCache, TEMPLATE_TOKEN};
pub use error::TemplateError;

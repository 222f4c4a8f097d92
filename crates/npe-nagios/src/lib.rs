//! Types implementing the Nagios plugin interface: exit codes, performance
//! data with thresholds and limits, the plugin output grammar, and a
//! subprocess runner that executes a check plugin and decodes its output.
//!
//! The grammar implemented here is the one described by the monitoring
//! plugin development guidelines:
//! <https://www.monitoring-plugins.org/doc/guidelines.html#AEN201>

pub mod error;
pub mod perfdata;
pub mod perfvalue;
pub mod plugin;
pub mod result;
pub mod state;
pub mod threshold;

pub use error::{ParseError, PluginError};
pub use perfdata::PerfData;
pub use perfvalue::PerfValue;
pub use plugin::Plugin;
pub use result::{PluginOutputDecoder, PluginResult};
pub use state::ExitCode;
pub use threshold::Threshold;

#[cfg(test)]
mod tests;

/// Removes empty strings from the given slice, preserving order.
pub fn compact(values: &[String]) -> Vec<String> {
    values.iter().filter(|v| !v.is_empty()).cloned().collect()
}

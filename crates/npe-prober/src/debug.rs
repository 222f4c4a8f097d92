use std::fmt::Write as _;

use prometheus::{Encoder, Registry, TextEncoder};

use npe_config::Module;
use npe_nagios::{Plugin, PluginError, PluginResult};

use crate::log::ProbeLog;

/// Renders the debug dump of one probe: the module definition, the
/// executed command and its outcome, the metrics the scrape would have
/// returned, and the buffered probe log. The exact format is informational
/// only.
pub fn dump(
    name: &str,
    module: &Module,
    plugin: Option<&Plugin>,
    outcome: Option<&Result<PluginResult, PluginError>>,
    registry: &Registry,
    log: &ProbeLog,
) -> String {
    let mut buf = String::new();

    write_module(&mut buf, name, module);
    write_execution(&mut buf, plugin, outcome);
    write_registry(&mut buf, registry);
    write_log(&mut buf, log);

    buf
}

fn write_module(buf: &mut String, name: &str, module: &Module) {
    let _ = writeln!(buf, "Module configuration ({name}):");

    match serde_yaml::to_string(module) {
        Ok(rendered) => buf.push_str(&rendered),
        Err(err) => {
            let _ = writeln!(buf, "Error marshalling module: {err}");
        }
    }

    buf.push('\n');
}

fn write_execution(
    buf: &mut String,
    plugin: Option<&Plugin>,
    outcome: Option<&Result<PluginResult, PluginError>>,
) {
    buf.push_str("Command execution:\n");

    match plugin {
        Some(plugin) => {
            let _ = writeln!(buf, "execv: {}", plugin.command_line());
        }
        None => buf.push_str("execv: (command line was not built)\n"),
    }

    match outcome {
        Some(Ok(result)) => {
            let _ = writeln!(buf, "status: {}", result.status);
            let _ = writeln!(buf, "output: {result}");
            if let Some(stderr) = &result.stderr {
                let _ = writeln!(buf, "stderr: {stderr}");
            }
        }
        Some(Err(err)) => {
            let _ = writeln!(buf, "error: {err}");
        }
        None => buf.push_str("(plugin was not executed)\n"),
    }

    buf.push('\n');
}

fn write_registry(buf: &mut String, registry: &Registry) {
    buf.push_str("Metrics that would have been returned:\n");

    let mut encoded = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(err) = encoder.encode(&registry.gather(), &mut encoded) {
        let _ = writeln!(buf, "Error gathering metrics: {err}");
    }
    buf.push_str(&String::from_utf8_lossy(&encoded));

    buf.push('\n');
}

fn write_log(buf: &mut String, log: &ProbeLog) {
    buf.push_str("Logs for the probe:\n");

    for line in log.lines() {
        buf.push_str(&line);
        buf.push('\n');
    }

    buf.push('\n');
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use prometheus::{Encoder, Registry, TextEncoder};
use tracing::Level;

use npe_config::Module;
use npe_nagios::{PluginError, PluginResult};
use npe_template::TemplateCache;

use crate::builder::PluginBuilder;
use crate::context::RenderContext;
use crate::debug;
use crate::error::ProbeError;
use crate::log::ProbeLog;
use crate::metrics::PluginMetrics;

/// The default scrape deadline when the transport does not announce one.
const DEFAULT_SCRAPE_TIMEOUT: f64 = 120.0;

/// Behaviour knobs of the probe orchestrator, fed from the command line.
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Metric namespace of the per-probe gauges.
    pub namespace: String,
    /// Subtracted from the transport deadline to leave room for the
    /// response to travel back.
    pub timeout_offset: f64,
    /// Whether `?debug=true` requests may receive the debug dump.
    pub debug: bool,
    /// Forward probe-scoped log records at this level and above.
    pub prober_log: Option<Level>,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            namespace: "nagios_plugin".to_string(),
            timeout_offset: 0.5,
            debug: false,
            prober_log: None,
        }
    }
}

/// Executes modules on behalf of scrape requests.
pub struct Prober {
    cache: Arc<TemplateCache>,
    builder: PluginBuilder,
    options: ProbeOptions,
}

impl Prober {
    pub fn new(cache: Arc<TemplateCache>, options: ProbeOptions) -> Self {
        Self {
            builder: PluginBuilder::new(cache.clone()),
            cache,
            options,
        }
    }

    /// The template cache backing module rendering.
    pub fn cache(&self) -> &Arc<TemplateCache> {
        &self.cache
    }

    /// Runs `module` under the request `params` and renders the scrape
    /// response body.
    ///
    /// `scrape_timeout` is the transport-announced deadline in seconds
    /// (`X-Prometheus-Scrape-Timeout-Seconds`), already parsed by the
    /// caller. Plugin-level failures still produce `Ok`: their outcome is
    /// carried by the returned metrics.
    pub async fn probe(
        &self,
        name: &str,
        module: &Module,
        params: &HashMap<String, Vec<String>>,
        scrape_timeout: Option<f64>,
        debug: bool,
    ) -> Result<String, ProbeError> {
        let timeout = self.effective_timeout(module, scrape_timeout);
        let log = ProbeLog::new(name, self.options.prober_log);

        let ctx = RenderContext::from_module(module)
            .visit_variables(|key| params.get(key).cloned())
            .visit_environment(|key| std::env::var(key).ok());

        let plugin = self.builder.build(name, module, &ctx)?;

        log.info(
            "Beginning probe",
            &[
                ("command", module.command.clone()),
                ("timeout_seconds", format!("{timeout:?}")),
            ],
        );

        let registry = Registry::new();
        let metrics = PluginMetrics::new(&self.options.namespace)?;

        let start = Instant::now();
        let outcome = match tokio::time::timeout(timeout, plugin.run()).await {
            Ok(outcome) => outcome,
            // dropping the run future kills the child
            Err(_) => Err(PluginError::Timeout(timeout)),
        };
        let duration = start.elapsed().as_secs_f64();

        metrics.report(&registry, &outcome, duration)?;
        self.log_outcome(&log, &outcome, duration);

        if debug && self.options.debug {
            return Ok(debug::dump(
                name,
                module,
                Some(&plugin),
                Some(&outcome),
                &registry,
                &log,
            ));
        }

        let mut body = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut body)?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn log_outcome(
        &self,
        log: &ProbeLog,
        outcome: &Result<PluginResult, PluginError>,
        duration: f64,
    ) {
        match outcome {
            Ok(result) => {
                log.info(
                    "Probe succeeded",
                    &[("duration_seconds", duration.to_string())],
                );
                if let Some(stderr) = &result.stderr {
                    log.warn("Plugin reported problems", &[("stderr", stderr.clone())]);
                }
            }
            Err(err) => {
                log.error(
                    "Probe failed",
                    &[
                        ("duration_seconds", duration.to_string()),
                        ("err", err.to_string()),
                    ],
                );
            }
        }
    }

    /// Computes the execution deadline: the transport timeout (less the
    /// configured offset) capped by the module timeout, whichever of the
    /// two is tighter; either side alone applies when the other is unset.
    fn effective_timeout(&self, module: &Module, scrape_timeout: Option<f64>) -> Duration {
        let scrape = match scrape_timeout {
            Some(timeout) if timeout > 0.0 => timeout,
            _ => DEFAULT_SCRAPE_TIMEOUT,
        };
        let max_timeout = (scrape - self.options.timeout_offset).max(0.0);
        let module_timeout = module.timeout.as_secs_f64();

        let seconds = if module_timeout > 0.0 && max_timeout > 0.0 {
            max_timeout.min(module_timeout)
        } else if module_timeout > 0.0 {
            module_timeout
        } else {
            max_timeout
        };

        Duration::from_secs_f64(seconds)
    }
}

use prometheus::{Gauge, Opts, Registry};

use npe_nagios::{PluginError, PluginResult};

/// The per-probe outcome gauges.
///
/// `probe_duration_seconds` is always exported; `probe_exit_code` and
/// `probe_success` are only registered once the runner finished, so a hard
/// failure (spawn error, malformed output, timeout) is observable as their
/// absence from the scrape.
pub struct PluginMetrics {
    probe_exit: Gauge,
    probe_success: Gauge,
    probe_duration: Gauge,
}

impl PluginMetrics {
    pub fn new(namespace: &str) -> Result<Self, prometheus::Error> {
        let probe_exit = Gauge::with_opts(
            Opts::new("probe_exit_code", "Probe command exit code").namespace(namespace),
        )?;
        let probe_success = Gauge::with_opts(
            Opts::new(
                "probe_success",
                "Displays whether or not the probe was a success",
            )
            .namespace(namespace),
        )?;
        let probe_duration = Gauge::with_opts(
            Opts::new(
                "probe_duration_seconds",
                "Returns how long the probe took to complete in seconds",
            )
            .namespace(namespace),
        )?;

        Ok(Self {
            probe_exit,
            probe_success,
            probe_duration,
        })
    }

    /// Records the probe outcome on the given per-probe registry.
    pub fn report(
        &self,
        registry: &Registry,
        outcome: &Result<PluginResult, PluginError>,
        duration: f64,
    ) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.probe_duration.clone()))?;
        self.probe_duration.set(duration);

        if let Ok(result) = outcome {
            registry.register(Box::new(self.probe_exit.clone()))?;
            registry.register(Box::new(self.probe_success.clone()))?;
            self.probe_exit.set(result.status.code() as f64);
            self.probe_success.set(1.0);
        }

        Ok(())
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use prometheus::{IntCounter, IntGaugeVec, Opts, Registry};

use npe_config::{ConfigError, ConfigStore};
use npe_prober::{ProbeOptions, Prober};
use npe_template::TemplateCache;

use crate::cli::Cli;

/// Metric namespace of the exporter telemetry.
pub const NAMESPACE: &str = "nagios_plugin";

/// Shared state of all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub prober: Arc<Prober>,
    pub registry: Registry,
    pub module_unknown: IntCounter,
    config_file: Arc<PathBuf>,
}

impl AppState {
    pub fn new(cli: &Cli) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let build_info = IntGaugeVec::new(
            Opts::new("build_info", "Build information of the exporter.")
                .namespace(format!("{NAMESPACE}_exporter")),
            &["version"],
        )?;
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);
        registry.register(Box::new(build_info))?;

        let module_unknown = IntCounter::with_opts(
            Opts::new(
                "module_unknown_total",
                "Count of unknown modules requested by probes",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(module_unknown.clone()))?;

        let store = Arc::new(ConfigStore::new(NAMESPACE, &registry)?);
        let cache = Arc::new(TemplateCache::new());
        let prober = Arc::new(Prober::new(
            cache,
            ProbeOptions {
                namespace: NAMESPACE.to_string(),
                timeout_offset: cli.timeout_offset,
                debug: cli.web_debug,
                prober_log: cli.prober_level(),
            },
        ));

        Ok(Self {
            store,
            prober,
            registry,
            module_unknown,
            config_file: Arc::new(cli.config_file.clone()),
        })
    }

    /// Re-reads the configuration file; the template cache is only flushed
    /// once the new snapshot is in place.
    pub fn reload(&self) -> Result<(), ConfigError> {
        self.store.reload(self.config_file.as_ref())?;
        self.prober.cache().flush();

        Ok(())
    }
}

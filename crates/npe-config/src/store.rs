use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use prometheus::{Gauge, Opts, Registry};

use crate::error::ConfigError;
use crate::module::Config;

/// Owner of the currently loaded configuration snapshot.
///
/// The snapshot is swapped atomically on reload, so concurrent probes see
/// either the prior or the new document in full, never a mix; a probe that
/// already took its snapshot keeps it for the rest of the request.
pub struct ConfigStore {
    current: ArcSwap<Config>,
    reload_success: Gauge,
    reload_seconds: Gauge,
}

impl ConfigStore {
    /// Creates an empty store and registers the reload telemetry gauges
    /// with the given registry.
    pub fn new(namespace: &str, registry: &Registry) -> Result<Self, prometheus::Error> {
        let reload_success = Gauge::with_opts(
            Opts::new(
                "config_last_reload_successful",
                "Exporter config loaded successfully.",
            )
            .namespace(namespace),
        )?;
        let reload_seconds = Gauge::with_opts(
            Opts::new(
                "config_last_reload_success_timestamp_seconds",
                "Timestamp of the last successful configuration reload.",
            )
            .namespace(namespace),
        )?;
        registry.register(Box::new(reload_success.clone()))?;
        registry.register(Box::new(reload_seconds.clone()))?;

        Ok(Self {
            current: ArcSwap::from_pointee(Config::default()),
            reload_success,
            reload_seconds,
        })
    }

    /// Parses the document at `path` and swaps it in as the current
    /// snapshot. A failed reload leaves the current snapshot untouched and
    /// only drops the success gauge to zero.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let result = Self::load(path);

        match result {
            Ok(config) => {
                self.current.store(Arc::new(config));
                self.reload_success.set(1.0);
                self.reload_seconds
                    .set(chrono::Utc::now().timestamp_millis() as f64 / 1_000.0);
                Ok(())
            }
            Err(err) => {
                self.reload_success.set(0.0);
                Err(err)
            }
        }
    }

    fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// The current configuration snapshot. The returned pointer stays valid
    /// across reloads; callers should not retain it beyond the scope of one
    /// request.
    pub fn snapshot(&self) -> Arc<Config> {
        self.current.load_full()
    }

    /// Invokes `f` with the current snapshot.
    pub fn provide<R>(&self, f: impl FnOnce(&Config) -> R) -> R {
        f(&self.current.load())
    }
}

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "nagios-plugin-exporter",
    about = "Prometheus exporter for Nagios check plugins",
    version
)]
pub struct Cli {
    /// Nagios plugin exporter configuration file.
    #[arg(long = "config.file", default_value = "nagios_plugin.yml")]
    pub config_file: PathBuf,

    /// Validate the config file and then exit.
    #[arg(long = "config.check")]
    pub config_check: bool,

    /// Address to expose the HTTP endpoints on.
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:9665")]
    pub listen_address: String,

    /// Enable the debugging feature for the probe endpoint.
    #[arg(long = "web.debug")]
    pub web_debug: bool,

    /// Offset to subtract from the scrape timeout in seconds.
    #[arg(long = "timeout-offset", default_value_t = 0.5)]
    pub timeout_offset: f64,

    /// Log level of the exporter itself. One of: [debug, info, warn, error]
    #[arg(long = "log.level", default_value = "info")]
    pub log_level: String,

    /// Log level forwarded from probe requests. One of:
    /// [debug, info, warn, error, none]
    #[arg(long = "log.prober", default_value = "none")]
    pub log_prober: String,
}

impl Cli {
    /// The minimum probe-log level to forward to the global subscriber, or
    /// `None` to keep probe logs out of the exporter log entirely.
    pub fn prober_level(&self) -> Option<Level> {
        match self.log_prober.as_str() {
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["nagios-plugin-exporter"]);

        assert_eq!(cli.config_file, PathBuf::from("nagios_plugin.yml"));
        assert!(!cli.config_check);
        assert!(!cli.web_debug);
        assert_eq!(cli.timeout_offset, 0.5);
        assert_eq!(cli.prober_level(), None);
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "nagios-plugin-exporter",
            "--config.file",
            "/etc/npe.yml",
            "--config.check",
            "--web.debug",
            "--timeout-offset",
            "1.5",
            "--log.prober",
            "warn",
        ]);

        assert_eq!(cli.config_file, PathBuf::from("/etc/npe.yml"));
        assert!(cli.config_check);
        assert!(cli.web_debug);
        assert_eq!(cli.timeout_offset, 1.5);
        assert_eq!(cli.prober_level(), Some(Level::WARN));
    }
}

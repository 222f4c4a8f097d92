use npe_template::TemplateError;

/// Errors surfaced to the HTTP layer by a probe.
///
/// Plugin-level problems (non-zero exit, stderr output, timeouts) are not
/// errors here; they are expressed through the probe gauges.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The module definition has no plugin command.
    #[error("module {0} is missing the plugin command")]
    MissingCommand(String),

    /// Rendering an argument template failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Serialising the per-probe registry failed.
    #[error("encoding probe metrics: {0}")]
    Encode(#[from] prometheus::Error),
}

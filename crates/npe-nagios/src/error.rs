/// Errors produced while parsing Nagios plugin output.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A performance data token without a (or with an empty) label.
    #[error("performance data label must not be empty")]
    EmptyLabel,

    /// A performance data token with more than one `=` delimiter.
    #[error("malformed performance data with too many ({0}) labels")]
    TooManyLabels(usize),

    /// A numeric fragment that is not parseable as a float.
    #[error("invalid numeric value '{0}'")]
    InvalidValue(String),

    /// A threshold with more than two `:`-separated parts.
    #[error("malformed threshold limits")]
    MalformedThreshold,

    /// An `@` range modifier without a limit.
    #[error("missing limit in lower threshold value")]
    MissingLowerLimit,

    /// A threshold bound that is not parseable as a float.
    #[error("invalid threshold limit '{0}'")]
    InvalidLimit(String),

    /// A min/max field that is not parseable as an integer.
    #[error("invalid value range '{0}'")]
    InvalidRange(String),

    /// An output line with more than one perfdata delimiter.
    #[error("malformed plugin output with {0} perfdata delimiters")]
    TooManyDelimiters(usize),

    /// Reading the plugin output failed.
    #[error("reading plugin output: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced while executing a check plugin. Anything here means the
/// command itself could not be run to completion; plugin-level problems
/// (non-zero exit, stderr output) are reported on the
/// [`PluginResult`](crate::PluginResult) instead.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("starting plugin: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("decoding plugin output: {0}")]
    Output(#[from] ParseError),

    #[error("reading plugin stderr: {0}")]
    Stderr(#[source] std::io::Error),

    #[error("waiting for plugin: {0}")]
    Wait(#[source] std::io::Error),

    #[error("plugin terminated by signal {0}")]
    Terminated(i32),

    /// The effective probe deadline elapsed; the child has been killed.
    #[error("plugin did not finish within {0:?}")]
    Timeout(std::time::Duration),
}

use std::fmt;

/// Nagios plugin exit state.
///
/// The plugin API reserves the values 0 through 4; anything else a plugin
/// returns is kept as-is under [`ExitCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok,
    Warning,
    Critical,
    Unknown,
    Dependent,
    Other(i32),
}

impl ExitCode {
    /// The numeric exit status this state corresponds to.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Ok => 0,
            ExitCode::Warning => 1,
            ExitCode::Critical => 2,
            ExitCode::Unknown => 3,
            ExitCode::Dependent => 4,
            ExitCode::Other(c) => c,
        }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        ExitCode::Ok
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        match code {
            0 => ExitCode::Ok,
            1 => ExitCode::Warning,
            2 => ExitCode::Critical,
            3 => ExitCode::Unknown,
            4 => ExitCode::Dependent,
            c => ExitCode::Other(c),
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Ok => f.write_str("OK"),
            ExitCode::Warning => f.write_str("WARNING"),
            ExitCode::Critical => f.write_str("CRITICAL"),
            ExitCode::Unknown => f.write_str("UNKNOWN"),
            ExitCode::Dependent => f.write_str("DEPENDENT"),
            ExitCode::Other(c) => write!(f, "ExitCode({c})"),
        }
    }
}

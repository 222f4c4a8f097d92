use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::error::ParseError;
use crate::perfdata::{parse_perfdata_output, PerfData, PERFDATA_OUTPUT_DELIMITER};
use crate::state::ExitCode;

/// The summary of one Nagios plugin execution.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PluginResult {
    /// The plugin exit state.
    pub status: ExitCode,
    /// First line of output, left of the perfdata delimiter.
    pub output: String,
    /// Subsequent output lines, left of the perfdata delimiter.
    pub trailer: Vec<String>,
    /// Performance data in input order, across all lines.
    pub perf_data: Vec<PerfData>,
    /// Anything the plugin wrote to standard error. Retained even when the
    /// plugin exited successfully.
    pub stderr: Option<String>,
}

impl fmt::Display for PluginResult {
    /// Renders the plugin result in a Nagios compatible way: the status name
    /// prefixes the output (unless already present), followed by the
    /// space-joined perfdata.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.status.to_string();
        if self.output.starts_with(&prefix) {
            f.write_str(&self.output)?;
        } else {
            write!(f, "{}: {}", prefix, self.output)?;
        }

        if self.perf_data.is_empty() {
            return Ok(());
        }

        let pd: Vec<String> = self.perf_data.iter().map(PerfData::to_string).collect();

        write!(f, " {} {}", PERFDATA_OUTPUT_DELIMITER, pd.join(" "))
    }
}

/// A line-oriented decoder for Nagios plugin output.
pub struct PluginOutputDecoder<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> PluginOutputDecoder<R> {
    /// Creates a new decoder instance using the given reader as data source.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Drains the internal reader of any data. Processed information is fed
    /// back into the given result instance.
    ///
    /// Each line is split on the perfdata delimiter; the left segment becomes
    /// the output (first line) or a trailer entry (subsequent lines), the
    /// right segment is parsed as whitespace-separated perfdata tokens.
    pub async fn decode(mut self, result: &mut PluginResult) -> Result<(), ParseError> {
        let mut trailer = false;

        while let Some(line) = self.lines.next_line().await? {
            let fragments: Vec<&str> = line.split(PERFDATA_OUTPUT_DELIMITER).collect();

            if fragments.len() > 2 {
                return Err(ParseError::TooManyDelimiters(fragments.len() - 1));
            }

            if let Some(perf) = fragments.get(1) {
                result
                    .perf_data
                    .extend(parse_perfdata_output(perf.trim())?);
            }

            let summary = fragments.first().map(|s| s.trim()).unwrap_or_default();
            if trailer {
                result.trailer.push(summary.to_string());
            } else {
                result.output = summary.to_string();
                trailer = true;
            }
        }

        Ok(())
    }
}

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::error::PluginError;
use crate::result::{PluginOutputDecoder, PluginResult};
use crate::state::ExitCode;

/// A Nagios plugin execution definition: the command, its materialised
/// argument vector, and an explicit environment (nothing is inherited from
/// the exporter process).
#[derive(Debug, Clone)]
pub struct Plugin {
    command: String,
    arguments: Vec<String>,
    environment: Vec<(String, String)>,
}

impl Plugin {
    /// Creates a new plugin instance using the given command and
    /// commandline arguments.
    pub fn with_arguments(command: impl Into<String>, arguments: Vec<String>) -> Self {
        Self::new(command, arguments, Vec::new())
    }

    /// Creates a new plugin instance using the given command, commandline
    /// arguments, and environment variables.
    pub fn new(
        command: impl Into<String>,
        arguments: Vec<String>,
        environment: Vec<(String, String)>,
    ) -> Self {
        Self {
            command: command.into(),
            arguments,
            environment,
        }
    }

    /// A rudimentary commandline representation, using the command and its
    /// arguments.
    pub fn command_line(&self) -> String {
        let mut s = Vec::with_capacity(self.arguments.len() + 1);
        s.push(self.command.clone());
        s.extend(self.arguments.iter().cloned());

        s.join(" ")
    }

    /// Executes the plugin and decodes its standard output.
    ///
    /// Errors represent the command not being able to run to completion.
    /// Output on standard error does not fail the run; it is retained on the
    /// returned result as a plugin-level problem, alongside the exit status.
    ///
    /// The spawned child is killed when the returned future is dropped, so
    /// wrapping the call in a timeout or cancelling the surrounding task
    /// does not leak processes.
    pub async fn run(&self) -> Result<PluginResult, PluginError> {
        let mut child = Command::new(&self.command)
            .args(&self.arguments)
            .env_clear()
            .envs(self.environment.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(PluginError::Spawn)?;

        let stdout = child
            .stdout
            .take()
            .expect("child stdout is piped");
        let mut stderr = child
            .stderr
            .take()
            .expect("child stderr is piped");

        let mut result = PluginResult::default();
        let mut errout = Vec::new();

        // Drain both pipes concurrently so a chatty plugin cannot block on
        // pipe back-pressure while the other stream is being read.
        let (decoded, erred) = tokio::join!(
            PluginOutputDecoder::new(BufReader::new(stdout)).decode(&mut result),
            stderr.read_to_end(&mut errout),
        );

        if let Err(err) = decoded {
            child.kill().await.ok();
            child.wait().await.ok();
            return Err(PluginError::Output(err));
        }
        erred.map_err(PluginError::Stderr)?;

        let status = child.wait().await.map_err(PluginError::Wait)?;
        match status.code() {
            Some(code) => result.status = ExitCode::from(code),
            None => return Err(PluginError::Terminated(status.signal().unwrap_or_default())),
        }

        if !errout.is_empty() {
            result.stderr = Some(String::from_utf8_lossy(&errout).into_owned());
        }

        Ok(result)
    }
}

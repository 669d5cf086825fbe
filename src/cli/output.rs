//! GitHub Actions output handling.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` when the runner provides
//! one, and fall back to `::set-output` workflow commands on stdout otherwise.
//! Failures are reported with an `::error::` command.

use crate::models::DeploymentMatch;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

const MULTILINE_DELIMITER: &str = "ghadelimiter_deployment_watcher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    File(PathBuf),
    WorkflowCommand,
}

#[derive(Debug, Clone)]
pub struct ActionOutput {
    sink: OutputSink,
}

impl ActionOutput {
    pub fn new(sink: OutputSink) -> Self {
        Self { sink }
    }

    pub fn from_env() -> Self {
        match std::env::var_os("GITHUB_OUTPUT").filter(|path| !path.is_empty()) {
            Some(path) => Self::new(OutputSink::File(PathBuf::from(path))),
            None => Self::new(OutputSink::WorkflowCommand),
        }
    }

    /// Publishes `id` and `url` for the matched deployment.
    pub fn publish(&self, found: &DeploymentMatch) -> io::Result<()> {
        tracing::info!(
            deployment_id = found.deployment.id,
            url = %found.url,
            "Publishing deployment outputs"
        );
        self.set_output("id", &found.deployment.id.to_string())?;
        self.set_output("url", &found.url)
    }

    pub fn set_output(&self, name: &str, value: &str) -> io::Result<()> {
        match &self.sink {
            OutputSink::File(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(file_command(name, value).as_bytes())
            }
            OutputSink::WorkflowCommand => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", set_output_command(name, value))
            }
        }
    }
}

/// `name=value` line for the `GITHUB_OUTPUT` file, heredoc form for multi-line values.
pub fn file_command(name: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        format!(
            "{name}<<{delim}\n{value}\n{delim}\n",
            delim = MULTILINE_DELIMITER
        )
    } else {
        format!("{}={}\n", name, value)
    }
}

pub fn set_output_command(name: &str, value: &str) -> String {
    format!(
        "::set-output name={}::{}",
        escape_property(name),
        escape_data(value)
    )
}

pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Marks the run as failed the way the Actions toolkit does.
pub fn report_failure(err: &dyn fmt::Display) {
    println!("{}", error_command(&err.to_string()));
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

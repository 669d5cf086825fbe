pub mod error;
pub mod output;

pub use error::CliError;
pub use output::{report_failure, ActionOutput, OutputSink};

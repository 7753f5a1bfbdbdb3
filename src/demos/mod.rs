//! The demo scripts: each builds a prompt and options, streams the run and
//! checks for the artifact it asked the agent to produce.

mod hello_world;
mod inbox;
mod research;
mod resume;
mod spreadsheet;

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::config::DemoConfig;
use crate::display::{EventPrinter, print_stream};
use crate::error::DemoError;
use crate::sdk::{QueryOptions, ResultMessage, Transport, query_stream};

pub use hello_world::HelloWorld;
pub use inbox::{InboxSummary, MessageHeader, scan_inbox};
pub use research::Research;
pub use resume::Resume;
pub use spreadsheet::Spreadsheet;

pub trait Demo {
    /// Short name used in logs and the run report.
    fn name(&self) -> &'static str;

    /// The user prompt. Fails on unusable input before anything touches disk.
    fn prompt(&self) -> Result<String, DemoError>;

    fn options(&self) -> QueryOptions;

    /// Filesystem setup that must exist before the agent starts.
    fn prepare(&self) -> Result<(), DemoError> {
        Ok(())
    }

    /// The artifact a successful run leaves behind, if any.
    fn expected_output(&self) -> Option<OutputCheck> {
        None
    }
}

/// A demo whose options pass through [`DemoConfig::apply`].
#[derive(Debug)]
pub struct Configured<'a, D> {
    demo: D,
    config: &'a DemoConfig,
}

impl<'a, D: Demo> Configured<'a, D> {
    pub fn new(demo: D, config: &'a DemoConfig) -> Self {
        Self { demo, config }
    }

    pub fn inner(&self) -> &D {
        &self.demo
    }
}

impl<D: Demo> Demo for Configured<'_, D> {
    fn name(&self) -> &'static str {
        self.demo.name()
    }

    fn prompt(&self) -> Result<String, DemoError> {
        self.demo.prompt()
    }

    fn options(&self) -> QueryOptions {
        self.config.apply(self.demo.options())
    }

    fn prepare(&self) -> Result<(), DemoError> {
        self.demo.prepare()
    }

    fn expected_output(&self) -> Option<OutputCheck> {
        self.demo.expected_output()
    }
}

/// Where a demo expects the agent to leave its artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCheck {
    File(PathBuf),
    Matching { dir: PathBuf, pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    Found(Vec<PathBuf>),
    Missing(String),
}

impl OutputCheck {
    pub fn check(&self) -> OutputStatus {
        match self {
            OutputCheck::File(path) => {
                if path.is_file() {
                    OutputStatus::Found(vec![path.clone()])
                } else {
                    OutputStatus::Missing(path.display().to_string())
                }
            }
            OutputCheck::Matching { dir, pattern } => {
                let full = dir.join(pattern);
                // Only `pattern` is a glob; the directory is matched literally.
                let escaped = format!(
                    "{}{}{pattern}",
                    glob::Pattern::escape(&dir.to_string_lossy()),
                    std::path::MAIN_SEPARATOR
                );
                let paths = match glob::glob(&escaped) {
                    Ok(paths) => paths,
                    Err(err) => {
                        return OutputStatus::Missing(format!(
                            "{} (invalid pattern: {err})",
                            full.display()
                        ));
                    }
                };

                let mut found = paths
                    .filter_map(Result::ok)
                    .filter(|path| path.is_file())
                    .collect::<Vec<_>>();
                found.sort();

                if found.is_empty() {
                    OutputStatus::Missing(full.display().to_string())
                } else {
                    OutputStatus::Found(found)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub result: Option<ResultMessage>,
    pub output: Option<OutputStatus>,
}

impl DemoReport {
    /// True when the runtime finished cleanly and any expected artifact exists.
    pub fn succeeded(&self) -> bool {
        let finished = self.result.as_ref().is_some_and(|result| !result.is_error);
        let produced = !matches!(self.output, Some(OutputStatus::Missing(_)));
        finished && produced
    }
}

pub async fn run<D, W>(
    demo: &D,
    transport: &dyn Transport,
    printer: &mut EventPrinter,
    writer: &mut W,
) -> Result<DemoReport, DemoError>
where
    D: Demo + ?Sized,
    W: Write,
{
    let prompt = demo.prompt()?;
    demo.prepare()?;
    let options = demo.options();
    info!(demo = demo.name(), max_turns = ?options.max_turns, "starting demo");

    let result = print_stream(query_stream(transport, prompt, options), printer, writer).await?;

    let output = demo.expected_output().map(|check| check.check());
    match &output {
        Some(OutputStatus::Found(paths)) => {
            for path in paths {
                writeln!(writer, "output: {}", path.display())?;
            }
        }
        Some(OutputStatus::Missing(expected)) => {
            writeln!(writer, "output missing: {expected} was not created")?;
        }
        None => {}
    }

    info!(demo = demo.name(), "demo finished");
    Ok(DemoReport { result, output })
}

#[cfg(test)]
mod tests;

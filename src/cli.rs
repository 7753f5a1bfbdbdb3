//! Flags shared by every demo binary.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use crate::config::{Backend, DemoConfig};
use crate::demos::{Configured, Demo, run};
use crate::display::{DisplayConfig, EventPrinter};
use crate::error::SdkError;
use crate::sdk::Transport;

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Runtime to talk to (overrides AGENT_DEMOS_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Model id or alias (overrides ANTHROPIC_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Turn ceiling for the agent (overrides the demo default)
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Path to the agent CLI (overrides CLAUDE_CLI_PATH)
    #[arg(long)]
    pub cli_path: Option<PathBuf>,

    /// Replay a recorded stream-json transcript instead of calling the runtime
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Print the model's thinking blocks
    #[arg(long)]
    pub show_thinking: bool,

    /// Print tool results as they come back
    #[arg(long)]
    pub show_tool_results: bool,

    /// Cut assistant text to this many characters
    #[arg(long, value_name = "CHARS")]
    pub text_width: Option<usize>,
}

impl CommonArgs {
    /// Environment first, then flags on top.
    pub fn config(&self) -> Result<DemoConfig, SdkError> {
        let mut config = DemoConfig::from_env()?;
        self.merge_into(&mut config);
        Ok(config)
    }

    fn merge_into(&self, config: &mut DemoConfig) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(max_turns) = self.max_turns {
            config.max_turns = Some(max_turns);
        }
        if let Some(cli_path) = &self.cli_path {
            config.cli_path = Some(cli_path.clone());
        }
    }

    pub fn transport(&self, config: &DemoConfig) -> Result<Box<dyn Transport>, SdkError> {
        match &self.replay {
            Some(path) => DemoConfig::replay_transport(path),
            None => config.transport(),
        }
    }

    pub fn printer(&self) -> EventPrinter {
        EventPrinter::new(DisplayConfig {
            show_thinking: self.show_thinking,
            show_tool_results: self.show_tool_results,
            text_width: self.text_width,
            ..DisplayConfig::default()
        })
    }
}

/// Runs one demo against the configured runtime, printing to stdout.
/// Exits with failure when the run errored or its artifact is missing.
pub async fn execute<D: Demo>(demo: D, args: &CommonArgs) -> Result<ExitCode, Box<dyn Error>> {
    let config = args.config()?;
    let transport = args.transport(&config)?;
    let demo = Configured::new(demo, &config);
    let mut printer = args.printer();
    let mut stdout = io::stdout().lock();

    let report = run(&demo, transport.as_ref(), &mut printer, &mut stdout).await?;
    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

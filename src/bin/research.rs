use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use agent_demos::cli::{CommonArgs, execute};
use agent_demos::demos::Research;
use clap::Parser;

/// Research a topic on the web with subagents and write a report.
#[derive(Parser, Debug)]
#[command(name = "research")]
struct Args {
    /// Topic to research
    #[arg(required = true)]
    topic: Vec<String>,

    /// Workspace for notes and reports
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    agent_demos::logging::init();
    let args = Args::parse();

    let demo = Research::new(args.topic.join(" "), &args.workspace);
    execute(demo, &args.common).await
}

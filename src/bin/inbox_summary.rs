use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use agent_demos::cli::{CommonArgs, execute};
use agent_demos::demos::InboxSummary;
use clap::Parser;

/// Summarize a directory of exported .eml messages.
#[derive(Parser, Debug)]
#[command(name = "inbox_summary")]
struct Args {
    /// Directory holding the exported inbox
    #[arg(default_value = "inbox")]
    inbox: PathBuf,

    /// How many messages to list in the prompt
    #[arg(long, default_value_t = InboxSummary::DEFAULT_LIMIT)]
    limit: usize,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    agent_demos::logging::init();
    let args = Args::parse();

    let demo = InboxSummary::new(&args.inbox).with_limit(args.limit);
    execute(demo, &args.common).await
}

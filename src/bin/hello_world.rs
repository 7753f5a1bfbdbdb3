use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use agent_demos::cli::{CommonArgs, execute};
use agent_demos::demos::HelloWorld;
use clap::Parser;

/// Ask the agent to introduce itself.
#[derive(Parser, Debug)]
#[command(name = "hello_world")]
struct Args {
    /// Prompt to send instead of the default greeting
    greeting: Vec<String>,

    /// Working directory handed to the agent
    #[arg(long, default_value = "agent")]
    agent_dir: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    agent_demos::logging::init();
    let args = Args::parse();

    let mut demo = HelloWorld::new(&args.agent_dir);
    let greeting = args.greeting.join(" ");
    if !greeting.trim().is_empty() {
        demo = demo.with_greeting(greeting);
    }

    execute(demo, &args.common).await
}

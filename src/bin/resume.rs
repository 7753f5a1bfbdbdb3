use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use agent_demos::cli::{CommonArgs, execute};
use agent_demos::demos::Resume;
use clap::Parser;

/// Research a person and write their resume as a .docx file.
#[derive(Parser, Debug)]
#[command(name = "resume")]
struct Args {
    /// Full name of the person
    #[arg(required = true)]
    person: Vec<String>,

    /// Workspace; the document lands in <workspace>/output/resume.docx
    #[arg(long, default_value = "agent")]
    workspace: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    agent_demos::logging::init();
    let args = Args::parse();

    let demo = Resume::new(args.person.join(" "), &args.workspace);
    execute(demo, &args.common).await
}

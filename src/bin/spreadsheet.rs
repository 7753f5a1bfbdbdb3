use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use agent_demos::cli::{CommonArgs, execute};
use agent_demos::demos::Spreadsheet;
use clap::Parser;

const DEFAULT_REQUEST: &str = "Create a monthly household budget workbook with income, fixed \
costs and variable costs for January to December, a totals row per month and a yearly summary \
sheet with a chart.";

/// Have the agent build an Excel workbook.
#[derive(Parser, Debug)]
#[command(name = "spreadsheet")]
struct Args {
    /// What the workbook should contain
    request: Vec<String>,

    /// Workspace the agent works in; the workbook lands in <workspace>/output
    #[arg(long, default_value = "agent")]
    workspace: PathBuf,

    /// File name of the workbook
    #[arg(long, default_value = "budget.xlsx")]
    output: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    agent_demos::logging::init();
    let args = Args::parse();

    let request = args.request.join(" ");
    let request = if request.trim().is_empty() {
        DEFAULT_REQUEST.to_string()
    } else {
        request
    };

    let demo = Spreadsheet::new(&args.workspace, request, args.output);
    execute(demo, &args.common).await
}

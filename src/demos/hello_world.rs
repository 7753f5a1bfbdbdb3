use std::path::PathBuf;

use crate::error::DemoError;
use crate::sdk::QueryOptions;

use super::Demo;

pub const DEFAULT_GREETING: &str = "Hello, Claude! Please introduce yourself in one sentence.";

const TOOLS: &[&str] = &[
    "Task",
    "Bash",
    "Glob",
    "Grep",
    "LS",
    "ExitPlanMode",
    "Read",
    "Edit",
    "MultiEdit",
    "Write",
    "NotebookEdit",
    "WebFetch",
    "TodoWrite",
    "WebSearch",
    "BashOutput",
    "KillBash",
];

/// The smallest possible run: one prompt, the full tool belt, no artifact.
#[derive(Debug, Clone)]
pub struct HelloWorld {
    pub greeting: String,
    pub agent_dir: PathBuf,
}

impl HelloWorld {
    pub fn new(agent_dir: impl Into<PathBuf>) -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            agent_dir: agent_dir.into(),
        }
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }
}

impl Demo for HelloWorld {
    fn name(&self) -> &'static str {
        "hello-world"
    }

    fn prompt(&self) -> Result<String, DemoError> {
        Ok(self.greeting.clone())
    }

    fn options(&self) -> QueryOptions {
        QueryOptions::new()
            .max_turns(100)
            .cwd(&self.agent_dir)
            .allowed_tools(TOOLS.iter().copied())
    }

    fn prepare(&self) -> Result<(), DemoError> {
        std::fs::create_dir_all(&self.agent_dir)?;
        Ok(())
    }
}

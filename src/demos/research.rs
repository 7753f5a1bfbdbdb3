use std::path::PathBuf;

use crate::error::DemoError;
use crate::sdk::{AgentDefinition, QueryOptions};

use super::{Demo, OutputCheck};

const LEAD_PROMPT: &str = "You are a lead researcher. Break the topic into two to four focused \
subtopics and hand each one to the researcher subagent with the Task tool. Researchers save their \
findings under files/research_notes/. When all notes are in, hand them to the report-writer \
subagent, which writes the final report to files/reports/. Do not search the web yourself.";

const RESEARCHER_PROMPT: &str = "You research one subtopic. Run several web searches, fetch the \
most relevant pages, and write concise notes with source URLs to files/research_notes/<subtopic>.md.";

const WRITER_PROMPT: &str = "You turn research notes into a report. Read every file in \
files/research_notes/, then write a structured markdown report with a summary, key findings and a \
sources section to files/reports/<topic>.md.";

/// Multi-agent web research: a lead agent fans out to researcher subagents
/// and a report writer, leaving a markdown report behind.
#[derive(Debug, Clone)]
pub struct Research {
    pub topic: String,
    pub workspace: PathBuf,
}

impl Research {
    pub fn new(topic: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            topic: topic.into(),
            workspace: workspace.into(),
        }
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.workspace.join("files").join("research_notes")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.workspace.join("files").join("reports")
    }
}

impl Demo for Research {
    fn name(&self) -> &'static str {
        "research"
    }

    fn prompt(&self) -> Result<String, DemoError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(DemoError::InvalidInput("research topic must not be empty".to_string()));
        }
        Ok(format!("Research the following topic and produce a report: {topic}"))
    }

    fn options(&self) -> QueryOptions {
        QueryOptions::new()
            .max_turns(50)
            .cwd(&self.workspace)
            .allowed_tools(["Task", "WebSearch", "WebFetch", "Write", "Read", "Glob"])
            .system_prompt(LEAD_PROMPT)
            .agent(
                "researcher",
                AgentDefinition::new(
                    "Researches one subtopic on the web and saves notes",
                    RESEARCHER_PROMPT,
                )
                .with_tools(["WebSearch", "WebFetch", "Write"]),
            )
            .agent(
                "report-writer",
                AgentDefinition::new(
                    "Combines research notes into the final report",
                    WRITER_PROMPT,
                )
                .with_tools(["Read", "Glob", "Write"]),
            )
    }

    fn prepare(&self) -> Result<(), DemoError> {
        std::fs::create_dir_all(self.notes_dir())?;
        std::fs::create_dir_all(self.reports_dir())?;
        Ok(())
    }

    fn expected_output(&self) -> Option<OutputCheck> {
        Some(OutputCheck::Matching {
            dir: self.reports_dir(),
            pattern: "*.md".to_string(),
        })
    }
}

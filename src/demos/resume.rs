use std::path::PathBuf;

use crate::error::DemoError;
use crate::sdk::QueryOptions;

use super::{Demo, OutputCheck};

pub const RESUME_FILE: &str = "resume.docx";

const SYSTEM_PROMPT: &str = "You are a professional resume writer. Research the person with web \
searches (professional profiles, company pages, talks, publications), then write a one-page \
resume covering a summary, experience, skills and education. Produce it as a .docx document using \
the docx skill when available, otherwise a script run with Bash. Only include facts you found.";

/// Researches a person on the web and writes a resume document.
#[derive(Debug, Clone)]
pub struct Resume {
    pub person: String,
    pub workspace: PathBuf,
}

impl Resume {
    pub fn new(person: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            person: person.into(),
            workspace: workspace.into(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.workspace.join("output").join(RESUME_FILE)
    }
}

impl Demo for Resume {
    fn name(&self) -> &'static str {
        "resume"
    }

    fn prompt(&self) -> Result<String, DemoError> {
        let person = self.person.trim();
        if person.is_empty() {
            return Err(DemoError::InvalidInput("a person's name is required".to_string()));
        }
        Ok(format!(
            "Research \"{person}\" and create a professional resume. \
Save it as output/{RESUME_FILE}."
        ))
    }

    fn options(&self) -> QueryOptions {
        QueryOptions::new()
            .max_turns(30)
            .cwd(&self.workspace)
            .allowed_tools([
                "Skill",
                "WebSearch",
                "WebFetch",
                "Bash",
                "Write",
                "Read",
                "Glob",
            ])
            .setting_source("project")
            .system_prompt(SYSTEM_PROMPT)
    }

    fn prepare(&self) -> Result<(), DemoError> {
        std::fs::create_dir_all(self.workspace.join("output"))?;
        Ok(())
    }

    fn expected_output(&self) -> Option<OutputCheck> {
        Some(OutputCheck::File(self.output_path()))
    }
}

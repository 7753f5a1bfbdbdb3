use std::path::PathBuf;

use crate::error::DemoError;
use crate::sdk::QueryOptions;

use super::{Demo, OutputCheck};

const SYSTEM_PROMPT: &str = "You build Excel workbooks. Use the xlsx skill when it is available, \
otherwise write a Python script that uses openpyxl and run it with Bash. Use real formulas rather \
than hard-coded totals, give every sheet a header row, and save the finished workbook at the path \
the user gives you.";

/// Asks the agent to create or transform a spreadsheet and checks that the workbook exists.
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    pub workspace: PathBuf,
    pub request: String,
    pub output_name: String,
}

impl Spreadsheet {
    pub fn new(
        workspace: impl Into<PathBuf>,
        request: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            request: request.into(),
            output_name: output_name.into(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.workspace.join("output")
    }

    pub fn file_name(&self) -> String {
        let name = self.output_name.trim();
        if name.to_ascii_lowercase().ends_with(".xlsx") {
            name.to_string()
        } else {
            format!("{name}.xlsx")
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(self.file_name())
    }
}

impl Demo for Spreadsheet {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn prompt(&self) -> Result<String, DemoError> {
        let request = self.request.trim();
        if request.is_empty() {
            return Err(DemoError::InvalidInput(
                "spreadsheet request must not be empty".to_string(),
            ));
        }
        let name = self.output_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(DemoError::InvalidInput(format!(
                "output name must be a plain file name, got {:?}",
                self.output_name
            )));
        }

        Ok(format!(
            "{request}\n\nSave the workbook as output/{}.",
            self.file_name()
        ))
    }

    fn options(&self) -> QueryOptions {
        QueryOptions::new()
            .max_turns(40)
            .cwd(&self.workspace)
            .allowed_tools(["Skill", "Bash", "Read", "Write", "Edit", "Glob"])
            .setting_source("project")
            .system_prompt(SYSTEM_PROMPT)
    }

    fn prepare(&self) -> Result<(), DemoError> {
        std::fs::create_dir_all(self.output_dir())?;
        Ok(())
    }

    fn expected_output(&self) -> Option<OutputCheck> {
        Some(OutputCheck::File(self.output_path()))
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::SdkError;

/// How the runtime asks for permission before running tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    Default,
    AcceptEdits,
    BypassPermissions,
    Plan,
}

impl PermissionMode {
    /// The spelling the CLI expects after `--permission-mode`.
    pub fn as_cli_str(self) -> &'static str {
        match self {
            PermissionMode::Default => "default",
            PermissionMode::AcceptEdits => "acceptEdits",
            PermissionMode::BypassPermissions => "bypassPermissions",
            PermissionMode::Plan => "plan",
        }
    }

    /// Accepts the CLI spelling or its kebab-case form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(PermissionMode::Default),
            "acceptEdits" | "accept-edits" => Some(PermissionMode::AcceptEdits),
            "bypassPermissions" | "bypass-permissions" => Some(PermissionMode::BypassPermissions),
            "plan" => Some(PermissionMode::Plan),
            _ => None,
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cli_str())
    }
}

/// A named subagent the runtime may delegate to through its `Task` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDefinition {
    pub description: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AgentDefinition {
    pub fn new(description: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            prompt: prompt.into(),
            tools: None,
            model: None,
        }
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Configuration handed to the agent runtime alongside the prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub max_turns: Option<u32>,
    pub cwd: Option<PathBuf>,
    pub model: Option<String>,
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    pub system_prompt: Option<String>,
    pub append_system_prompt: Option<String>,
    pub permission_mode: Option<PermissionMode>,
    pub setting_sources: Vec<String>,
    pub agents: BTreeMap<String, AgentDefinition>,
    pub env: BTreeMap<String, String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of agent turns.
    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Directory the runtime works in.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Model id or alias.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Adds tools the runtime may use without asking.
    pub fn allowed_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn allow_tool(mut self, tool: impl Into<String>) -> Self {
        self.allowed_tools.push(tool.into());
        self
    }

    /// Blocks a tool outright.
    pub fn disallow_tool(mut self, tool: impl Into<String>) -> Self {
        self.disallowed_tools.push(tool.into());
        self
    }

    /// Replaces the runtime's default system prompt.
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Appends to the default system prompt instead of replacing it.
    pub fn append_system_prompt(mut self, extra: impl Into<String>) -> Self {
        self.append_system_prompt = Some(extra.into());
        self
    }

    pub fn permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = Some(mode);
        self
    }

    /// Loads settings (and skills) from `user`, `project` or `local`.
    pub fn setting_source(mut self, source: impl Into<String>) -> Self {
        self.setting_sources.push(source.into());
        self
    }

    /// Registers a subagent under `name`.
    pub fn agent(mut self, name: impl Into<String>, definition: AgentDefinition) -> Self {
        self.agents.insert(name.into(), definition);
        self
    }

    /// Extra environment variable for the runtime process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Rejects a zero turn limit, blank tool names, and tools both allowed and disallowed.
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.max_turns == Some(0) {
            return Err(SdkError::InvalidOptions(
                "max_turns must be at least 1".to_string(),
            ));
        }

        for tool in self.allowed_tools.iter().chain(&self.disallowed_tools) {
            if tool.trim().is_empty() {
                return Err(SdkError::InvalidOptions(
                    "tool names must not be empty".to_string(),
                ));
            }
        }

        if let Some(tool) = self
            .allowed_tools
            .iter()
            .find(|tool| self.disallowed_tools.contains(tool))
        {
            return Err(SdkError::InvalidOptions(format!(
                "tool {tool} is both allowed and disallowed"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_tools_and_agents() {
        let options = QueryOptions::new()
            .allowed_tools(["Read", "Glob"])
            .allow_tool("Grep")
            .agent(
                "researcher",
                AgentDefinition::new("digs", "find sources").with_tools(["WebSearch"]),
            )
            .max_turns(5);

        assert_eq!(options.allowed_tools, vec!["Read", "Glob", "Grep"]);
        assert_eq!(options.max_turns, Some(5));
        assert!(options.agents.contains_key("researcher"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_turns() {
        let err = QueryOptions::new().max_turns(0).validate().unwrap_err();
        assert!(matches!(err, SdkError::InvalidOptions(_)));
    }

    #[test]
    fn validate_rejects_conflicting_tools() {
        let err = QueryOptions::new()
            .allow_tool("Bash")
            .disallow_tool("Bash")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Bash"));
    }

    #[test]
    fn validate_rejects_blank_tool_names() {
        assert!(QueryOptions::new().allow_tool("  ").validate().is_err());
    }

    #[test]
    fn permission_mode_round_trips_cli_spelling() {
        for mode in [
            PermissionMode::Default,
            PermissionMode::AcceptEdits,
            PermissionMode::BypassPermissions,
            PermissionMode::Plan,
        ] {
            assert_eq!(PermissionMode::parse(mode.as_cli_str()), Some(mode));
        }
        assert_eq!(PermissionMode::parse("yolo"), None);
    }

    #[test]
    fn agent_definition_omits_unset_fields() {
        let json = serde_json::to_value(AgentDefinition::new("d", "p")).unwrap();
        assert_eq!(json, serde_json::json!({"description": "d", "prompt": "p"}));
    }
}

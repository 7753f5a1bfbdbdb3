use std::path::PathBuf;
use std::str::FromStr;

use crate::error::SdkError;
use crate::sdk::{
    AnthropicConfig, AnthropicTransport, CliTransport, DEFAULT_CLI_PROGRAM, FixtureTransport,
    PermissionMode, QueryOptions, Transport,
};

pub const BACKEND_VAR: &str = "AGENT_DEMOS_BACKEND";
pub const CLI_PATH_VAR: &str = "CLAUDE_CLI_PATH";
pub const MODEL_VAR: &str = "ANTHROPIC_MODEL";
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const PERMISSION_MODE_VAR: &str = "AGENT_DEMOS_PERMISSION_MODE";

/// Which runtime a demo talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// The agent CLI, with tools and subagents.
    #[default]
    Cli,
    /// A single Messages API turn without tools.
    Api,
}

impl FromStr for Backend {
    type Err = SdkError;

    /// Case-insensitive `cli` or `api`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cli" => Ok(Backend::Cli),
            "api" => Ok(Backend::Api),
            other => Err(SdkError::InvalidOptions(format!(
                "unknown backend {other:?}, expected cli or api"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemoConfig {
    pub backend: Backend,
    pub cli_path: Option<PathBuf>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub permission_mode: Option<PermissionMode>,
    pub max_turns: Option<u32>,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SdkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match non_empty(BACKEND_VAR) {
            Some(value) => value.parse()?,
            None => Backend::default(),
        };

        let permission_mode = match non_empty(PERMISSION_MODE_VAR) {
            Some(value) => Some(PermissionMode::parse(value.trim()).ok_or_else(|| {
                SdkError::InvalidOptions(format!("unknown permission mode {value:?}"))
            })?),
            None => None,
        };

        Ok(Self {
            backend,
            cli_path: non_empty(CLI_PATH_VAR).map(PathBuf::from),
            model: non_empty(MODEL_VAR),
            api_key: non_empty(API_KEY_VAR),
            permission_mode,
            max_turns: None,
        })
    }

    /// Applies config-level overrides on top of a demo's own options.
    pub fn apply(&self, mut options: QueryOptions) -> QueryOptions {
        if let Some(model) = &self.model {
            options.model = Some(model.clone());
        }
        if let Some(mode) = self.permission_mode {
            options.permission_mode = Some(mode);
        }
        if let Some(max_turns) = self.max_turns {
            options.max_turns = Some(max_turns);
        }
        options
    }

    /// Builds the transport for the selected backend. The api backend needs a key.
    pub fn transport(&self) -> Result<Box<dyn Transport>, SdkError> {
        match self.backend {
            Backend::Cli => {
                let program = self
                    .cli_path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CLI_PROGRAM));
                Ok(Box::new(CliTransport::new(program)))
            }
            Backend::Api => {
                let api_key = self.api_key.clone().ok_or_else(|| {
                    SdkError::InvalidOptions(format!(
                        "{API_KEY_VAR} is required for the api backend"
                    ))
                })?;
                let model = self
                    .model
                    .clone()
                    .unwrap_or_else(|| AnthropicConfig::DEFAULT_MODEL.to_string());
                Ok(Box::new(AnthropicTransport::new(AnthropicConfig::new(
                    api_key, model,
                ))?))
            }
        }
    }

    pub fn replay_transport(path: impl Into<PathBuf>) -> Result<Box<dyn Transport>, SdkError> {
        Ok(Box::new(FixtureTransport::from_path(path.into())?))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_cli_backend() {
        let config = DemoConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.backend, Backend::Cli);
    }

    #[test]
    fn reads_environment_values() {
        let config = DemoConfig::from_lookup(lookup(&[
            (BACKEND_VAR, "API"),
            (MODEL_VAR, "claude-opus-4-1"),
            (API_KEY_VAR, "sk-test"),
            (CLI_PATH_VAR, "/usr/local/bin/claude"),
            (PERMISSION_MODE_VAR, "acceptEdits"),
        ]))
        .unwrap();

        assert_eq!(config.backend, Backend::Api);
        assert_eq!(config.model.as_deref(), Some("claude-opus-4-1"));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.cli_path,
            Some(PathBuf::from("/usr/local/bin/claude"))
        );
        assert_eq!(config.permission_mode, Some(PermissionMode::AcceptEdits));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = DemoConfig::from_lookup(lookup(&[(MODEL_VAR, "  ")])).unwrap();
        assert!(config.model.is_none());
    }

    #[test]
    fn rejects_unknown_backend_and_mode() {
        assert!(DemoConfig::from_lookup(lookup(&[(BACKEND_VAR, "grpc")])).is_err());
        assert!(DemoConfig::from_lookup(lookup(&[(PERMISSION_MODE_VAR, "always")])).is_err());
    }

    #[test]
    fn apply_overrides_demo_options() {
        let config = DemoConfig {
            model: Some("haiku".to_string()),
            max_turns: Some(5),
            ..DemoConfig::default()
        };
        let options = config.apply(QueryOptions::new().max_turns(40).model("sonnet"));
        assert_eq!(options.model.as_deref(), Some("haiku"));
        assert_eq!(options.max_turns, Some(5));
    }

    #[test]
    fn api_backend_requires_key() {
        let config = DemoConfig {
            backend: Backend::Api,
            ..DemoConfig::default()
        };
        let err = config.transport().err().unwrap();
        assert!(err.to_string().contains(API_KEY_VAR));
    }
}

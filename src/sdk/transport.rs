use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Mutex;

use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{SdkError, TransportError};
use crate::sdk::message::SdkMessage;
use crate::sdk::options::QueryOptions;

pub type MessageStream = BoxStream<'static, Result<SdkMessage, SdkError>>;

/// A prompt plus the options it runs under.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub prompt: String,
    pub options: QueryOptions,
}

/// The seam through which a query reaches the agent runtime.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, request: &QueryRequest) -> Result<MessageStream, SdkError>;
}

pub const DEFAULT_CLI_PROGRAM: &str = "claude";

/// Launches the agent CLI in stream-json mode and decodes its stdout line by line.
#[derive(Debug, Clone)]
pub struct CliTransport {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl Default for CliTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CLI_PROGRAM)
    }
}

impl CliTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn build_args(&self, request: &QueryRequest) -> Result<Vec<String>, SdkError> {
        let options = &request.options;
        let mut args = vec![
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
        ];

        if let Some(system_prompt) = &options.system_prompt {
            args.push("--system-prompt".to_string());
            args.push(system_prompt.clone());
        }
        if let Some(extra) = &options.append_system_prompt {
            args.push("--append-system-prompt".to_string());
            args.push(extra.clone());
        }
        if !options.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(options.allowed_tools.join(","));
        }
        if !options.disallowed_tools.is_empty() {
            args.push("--disallowedTools".to_string());
            args.push(options.disallowed_tools.join(","));
        }
        if let Some(max_turns) = options.max_turns {
            args.push("--max-turns".to_string());
            args.push(max_turns.to_string());
        }
        if let Some(model) = &options.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if let Some(mode) = options.permission_mode {
            args.push("--permission-mode".to_string());
            args.push(mode.as_cli_str().to_string());
        }
        if !options.setting_sources.is_empty() {
            args.push("--setting-sources".to_string());
            args.push(options.setting_sources.join(","));
        }
        if !options.agents.is_empty() {
            let agents = serde_json::to_string(&options.agents)
                .map_err(|err| SdkError::InvalidOptions(format!("agents: {err}")))?;
            args.push("--agents".to_string());
            args.push(agents);
        }

        args.extend(self.extra_args.iter().cloned());
        args.push("--print".to_string());
        args.push("--".to_string());
        args.push(request.prompt.clone());
        Ok(args)
    }

    fn spawn_error(&self, err: std::io::Error) -> TransportError {
        let message = if err.kind() == std::io::ErrorKind::NotFound {
            format!("{err}; install the agent CLI or point CLAUDE_CLI_PATH at it")
        } else {
            err.to_string()
        };
        TransportError::Spawn {
            program: self.program.display().to_string(),
            message,
        }
    }
}

#[async_trait]
impl Transport for CliTransport {
    async fn open(&self, request: &QueryRequest) -> Result<MessageStream, SdkError> {
        let args = self.build_args(request)?;

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .envs(&request.options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &request.options.cwd {
            command.current_dir(cwd);
        }

        debug!(program = %self.program.display(), ?args, "launching agent runtime");
        let mut child = command.spawn().map_err(|err| self.spawn_error(err))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Request("runtime stdout was not captured".to_string()))?;
        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut collected = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut collected).await;
            }
            collected
        });

        Ok(read_events(child, stdout, stderr_task).boxed())
    }
}

fn read_events(
    mut child: Child,
    stdout: ChildStdout,
    stderr_task: JoinHandle<String>,
) -> impl Stream<Item = Result<SdkMessage, SdkError>> + Send {
    try_stream! {
        let mut lines = BufReader::new(stdout).lines();
        let mut saw_result = false;

        while let Some(line) = lines.next_line().await.map_err(TransportError::from)? {
            if let Some(message) = SdkMessage::from_json_line(&line)? {
                saw_result |= matches!(message, SdkMessage::Result(_));
                yield message;
            }
        }

        let status = child.wait().await.map_err(TransportError::from)?;
        let stderr = stderr_task.await.unwrap_or_default();
        debug!(%status, "agent runtime exited");
        check_exit(status, saw_result, stderr)?;
    }
}

fn check_exit(status: ExitStatus, saw_result: bool, stderr: String) -> Result<(), SdkError> {
    if status.success() || saw_result {
        return Ok(());
    }
    Err(TransportError::Exited {
        code: status.code(),
        stderr: stderr.trim().to_string(),
    }
    .into())
}

/// Replays a recorded stream-json transcript instead of calling the runtime.
#[derive(Debug, Default)]
pub struct FixtureTransport {
    messages: Vec<SdkMessage>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl FixtureTransport {
    pub fn new(messages: Vec<SdkMessage>) -> Self {
        Self {
            messages,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn from_json_lines(transcript: &str) -> Result<Self, SdkError> {
        let mut messages = Vec::new();
        for line in transcript.lines() {
            if let Some(message) = SdkMessage::from_json_line(line)? {
                messages.push(message);
            }
        }
        Ok(Self::new(messages))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let transcript = std::fs::read_to_string(path).map_err(|err| {
            TransportError::Fixture(format!("{}: {err}", path.display()))
        })?;
        Self::from_json_lines(&transcript)
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn open(&self, request: &QueryRequest) -> Result<MessageStream, SdkError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        debug!(events = self.messages.len(), "replaying fixture transcript");
        Ok(stream::iter(self.messages.clone().into_iter().map(Ok)).boxed())
    }
}

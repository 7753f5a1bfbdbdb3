use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to launch agent runtime `{program}`: {message}")]
    Spawn { program: String, message: String },
    #[error("agent runtime exited with {} before a result: {stderr}", exit_label(.code))]
    Exited { code: Option<i32>, stderr: String },
    #[error("agent request failed: {0}")]
    Request(String),
    #[error("fixture unreadable: {0}")]
    Fixture(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("undecodable event ({message}): {line}")]
    Decode { line: String, message: String },
    #[error("invalid query options: {0}")]
    InvalidOptions(String),
    #[error("event stream ended without a result")]
    MissingResult,
}

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Sdk(#[from] SdkError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no messages found in inbox {}", .0.display())]
    EmptyInbox(PathBuf),
    #[error("invalid demo input: {0}")]
    InvalidInput(String),
}

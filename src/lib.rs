//! Demo applications driving an external agent runtime.
//!
//! - `sdk`: `query` / `query_stream` entry points over a pluggable `Transport`
//!   (agent CLI, single-turn Messages API, or recorded fixture)
//! - `display`: console rendering of runtime events
//! - `demos`: hello world, inbox summary, spreadsheet, research, resume
//! - `config` / `cli` / `logging`: environment, flags and tracing setup

pub mod cli;
pub mod config;
pub mod demos;
pub mod display;
pub mod error;
pub mod logging;
pub mod sdk;

pub use config::{Backend, DemoConfig};
pub use demos::{Configured, Demo, DemoReport, OutputCheck, OutputStatus, run};
pub use display::{DisplayConfig, EventPrinter, print_stream};
pub use error::{DemoError, SdkError, TransportError};
pub use sdk::{
    AgentDefinition, ContentBlock, PermissionMode, QueryOptions, ResultMessage, SdkMessage,
    Transport, query, query_stream,
};

//! Console rendering of runtime events.

use std::io::Write;

use futures_util::{Stream, StreamExt};
use serde_json::Value;

use crate::error::{DemoError, SdkError};
use crate::sdk::{ContentBlock, ResultMessage, SdkMessage};

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub show_thinking: bool,
    pub show_tool_results: bool,
    pub text_width: Option<usize>,
    pub tool_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_thinking: false,
            show_tool_results: false,
            text_width: None,
            tool_width: 160,
        }
    }
}

/// Turns runtime events into console lines.
#[derive(Debug, Default)]
pub struct EventPrinter {
    config: DisplayConfig,
    last_text: Option<String>,
}

impl EventPrinter {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            config,
            last_text: None,
        }
    }

    pub fn render(&mut self, message: &SdkMessage) -> Vec<String> {
        match message {
            SdkMessage::System(system) if system.subtype == "init" => {
                let session = system.session_id.as_deref().unwrap_or("-");
                match &system.model {
                    Some(model) => vec![format!("session: {session} (model {model})")],
                    None => vec![format!("session: {session}")],
                }
            }
            SdkMessage::System(_) | SdkMessage::Unknown => Vec::new(),
            SdkMessage::Assistant(assistant) => {
                let indent = indent_for(assistant.parent_tool_use_id.as_deref());
                assistant
                    .message
                    .content
                    .iter()
                    .filter_map(|block| self.render_block(block))
                    .map(|line| format!("{indent}{line}"))
                    .collect()
            }
            SdkMessage::User(user) => {
                if !self.config.show_tool_results {
                    return Vec::new();
                }
                let indent = indent_for(user.parent_tool_use_id.as_deref());
                user.message
                    .content
                    .blocks()
                    .iter()
                    .filter_map(|block| self.render_tool_result(block))
                    .map(|line| format!("{indent}{line}"))
                    .collect()
            }
            SdkMessage::Result(result) => self.render_result(result),
        }
    }

    fn render_block(&mut self, block: &ContentBlock) -> Option<String> {
        match block {
            ContentBlock::Text { text } => {
                if text.trim().is_empty() {
                    return None;
                }
                self.last_text = Some(text.trim().to_string());
                Some(format!("assistant: {}", self.fit_text(text.trim())))
            }
            ContentBlock::Thinking { thinking, .. } if self.config.show_thinking => Some(format!(
                "thinking: {}",
                truncate(thinking.trim(), self.config.tool_width)
            )),
            ContentBlock::ToolUse { id, name, input } => {
                Some(describe_tool_use(id, name, input, self.config.tool_width))
            }
            _ => None,
        }
    }

    fn render_tool_result(&self, block: &ContentBlock) -> Option<String> {
        let ContentBlock::ToolResult {
            tool_use_id,
            is_error,
            ..
        } = block
        else {
            return None;
        };
        let text = block.tool_result_text().unwrap_or_default();
        Some(format!(
            "tool-result [{tool_use_id}] (error={}): {}",
            is_error.unwrap_or(false),
            truncate(text.trim(), self.config.tool_width)
        ))
    }

    fn render_result(&mut self, result: &ResultMessage) -> Vec<String> {
        let seconds = result.duration_ms as f64 / 1000.0;
        let mut summary = format!(
            "result: {} (turns={}, {seconds:.1}s",
            result.subtype, result.num_turns
        );
        if let Some(cost) = result.total_cost_usd {
            summary.push_str(&format!(", ${cost:.4}"));
        }
        summary.push(')');

        let mut lines = Vec::new();
        if let Some(text) = result.result.as_deref().map(str::trim) {
            if !text.is_empty() && self.last_text.as_deref() != Some(text) {
                lines.push(format!("final: {text}"));
            }
        }
        if result.hit_max_turns() {
            lines.push("stopped: turn limit reached before the task finished".to_string());
        }
        lines.push(summary);
        lines
    }

    fn fit_text(&self, text: &str) -> String {
        match self.config.text_width {
            Some(width) => truncate(text, width),
            None => text.to_string(),
        }
    }
}

fn indent_for(parent_tool_use_id: Option<&str>) -> &'static str {
    if parent_tool_use_id.is_some() { "  " } else { "" }
}

fn describe_tool_use(id: &str, name: &str, input: &Value, width: usize) -> String {
    let field = |key: &str| input.get(key).and_then(Value::as_str);

    let described = match name {
        "WebSearch" => field("query").map(|query| format!("search: {query}")),
        "WebFetch" => field("url").map(|url| format!("fetch: {url}")),
        "Read" | "Write" | "Edit" | "MultiEdit" => field("file_path")
            .or_else(|| field("path"))
            .map(|path| format!("{}: {path}", name.to_lowercase())),
        "Bash" => field("command").map(|command| format!("bash: {command}")),
        "Glob" | "Grep" => {
            field("pattern").map(|pattern| format!("{}: {pattern}", name.to_lowercase()))
        }
        "Task" => field("description")
            .or_else(|| field("subagent_type"))
            .map(|description| format!("subagent: {description}")),
        "Skill" => field("skill")
            .or_else(|| field("command"))
            .map(|skill| format!("skill: {skill}")),
        _ => None,
    };

    let line = described.unwrap_or_else(|| format!("tool-call [{id}] {name}: {input}"));
    truncate(&line, width)
}

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut = text
        .char_indices()
        .nth(max)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    format!("{}...", &text[..cut])
}

/// Writes every rendered event and returns the final result, if one arrived.
pub async fn print_stream<S, W>(
    stream: S,
    printer: &mut EventPrinter,
    writer: &mut W,
) -> Result<Option<ResultMessage>, DemoError>
where
    S: Stream<Item = Result<SdkMessage, SdkError>>,
    W: Write,
{
    futures_util::pin_mut!(stream);

    let mut result = None;
    while let Some(event) = stream.next().await {
        let event = event?;
        for line in printer.render(&event) {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        if let SdkMessage::Result(message) = event {
            result = Some(message);
        }
    }

    Ok(result)
}

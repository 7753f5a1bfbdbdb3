use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::DemoError;
use crate::sdk::QueryOptions;

use super::Demo;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^(from|subject|date):[ \t]*(.*)$").expect("valid header regex")
});

const SYSTEM_PROMPT: &str = "You are an email assistant. The current directory holds an inbox \
exported as .eml files. Only read files; never modify or delete them. Answer in plain text.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Path relative to the inbox root.
    pub path: PathBuf,
    pub from: String,
    pub subject: String,
    pub date: Option<String>,
}

/// Collects the headers of every `.eml` file below `inbox_dir`, sorted by path.
pub fn scan_inbox(inbox_dir: &Path) -> Result<Vec<MessageHeader>, DemoError> {
    let mut headers = Vec::new();

    for entry in WalkDir::new(inbox_dir).follow_links(true) {
        let entry = entry.map_err(|err| DemoError::Io(err.into()))?;
        let path = entry.path();
        let is_eml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
        if !entry.file_type().is_file() || !is_eml {
            continue;
        }

        let raw = std::fs::read(path)?;
        let relative = path.strip_prefix(inbox_dir).unwrap_or(path).to_path_buf();
        headers.push(parse_headers(relative, &String::from_utf8_lossy(&raw)));
    }

    headers.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(count = headers.len(), inbox = %inbox_dir.display(), "scanned inbox");
    Ok(headers)
}

fn parse_headers(path: PathBuf, raw: &str) -> MessageHeader {
    let head = raw
        .split("\r\n\r\n")
        .next()
        .and_then(|head| head.split("\n\n").next())
        .unwrap_or_default();
    let unfolded = unfold(head);

    let mut header = MessageHeader {
        path,
        from: "(unknown sender)".to_string(),
        subject: "(no subject)".to_string(),
        date: None,
    };

    for captures in HEADER.captures_iter(&unfolded) {
        let value = captures[2].trim().to_string();
        if value.is_empty() {
            continue;
        }
        match captures[1].to_ascii_lowercase().as_str() {
            "from" => header.from = value,
            "subject" => header.subject = value,
            "date" => header.date = Some(value),
            _ => {}
        }
    }

    header
}

/// Joins RFC 5322 continuation lines onto the header they extend.
fn unfold(head: &str) -> String {
    let mut out = String::with_capacity(head.len());
    for line in head.lines() {
        if line.starts_with([' ', '\t']) && !out.is_empty() {
            out.push(' ');
            out.push_str(line.trim());
        } else {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(line.trim_end());
        }
    }
    out
}

/// Summarizes a local inbox of `.eml` files with read-only tools.
#[derive(Debug, Clone)]
pub struct InboxSummary {
    pub inbox_dir: PathBuf,
    pub limit: usize,
}

impl InboxSummary {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn new(inbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            inbox_dir: inbox_dir.into(),
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Demo for InboxSummary {
    fn name(&self) -> &'static str {
        "inbox-summary"
    }

    fn prompt(&self) -> Result<String, DemoError> {
        let headers = scan_inbox(&self.inbox_dir)?;
        if headers.is_empty() {
            return Err(DemoError::EmptyInbox(self.inbox_dir.clone()));
        }

        let shown = headers.len().min(self.limit.max(1));
        let mut prompt = format!(
            "My inbox has {} messages. Here are the first {shown}:\n\n",
            headers.len()
        );
        for (index, header) in headers.iter().take(shown).enumerate() {
            let date = header.date.as_deref().unwrap_or("undated");
            let _ = writeln!(
                prompt,
                "{}. [{date}] {} | {} ({})",
                index + 1,
                header.from,
                header.subject,
                header.path.display()
            );
        }
        prompt.push_str(
            "\nRead the messages that look important and summarize my inbox: \
group related messages by topic, flag anything that needs a reply from me, \
and list any deadlines or dates mentioned.",
        );
        Ok(prompt)
    }

    fn options(&self) -> QueryOptions {
        QueryOptions::new()
            .max_turns(20)
            .cwd(&self.inbox_dir)
            .allowed_tools(["Read", "Glob", "Grep"])
            .system_prompt(SYSTEM_PROMPT)
    }
}

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::config::DemoConfig;
use crate::display::DisplayConfig;
use crate::sdk::{AssistantBody, AssistantMessage, ContentBlock, FixtureTransport, SdkMessage};

fn assistant(blocks: Vec<ContentBlock>) -> SdkMessage {
    SdkMessage::Assistant(AssistantMessage {
        message: AssistantBody {
            content: blocks,
            ..AssistantBody::default()
        },
        parent_tool_use_id: None,
        session_id: None,
    })
}

fn result(subtype: &str, is_error: bool) -> SdkMessage {
    SdkMessage::Result(ResultMessage {
        subtype: subtype.to_string(),
        is_error,
        num_turns: 3,
        ..ResultMessage::default()
    })
}

async fn run_to_string<D: Demo>(
    demo: &D,
    transport: &FixtureTransport,
) -> (DemoReport, String) {
    let mut printer = EventPrinter::new(DisplayConfig::default());
    let mut out = Vec::new();
    let report = run(demo, transport, &mut printer, &mut out)
        .await
        .expect("demo runs");
    (report, String::from_utf8(out).expect("utf8 output"))
}

#[tokio::test]
async fn hello_world_prints_greeting_reply() {
    let dir = TempDir::new().unwrap();
    let demo = HelloWorld::new(dir.path().join("agent"));
    let transport = FixtureTransport::new(vec![
        assistant(vec![ContentBlock::Text {
            text: "I am an AI assistant.".to_string(),
        }]),
        result("success", false),
    ]);

    let (report, output) = run_to_string(&demo, &transport).await;

    assert!(report.succeeded());
    assert!(report.output.is_none());
    assert!(output.starts_with("assistant: I am an AI assistant.\n"));
    assert!(dir.path().join("agent").is_dir());

    let request = &transport.requests()[0];
    assert_eq!(request.prompt, hello_world::DEFAULT_GREETING);
    assert_eq!(request.options.max_turns, Some(100));
    assert!(request.options.allowed_tools.iter().any(|t| t == "WebSearch"));
}

#[tokio::test]
async fn spreadsheet_reports_missing_workbook() {
    let dir = TempDir::new().unwrap();
    let demo = Spreadsheet::new(dir.path(), "Build a monthly budget", "budget");
    let transport = FixtureTransport::new(vec![
        assistant(vec![ContentBlock::ToolUse {
            id: "tu_1".to_string(),
            name: "Bash".to_string(),
            input: json!({"command": "python make_budget.py"}),
        }]),
        result("success", false),
    ]);

    let (report, output) = run_to_string(&demo, &transport).await;

    assert!(!report.succeeded());
    assert!(matches!(report.output, Some(OutputStatus::Missing(_))));
    assert!(output.contains("bash: python make_budget.py"));
    assert!(output.contains("output missing:"));
    assert!(dir.path().join("output").is_dir());

    let request = &transport.requests()[0];
    assert!(request.prompt.ends_with("Save the workbook as output/budget.xlsx."));
    assert_eq!(request.options.setting_sources, vec!["project"]);
    assert_eq!(request.options.cwd.as_deref(), Some(dir.path()));
}

#[tokio::test]
async fn spreadsheet_finds_workbook() {
    let dir = TempDir::new().unwrap();
    let demo = Spreadsheet::new(dir.path(), "Build a monthly budget", "budget.xlsx");
    fs::create_dir_all(demo.output_dir()).unwrap();
    fs::write(demo.output_path(), b"PK").unwrap();
    let transport = FixtureTransport::new(vec![result("success", false)]);

    let (report, output) = run_to_string(&demo, &transport).await;

    assert!(report.succeeded());
    assert_eq!(
        report.output,
        Some(OutputStatus::Found(vec![demo.output_path()]))
    );
    assert!(output.contains(&format!("output: {}", demo.output_path().display())));
}

#[test]
fn spreadsheet_rejects_nested_output_names() {
    let demo = Spreadsheet::new("/tmp/ws", "anything", "../escape");
    assert!(matches!(demo.prompt(), Err(DemoError::InvalidInput(_))));
}

#[tokio::test]
async fn research_passes_subagents_and_finds_reports() {
    let dir = TempDir::new().unwrap();
    let demo = Research::new("solid-state batteries", dir.path());
    fs::create_dir_all(demo.reports_dir()).unwrap();
    fs::write(demo.reports_dir().join("batteries.md"), "# Report").unwrap();
    fs::write(demo.reports_dir().join("scratch.txt"), "ignored").unwrap();

    let transport = FixtureTransport::new(vec![
        assistant(vec![ContentBlock::ToolUse {
            id: "tu_1".to_string(),
            name: "Task".to_string(),
            input: json!({
                "description": "Research cathode materials",
                "subagent_type": "researcher"
            }),
        }]),
        result("success", false),
    ]);

    let (report, output) = run_to_string(&demo, &transport).await;

    assert!(report.succeeded());
    assert_eq!(
        report.output,
        Some(OutputStatus::Found(vec![
            demo.reports_dir().join("batteries.md")
        ]))
    );
    assert!(output.contains("subagent: Research cathode materials"));
    assert!(demo.notes_dir().is_dir());

    let options = &transport.requests()[0].options;
    assert_eq!(options.max_turns, Some(50));
    assert!(options.agents.contains_key("researcher"));
    assert!(options.agents.contains_key("report-writer"));
}

#[tokio::test]
async fn resume_flags_turn_limit_and_missing_document() {
    let dir = TempDir::new().unwrap();
    let demo = Resume::new("Grace Hopper", dir.path());
    let transport = FixtureTransport::new(vec![
        assistant(vec![ContentBlock::ToolUse {
            id: "tu_1".to_string(),
            name: "WebSearch".to_string(),
            input: json!({"query": "Grace Hopper career"}),
        }]),
        result("error_max_turns", true),
    ]);

    let (report, output) = run_to_string(&demo, &transport).await;

    assert!(!report.succeeded());
    assert!(output.contains("search: Grace Hopper career"));
    assert!(output.contains("stopped: turn limit reached"));
    assert!(output.contains("resume.docx was not created"));
    assert_eq!(transport.requests()[0].options.max_turns, Some(30));
}

#[test]
fn resume_requires_a_name() {
    let demo = Resume::new("  ", "/tmp/ws");
    assert!(matches!(demo.prompt(), Err(DemoError::InvalidInput(_))));
}

#[tokio::test]
async fn inbox_prompt_lists_messages() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("archive")).unwrap();
    fs::write(
        dir.path().join("001.eml"),
        "From: boss@example.com\nSubject: Q3 numbers\nDate: Tue, 2 Jan 2024\n\nPlease send by Friday.",
    )
    .unwrap();
    fs::write(
        dir.path().join("archive").join("002.EML"),
        "From: friend@example.com\nSubject: Lunch?\n\nNoon?",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not mail").unwrap();

    let demo = InboxSummary::new(dir.path());
    let transport = FixtureTransport::new(vec![result("success", false)]);
    let (report, _output) = run_to_string(&demo, &transport).await;
    assert!(report.succeeded());

    let request = &transport.requests()[0];
    assert!(request.prompt.starts_with("My inbox has 2 messages."));
    assert!(
        request
            .prompt
            .contains("1. [Tue, 2 Jan 2024] boss@example.com | Q3 numbers (001.eml)")
    );
    assert!(request.prompt.contains("friend@example.com | Lunch?"));
    assert_eq!(request.options.allowed_tools, vec!["Read", "Glob", "Grep"]);
}

#[test]
fn inbox_limit_caps_listing() {
    let dir = TempDir::new().unwrap();
    for index in 0..3 {
        fs::write(
            dir.path().join(format!("{index}.eml")),
            format!("Subject: message {index}\n\nbody"),
        )
        .unwrap();
    }

    let prompt = InboxSummary::new(dir.path()).with_limit(2).prompt().unwrap();
    assert!(prompt.starts_with("My inbox has 3 messages. Here are the first 2:"));
    assert!(prompt.contains("message 1"));
    assert!(!prompt.contains("message 2"));
}

#[tokio::test]
async fn empty_inbox_is_an_error() {
    let dir = TempDir::new().unwrap();
    let demo = InboxSummary::new(dir.path());
    let transport = FixtureTransport::new(vec![result("success", false)]);
    let mut printer = EventPrinter::default();
    let mut out = Vec::new();

    let err = run(&demo, &transport, &mut printer, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, DemoError::EmptyInbox(_)));
    assert!(transport.requests().is_empty());
}

#[test]
fn output_check_matching_ignores_other_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    let check = OutputCheck::Matching {
        dir: dir.path().to_path_buf(),
        pattern: "*.md".to_string(),
    };
    assert!(matches!(check.check(), OutputStatus::Missing(_)));
}

#[tokio::test]
async fn configured_demo_applies_overrides() {
    let dir = TempDir::new().unwrap();
    let config = DemoConfig {
        model: Some("haiku".to_string()),
        max_turns: Some(4),
        ..DemoConfig::default()
    };
    let demo = Configured::new(Resume::new("Ada Lovelace", dir.path()), &config);
    let transport = FixtureTransport::new(vec![result("success", false)]);

    let (_report, _output) = run_to_string(&demo, &transport).await;

    let options = &transport.requests()[0].options;
    assert_eq!(options.model.as_deref(), Some("haiku"));
    assert_eq!(options.max_turns, Some(4));
    assert_eq!(demo.inner().person, "Ada Lovelace");
}

fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

#[tokio::test]
async fn recorded_research_run_prints_expected_lines() {
    let dir = TempDir::new().unwrap();
    let demo = Research::new("solid-state batteries", dir.path());
    let transport = FixtureTransport::from_path(fixture("research.jsonl")).unwrap();
    let mut printer = EventPrinter::new(DisplayConfig {
        show_tool_results: true,
        ..DisplayConfig::default()
    });
    let mut out = Vec::new();

    let report = run(&demo, &transport, &mut printer, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();

    assert_eq!(
        output.lines().take(7).collect::<Vec<_>>(),
        vec![
            "session: r42 (model claude-sonnet-4-5)",
            "assistant: I'll split this into two subtopics.",
            "subagent: Research electrolyte chemistry",
            "  search: solid-state electrolyte conductivity 2024",
            "  tool-result [tu_2] (error=false): 10 results",
            "write: files/reports/solid_state_batteries.md",
            "final: Report written to files/reports/solid_state_batteries.md",
        ]
    );
    assert!(output.contains("result: success (turns=6, 48.2s, $0.3121)"));
    assert!(matches!(report.output, Some(OutputStatus::Missing(_))));
}

#[tokio::test]
async fn recorded_hello_world_and_sample_inbox_replay() {
    let dir = TempDir::new().unwrap();
    let transport = FixtureTransport::from_path(fixture("hello_world.jsonl")).unwrap();
    let (report, output) = run_to_string(&HelloWorld::new(dir.path()), &transport).await;
    assert!(report.succeeded());
    assert!(
        output.starts_with("session: 8f1c2a (model claude-sonnet-4-5)\nassistant: Hello!")
    );
    assert!(!output.contains("final:"));

    let prompt = InboxSummary::new(fixture("inbox")).prompt().unwrap();
    assert!(prompt.starts_with("My inbox has 3 messages."));
    assert!(
        prompt.contains("Priya Nair <priya@example.com> | Q3 budget review moved to Thursday")
    );
}

#[test]
fn report_dir_with_glob_characters_is_matched_literally() {
    let dir = TempDir::new().unwrap();
    let demo = Research::new("x", dir.path().join("run[1]"));
    fs::create_dir_all(demo.reports_dir()).unwrap();
    fs::write(demo.reports_dir().join("r.md"), "# Report").unwrap();

    let status = demo.expected_output().unwrap().check();

    assert_eq!(
        status,
        OutputStatus::Found(vec![demo.reports_dir().join("r.md")])
    );
}

#[test]
fn malformed_output_pattern_is_reported() {
    let dir = TempDir::new().unwrap();
    let check = OutputCheck::Matching {
        dir: dir.path().to_path_buf(),
        pattern: "[".to_string(),
    };

    let OutputStatus::Missing(description) = check.check() else {
        panic!("expected missing output")
    };
    assert!(description.contains("invalid pattern"));
}

#[tokio::test]
async fn rejected_input_leaves_workspace_untouched() {
    let dir = TempDir::new().unwrap();
    let demo = Spreadsheet::new(dir.path(), "   ", "budget");
    let transport = FixtureTransport::new(vec![result("success", false)]);
    let mut printer = EventPrinter::default();
    let mut out = Vec::new();

    let err = run(&demo, &transport, &mut printer, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, DemoError::InvalidInput(_)));
    assert!(!demo.output_dir().exists());
    assert!(transport.requests().is_empty());
}

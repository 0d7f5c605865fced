//! luma-guide - chat-side guidance hook for the Luma wellness app
//!
//! # Input (via stdin)
//! `stream`: one JSON object per line with fields: text, role (default "user"),
//! at (optional RFC3339 timestamp)
//! `exercises`: one JSON object with fields: messages, recent_mood
//!
//! # Output (via stdout)
//! One JSON object per input line: version, crisis flag (with the hotline
//! reply when set), and at most one suggestion to render under the user's message

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use colored::Colorize;
use luma_guide::catalog::default_catalog_path;
use luma_guide::{
    detect_crisis, detect_moods, personalize, GuidanceCatalog, GuidanceMatcher, GuideError,
    Suggestion, CRISIS_RESPONSE,
};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Longest accepted cooldown (one day)
const MAX_COOLDOWN_SECS: u64 = 86_400;

const OUTPUT_VERSION: &str = "1.0";

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "luma-guide", version, about = "Keyword guidance for the Luma chat")]
struct Cli {
    /// Guidance catalog JSON (default: ~/.luma/guidance.json, else built-in)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Seconds a surfaced topic stays quiet
    #[arg(
        long,
        global = true,
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(0..=MAX_COOLDOWN_SECS)
    )]
    cooldown_secs: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read chat lines from stdin and emit one suggestion payload per line
    Stream,
    /// List the catalog in priority order
    Topics,
    /// Print the suggestion for one topic, ignoring cooldowns
    Trigger { topic: String },
    /// Read recent messages from stdin and print a personalized exercise plan
    Exercises,
}

// ============================================================================
// Input / Output Types
// ============================================================================

/// One chat line from the chat layer
#[derive(Debug, Deserialize)]
struct ChatLine {
    text: String,

    #[serde(default = "default_role")]
    role: String,

    /// When the message was sent
    #[serde(default)]
    at: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

#[derive(Debug, Deserialize)]
struct ExercisesInput {
    #[serde(default)]
    messages: Vec<String>,

    /// Latest 1-5 mood check-in
    #[serde(default)]
    recent_mood: Option<u8>,
}

#[derive(Debug, Serialize)]
struct GuideOutput {
    version: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    crisis: Option<bool>,

    /// Hotline message, only when crisis language was seen
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<Suggestion>,
}

impl GuideOutput {
    fn empty() -> Self {
        Self {
            version: OUTPUT_VERSION,
            crisis: None,
            reply: None,
            suggestion: None,
        }
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Turns message timestamps into monotonic instants.
///
/// The first timestamp seen is pinned to the `Instant` it arrived at; later
/// ones are offset from it. Timestamps earlier than the first clamp to it.
#[derive(Default)]
struct StreamClock {
    anchor: Option<(DateTime<FixedOffset>, Instant)>,
}

impl StreamClock {
    fn now(&mut self, at: Option<DateTime<FixedOffset>>) -> Instant {
        let Some(ts) = at else {
            return Instant::now();
        };
        let (first, base) = *self.anchor.get_or_insert_with(|| (ts, Instant::now()));
        let offset = (ts - first).to_std().unwrap_or(Duration::ZERO);
        base + offset
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    // Initialize tracing if RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let hook_mode = matches!(
        cli.command,
        None | Some(Command::Stream) | Some(Command::Exercises)
    );

    let result = run(cli, io::stdin().lock(), &mut io::stdout().lock());
    if let Err(e) = result {
        error!("Error: {}", e);
        if hook_mode {
            // Output empty response on error so the chat never blocks
            println!(
                "{}",
                serde_json::to_string(&GuideOutput::empty()).unwrap_or_default()
            );
            std::process::exit(0);
        }
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Only the commands that match topics load the catalog
fn run<R: BufRead, W: Write>(cli: Cli, input: R, out: &mut W) -> Result<(), GuideError> {
    match cli.command.unwrap_or(Command::Stream) {
        Command::Stream => {
            let matcher = build_matcher(&cli.catalog, cli.cooldown_secs)?;
            stream(matcher, input, out)
        }
        Command::Topics => {
            let matcher = build_matcher(&cli.catalog, cli.cooldown_secs)?;
            print_topics(matcher.catalog(), out)
        }
        Command::Trigger { topic } => {
            let matcher = build_matcher(&cli.catalog, cli.cooldown_secs)?;
            let output = GuideOutput {
                suggestion: Some(matcher.trigger(&topic)?),
                ..GuideOutput::empty()
            };
            emit(out, &output)
        }
        Command::Exercises => exercises(input, out),
    }
}

/// Write one JSON line
fn emit<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), GuideError> {
    let json = serde_json::to_string(value)?;
    writeln!(out, "{}", json).map_err(GuideError::OutputWrite)
}

fn build_matcher(
    catalog: &Option<PathBuf>,
    cooldown_secs: u64,
) -> Result<GuidanceMatcher, GuideError> {
    let catalog = resolve_catalog(catalog.as_deref())?;
    info!(
        "Loaded {} topics (catalog {})",
        catalog.len(),
        catalog.version()
    );
    Ok(GuidanceMatcher::new(catalog).with_cooldown(Duration::from_secs(cooldown_secs)))
}

/// Explicit path must exist; the default path falls back to the built-in table
fn resolve_catalog(path: Option<&Path>) -> Result<GuidanceCatalog, GuideError> {
    if let Some(path) = path {
        return GuidanceCatalog::load(path);
    }

    let default_path = match default_catalog_path() {
        Ok(p) => p,
        Err(GuideError::NoHomeDir) => {
            warn!("Home directory not found, using built-in catalog");
            return Ok(GuidanceCatalog::builtin());
        }
        Err(e) => return Err(e),
    };

    debug!("Loading catalog from: {:?}", default_path);
    match GuidanceCatalog::load(&default_path) {
        Ok(catalog) => Ok(catalog),
        Err(GuideError::CatalogNotFound(path)) => {
            warn!("Guidance catalog not found at {:?}, using built-in", path);
            Ok(GuidanceCatalog::builtin())
        }
        Err(e) => Err(e),
    }
}

/// One output line per well-formed input line; malformed lines produce none
fn stream<R: BufRead, W: Write>(
    mut matcher: GuidanceMatcher,
    input: R,
    out: &mut W,
) -> Result<(), GuideError> {
    let mut clock = StreamClock::default();

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let chat: ChatLine = match serde_json::from_str(line) {
            Ok(chat) => chat,
            Err(e) => {
                warn!("Skipping malformed line: {}", e);
                continue;
            }
        };

        if chat.role != "user" {
            debug!("Skipping {} message", chat.role);
            emit(out, &GuideOutput::empty())?;
            continue;
        }

        let at = match chat.at.as_deref().map(DateTime::parse_from_rfc3339) {
            Some(Ok(ts)) => Some(ts),
            Some(Err(e)) => {
                warn!("Ignoring bad timestamp {:?}: {}", chat.at, e);
                None
            }
            None => None,
        };
        let now = clock.now(at);

        debug!("Processing message: {}", preview(&chat.text));

        let crisis = detect_crisis(&chat.text);
        if crisis {
            warn!("{}", "Crisis language detected".red().bold());
        }

        let suggestion = matcher.suggest(&chat.text, now);
        if let Some(s) = &suggestion {
            info!("{} {} -> {}", s.icon, s.topic.bold(), s.link.cyan());
        }

        let output = GuideOutput {
            version: OUTPUT_VERSION,
            crisis: Some(crisis),
            reply: crisis.then_some(CRISIS_RESPONSE),
            suggestion,
        };
        emit(out, &output)?;
    }

    out.flush().map_err(GuideError::OutputWrite)
}

fn exercises<R: Read, W: Write>(mut input: R, out: &mut W) -> Result<(), GuideError> {
    let mut input_json = String::new();
    input.read_to_string(&mut input_json)?;

    let input: ExercisesInput = serde_json::from_str(&input_json)?;
    let moods = detect_moods(&input.messages);
    let plan = personalize(&moods, input.recent_mood)?;

    info!(
        "Plan with {} exercises for {} detected moods",
        plan.exercises.len(),
        moods.len()
    );
    emit(out, &plan)
}

fn print_topics<W: Write>(catalog: &GuidanceCatalog, out: &mut W) -> Result<(), GuideError> {
    for (i, topic) in catalog.topics().iter().enumerate() {
        writeln!(
            out,
            "{}. {} {} [{}]",
            i + 1,
            topic.icon,
            topic.id.bold(),
            topic.link.cyan()
        )
        .map_err(GuideError::OutputWrite)?;
        writeln!(out, "   {}", topic.keywords.join(", ").dimmed())
            .map_err(GuideError::OutputWrite)?;
    }
    Ok(())
}

/// First 50 characters, for logs
fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Option<DateTime<FixedOffset>> {
        Some(DateTime::parse_from_rfc3339(s).unwrap())
    }

    #[test]
    fn test_clock_offsets_from_first_timestamp() {
        let mut clock = StreamClock::default();
        let t0 = clock.now(ts("2026-10-17T10:00:00Z"));
        let t1 = clock.now(ts("2026-10-17T10:00:45Z"));
        assert_eq!(t1.duration_since(t0), Duration::from_secs(45));
    }

    #[test]
    fn test_clock_clamps_earlier_timestamps() {
        let mut clock = StreamClock::default();
        let t0 = clock.now(ts("2026-10-17T10:00:00+02:00"));
        let back = clock.now(ts("2026-10-17T09:59:00+02:00"));
        assert_eq!(back, t0);
    }

    #[test]
    fn test_timestamps_drive_cooldown() {
        let mut clock = StreamClock::default();
        let mut matcher = GuidanceMatcher::new(GuidanceCatalog::builtin());

        let first = matcher.suggest("yoga?", clock.now(ts("2026-10-17T10:00:00Z")));
        let again = matcher.suggest("yoga?", clock.now(ts("2026-10-17T10:00:30Z")));
        let later = matcher.suggest("yoga?", clock.now(ts("2026-10-17T10:01:01Z")));
        assert!(first.is_some());
        assert!(again.is_none());
        assert!(later.is_some());
    }

    #[test]
    fn test_chat_line_defaults() {
        let line: ChatLine = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(line.role, "user");
        assert!(line.at.is_none());
    }

    #[test]
    fn test_output_shape() {
        let empty = serde_json::to_string(&GuideOutput::empty()).unwrap();
        assert_eq!(empty, r#"{"version":"1.0"}"#);

        let output = GuideOutput {
            crisis: Some(false),
            ..GuideOutput::empty()
        };
        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"version":"1.0","crisis":false}"#
        );
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "🧘".repeat(60);
        assert_eq!(preview(&text).chars().count(), 50);
    }

    #[test]
    fn test_resolve_explicit_missing_catalog() {
        let path = std::env::temp_dir().join("luma-guide-missing-catalog.json");
        assert!(matches!(
            resolve_catalog(Some(path.as_path())),
            Err(GuideError::CatalogNotFound(_))
        ));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from(["luma-guide", "--cooldown-secs", "5", "trigger", "tools"]);
        assert_eq!(cli.cooldown_secs, 5);
        assert!(matches!(cli.command, Some(Command::Trigger { topic }) if topic == "tools"));

        assert!(Cli::try_parse_from(["luma-guide", "--cooldown-secs", "100000"]).is_err());
    }

    fn run_stream(transcript: &str) -> Vec<serde_json::Value> {
        let matcher = GuidanceMatcher::new(GuidanceCatalog::builtin());
        let mut out = Vec::new();
        stream(matcher, transcript.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_stream_mixed_transcript() {
        let transcript = [
            r#"{"text": "I need help with breathing"}"#,
            r#"{"text": "Let's try a breathing exercise", "role": "assistant"}"#,
            "this is not json",
            "",
            r#"{"text": "some days I want to die"}"#,
        ]
        .join("\n");

        let lines = run_stream(&transcript);
        assert_eq!(
            lines,
            vec![
                serde_json::json!({
                    "version": "1.0",
                    "crisis": false,
                    "suggestion": {
                        "topic": "exercises",
                        "message": "💡 Pro Tip: Check out the Exercises section for guided breathing exercises, meditation, and wellness routines tailored to your needs.",
                        "icon": "🧘",
                        "link": "exercises.html",
                        "label": "→ Go to Exercises"
                    }
                }),
                serde_json::json!({"version": "1.0"}),
                serde_json::json!({
                    "version": "1.0",
                    "crisis": true,
                    "reply": CRISIS_RESPONSE
                }),
            ]
        );
    }

    #[test]
    fn test_stream_cooldown_across_lines() {
        let transcript = [
            r#"{"text": "yoga?", "at": "2026-10-17T10:00:00Z"}"#,
            r#"{"text": "more yoga", "at": "2026-10-17T10:00:20Z"}"#,
            r#"{"text": "yoga again", "at": "2026-10-17T10:01:30Z"}"#,
        ]
        .join("\n");

        let lines = run_stream(&transcript);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["suggestion"]["topic"], "exercises");
        assert!(lines[1].get("suggestion").is_none());
        assert_eq!(lines[1]["crisis"], false);
        assert_eq!(lines[2]["suggestion"]["topic"], "exercises");
    }

    #[test]
    fn test_exercises_ignore_broken_catalog() {
        let path = std::env::temp_dir().join(format!("luma-guide-broken-{}.json", std::process::id()));
        std::fs::write(&path, "{ not a catalog").unwrap();
        let path_arg = path.to_str().unwrap().to_string();

        let cli = Cli::parse_from(["luma-guide", "--catalog", path_arg.as_str(), "exercises"]);
        let mut out = Vec::new();
        let input = r#"{"messages": ["so worried lately"], "recent_mood": 4}"#;
        run(cli, input.as_bytes(), &mut out).unwrap();

        let plan: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(plan["detected_moods"][0], "anxiety");

        // The same catalog still fails commands that need it
        let cli = Cli::parse_from(["luma-guide", "--catalog", path_arg.as_str(), "topics"]);
        let result = run(cli, "".as_bytes(), &mut Vec::<u8>::new());
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(GuideError::CatalogParse(_))));
    }

    #[test]
    fn test_trigger_through_run() {
        let path = std::env::temp_dir().join(format!("luma-guide-trigger-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"topics": [{"id": "sleep", "keywords": ["insomnia"], "message": "Log it", "link": "health.html"}]}"#,
        )
        .unwrap();
        let path_arg = path.to_str().unwrap().to_string();

        let cli = Cli::parse_from(["luma-guide", "--catalog", path_arg.as_str(), "trigger", "sleep"]);
        let mut out = Vec::new();
        let result = run(cli, "".as_bytes(), &mut out);
        std::fs::remove_file(&path).unwrap();
        result.unwrap();

        let line: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(line["suggestion"]["label"], "→ Go to Health");
        assert!(line.get("crisis").is_none());
    }
}

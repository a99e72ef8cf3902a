//! Purpose: `tranutil` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Command results are single-line JSON on stdout.
//! Invariants: Errors are JSON on stderr unless stderr is a terminal.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use tranutil::api::{Error, ErrorKind, error_causes, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `tranutil --help`."));
            }
        },
    };

    init_tracing();

    command_dispatch::dispatch_command(cli.command)
        .map(|()| RunOutcome::ok())
        .map_err(add_transport_hint)
}

#[derive(Parser)]
#[command(
    name = "tranutil",
    version,
    about = "Deliver transcription results as JSON and decode 16-bit PCM buffers",
    long_about = None,
    after_help = r#"EXAMPLES
  $ tranutil post http://localhost:8080/transcripts '{"text": "hello"}'
  $ tranutil post http://localhost:8080/transcripts --file result.json --timeout 5s
  $ tranutil samples capture.raw --strict

Set RUST_LOG=debug to trace request lifecycle on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "POST a JSON document to an address")]
    Post {
        #[arg(help = "Target address (http:// or https://)", value_hint = ValueHint::Url)]
        url: String,
        #[arg(help = "Inline JSON document; read from --file or stdin when omitted")]
        data: Option<String>,
        #[arg(long, help = "Read the JSON document from a file", value_hint = ValueHint::FilePath, conflicts_with = "data")]
        file: Option<PathBuf>,
        #[arg(long, help = "Overall request timeout (e.g. 500ms, 30s)", conflicts_with = "no_timeout")]
        timeout: Option<String>,
        #[arg(long, help = "Connection timeout (e.g. 500ms, 10s)")]
        connect_timeout: Option<String>,
        #[arg(long, help = "Wait for the response indefinitely")]
        no_timeout: bool,
        #[arg(long, help = "Log failures instead of failing the command")]
        best_effort: bool,
    },
    #[command(about = "Decode raw 16-bit little-endian PCM into samples")]
    Samples {
        #[arg(help = "Raw PCM file; reads stdin when omitted", value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        #[arg(long, help = "Fail on an odd byte count instead of dropping the last byte")]
        strict: bool,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn add_transport_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Transport => {
            err.with_hint("Could not reach the address. Check the host, port, and network.")
        }
        ErrorKind::Timeout => err.with_hint(
            "The endpoint did not answer in time. Raise --timeout or check the service.",
        ),
        ErrorKind::HttpStatus => {
            err.with_hint("The endpoint rejected the document. Check its logs for details.")
        }
        _ => err,
    }
}

fn parse_duration(input: &str) -> Result<Duration, Error> {
    let invalid = || {
        Error::new(ErrorKind::Usage)
            .with_message("invalid duration")
            .with_hint("Use a number plus ms|s|m|h (e.g. 10s).")
    };
    let trimmed = input.trim();
    let split = trimmed.char_indices().find(|(_, ch)| !ch.is_ascii_digit());
    let (num_str, unit) = match split {
        Some((idx, _)) => trimmed.split_at(idx),
        None => return Err(invalid()),
    };
    if num_str.is_empty() {
        return Err(invalid());
    }
    let value: u64 = num_str.parse().map_err(|_| invalid())?;
    let millis = match unit {
        "ms" => value,
        "s" => value.saturating_mul(1_000),
        "m" => value.saturating_mul(60_000),
        "h" => value.saturating_mul(3_600_000),
        _ => return Err(invalid()),
    };
    Ok(Duration::from_millis(millis))
}

/// Writes `err` to stderr: readable lines on a terminal, one JSON object otherwise.
fn emit_error(err: &Error) {
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?}", err.kind()));
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err, &message));
        return;
    }
    match serde_json::to_string(&error_json(err, &message)) {
        Ok(line) => eprintln!("{line}"),
        Err(_) => eprintln!("error: {message}"),
    }
}

fn error_json(err: &Error, message: &str) -> Value {
    let mut fields = Map::new();
    fields.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    fields.insert("message".to_string(), json!(message));
    let optional = [
        ("hint", err.hint().map(|hint| json!(hint))),
        ("url", err.url().map(|url| json!(url))),
        ("status", err.status().map(|status| json!(status))),
        ("status_text", err.status_text().map(|text| json!(text))),
        ("len", err.input_len().map(|len| json!(len))),
    ];
    for (key, value) in optional
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
    {
        fields.insert(key.to_string(), value);
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        fields.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": fields })
}

fn error_text(err: &Error, message: &str) -> String {
    let mut lines = vec![format!("error: {message}")];
    match (err.status(), err.status_text()) {
        (Some(status), Some(text)) => lines.push(format!("status: {status} {text}")),
        (Some(status), None) => lines.push(format!("status: {status}")),
        _ => {}
    }
    lines.extend(err.url().map(|url| format!("url: {url}")));
    lines.extend(
        error_causes(err)
            .into_iter()
            .map(|cause| format!("caused by: {cause}")),
    );
    lines.extend(err.hint().map(|hint| format!("hint: {hint}")));
    lines.join("\n")
}

/// First non-empty line of clap's rendered error, without its `error:` label.
fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

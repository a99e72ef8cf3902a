//! Purpose: Execute parsed CLI commands against the library API.
//! Exports: `dispatch_command`.
//! Role: Reads command inputs, calls the notifier or converter, prints JSON results.
//! Invariants: Each command writes exactly one JSON line to stdout on success.
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{Value, json};
use tranutil::api::{
    BYTES_PER_SAMPLE, Error, ErrorKind, JsonNotifier, NotifierConfig, convert, convert_strict,
};

use super::{Command, parse_duration};

pub(super) fn dispatch_command(command: Command) -> Result<(), Error> {
    match command {
        Command::Post {
            url,
            data,
            file,
            timeout,
            connect_timeout,
            no_timeout,
            best_effort,
        } => {
            let mut config = NotifierConfig::new();
            if no_timeout {
                config = config.with_timeout(None);
            } else if let Some(timeout) = timeout.as_deref() {
                config = config.with_timeout(Some(parse_duration(timeout)?));
            }
            if let Some(timeout) = connect_timeout.as_deref() {
                config = config.with_connect_timeout(Some(parse_duration(timeout)?));
            }

            let text = match (data, file) {
                (Some(data), _) => data,
                (None, Some(path)) => read_text_file(&path)?,
                (None, None) => read_stdin_text()?,
            };
            let payload = parse_payload(&text)?;

            let notifier = JsonNotifier::with_config(config);
            if best_effort {
                notifier.post(&url, &payload);
                return emit_json(&json!({ "posted": { "url": url, "best_effort": true } }));
            }
            let delivery = notifier.send(&url, &payload)?;
            emit_json(&json!({ "posted": delivery }))
        }
        Command::Samples { file, strict } => {
            let bytes = match file {
                Some(path) => std::fs::read(&path).map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message(format!("failed to read {}", path.display()))
                        .with_source(err)
                })?,
                None => read_stdin_bytes()?,
            };
            let samples = if strict {
                convert_strict(&bytes)?
            } else {
                convert(&bytes)
            };
            emit_json(&samples_json(bytes.len(), &samples))
        }
    }
}

fn samples_json(byte_len: usize, samples: &[i16]) -> Value {
    json!({
        "count": samples.len(),
        "dropped_bytes": byte_len % BYTES_PER_SAMPLE,
        "samples": samples,
    })
}

fn parse_payload(text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("payload is not valid json")
            .with_hint("Pass a single JSON document, e.g. '{\"text\": \"hello\"}'.")
            .with_source(err)
    })
}

fn read_text_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to read {}", path.display()))
            .with_source(err)
    })
}

fn read_stdin_text() -> Result<String, Error> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    Ok(text)
}

fn read_stdin_bytes() -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    Ok(bytes)
}

fn emit_json(value: &Value) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode output json")
                .with_source(err)
        })
        .and_then(|()| {
            writeln!(stdout).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to write stdout")
                    .with_source(err)
            })
        })
}

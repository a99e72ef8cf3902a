//! Purpose: Blocking HTTP client that posts JSON documents to a caller-supplied address.
//! Exports: `JsonNotifier`, `NotifierConfig`, `Delivery`, `post_json`.
//! Role: Delivers transcription results to downstream services.
//! Invariants: Exactly one POST per call; no retry, no pooled connection reuse.
//! Invariants: Only HTTP 200 counts as delivered; every other final status is `HttpStatus`.
//! Invariants: `post` never fails toward the caller; `send` never logs.
#![allow(clippy::result_large_err)]

use super::delivery_log::{DeliveryLog, TracingLog};
use crate::core::error::{Error, ErrorKind};
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

type ApiResult<T> = Result<T, Error>;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Overall deadline for a request; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: String,
    pub max_redirects: u32,
}

impl NotifierConfig {
    pub fn new() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            user_agent: format!("tranutil/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub url: String,
    pub status: u16,
}

#[derive(Clone)]
pub struct JsonNotifier {
    agent: ureq::Agent,
    config: NotifierConfig,
    log: Arc<dyn DeliveryLog>,
}

impl JsonNotifier {
    pub fn new() -> Self {
        Self::with_config(NotifierConfig::default())
    }

    pub fn with_config(config: NotifierConfig) -> Self {
        Self {
            agent: build_agent(&config),
            config,
            log: Arc::new(TracingLog),
        }
    }

    pub fn with_log(mut self, log: Arc<dyn DeliveryLog>) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Posts `payload` and reports the outcome to the caller.
    pub fn send(&self, address: &str, payload: &Value) -> ApiResult<Delivery> {
        let url = parse_address(address)?;
        let body = serde_json::to_string(payload).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode request json")
                .with_url(url.as_str())
                .with_source(err)
        })?;

        tracing::debug!(url = %url, bytes = body.len(), "posting json");
        let response = self
            .agent
            .request("POST", url.as_str())
            .set("Content-Type", "application/json")
            .send_string(&body);

        match response {
            Ok(resp) if resp.status() == 200 => {
                tracing::debug!(url = %url, status = 200, "json delivered");
                Ok(Delivery {
                    url: url.to_string(),
                    status: 200,
                })
            }
            Ok(resp) => Err(status_error(&url, resp.status(), resp.status_text())),
            Err(ureq::Error::Status(code, resp)) => {
                Err(status_error(&url, code, resp.status_text()))
            }
            Err(ureq::Error::Transport(err)) => Err(transport_error(&url, err)),
        }
    }

    /// Posts `payload`, logging any failure through the delivery log instead of returning it.
    pub fn post(&self, address: &str, payload: &Value) {
        if let Err(err) = self.send(address, payload) {
            self.log.delivery_failed(address, &err);
        }
    }
}

impl Default for JsonNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot best-effort post with the default configuration.
pub fn post_json(address: &str, payload: &Value) {
    JsonNotifier::new().post(address, payload);
}

fn build_agent(config: &NotifierConfig) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new()
        .max_idle_connections(0)
        .redirects(config.max_redirects)
        .user_agent(&config.user_agent);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(timeout) = config.connect_timeout {
        builder = builder.timeout_connect(timeout);
    }
    builder.build()
}

fn parse_address(address: &str) -> ApiResult<Url> {
    let url = Url::parse(address.trim()).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid address")
            .with_url(address)
            .with_hint("Use an absolute http:// or https:// URL.")
            .with_source(err)
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unsupported address scheme: {other}"))
                .with_url(address)
                .with_hint("Use an absolute http:// or https:// URL."));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("address has no host")
            .with_url(address));
    }
    Ok(url)
}

fn status_error(url: &Url, status: u16, status_text: &str) -> Error {
    Error::new(ErrorKind::HttpStatus)
        .with_message("json post rejected")
        .with_status(status, status_text)
        .with_url(url.as_str())
}

fn transport_error(url: &Url, err: ureq::Transport) -> Error {
    let (kind, message) = if is_timeout(&err) {
        (ErrorKind::Timeout, "request timed out")
    } else {
        match err.kind() {
            ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                (ErrorKind::Usage, "invalid address")
            }
            ureq::ErrorKind::Dns => (ErrorKind::Transport, "dns lookup failed"),
            ureq::ErrorKind::ConnectionFailed => (ErrorKind::Transport, "connection failed"),
            _ => (ErrorKind::Transport, "request failed"),
        }
    };
    Error::new(kind)
        .with_message(message)
        .with_url(url.as_str())
        .with_source(err)
}

fn is_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        current = err.source();
    }
    false
}

//! Purpose: Injectable sink for failed JSON deliveries.
//! Exports: `DeliveryLog`, `TracingLog`, `error_causes`.
//! Role: Lets best-effort posts report failures without a process-wide logger handle.
//! Invariants: A failed best-effort post produces exactly one `delivery_failed` call.
use crate::core::error::Error;
use std::error::Error as StdError;

pub trait DeliveryLog: Send + Sync {
    fn delivery_failed(&self, address: &str, err: &Error);
}

/// Reports failures as one `tracing` error event with `address`, `kind`, and `status` fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl DeliveryLog for TracingLog {
    fn delivery_failed(&self, address: &str, err: &Error) {
        match err.status() {
            Some(status) => {
                let status_text = err.status_text().unwrap_or_default();
                tracing::error!(
                    address,
                    kind = ?err.kind(),
                    status,
                    "error for json post received: {status} ({status_text})"
                );
            }
            None => {
                let causes = error_causes(err).join(": ");
                tracing::error!(
                    address,
                    kind = ?err.kind(),
                    causes = %causes,
                    "error posting json: {err}"
                );
            }
        }
    }
}

/// Messages of every error below `err` in its source chain.
pub fn error_causes(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

#[cfg(test)]
mod tests {
    use super::{DeliveryLog, TracingLog, error_causes};
    use crate::core::error::{Error, ErrorKind};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl CapturedOutput {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap_or_else(|poison| poison.into_inner());
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedOutput {
        type Writer = CapturedOutput;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn log_with_capture(address: &str, err: &Error) -> Vec<String> {
        let output = CapturedOutput::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(output.clone())
            .with_ansi(false)
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            TracingLog.delivery_failed(address, err);
        });
        output.lines()
    }

    #[test]
    fn tracing_log_status_record_names_code_and_text() {
        let err = Error::new(ErrorKind::HttpStatus)
            .with_message("json post rejected")
            .with_status(500, "Internal Server Error");
        let lines = log_with_capture("http://127.0.0.1:9/hook", &err);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert!(line.contains("ERROR"));
        assert!(line.contains("500 (Internal Server Error)"));
        assert!(line.contains("address="));
        assert!(line.contains("http://127.0.0.1:9/hook"));
        assert!(line.contains("kind=HttpStatus"));
        assert!(line.contains("status=500"));
    }

    #[test]
    fn tracing_log_transport_record_carries_causes() {
        let err = Error::new(ErrorKind::Transport)
            .with_message("connection failed")
            .with_source(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        let lines = log_with_capture("http://127.0.0.1:9/hook", &err);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("error posting json"));
        assert!(lines[0].contains("kind=Transport"));
        assert!(lines[0].contains("refused"));
        assert!(!lines[0].contains("status="));
    }

    #[test]
    fn error_causes_walks_source_chain() {
        let err = Error::new(ErrorKind::Transport)
            .with_message("request failed")
            .with_source(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(error_causes(&err), vec!["refused".to_string()]);
    }

    #[test]
    fn error_causes_empty_without_source() {
        let err = Error::new(ErrorKind::HttpStatus).with_status(500, "Internal Server Error");
        assert!(error_causes(&err).is_empty());
    }
}

/*!
 * Operation Tracing
 * Structured tracing for root operations using the tracing crate
 *
 * Features:
 * - Per-operation trace ID for correlating the events of one call
 * - JSON-formatted logs for structured parsing
 * - Result and error recorded on the operation span
 */

use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

pub const ENV_TRACE_JSON: &str = "DIRROOT_TRACE_JSON";

/// Operations slower than this are logged at warn
const SLOW_OP_MILLIS: u128 = 100;

/// Initialize structured tracing for a binary or test embedding the crate
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - DIRROOT_TRACE_JSON: Enable JSON output (default: false)
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        let installed = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok();
        if installed {
            info!("Structured tracing initialized with JSON output");
        }
    } else {
        let installed = registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok();
        if installed {
            info!("Structured tracing initialized");
        }
    }
}

/// Generate a unique trace ID for one operation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one public root operation
pub struct OpSpan {
    span: Span,
    start: Instant,
    op: &'static str,
    trace_id: String,
}

impl OpSpan {
    pub fn new(op: &'static str, root: &str, path: &dyn std::fmt::Debug) -> Self {
        let trace_id = generate_trace_id();
        let span = span!(
            Level::DEBUG,
            "root_op",
            trace_id = %trace_id,
            op = op,
            root = root,
            path = ?path,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            op,
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Run `f` inside the span and record how it ended
    pub fn run<T, E, F>(self, f: F) -> Result<T, E>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let result = {
            let _entered = self.span.enter();
            f()
        };
        match &result {
            Ok(_) => {
                self.span.record("result", "success");
            }
            Err(err) => {
                self.span.record("result", "error");
                self.span.record("error", tracing::field::display(err));
            }
        }
        result
    }
}

impl Drop for OpSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_OP_MILLIS {
            warn!(
                trace_id = %self.trace_id,
                op = self.op,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow root operation"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                op = self.op,
                duration_us = duration.as_micros() as u64,
                "root operation completed"
            );
        }
    }
}

/// Wrap one operation in an [`OpSpan`]
#[inline]
pub(crate) fn in_op_span<T, E, F>(op: &'static str, root: &str, path: &dyn std::fmt::Debug, f: F) -> Result<T, E>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    OpSpan::new(op, root, path).run(f)
}

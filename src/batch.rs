//! Batch runner: newline-delimited JSON requests in, one JSON result line per
//! item out, in completion order.
//!
//! Output lines:
//! ```json
//! {"line":1,"ok":{...}}
//! {"line":2,"error":{"status":503,"payload":{...},"message":"..."}}
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

use crate::client::ApiError;
use crate::pool::AdaptiveWorkerPool;
use crate::processor::WorkProcessor;

/// Outcome counts of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Lines handed to the pool.
    pub submitted: u64,
    /// Items that produced a result.
    pub succeeded: u64,
    /// Items whose processor call failed or panicked.
    pub failed: u64,
    /// Non-blank lines that were not valid JSON.
    pub rejected: u64,
}

impl BatchSummary {
    /// True when every line produced a result.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.rejected == 0
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Report for a successful item.
pub fn ok_report(line: u64, value: Value) -> Value {
    json!({ "line": line, "ok": value })
}

/// Report for an item the API rejected.
pub fn error_report(line: u64, error: &ApiError) -> Value {
    json!({ "line": line, "error": error.to_json() })
}

fn panic_report(line: u64) -> Value {
    json!({
        "line": line,
        "error": { "status": null, "payload": null, "message": "processor panicked" },
    })
}

fn invalid_json_report(line: u64, text: &str, error: &serde_json::Error) -> Value {
    json!({
        "line": line,
        "error": {
            "status": null,
            "payload": text,
            "message": format!("invalid JSON: {}", error),
        },
    })
}

/// Submit every line of `input` to `pool` and write one report per line to
/// `output` as items complete.
///
/// Blank lines are skipped. Lines that are not JSON are reported without
/// being submitted. Once `shutdown` resolves no further input is read, but
/// everything already submitted is drained.
pub async fn run<P, R, W, S>(
    pool: &AdaptiveWorkerPool<P>,
    input: R,
    output: &mut W,
    shutdown: S,
) -> std::io::Result<BatchSummary>
where
    P: WorkProcessor<Input = Value, Output = Value, Error = ApiError>,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future,
{
    let mut lines = input.lines();
    let mut in_flight = FuturesUnordered::new();
    tokio::pin!(shutdown);

    let mut summary = BatchSummary::default();
    let mut reading = true;
    let mut line_no: u64 = 0;

    loop {
        tokio::select! {
            next = lines.next_line(), if reading => match next? {
                Some(text) => {
                    line_no += 1;
                    if !text.trim().is_empty() {
                        match serde_json::from_str::<Value>(&text) {
                            Ok(request) => {
                                let submission = pool.submit(request);
                                let line = line_no;
                                summary.submitted += 1;
                                in_flight.push(async move {
                                    (line, AssertUnwindSafe(submission).catch_unwind().await)
                                });
                            }
                            Err(e) => {
                                summary.rejected += 1;
                                write_line(output, &invalid_json_report(line_no, &text, &e)).await?;
                            }
                        }
                    }
                }
                None => reading = false,
            },
            Some((line, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                let report = match outcome {
                    Ok(Ok(value)) => {
                        summary.succeeded += 1;
                        ok_report(line, value)
                    }
                    Ok(Err(e)) => {
                        summary.failed += 1;
                        error_report(line, &e)
                    }
                    Err(_) => {
                        summary.failed += 1;
                        panic_report(line)
                    }
                };
                write_line(output, &report).await?;
            }
            _ = &mut shutdown, if reading => {
                warn!(in_flight = in_flight.len(), "Interrupted, draining submitted items");
                reading = false;
            }
            else => break,
        }
    }

    Ok(summary)
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, value: &Value) -> std::io::Result<()> {
    let mut line = value.to_string();
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await
}

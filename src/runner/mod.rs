pub mod ndjson;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::reporter::{JunitReporter, handle_event};

pub use ndjson::{RunnerEvent, decode_line};

/// What a drained event stream produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub events: usize,
    pub reports: usize,
}

/// Feed an NDJSON runner event stream into `reporter` until EOF, then wait
/// for every report write to finish.
pub async fn stream_events<R>(reader: R, reporter: &mut JunitReporter) -> Result<StreamSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = StreamSummary::default();

    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read runner event stream")?
    {
        if line.trim().is_empty() {
            continue;
        }
        let Some(event) = decode_line(line.trim_end()) else {
            continue;
        };
        summary.events += 1;
        if handle_event(reporter, event).is_some() {
            summary.reports += 1;
        }
    }

    tracing::debug!(
        "event stream closed after {} events, waiting for {} pending writes",
        summary.events,
        reporter.shutdown().pending()
    );
    reporter.wait_for_writes().await;
    Ok(summary)
}

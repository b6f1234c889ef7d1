//! Parsing and aggregation of combined-format access logs with a trailing
//! request duration.
//!
//! [analyze] reads a log line by line, feeds every matching line into a
//! [LogAggregator] and returns the resulting [Report]. Lines that don't
//! match the format are skipped.

mod aggregator;
mod line;
mod report;
#[cfg(test)]
mod test_utils;

pub use crate::aggregator::{LogAggregator, TOP_N};
pub use crate::line::{LineError, LogLine};
pub use crate::report::{LongestRequest, Report};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, instrument};

#[instrument(skip_all)]
pub async fn analyze<R>(reader: R) -> anyhow::Result<Report>
where
    R: AsyncBufRead + Unpin,
{
    let mut aggregator = LogAggregator::new();
    let mut num_lines = 0u64;
    let mut num_skipped = 0u64;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        num_lines += 1;

        match LogLine::parse(&line) {
            Ok(line) => aggregator.accept(line),
            Err(error) => {
                debug!(line_number = num_lines, "Skipping line: {error}");
                num_skipped += 1;
            }
        }
    }

    debug!(num_lines, num_skipped, "Finished reading log");

    Ok(aggregator.finalize())
}

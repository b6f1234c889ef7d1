use crate::line::LogLine;
use crate::report::{LongestRequest, Report};
use indexmap::IndexMap;
use tracing::debug;

/// Number of entries kept in the `top_*` lists of a [Report].
pub const TOP_N: usize = 3;

/// Accumulates statistics for the lines of a single log file.
///
/// Calling [LogAggregator::finalize] consumes the aggregator, so no more
/// lines can be added once the [Report] has been produced.
#[derive(Debug, Clone, Default)]
pub struct LogAggregator {
    total_requests: u64,
    method_counts: IndexMap<String, u64>,
    ip_counts: IndexMap<String, u64>,
    /// At most [TOP_N] entries, ordered by descending duration. Entries with
    /// equal durations stay in the order they were added.
    longest: Vec<LongestRequest>,
}

impl LogAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, line: LogLine) {
        self.total_requests += 1;

        if let Some(method) = line.method() {
            *self.method_counts.entry(method.to_string()).or_default() += 1;
        }

        *self.ip_counts.entry(line.client_ip.clone()).or_default() += 1;

        self.offer_longest(line);
    }

    /// Inserts the line into the longest requests list, unless at least
    /// [TOP_N] earlier lines have a duration that is greater or equal.
    ///
    /// Durations are compared as strings, so `"9.0"` ranks above `"10.0"`.
    fn offer_longest(&mut self, line: LogLine) {
        let position = self
            .longest
            .partition_point(|entry| entry.duration >= line.duration);

        if position >= TOP_N {
            return;
        }

        let method = line.method().map(str::to_string);
        let entry = LongestRequest {
            method,
            url: line.request,
            ip: line.client_ip,
            duration: line.duration,
            time: line.time,
        };

        self.longest.insert(position, entry);
        self.longest.truncate(TOP_N);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn method_counts(&self) -> &IndexMap<String, u64> {
        &self.method_counts
    }

    pub fn ip_counts(&self) -> &IndexMap<String, u64> {
        &self.ip_counts
    }

    pub fn finalize(self) -> Report {
        debug!(
            total_requests = self.total_requests,
            num_methods = self.method_counts.len(),
            num_ips = self.ip_counts.len(),
            "Finalizing report"
        );

        let mut top_ips = self.ip_counts.into_iter().collect::<Vec<_>>();
        // `sort_by` is stable, so ties keep their first-seen order.
        top_ips.sort_by(|(_, a), (_, b)| b.cmp(a));
        top_ips.truncate(TOP_N);

        Report {
            total_requests: self.total_requests,
            method_count: self.method_counts,
            top_ips,
            top_longest_requests: self.longest,
        }
    }
}

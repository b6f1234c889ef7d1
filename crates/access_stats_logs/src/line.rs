//! # Access log line parsing
//!
//! Lines follow a combined-log-like format with a trailing request duration:
//!
//! ```text
//! <ip> <ident> <user> [<time>] "<request>" <status> <size> "<referer>" "<user_agent>" <duration>
//! ```
//!
//! Only the time field is interpreted. Every other field is kept verbatim,
//! so malformed IPs, status codes or sizes never cause a line to be rejected.

use chrono::{DateTime, FixedOffset, Timelike};
use regex::Regex;
use std::sync::LazyLock;

/// Format of the bracketed time field, e.g. `10/Oct/2023:13:55:36 +0000`.
const TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^(?P<ip>.*?) .*? .*? \[(?P<time>[^\]]+)\] "(?P<request>.*? HTTP/.*)?" "#,
        r#"(?P<status>.*?) (?P<size>.*?) "(?P<referer>.*?)" "(?P<user_agent>.*?)" (?P<duration>.*)"#,
    ))
    .unwrap()
});

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("Line does not match the access log format")]
    GrammarMismatch,
    #[error("Invalid timestamp {time:?}: {source}")]
    InvalidTimestamp {
        time: String,
        source: chrono::ParseError,
    },
    #[error("Invalid timestamp {time:?}: {reason}")]
    UnsupportedTimestamp { time: String, reason: &'static str },
}

/// A single successfully parsed access log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub client_ip: String,
    pub time: DateTime<FixedOffset>,
    /// The quoted request field, if it has the `METHOD PATH HTTP/version` shape.
    pub request: Option<String>,
    pub status: String,
    pub size: String,
    pub referer: String,
    pub user_agent: String,
    /// Raw trailing token. Compared as text, never as a number.
    pub duration: String,
}

impl LogLine {
    /// Parses a single log line, without its line terminator.
    ///
    /// Either the whole line matches, including a valid timestamp, or an
    /// error is returned. Fields are never partially populated.
    pub fn parse(line: &str) -> Result<Self, LineError> {
        let captures = LINE_REGEX
            .captures(line)
            .ok_or(LineError::GrammarMismatch)?;

        // All groups except `request` are mandatory in the pattern.
        let field = |name: &str| captures.name(name).map_or("", |m| m.as_str());

        let time = parse_time(field("time"))?;

        Ok(Self {
            client_ip: field("ip").to_string(),
            time,
            request: captures.name("request").map(|m| m.as_str().to_string()),
            status: field("status").to_string(),
            size: field("size").to_string(),
            referer: field("referer").to_string(),
            user_agent: field("user_agent").to_string(),
            duration: field("duration").to_string(),
        })
    }

    /// Same as [LogLine::parse], discarding the reason for a mismatch.
    pub fn parse_opt(line: &str) -> Option<Self> {
        Self::parse(line).ok()
    }

    /// Returns the HTTP method, i.e. the text before the first space of the
    /// request field.
    ///
    /// Returns `None` if there is no request field or if it starts with a
    /// space.
    pub fn method(&self) -> Option<&str> {
        self.request
            .as_deref()
            .and_then(|request| request.split(' ').next())
            .filter(|method| !method.is_empty())
    }
}

/// Parses the bracketed time field.
///
/// `chrono` skips surrounding whitespace and accepts leap seconds, both of
/// which must reject the line.
fn parse_time(time: &str) -> Result<DateTime<FixedOffset>, LineError> {
    let unsupported = |reason| LineError::UnsupportedTimestamp {
        time: time.to_string(),
        reason,
    };

    if time.trim() != time {
        return Err(unsupported("surrounding whitespace"));
    }

    let parsed = DateTime::parse_from_str(time, TIME_FORMAT).map_err(|source| {
        LineError::InvalidTimestamp {
            time: time.to_string(),
            source,
        }
    })?;

    if parsed.nanosecond() >= 1_000_000_000 {
        return Err(unsupported("leap second"));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_matches, assert_none, assert_ok, assert_some_eq};
    use insta::assert_debug_snapshot;

    const BASIC: &str = r#"192.168.1.1 - - [10/Oct/2023:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 612 "-" "Mozilla/5.0" 0.123"#;

    /// Renders the captured fields back into the line template.
    fn render(line: &LogLine, ident: &str, user: &str, time: &str) -> String {
        format!(
            r#"{} {ident} {user} [{time}] "{}" {} {} "{}" "{}" {}"#,
            line.client_ip,
            line.request.as_deref().unwrap_or_default(),
            line.status,
            line.size,
            line.referer,
            line.user_agent,
            line.duration,
        )
    }

    #[test]
    fn test_basic() {
        let line = assert_ok!(LogLine::parse(BASIC));
        assert_debug_snapshot!(line, @r#"
        LogLine {
            client_ip: "192.168.1.1",
            time: 2023-10-10T13:55:36+00:00,
            request: Some(
                "GET /index.html HTTP/1.1",
            ),
            status: "200",
            size: "612",
            referer: "-",
            user_agent: "Mozilla/5.0",
            duration: "0.123",
        }
        "#);
        assert_some_eq!(line.method(), "GET");
    }

    #[test]
    fn test_round_trip() {
        let lines = [
            (BASIC, "-", "-", "10/Oct/2023:13:55:36 +0000"),
            (
                r#"10.0.0.7 ident bob [01/Jan/2024:00:00:00 -0500] "POST /api/v1/items?id=3 HTTP/2.0" 201 0 "https://example.com/" "curl/8.4.0" 12.5"#,
                "ident",
                "bob",
                "01/Jan/2024:00:00:00 -0500",
            ),
            (
                r#"::1 - - [29/Feb/2024:23:59:59 +0530] "DELETE / HTTP/1.0" - - "" "" 0"#,
                "-",
                "-",
                "29/Feb/2024:23:59:59 +0530",
            ),
        ];

        for (input, ident, user, time) in lines {
            let line = assert_ok!(LogLine::parse(input));
            assert_eq!(render(&line, ident, user, time), input);
        }
    }

    #[test]
    fn test_timezone_offset() {
        let input = r#"1.2.3.4 - - [05/Mar/2024:08:09:10 -0700] "GET / HTTP/1.1" 200 1 "-" "-" 1"#;
        let line = assert_ok!(LogLine::parse(input));
        assert_eq!(line.time.to_rfc3339(), "2024-03-05T08:09:10-07:00");
        assert_eq!(line.time.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_opaque_tokens() {
        let input = r#"not-an-ip - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" abc 12kb "-" "-" slow"#;
        let line = assert_ok!(LogLine::parse(input));
        assert_eq!(line.client_ip, "not-an-ip");
        assert_eq!(line.status, "abc");
        assert_eq!(line.size, "12kb");
        assert_eq!(line.duration, "slow");
    }

    #[test]
    fn test_request_without_http_version() {
        // An empty request field is accepted, but there is no request.
        let input = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "" 400 0 "-" "-" 0.001"#;
        let line = assert_ok!(LogLine::parse(input));
        assert_none!(line.request.as_deref());
        assert_none!(line.method());
    }

    #[test]
    fn test_request_without_http_version_is_rejected() {
        // A non-empty request field must end in an HTTP version, so e.g.
        // nginx's `"-"` for invalid requests drops the whole line.
        let input = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "-" 400 0 "-" "-" 0.001"#;
        let error = assert_err!(LogLine::parse(input));
        assert_matches!(error, LineError::GrammarMismatch);
    }

    #[test]
    fn test_request_without_method() {
        let input = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] " HTTP/1.1" 400 0 "-" "-" 0.001"#;
        let line = assert_ok!(LogLine::parse(input));
        assert_some_eq!(line.request.as_deref(), " HTTP/1.1");
        assert_none!(line.method());
    }

    #[test]
    fn test_nonstandard_method() {
        let input = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "FOOBAR /x HTTP/1.1" 405 0 "-" "-" 0.2"#;
        let line = assert_ok!(LogLine::parse(input));
        assert_some_eq!(line.method(), "FOOBAR");
    }

    #[test]
    fn test_empty_referer_and_user_agent() {
        let input = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "" "" 0.2"#;
        let line = assert_ok!(LogLine::parse(input));
        assert_eq!(line.referer, "");
        assert_eq!(line.user_agent, "");
    }

    #[test]
    fn test_malformed_lines() {
        let inputs = [
            "",
            "garbage",
            // missing closing bracket
            r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000 "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
            // missing closing quote of the user agent
            r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "-" "Mozilla 0.2"#,
            // truncated after the status
            r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200"#,
            // truncated before the duration
            r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "-" "-""#,
        ];

        for input in inputs {
            let error = assert_err!(LogLine::parse(input));
            assert_matches!(error, LineError::GrammarMismatch);
            assert_none!(LogLine::parse_opt(input));
        }
    }

    #[test]
    fn test_invalid_timestamp() {
        let inputs = [
            r#"1.2.3.4 - - [2023-10-10 13:55:36] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
            r#"1.2.3.4 - - [10/Foo/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
            r#"1.2.3.4 - - [10/Oct/2023:13:55:36] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
            r#"1.2.3.4 - - [31/Feb/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
        ];

        for input in inputs {
            let error = assert_err!(LogLine::parse(input));
            assert_matches!(error, LineError::InvalidTimestamp { .. });
        }

        let inputs = [
            r#"1.2.3.4 - - [ 10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
            r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000 ] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
            r#"1.2.3.4 - - [10/Oct/2023:13:55:60 +0000] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#,
        ];

        for input in inputs {
            let error = assert_err!(LogLine::parse(input));
            assert_matches!(error, LineError::UnsupportedTimestamp { .. });
            assert_none!(LogLine::parse_opt(input));
        }
    }

    #[test]
    fn test_leap_second_message() {
        let input = r#"1.2.3.4 - - [10/Oct/2023:13:55:60 +0000] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#;
        let error = assert_err!(LogLine::parse(input));
        assert_eq!(
            error.to_string(),
            r#"Invalid timestamp "10/Oct/2023:13:55:60 +0000": leap second"#
        );
    }

    #[test]
    fn test_invalid_timestamp_message() {
        let input = r#"1.2.3.4 - - [10/Foo/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "-" "-" 0.2"#;
        let error = assert_err!(LogLine::parse(input));
        let message = error.to_string();
        assert!(message.starts_with(r#"Invalid timestamp "10/Foo/2023:13:55:36 +0000": "#));
    }

    #[test]
    fn test_embedded_quotes() {
        // Quotes are not escaped. The user agent ends at the first quote
        // followed by a space, and the rest of the line becomes the duration.
        let input = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 0 "-" "Agent "quoted" v1" 0.5"#;
        let line = assert_ok!(LogLine::parse(input));
        assert_some_eq!(line.request.as_deref(), "GET / HTTP/1.1");
        assert_eq!(line.referer, "-");
        assert_eq!(line.user_agent, r#"Agent "quoted"#);
        assert_eq!(line.duration, r#"v1" 0.5"#);
    }
}

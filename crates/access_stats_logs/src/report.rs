use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::ser::{Formatter, PrettyFormatter};
use std::io;

/// Format of the `time` field in [LongestRequest], e.g. `2023-10-10 13:55:36 +0000`.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Final statistics for a single access log file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub total_requests: u64,
    /// Request counts per HTTP method, in order of first appearance.
    pub method_count: IndexMap<String, u64>,
    /// `(ip, count)` pairs, serialized as two-element arrays.
    pub top_ips: Vec<(String, u64)>,
    pub top_longest_requests: Vec<LongestRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestRequest {
    pub method: Option<String>,
    /// The full request line, e.g. `GET /index.html HTTP/1.1`.
    pub url: Option<String>,
    pub ip: String,
    pub duration: String,
    #[serde(serialize_with = "serialize_time")]
    pub time: DateTime<FixedOffset>,
}

fn serialize_time<S>(time: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&time.format(TIME_FORMAT))
}

impl Report {
    /// Renders the report as JSON, indented by four spaces.
    ///
    /// Non-ASCII characters are written as `\uXXXX` escapes, so the output
    /// is always plain ASCII.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut buffer = Vec::new();
        let formatter = AsciiFormatter(PrettyFormatter::with_indent(b"    "));
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// [PrettyFormatter] that escapes every non-ASCII character (and DEL) as one
/// or two (for surrogate pairs) lowercase `\uXXXX` sequences.
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut rest = fragment;
        while let Some(position) = rest.find(|c: char| !c.is_ascii() || c == '\x7f') {
            let (ascii, tail) = rest.split_at(position);
            writer.write_all(ascii.as_bytes())?;

            let mut chars = tail.chars();
            if let Some(c) = chars.next() {
                let mut units = [0; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
            rest = chars.as_str();
        }

        writer.write_all(rest.as_bytes())
    }
}

//! Functions for implementing different strategies for writing parsed metrics
//! to the output stream.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use log::trace;

use crate::parse::Metric;


/// How metrics are rendered on the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Debug,
    Tsv,
    Perfdata,
}

impl Format {
    pub const NAMES: [&'static str; 3] = ["debug", "tsv", "perfdata"];

    /// Write the metrics parsed from input line `line` using this format.
    pub fn write<W: Write>(self, out: &mut W, line: usize, metrics: &[Metric]) -> io::Result<()> {
        trace!("Writing {} metric(s) from line {} as {}.", metrics.len(), line, self);
        match self {
            Format::Debug => debug(out, line, metrics),
            Format::Tsv => tsv(out, line, metrics),
            Format::Perfdata => perfdata(out, metrics),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "debug" => Ok(Format::Debug),
            "tsv" => Ok(Format::Tsv),
            "perfdata" => Ok(Format::Perfdata),
            _ => Err(format!("unknown output format `{}`", name)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Format::Debug => Format::NAMES[0],
            Format::Tsv => Format::NAMES[1],
            Format::Perfdata => Format::NAMES[2],
        };
        f.write_str(name)
    }
}


/// One `{:?}` rendering per metric, prefixed with the line number.
pub fn debug<W: Write>(out: &mut W, line: usize, metrics: &[Metric]) -> io::Result<()> {
    for metric in metrics {
        writeln!(out, "{}: {:?}", line, metric)?;
    }
    Ok(())
}

/// Escape the characters that would break a TSV row: backslash, tab, CR and LF.
fn escape_cell(text: &str) -> Cow<str> {
    if !text.contains(|c: char| matches!(c, '\\' | '\t' | '\r' | '\n')) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// One tab-separated row per metric:
/// `line  label  value  unit  warning  critical  min  max`.
/// Absent thresholds are left as empty cells. Tabs and line breaks inside a
/// label or unit are written as `\t`, `\r` and `\n`, backslashes as `\\`.
pub fn tsv<W: Write>(out: &mut W, line: usize, metrics: &[Metric]) -> io::Result<()> {
    let cell = |threshold: Option<f64>| threshold.map(|t| t.to_string()).unwrap_or_default();
    for metric in metrics {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            line,
            escape_cell(&metric.label),
            metric.value,
            escape_cell(&metric.unit),
            cell(metric.warning),
            cell(metric.critical),
            cell(metric.min),
            cell(metric.max),
        )?;
    }
    Ok(())
}

/// All metrics of a line re-rendered as a single canonical perfdata string.
pub fn perfdata<W: Write>(out: &mut W, metrics: &[Metric]) -> io::Result<()> {
    let rendered: Vec<String> = metrics.iter().map(Metric::to_string).collect();
    writeln!(out, "{}", rendered.join(" "))
}

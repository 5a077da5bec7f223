//! Feed plugin output through the parser.
//!
//! A reader thread pushes input lines onto a bounded channel. The consumer
//! takes them off in chunks, parses every chunk in parallel and writes the
//! results back out in input order.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::string::FromUtf8Error;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use itertools::Itertools;
use log::{debug, error, info, trace};
use rayon::prelude::*;

use crate::config::Config;
use crate::parse::{parse, Metric};


static CHANNEL_CAPACITY: usize = 1000;


/// Counts gathered over one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub lines: usize,
    pub metrics: usize,
    pub failures: usize,
}


/// Open the configured input, falling back to standard input.
pub fn open_input(config: &Config) -> io::Result<Box<dyn BufRead + Send>> {
    match &config.input {
        Some(path) => {
            info!("Reading plugin output from {}...", path.display());
            Ok(Box::new(BufReader::new(File::open(path)?)))
        },
        None => {
            info!("Reading plugin output from stdin...");
            Ok(Box::new(BufReader::new(io::stdin())))
        },
    }
}

/// The perfdata portion of a line of plugin output: everything after the
/// first `|`, or the whole line in raw mode.
pub fn perfdata_portion(line: &str, raw: bool) -> Option<&str> {
    let perfdata = if raw {
        line
    } else {
        line.split_once('|').map(|(_, perfdata)| perfdata)?
    };
    if perfdata.trim().is_empty() {
        None
    } else {
        Some(perfdata)
    }
}

/// A numbered input line, or the reason it could not be read as text.
type Line = (usize, Result<String, FromUtf8Error>);

pub fn run<R, W>(config: &Config, input: R, out: &mut W) -> io::Result<Summary>
where
    R: BufRead + Send + 'static,
    W: Write,
{
    let (sender, receiver) = bounded::<Line>(CHANNEL_CAPACITY);
    let reader = thread::Builder::new()
        .name(String::from("reader"))
        .spawn(move || { read_lines(input, sender) })?;

    let summary = consume(config, receiver, out);
    // A failed consumer drops the receiver, which stops the reader.
    let read = reader.join()
        .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "reader thread panicked")));
    let summary = summary?;
    read?;
    out.flush()?;

    info!("Parsed {} metric(s) from {} line(s), {} failure(s).",
          summary.metrics, summary.lines, summary.failures);
    Ok(summary)
}

/// Send every line of `input` down the channel, without its line ending.
///
/// Lines that are not valid UTF-8 are passed on as errors so the consumer
/// can count them; only I/O errors stop the reader.
fn read_lines<R: BufRead>(mut input: R, sender: Sender<Line>) -> io::Result<()> {
    let mut line_no = 0;
    loop {
        let mut buf = Vec::new();
        let read = input.read_until(b'\n', &mut buf).map_err(|e| {
            error!("Error reading input:  {}", e);
            e
        })?;
        if read == 0 {
            break;
        }
        line_no += 1;
        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }

        let line = String::from_utf8(buf);
        trace!("Read line {}:  {:?}", line_no, line);
        if sender.send((line_no, line)).is_err() {
            debug!("Consumer hung up, stopping reader.");
            break;
        }
    }
    Ok(())
}

/// What became of one input line.
enum Outcome {
    Metrics(Vec<Metric>),
    Failed(String),
    Skipped,
}

fn outcome(config: &Config, line: &Result<String, FromUtf8Error>) -> Outcome {
    let line = match line {
        Ok(line) => line,
        Err(e) => return Outcome::Failed(format!("could not read line: {}", e)),
    };
    match perfdata_portion(line, config.raw).map(parse) {
        Some(Ok(metrics)) => Outcome::Metrics(metrics),
        Some(Err(e)) => Outcome::Failed(e.to_string()),
        None => Outcome::Skipped,
    }
}

fn consume<W: Write>(config: &Config, receiver: Receiver<Line>, out: &mut W)
    -> io::Result<Summary>
{
    let mut summary = Summary::default();

    for chunk in &receiver.iter().chunks(config.chunk_size) {
        let lines: Vec<Line> = chunk.collect();
        summary.lines += lines.len();
        let parsed: Vec<(usize, Outcome)> = lines
            .par_iter()
            .map(|(line_no, line)| (*line_no, outcome(config, line)))
            .collect();
        debug!("Parsed a chunk of {} line(s).", parsed.len());

        for (line_no, result) in parsed {
            match result {
                Outcome::Metrics(metrics) => {
                    summary.metrics += metrics.len();
                    config.format.write(out, line_no, &metrics)?;
                },
                Outcome::Failed(reason) => {
                    error!("Line {} - {}", line_no, reason);
                    summary.failures += 1;
                },
                Outcome::Skipped => trace!("Line {} has no perfdata.", line_no),
            }
        }
    }
    Ok(summary)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["perfdata"];
        argv.extend_from_slice(args);
        Config::from_args(argv).unwrap()
    }

    fn run_on_bytes(config: &Config, input: &[u8]) -> (Summary, String) {
        let mut out = Vec::new();
        let summary = run(config, Cursor::new(input.to_vec()), &mut out).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    fn run_on(config: &Config, input: &str) -> (Summary, String) {
        run_on_bytes(config, input.as_bytes())
    }

    #[test]
    fn test_perfdata_portion() {
        assert_eq!(perfdata_portion("OK - load fine | load1=0.5;1;2", false), Some(" load1=0.5;1;2"));
        assert_eq!(perfdata_portion("OK - no data", false), None);
        assert_eq!(perfdata_portion("OK |  ", false), None);
        assert_eq!(perfdata_portion("load1=0.5", true), Some("load1=0.5"));
        assert_eq!(perfdata_portion("", true), None);
    }

    #[test]
    fn test_run_plugin_output() {
        let input = "\
OK - users | users=2;3;7;0
WARNING - no perfdata here
OK - load | load1=0.050;7.000;10.000;0; load5=0.040;6.000;7.000;0; load15=0.010;5.000;6.000;0;100
";
        let (summary, out) = run_on(&config(&["-f", "perfdata"]), input);
        assert_eq!(summary, Summary { lines: 3, metrics: 4, failures: 0 });
        assert_eq!(out, "users=2;3;7;0\nload1=0.05;7;10;0 load5=0.04;6;7;0 load15=0.01;5;6;0;100\n");
    }

    #[test]
    fn test_run_counts_failures_and_keeps_going() {
        let input = "a=1\nb=\n=3\nc=4%\n";
        let (summary, out) = run_on(&config(&["--raw", "--chunk-size", "3"]), input);
        assert_eq!(summary, Summary { lines: 4, metrics: 2, failures: 2 });
        assert_eq!(out, "1\ta\t1\t\t\t\t\t\n4\tc\t4\t%\t\t\t\t\n");
    }

    #[test]
    fn test_run_preserves_line_order_across_chunks() {
        let input: String = (1..=50).map(|i| format!("m{}={}\n", i, i)).collect();
        let (summary, out) = run_on(&config(&["--raw", "--chunk-size", "7"]), &input);
        assert_eq!(summary.metrics, 50);
        let line_numbers: Vec<usize> = out.lines()
            .map(|row| row.split('\t').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(line_numbers, (1..=50).collect::<Vec<usize>>());
    }

    #[test]
    fn test_run_counts_invalid_utf8_line_and_keeps_going() {
        let (summary, out) = run_on_bytes(&config(&["--raw"]), b"a=1\n\xff=2\nc=3\n");
        assert_eq!(summary, Summary { lines: 3, metrics: 2, failures: 1 });
        assert_eq!(out, "1\ta\t1\t\t\t\t\t\n3\tc\t3\t\t\t\t\t\n");
    }

    #[test]
    fn test_run_strips_line_endings() {
        let (summary, out) = run_on(&config(&["--raw"]), "a=1%\r\nb=2s");
        assert_eq!(summary, Summary { lines: 2, metrics: 2, failures: 0 });
        assert_eq!(out, "1\ta\t1\t%\t\t\t\t\n2\tb\t2\ts\t\t\t\t\n");
    }
}

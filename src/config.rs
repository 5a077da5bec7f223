use std::ffi::OsString;
use std::path::PathBuf;

use clap::{crate_version, value_t, App, Arg};
use log::LevelFilter;

use crate::output::Format;


static DEFAULT_CHUNK_SIZE: &str = "100";


pub struct Config {
    // Input
    /// `None` reads standard input.
    pub input: Option<PathBuf>,
    /// Treat every line as bare perfdata instead of plugin output.
    pub raw: bool,
    // Processing
    pub chunk_size: usize,
    /// Parser threads, 0 lets rayon decide.
    pub threads: usize,
    // Output
    pub format: Format,
    pub log_level: LevelFilter,
}


impl Config {
    /// Build the configuration from the process arguments, exiting with a
    /// usage message when they are invalid.
    pub fn new() -> Self {
        Self::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = App::new("perfdata")
            .version(crate_version!())
            .about("Parses Nagios plugin performance data into structured records.")
            .arg(Arg::with_name("INPUT")
                .help("File of plugin output to read, `-` or nothing for stdin")
                .index(1))
            .arg(Arg::with_name("raw")
                .long("raw")
                .help("Treat each whole line as perfdata instead of the text after `|`"))
            .arg(Arg::with_name("format")
                .short("f")
                .long("format")
                .takes_value(true)
                .possible_values(&Format::NAMES)
                .default_value("tsv")
                .help("Output format"))
            .arg(Arg::with_name("chunk-size")
                .long("chunk-size")
                .takes_value(true)
                .default_value(DEFAULT_CHUNK_SIZE)
                .validator(positive)
                .help("Number of lines handed to the parser at a time"))
            .arg(Arg::with_name("threads")
                .short("j")
                .long("threads")
                .takes_value(true)
                .default_value("0")
                .help("Parser threads, 0 for one per CPU"))
            .arg(Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more; repeat for debug and trace output"))
            .arg(Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .conflicts_with("verbose")
                .help("Log nothing"))
            .get_matches_from_safe(args)?;

        let input = matches.value_of_os("INPUT")
            .filter(|path| *path != "-")
            .map(PathBuf::from);
        let log_level = if matches.is_present("quiet") {
            LevelFilter::Off
        } else {
            match matches.occurrences_of("verbose") {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };

        Ok(Self {
            input,
            raw: matches.is_present("raw"),
            chunk_size: value_t!(matches, "chunk-size", usize)?,
            threads: value_t!(matches, "threads", usize)?,
            format: value_t!(matches, "format", Format)?,
            log_level,
        })
    }
}


fn positive(value: String) -> Result<(), String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(String::from("must be a positive integer")),
    }
}

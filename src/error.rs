//! Errors raised while splitting and decoding performance data.

use std::num::ParseFloatError;

use thiserror::Error;


/// The broad category of a parse failure, independent of the input that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SplitFailure,
    MalformedEntry,
    InvalidLabel,
    NoValue,
    InvalidFormat,
    MissingNumber,
    NumberFormat,
}


/// Why a numeric field could not be read as a float.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FloatError {
    #[error(transparent)]
    Syntax(#[from] ParseFloatError),
    /// The literal is well formed but too large for an `f64`.
    #[error("value out of range")]
    OutOfRange,
}


/// Failure to decode a single `label=value[UOM];warn;crit;min;max` entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    /// The entry split into more than five `;`-delimited fields.
    #[error("invalid perfdata string")]
    MalformedEntry,
    #[error("invalid label")]
    InvalidLabel,
    #[error("no value found")]
    NoValue,
    /// The label was not immediately followed by `=`.
    #[error("invalid format")]
    InvalidFormat,
    #[error("missing number")]
    MissingNumber,
    /// `text` is the literal after `,` has been normalized to `.`.
    #[error("invalid float literal {text:?}: {source}")]
    NumberFormat {
        text: String,
        #[source]
        source: FloatError,
    },
}

impl EntryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EntryError::MalformedEntry => ErrorKind::MalformedEntry,
            EntryError::InvalidLabel => ErrorKind::InvalidLabel,
            EntryError::NoValue => ErrorKind::NoValue,
            EntryError::InvalidFormat => ErrorKind::InvalidFormat,
            EntryError::MissingNumber => ErrorKind::MissingNumber,
            EntryError::NumberFormat { .. } => ErrorKind::NumberFormat,
        }
    }
}


/// Failure to parse a whole performance data string.
///
/// Parsing is all-or-nothing: the first bad entry aborts the call and no
/// partially decoded metrics are returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input held no entries at all (empty or whitespace only).
    #[error("could not split perfdata: {0}")]
    Split(String),
    /// The entry at `index` (zero based, in input order) failed to decode.
    #[error("could not parse perfdata: {source}")]
    Entry {
        index: usize,
        entry: String,
        #[source]
        source: EntryError,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Split(_) => ErrorKind::SplitFailure,
            Error::Entry { source, .. } => source.kind(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_error_is_wrapped_with_context() {
        let err = Error::Entry {
            index: 2,
            entry: String::from("users2%"),
            source: EntryError::NoValue,
        };
        assert_eq!(err.to_string(), "could not parse perfdata: no value found");
        assert_eq!(err.kind(), ErrorKind::NoValue);
    }

    #[test]
    fn test_split_error_names_input() {
        let err = Error::Split(String::from(" "));
        assert_eq!(err.to_string(), "could not split perfdata:  ");
        assert_eq!(err.kind(), ErrorKind::SplitFailure);
    }

    #[test]
    fn test_number_format_message() {
        let source = "2.4.4".parse::<f64>().unwrap_err();
        let err = EntryError::NumberFormat { text: String::from("2.4.4"), source: source.into() };
        assert!(err.to_string().starts_with("invalid float literal \"2.4.4\": "));
        assert_eq!(err.kind(), ErrorKind::NumberFormat);
    }

    #[test]
    fn test_out_of_range_message() {
        let err = EntryError::NumberFormat { text: String::from("1e400"), source: FloatError::OutOfRange };
        assert_eq!(err.to_string(), "invalid float literal \"1e400\": value out of range");
        assert_eq!(err.kind(), ErrorKind::NumberFormat);
    }
}

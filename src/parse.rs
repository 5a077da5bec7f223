//! Parse Nagios performance data.
//!
//! See https://nagios-plugins.org/doc/guidelines.html#AEN200
//!
//! Each entry has the shape `'label'=value[UOM];[warn];[crit];[min];[max]`.

use std::fmt;
use std::str::FromStr;

use log::trace;
use nom::bytes::complete::{take_till, take_while1};
use nom::combinator::{opt, recognize};
use nom::sequence::pair;
use nom::IResult;

use crate::error::{EntryError, Error, FloatError};
use crate::split::{quoted, split};


/// `label=value`, warning, critical, min and max.
const MAX_FIELDS: usize = 5;


/// One decoded performance data entry.
///
/// Thresholds are `None` when the field was empty or left off the end of the
/// entry. A literal `NaN` in the source is kept as `Some(NaN)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Verbatim, surrounding quotes included.
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}


impl Metric {
    /// `[warning, critical, min, max]` with absent thresholds as NaN.
    pub fn thresholds_or_nan(&self) -> [f64; 4] {
        let or_nan = |threshold: Option<f64>| threshold.unwrap_or(f64::NAN);
        [
            or_nan(self.warning),
            or_nan(self.critical),
            or_nan(self.min),
            or_nan(self.max),
        ]
    }

    fn thresholds(&self) -> [Option<f64>; 4] {
        [self.warning, self.critical, self.min, self.max]
    }
}


impl FromStr for Metric {
    type Err = EntryError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        decode(entry)
    }
}


/// Renders the entry in canonical form, dropping absent trailing thresholds.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}{}", self.label, self.value, self.unit)?;
        let thresholds = self.thresholds();
        let present = thresholds.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        for threshold in &thresholds[..present] {
            match threshold {
                Some(threshold) => write!(f, ";{}", threshold)?,
                None => write!(f, ";")?,
            }
        }
        Ok(())
    }
}


/// Everything up to the first unquoted `=`.
fn label(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(quoted), take_till(|c: char| c == '=' || c == '\'')))(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit() || c == '.' || c == ',')(input)
}

/// Whether `text` spells infinity outright, as opposed to overflowing into it.
fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parse a float, accepting `,` as the decimal separator.
///
/// Literals too large for an `f64` are rejected rather than read as infinity.
fn parse_float(raw: &str) -> Result<f64, EntryError> {
    let text = raw.replace(',', ".");
    let source = match text.parse::<f64>() {
        Ok(value) if value.is_infinite() && !is_infinity_literal(&text) => FloatError::OutOfRange,
        Ok(value) => return Ok(value),
        Err(e) => FloatError::from(e),
    };
    Err(EntryError::NumberFormat { text, source })
}

fn threshold(fields: &[&str], index: usize) -> Result<Option<f64>, EntryError> {
    match fields.get(index) {
        Some(field) if !field.is_empty() => parse_float(field).map(Some),
        _ => Ok(None),
    }
}

/// Decode `label=value[UOM]` into its three parts.
fn label_and_value(field: &str) -> Result<(&str, f64, &str), EntryError> {
    let (rest, label) = label(field).map_err(|_| EntryError::InvalidLabel)?;
    if label.is_empty() {
        return Err(EntryError::InvalidLabel);
    }
    if rest.is_empty() {
        return Err(EntryError::NoValue);
    }
    let value_with_unit = rest.strip_prefix('=').ok_or(EntryError::InvalidFormat)?;
    let (unit, raw) = number(value_with_unit).map_err(|_| EntryError::MissingNumber)?;
    let value = parse_float(raw)?;
    Ok((label, value, unit))
}

/// Decode a single performance data entry.
///
/// Thresholds are decoded max first and warning last, then the label and
/// value. The first failing field decides the error.
pub fn decode(entry: &str) -> Result<Metric, EntryError> {
    let fields: Vec<&str> = entry.split(';').collect();
    if fields.is_empty() || fields.len() > MAX_FIELDS {
        return Err(EntryError::MalformedEntry);
    }

    let max = threshold(&fields, 4)?;
    let min = threshold(&fields, 3)?;
    let critical = threshold(&fields, 2)?;
    let warning = threshold(&fields, 1)?;
    let (label, value, unit) = label_and_value(fields[0])?;

    Ok(Metric {
        label: label.to_string(),
        value,
        unit: unit.to_string(),
        warning,
        critical,
        min,
        max,
    })
}

/// Parse a whole performance data string into its metrics, in input order.
///
/// Either every entry decodes or the call fails with the first bad entry.
pub fn parse(perfdata: &str) -> Result<Vec<Metric>, Error> {
    let metrics = split(perfdata)?
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            decode(entry).map_err(|source| Error::Entry {
                index,
                entry: entry.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<Metric>, Error>>()?;
    trace!("Parsed {} metric(s).", metrics.len());
    Ok(metrics)
}

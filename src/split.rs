//! Split a performance data string into its individual entries.
//!
//! Entries are separated by whitespace, except inside a single-quoted label:
//! `'free space'=12GB;;;0 load=0.5` holds two entries.

use log::trace;
use nom::branch::alt;
use nom::bytes::complete::{is_not, take_till1, take_while};
use nom::character::complete::char;
use nom::combinator::recognize;
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

use crate::error::Error;


fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// A single-quoted segment with at least one character between the quotes.
pub(crate) fn quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('\''), is_not("'"), char('\'')))(input)
}

/// One entry: a quoted segment glued to a non-empty run of non-whitespace,
/// or failing that, any plain run of non-whitespace.
fn entry(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(quoted, take_till1(is_space))),
        take_till1(is_space),
    ))(input)
}

fn entries(input: &str) -> IResult<&str, Vec<&str>> {
    many0(preceded(take_while(is_space), entry))(input)
}

/// Split `perfdata` into entry substrings, in input order.
///
/// Fails with [`Error::Split`] when the input holds nothing but whitespace.
pub fn split(perfdata: &str) -> Result<Vec<&str>, Error> {
    let tokens = match entries(perfdata) {
        Ok((_, tokens)) => tokens,
        Err(_) => Vec::new(),
    };
    if tokens.is_empty() {
        return Err(Error::Split(perfdata.to_string()));
    }
    trace!("Split perfdata into {} entries:  {:?}", tokens.len(), tokens);
    Ok(tokens)
}

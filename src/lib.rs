//! Parse the performance data that Nagios compatible monitoring plugins
//! append to their output.
//!
//! ```
//! let metrics = nagios_perfdata::parse_perfdata("'users'=2%;3;7;0 load1=0,5").unwrap();
//! assert_eq!(metrics[0].label, "'users'");
//! assert_eq!(metrics[0].max, None);
//! assert_eq!(metrics[1].value, 0.5);
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod split;

pub use crate::error::{EntryError, Error, ErrorKind, FloatError};
pub use crate::parse::{decode, parse as parse_perfdata, Metric};
pub use crate::split::split;

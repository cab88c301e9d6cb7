#![warn(clippy::pedantic)]
// Noisy doc/signature lints: would require annotating every pub function
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference: keeping format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod macros;

pub mod cli;
pub mod config;
pub mod errors;
pub mod fulfillment;
pub mod gateway;
pub mod profile;
pub(crate) mod utils;

pub use errors::{BridgeError, BridgeResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

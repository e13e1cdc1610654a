//! vhunter: virtual host discovery by Host header fuzzing
//!
//! Every request connects to an operator-supplied IP; only the `Host`
//! header changes. Responses are compared against a baseline taken with a
//! random hostname, and anything different enough is reported.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod modes;
pub mod output;

pub use error::{Result, VhunterError};

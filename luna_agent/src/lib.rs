#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod parser;
mod prompt;
mod react;

pub use parser::{AgentStep, ParseError, parse_output, truncate_at_observation};
pub use react::{AgentConfig, ReactAgent};

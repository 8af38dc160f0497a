pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod output;
pub mod parser;
pub mod report;
pub mod state;

pub use config::{ConfigData, RunConfiguration};
pub use error::{Error, ErrorKind, ParseError};
pub use output::{OutputStream, OutputTarget};
pub use parser::{TestSpec, TestSpecParser, parse_test_spec};
pub use report::{Reporter, TapReporter};

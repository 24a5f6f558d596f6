//! Settings come from a TOML file named on the command line, overlaid with
//! `WARDEN__*` environment variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;

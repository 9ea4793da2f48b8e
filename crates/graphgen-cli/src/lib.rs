//! Library half of the `graphgen` binary: subcommands, configuration
//! loading and logging setup.

pub mod commands;
pub mod input;
pub mod logging;

//! Library side of the `sentivote` binary: argument handling and the
//! subcommand implementations, kept here so integration tests can drive them
//! without spawning a process.
pub mod commands;
pub mod input;
pub mod pipeline;

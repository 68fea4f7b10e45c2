//! CLI module for highlighter
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// Highlighter
///
/// Assembles a short highlight video from a long recorded talk, its transcript and
/// a scored list of candidate ranges.
#[derive(Parser, Debug)]
#[command(name = "highlighter")]
#[command(about = "Assemble highlight videos from scored transcripts")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log format: pretty, compact or json
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub overrides: args::OverrideArgs,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Produce the highlight video for one source
    Generate(args::GenerateArgs),
    /// Process every video in a directory
    Batch(args::BatchArgs),
    /// Re-run the failed entries of an earlier batch
    RetryFailed(args::RetryArgs),
    /// Report whether hardware encoding would be used
    Detect,
}

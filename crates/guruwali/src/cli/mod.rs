//! Command-line interface for guruwali.
//!
//! This module provides the CLI structure and command handlers for the
//! `guruwali` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AspectArg, BackupCommand, ConfigCommand, FilterArg, LogArgs, LogCommand, OutputFormat,
    SessionTypeArg, StatsCommand, StatusArg, StudentArgs, StudentCommand, StudentEditArgs,
};

/// guruwali - Counseling journal for homeroom teachers
///
/// Keeps the student roster and a log of counseling sessions, shows dashboard
/// statistics and exports both as Word documents.
#[derive(Debug, Parser)]
#[command(name = "guruwali")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the student roster
    #[command(subcommand)]
    Student(StudentCommand),

    /// Record and review counseling sessions
    #[command(subcommand)]
    Log(LogCommand),

    /// Show dashboard statistics
    Stats(StatsCommand),

    /// Back up or restore the whole journal
    #[command(subcommand)]
    Backup(BackupCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

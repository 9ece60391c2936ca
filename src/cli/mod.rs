//! Command-line interface, parsed with clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Assetrack - enterprise asset tracking
#[derive(Parser)]
#[command(name = "assetrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Write a default config.toml with a fresh signing key
    Init,

    /// List user accounts
    #[command(alias = "ls")]
    Users,

    /// Print dashboard statistics
    Stats,

    /// Print an argon2 hash for a password
    HashPassword {
        /// Plain-text password to hash
        password: String,
    },
}

//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Firmware component tool - inspect and validate component build graphs
#[derive(Parser, Debug)]
#[command(name = "fw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to firmware.toml (defaults to searching upward from the current directory)
    #[arg(short, long, global = true, env = "FW_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve the configured components and check the platform version
    ///
    /// Prints the initialisation order on success. Fails if a dependency is
    /// missing or the target SDK is older than a component requires.
    ///
    /// Examples:
    ///   fw check                      # Use firmware.toml
    ///   fw check --sdk-version 4.3.0  # Override the target SDK version
    ///   fw check wifi_udp             # Check specific components
    Check {
        /// Components to resolve (defaults to [build].components)
        components: Vec<String>,

        /// Target SDK version, overriding [platform].version
        #[arg(long)]
        sdk_version: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List registered components
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one component's descriptor
    Show {
        /// Component name
        name: String,

        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

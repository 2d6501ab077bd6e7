use clap::{Parser, Subcommand};

/// Vigil Server - Multi-Sensor Presence Detection
#[derive(Parser)]
#[command(name = "vigil-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server (default)
    Serve,

    /// Print the resolved configuration as JSON and exit
    Check,
}

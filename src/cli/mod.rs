pub mod push;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::BrokerBackend;

/// A3S Push - event push gateway
#[derive(Debug, Parser)]
#[command(name = "a3s-push", version, about)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "A3S_PUSH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the gateway
    Serve {
        /// Host address to bind the push endpoint to
        #[arg(long)]
        host: Option<String>,

        /// Port for the push endpoint
        #[arg(long)]
        port: Option<u16>,

        /// Broker backend
        #[arg(long, value_enum, env = "A3S_PUSH_BACKEND")]
        backend: Option<BrokerBackend>,
    },

    /// Push one event to a running gateway
    Push {
        /// Gateway base URL
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        url: String,

        /// Event name
        #[arg(long)]
        name: String,

        /// Event payload as JSON
        #[arg(long, default_value = "null")]
        payload: String,

        /// User the event belongs to
        #[arg(long)]
        user_id: i64,
    },
}

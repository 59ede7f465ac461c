use clap::{Parser, Subcommand};

/// Conduit - channel provisioning for pub/sub pipelines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Run the API server and the message relay
    Serve {
        /// API port (overrides SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not start the relay worker
        #[arg(long)]
        no_relay: bool,
    },

    /// Create a channel
    Create {
        /// Channel name (letters, digits, '-' and '_')
        name: String,
    },

    /// Delete a channel
    Delete {
        /// Channel id, or name when not numeric
        channel: String,
    },

    /// Rename a channel
    Rename {
        /// Channel id, or current name when not numeric
        channel: String,

        /// New channel name
        new_name: String,

        /// Requesting account
        #[arg(long, default_value = "")]
        account: String,
    },

    /// List all channels
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Publish a message to a channel
    Publish {
        /// Channel name
        channel: String,

        /// Message content
        message: String,

        /// Account number
        #[arg(long)]
        account: i64,

        /// Timestamp (default: now, epoch milliseconds)
        #[arg(long)]
        timestamp: Option<i64>,
    },
}

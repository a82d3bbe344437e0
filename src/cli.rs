use clap::{Parser, Subcommand};

/// approvald — approval processing service
#[derive(Parser)]
#[command(name = "approvald", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (overrides APPROVAL_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify a single reply against the configured deployment
    /// (connectivity check)
    Classify {
        /// The reply text to classify
        reply: String,
        /// The approval email the reply answers
        #[arg(long)]
        context: Option<String>,
    },
}

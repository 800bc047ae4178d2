//! CLI module for ontograph.
//!
//! Subcommands:
//! - `init`: Apply schema migrations
//! - `mcp`: Run the MCP server (stdio transport)
//! - `serve`: Run the MCP server (HTTP transport)
//! - `seed`: Load the demonstration dataset
//! - `process`: Run the news CSV pipeline
//! - `health`: Check database, data pipeline, configuration and system
//! - `query`: Run a Cypher statement and print the rows

mod health;
mod init;
mod mcp;
mod process;
mod query;
mod seed;
mod serve;

use clap::{Parser, Subcommand};

pub use health::{HealthComponent, HealthState, HealthStatus};

/// ontograph - Product ontology graph
#[derive(Parser)]
#[command(name = "ontograph")]
#[command(about = "Product ontology graph - MCP server for product, functionality and incident management")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending schema migrations (constraints and indexes)
    Init,

    /// Run the MCP server (stdio transport for local use)
    Mcp {
        /// Bearer token validated once and used for the whole session
        #[arg(long)]
        token: Option<String>,
    },

    /// Run the MCP server (HTTP transport for remote access)
    Serve {
        /// Host address to bind to (default: server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load the demonstration dataset and print statistics
    Seed {
        /// Remove all ontology data first
        #[arg(long)]
        clear: bool,
    },

    /// Download, validate and clean the news CSV, then print a summary
    Process {
        /// CSV URL or local path (default: data.news_url)
        #[arg(long)]
        url: Option<String>,
    },

    /// Check component health
    Health {
        /// Component to check (default: all)
        #[arg(long, value_enum)]
        component: Option<HealthComponent>,
    },

    /// Run a Cypher statement and print the returned rows
    Query {
        #[arg(long)]
        cypher: String,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Init => self.run_init().await,
            Command::Mcp { ref token } => self.run_mcp(token.clone()).await,
            Command::Serve { ref host, port } => self.run_serve(host.clone(), port).await,
            Command::Seed { clear } => self.run_seed(clear).await,
            Command::Process { ref url } => self.run_process(url.clone()).await,
            Command::Health { component } => self.run_health(component).await,
            Command::Query { ref cypher } => self.run_query(cypher).await,
        }
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(author, version, about = "RasoiBot: conversational Indian recipe lookup", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the recipe HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the recipe JSON file (overrides RECIPES_PATH)
        #[arg(short, long)]
        recipes: Option<PathBuf>,
    },
    /// Chat with a running server from the terminal
    Chat {
        /// Base URL of the server
        #[arg(long, env = "RASOIBOT_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

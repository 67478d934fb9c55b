pub mod commands;

use clap::{Parser, Subcommand};
use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rss-client")]
#[command(about = "Merge RSS/Atom feeds into one paginated, time-ordered stream")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RSS_CLIENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:9000
        #[arg(short, long)]
        bind: Option<String>,

        /// Public base URL used in continuation links
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Fetch feeds once and print the first page as JSON
    Fetch {
        /// Feed URLs
        #[arg(required = true, num_args = 1..)]
        feeds: Vec<String>,

        /// Page size
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Print the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::resolve(self.config.as_deref())?;

        // Keeps the non-blocking file writer alive until we return
        let _log_guard = commands::init_logging(self.debug, self.verbose, &config.logging)?;

        match self.command {
            Commands::Serve { bind, base_url } => {
                commands::serve(config, bind, base_url).await
            }
            Commands::Fetch { feeds, count } => {
                commands::fetch(&config, feeds, count).await
            }
            Commands::Config => {
                commands::show_config(&config)
            }
            Commands::Completions { shell } => {
                commands::generate_completions(shell);
                Ok(())
            }
        }
    }
}

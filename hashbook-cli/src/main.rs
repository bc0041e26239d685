//! # hashbook CLI
//!
//! Command-line interface for the hashbook documentation builder.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hashbook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(long, default_value = hashbook_core::config::CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new hashbook project
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Build db.json, index.html and sitemap.xml
    Build {
        /// Markdown source directory
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output directory (replaced on every build)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Absolute site URL used in the sitemap
        #[arg(long, env = "HASHBOOK_BASE_URL")]
        base_url: Option<String>,
    },

    /// Check internal links and transclusions without writing output
    Verify {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build {
            input,
            output,
            base_url,
        } => {
            let overrides = commands::BuildOverrides {
                input,
                output,
                base_url,
            };
            commands::build_site(&cli.config, overrides)
        }
        Commands::Verify { json } => commands::verify_site(&cli.config, json),
    }
}

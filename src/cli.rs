use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "dimagrab",
    version,
    about = "Resolve obfuscated episode stream links and download them"
)]
pub struct Cli {
    /// Log resolution details to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract (and optionally download) every episode of a stardima show
    Stardima(StardimaArgs),
    /// Interactively pick and download episodes from a dimakids page
    Dimakids {
        /// Page url; prompts for one when omitted
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Args)]
pub struct StardimaArgs {
    /// Show or episode url
    pub url: String,

    #[arg(value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Parallel resolution workers
    #[arg(short, long, default_value_t = 10)]
    pub workers: usize,

    /// Download episodes with yt-dlp instead of printing links
    #[arg(short, long)]
    pub download: bool,

    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(short, long, default_value_t = 3)]
    pub parallel_downloads: usize,

    /// Servers to try first, comma-separated (e.g. vk,uqload)
    #[arg(long, value_delimiter = ',')]
    pub prefer_servers: Vec<String>,

    /// Servers never to try, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub skip_servers: Vec<String>,

    /// Write {output-dir}/{title}/links.json with the first url of each episode
    #[arg(long)]
    pub export_links: bool,
}

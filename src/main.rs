mod app;
mod cli;
mod config;
mod http;
mod paths;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

fn setup_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn);
    builder.parse_env("RUST_LOG");

    if verbose {
        builder.filter_level(LevelFilter::Debug);
        for module in ["ureq", "rustls", "html5ever", "selectors"] {
            builder.filter_module(module, LevelFilter::Info);
        }
    }

    builder.format_timestamp_millis();
    builder.init();
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    setup_logger(cli.verbose);
    app::run(cli)
}

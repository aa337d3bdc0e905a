mod decode;
mod dimakids;
mod download;
mod enumerate;
mod episode;
mod export;
mod identify;
mod model;
mod orchestrate;
mod resolve;
mod stardima;
mod unwrap;


use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use log::debug;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::http::HttpClient;

use self::dimakids::{Prompter, run_dimakids};
use self::download::RetryPolicy;
use self::download::media::YtDlp;
use self::stardima::run_stardima;

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    debug!("config: {config:?}");
    let client = HttpClient::from_config(&config);

    match cli.command {
        Command::Stardima(args) => {
            let fetcher = YtDlp::new(&config.ytdlp_bin);
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            run_stardima(&args, &config, &client, &fetcher, &mut out)?;
            out.flush()?;
        }
        Command::Dimakids { url } => {
            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), io::stdout());
            run_dimakids(
                url.as_deref(),
                &client,
                RetryPolicy::from_config(&config),
                &mut prompter,
                Path::new("."),
            )?;
        }
    }

    Ok(())
}

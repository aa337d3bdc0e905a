use std::io::Write;
use std::path::Path;

use anyhow::{Result, bail};
use log::warn;

use crate::cli::{OutputFormat, StardimaArgs};
use crate::config::Config;
use crate::http::Transport;

use super::download::media::{MediaFetcher, download_candidates};
use super::download::{RetryPolicy, run_with_refresh};
use super::enumerate::{ProbeLimits, enumerate_catalog, enumerate_season_api, fetch_catalog_show};
use super::episode::replace_illegal_chars;
use super::export::{LinkExport, write_csv, write_json, write_link_export, write_table};
use super::identify::identify_url;
use super::model::{DiscoveryMode, DownloadOutcome, EpisodeRef, ResolvedEpisode, ShowIdentity};
use super::orchestrate::{resolve_all, run_pool};
use super::resolve::{CatalogResolver, LinkResolver, SeasonApiResolver};

const EXPECTED_FORMATS: &str = "expected one of:
  https://www.stardima.com/tvshow/<id>/play/<ep_id>
  https://watch.stardima.com/watch/tvshows/<slug>/
  https://watch.stardima.com/watch/episodes/<slug>-1x1/";

struct Discovery<'a> {
    show: ShowIdentity,
    episodes: Vec<EpisodeRef>,
    resolver: Box<dyn LinkResolver + 'a>,
}

fn discover<'a>(
    url: &str,
    config: &Config,
    transport: &'a dyn Transport,
) -> Result<Discovery<'a>> {
    let Some(found) = identify_url(url) else {
        bail!("could not extract a show from {url}\n{EXPECTED_FORMATS}");
    };
    let mut show = found.show();
    eprintln!("Extracting videos for: {}", show.id);
    eprintln!("[1/4] Fetching show info...");

    if found.mode == DiscoveryMode::SeasonApi {
        eprintln!("[2/4] Finding episodes...");
        let episodes = enumerate_season_api(transport, &mut show, found.episode_id.as_deref());
        let resolver = Box::new(SeasonApiResolver::new(transport, &show.id));
        return Ok(Discovery {
            show,
            episodes,
            resolver,
        });
    }

    let Some(catalog) = fetch_catalog_show(transport, &found.slug, found.mode) else {
        bail!("show not found: {}", found.slug);
    };
    show.title = Some(catalog.title);
    show.catalog_id = catalog.id;
    eprintln!("  Title: {}", show.display_title());

    eprintln!("[2/4] Finding episodes...");
    let episodes = enumerate_catalog(
        transport,
        &found.slug,
        config.aliases_for(&found.slug),
        ProbeLimits::from_config(config),
    );
    Ok(Discovery {
        show,
        episodes,
        resolver: Box::new(CatalogResolver::new(transport)),
    })
}

/// Batch extraction: identify, enumerate, resolve under `args.workers`, then
/// either print the links in `args.format` or download them.
pub(crate) fn run_stardima(
    args: &StardimaArgs,
    config: &Config,
    transport: &dyn Transport,
    fetcher: &dyn MediaFetcher,
    out: &mut impl Write,
) -> Result<()> {
    let Discovery {
        show,
        episodes,
        resolver,
    } = discover(&args.url, config, transport)?;
    eprintln!("  Found {} episodes", episodes.len());
    if episodes.is_empty() {
        bail!("no episodes found for {}", show.id);
    }

    eprintln!("[3/4] Extracting video URLs...");
    let summary = resolve_all(resolver.as_ref(), &episodes, args.workers, |done, total, label| {
        match label {
            Some(label) => eprint!("\r  Processed: {label} ({done}/{total})    "),
            None => eprint!("\r  Failed: episode {done}/{total}    "),
        }
    });
    eprintln!();
    if summary.failed > 0 {
        warn!("{} of {} episodes could not be resolved", summary.failed, episodes.len());
    }

    let title_dir = args.output_dir.join(replace_illegal_chars(show.display_title()));
    if args.export_links {
        let export = LinkExport::from_resolved(show.display_title(), &summary.resolved);
        let path = write_link_export(&title_dir, &export)?;
        eprintln!("  Link data saved to: {}", path.display());
    }

    if args.download {
        let outcomes = download_all(
            &summary.resolved,
            resolver.as_ref(),
            fetcher,
            &title_dir,
            args,
            RetryPolicy::from_config(config),
        );
        let downloaded = outcomes.iter().filter(|outcome| outcome.success).count();
        for outcome in outcomes.iter().filter(|outcome| !outcome.success) {
            eprintln!("  {outcome}");
        }
        eprintln!("Downloaded {downloaded}/{} episodes.", summary.resolved.len());
        return Ok(());
    }

    eprintln!("[4/4] Generating output...");
    match args.format {
        OutputFormat::Table => write_table(out, &show, &summary.resolved),
        OutputFormat::Json => write_json(out, &show, &summary.resolved),
        OutputFormat::Csv => write_csv(out, &summary.resolved),
    }
}

fn download_all(
    resolved: &[ResolvedEpisode],
    resolver: &dyn LinkResolver,
    fetcher: &dyn MediaFetcher,
    title_dir: &Path,
    args: &StardimaArgs,
    policy: RetryPolicy,
) -> Vec<DownloadOutcome> {
    eprintln!(
        "[4/4] Downloading {} episodes ({} parallel)...",
        resolved.len(),
        args.parallel_downloads
    );
    if !args.prefer_servers.is_empty() {
        eprintln!("  Preferred servers: {}", args.prefer_servers.join(", "));
    }
    if !args.skip_servers.is_empty() {
        eprintln!("  Skipping servers: {}", args.skip_servers.join(", "));
    }

    run_pool(
        resolved,
        args.parallel_downloads,
        |episode| {
            let outcome = run_with_refresh(
                &episode.label,
                episode.clone(),
                policy,
                |current| {
                    download_candidates(
                        fetcher,
                        current,
                        title_dir,
                        &args.prefer_servers,
                        &args.skip_servers,
                    )
                    .map(|_| ())
                },
                || resolver.resolve(&episode.episode),
            );
            if outcome.success {
                eprintln!("  {}: downloaded", outcome.key);
            }
            outcome
        },
        |_, _, _| {},
    )
}

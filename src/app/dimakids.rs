use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::http::Transport;

use super::download::segmented::{SegmentProgress, download_playlist};
use super::download::{RetryPolicy, run_with_refresh};
use super::enumerate::fetch_page_listing;
use super::episode::{episode_file_name, format_speed, parse_episode_selection, strip_illegal_chars};
use super::export::{LinkExport, write_link_export};
use super::identify::identify_page_url;
use super::model::{DownloadOutcome, EpisodeRef};
use super::orchestrate::resolve_all;
use super::resolve::{LinkResolver, PageResolver};

const BAR_WIDTH: usize = 20;

/// Line-oriented prompts over any reader/writer pair.
pub(crate) struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// `None` once input is exhausted.
    pub(crate) fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line).context("failed to read input")? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub(crate) fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }
}

pub(crate) fn progress_line(file_name: &str, progress: &SegmentProgress) -> String {
    let fraction = progress.fraction();
    let filled = ((BAR_WIDTH as f64) * fraction) as usize;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH.saturating_sub(filled)));
    format!(
        "\rDownloading {file_name}: [{bar}] {:.1}% | {}",
        fraction * 100.0,
        format_speed(progress.bytes_per_sec())
    )
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct PageReport {
    pub(crate) downloaded: Vec<u32>,
    pub(crate) failed: Vec<u32>,
}

/// One page from listing to finished downloads. Returns `None` when the user
/// backs out, nothing resolves, or the download is declined.
pub(crate) fn process_page<R: BufRead, W: Write>(
    transport: &dyn Transport,
    policy: RetryPolicy,
    prompter: &mut Prompter<R, W>,
    base_dir: &Path,
    page_url: &str,
) -> Result<Option<PageReport>> {
    prompter.say("Scraping details from URL...")?;
    let (listing, html) = match fetch_page_listing(transport, page_url) {
        Ok(found) => found,
        Err(err) => {
            prompter.say(&format!("Error: {err:#}"))?;
            return Ok(None);
        }
    };
    prompter.say(&format!("{}: {} episode(s) found", listing.title, listing.episodes.len()))?;
    if listing.episodes.is_empty() {
        prompter.say("Could not find any episodes on this page.")?;
        return Ok(None);
    }
    let total = listing.episodes.len();

    let numbers = if listing.is_movie {
        vec![1]
    } else {
        let Some(answer) = prompter
            .ask("Enter episode numbers to download (e.g. 1, 3-5, all) or 'b' to go back: ")?
        else {
            return Ok(None);
        };
        if answer.eq_ignore_ascii_case("b") {
            return Ok(None);
        }
        let selection = parse_episode_selection(&answer, total as u32);
        for warning in &selection.warnings {
            prompter.say(&format!("Warning: {warning}"))?;
        }
        selection.episodes
    };
    if numbers.is_empty() {
        prompter.say("No valid episodes selected.")?;
        return Ok(None);
    }

    let selected: Vec<EpisodeRef> = numbers
        .iter()
        .filter_map(|number| listing.episodes.iter().find(|ep| ep.number == *number))
        .cloned()
        .collect();

    prompter.say("Finding and resolving stream links...")?;
    let resolver = if listing.is_movie {
        PageResolver::with_prefetched(transport, page_url, html)
    } else {
        PageResolver::new(transport)
    };
    let summary = resolve_all(&resolver, &selected, 1, |done, total, label| {
        if label.is_none() {
            eprintln!("Could not find a stream link for selection {done}/{total}.");
        }
    });
    if summary.resolved.is_empty() {
        prompter.say("Could not resolve any download links for the selected episodes.")?;
        return Ok(None);
    }

    let safe_title = strip_illegal_chars(&listing.title);
    let folder = base_dir.join(&safe_title);
    let export = LinkExport {
        title: listing.title.clone(),
        episodes: summary
            .resolved
            .iter()
            .filter_map(|resolved| {
                resolved
                    .url_for("hls")
                    .map(|url| (resolved.episode.number, url.to_string()))
            })
            .collect::<BTreeMap<_, _>>(),
    };
    let links_path = write_link_export(&folder, &export)?;
    prompter.say(&format!("Link data saved to: {}", links_path.display()))?;

    let confirmed = prompter
        .ask("Proceed with download? (y/n): ")?
        .is_some_and(|answer| answer.eq_ignore_ascii_case("y"));
    if !confirmed {
        prompter.say("Download cancelled.")?;
        return Ok(None);
    }
    prompter.say(&format!("Downloads will be saved in folder: {}", folder.display()))?;

    let mut report = PageReport::default();
    for resolved in &summary.resolved {
        let number = resolved.episode.number;
        let movie_title = listing.is_movie.then_some(safe_title.as_str());
        let file_name = episode_file_name(number, total, movie_title);
        let dest = folder.join(&file_name);
        let Some(first_url) = resolved.url_for("hls") else {
            report.failed.push(number);
            continue;
        };

        let outcome: DownloadOutcome = run_with_refresh(
            &file_name,
            first_url.to_string(),
            policy,
            |url| {
                let result = download_playlist(transport, url, &resolved.episode.link, &dest, |p| {
                    eprint!("{}", progress_line(&file_name, p));
                });
                eprintln!();
                result.map(|_| ())
            },
            || {
                resolver
                    .resolve(&resolved.episode)
                    .and_then(|fresh| fresh.url_for("hls").map(str::to_string))
            },
        );
        if outcome.success {
            report.downloaded.push(number);
        } else {
            prompter.say(&format!("Download error: {outcome}"))?;
            report.failed.push(number);
        }
    }

    report.downloaded.sort_unstable();
    report.failed.sort_unstable();
    prompter.say("--- Final Download Summary ---")?;
    if !report.downloaded.is_empty() {
        prompter.say(&format!("Successfully downloaded episodes: {}", join_numbers(&report.downloaded)))?;
    }
    if !report.failed.is_empty() {
        prompter.say(&format!("Failed to download episodes: {}", join_numbers(&report.failed)))?;
    }
    Ok(Some(report))
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Processes `url` once, or prompts for page urls until `q`/`quit` or end of input.
pub(crate) fn run_dimakids<R: BufRead, W: Write>(
    url: Option<&str>,
    transport: &dyn Transport,
    policy: RetryPolicy,
    prompter: &mut Prompter<R, W>,
    base_dir: &Path,
) -> Result<()> {
    if let Some(url) = url {
        if identify_page_url(url).is_none() {
            bail!("not a dimakids.com url: {url}");
        }
        process_page(transport, policy, prompter, base_dir, url)?;
        return Ok(());
    }

    while let Some(input) = prompter.ask("Paste a URL from dimakids.com (or 'q' to quit): ")? {
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        match identify_page_url(&input) {
            Some(show) => {
                process_page(transport, policy, prompter, base_dir, &show.id)?;
                prompter.say(&"-".repeat(80))?;
            }
            None => prompter.say("Invalid URL. Please paste a valid link from dimakids.com.")?,
        }
    }
    prompter.say("Goodbye!")?;
    Ok(())
}

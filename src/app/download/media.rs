use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, warn};
use url::Url;

use crate::app::model::ResolvedEpisode;
use crate::app::unwrap::unwrap_embed_redirect;

/// Orders an episode's servers for download: `prefer` first in its own order,
/// then everything else in discovery order. Names in `skip` are dropped. Both
/// lists match case-insensitively.
pub(crate) fn order_candidates<'a>(
    resolved: &'a ResolvedEpisode,
    prefer: &[String],
    skip: &[String],
) -> Vec<(&'static str, &'a str)> {
    let rank = |name: &str| {
        prefer
            .iter()
            .position(|wanted| wanted.eq_ignore_ascii_case(name))
            .unwrap_or(usize::MAX)
    };

    let mut candidates: Vec<_> = resolved
        .available()
        .filter(|&(name, _)| !skip.iter().any(|skipped| skipped.eq_ignore_ascii_case(name)))
        .collect();
    candidates.sort_by_key(|&(name, _)| rank(name));
    candidates
}

/// `Referer` (`scheme://host/`) and `Origin` (`scheme://host`) for a url.
pub(crate) fn origin_headers(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    if parsed.host_str().is_none() {
        return None;
    }
    let origin = parsed.origin().ascii_serialization();
    Some((format!("{origin}/"), origin))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MediaRequest {
    pub(crate) url: String,
    pub(crate) referer: Option<String>,
    pub(crate) origin: Option<String>,
    pub(crate) output_template: PathBuf,
}

pub(crate) trait MediaFetcher: Sync {
    fn fetch(&self, request: &MediaRequest) -> Result<()>;
}

/// Delegates to an external `yt-dlp` binary.
pub(crate) struct YtDlp {
    bin: PathBuf,
}

impl YtDlp {
    pub(crate) fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    fn command(&self, request: &MediaRequest) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.args([
            "--format",
            "bestvideo+bestaudio/best",
            "--merge-output-format",
            "mp4",
            "--quiet",
            "--no-warnings",
            "--no-progress",
        ]);
        if let Some(referer) = &request.referer {
            cmd.arg("--add-header").arg(format!("Referer:{referer}"));
        }
        if let Some(origin) = &request.origin {
            cmd.arg("--add-header").arg(format!("Origin:{origin}"));
        }
        cmd.arg("--output")
            .arg(&request.output_template)
            .arg(&request.url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl MediaFetcher for YtDlp {
    fn fetch(&self, request: &MediaRequest) -> Result<()> {
        let output = self
            .command(request)
            .output()
            .with_context(|| format!("failed to launch {}", self.bin.display()))?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("no error output");
        bail!("{} exited with {}: {}", self.bin.display(), output.status, reason.trim())
    }
}

/// Tries each ordered candidate until the fetcher succeeds. Output lands at
/// `{title_dir}/{label}.%(ext)s`. Returns the server that worked.
pub(crate) fn download_candidates(
    fetcher: &dyn MediaFetcher,
    resolved: &ResolvedEpisode,
    title_dir: &Path,
    prefer: &[String],
    skip: &[String],
) -> Result<&'static str> {
    let candidates = order_candidates(resolved, prefer, skip);
    if candidates.is_empty() {
        bail!("no valid urls found");
    }
    fs::create_dir_all(title_dir)
        .with_context(|| format!("failed to create {}", title_dir.display()))?;
    let output_template = title_dir.join(format!("{}.%(ext)s", resolved.label));

    let mut last_error = None;
    for (server, url) in candidates {
        let url = unwrap_embed_redirect(url);
        let (referer, origin) = origin_headers(&url).unzip();
        let request = MediaRequest {
            url,
            referer,
            origin,
            output_template: output_template.clone(),
        };

        eprintln!("  {}: trying {server}...", resolved.label);
        match fetcher.fetch(&request) {
            Ok(()) => {
                debug!("{} downloaded from {server}", resolved.label);
                return Ok(server);
            }
            Err(err) => {
                warn!("{}: {server} failed: {err:#}", resolved.label);
                last_error = Some(err);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow!("no server attempted"))
        .context("all servers failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::model::{EpisodeRef, ServerSet};
    use std::sync::Mutex;

    fn resolved(urls: [Option<&str>; 5]) -> ResolvedEpisode {
        ResolvedEpisode::new(
            EpisodeRef {
                id: "1".to_string(),
                season: 1,
                number: 4,
                slug: "show-1x4".to_string(),
                link: String::new(),
            },
            "S1E4".to_string(),
            ServerSet::Standard,
            urls.iter().map(|url| url.map(str::to_string)).collect(),
            None,
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[derive(Default)]
    struct Recorder {
        fail_hosts: Vec<&'static str>,
        seen: Mutex<Vec<MediaRequest>>,
    }

    impl MediaFetcher for Recorder {
        fn fetch(&self, request: &MediaRequest) -> Result<()> {
            self.seen.lock().expect("lock seen").push(request.clone());
            if self.fail_hosts.iter().any(|host| request.url.contains(host)) {
                bail!("unsupported url");
            }
            Ok(())
        }
    }

    #[test]
    fn candidates_follow_preference_then_discovery_order() {
        let episode = resolved([
            Some("https://vudeo.test/1"),
            Some("https://uqload.test/2"),
            None,
            Some("https://goodstream.test/4"),
            Some("https://vk.test/5"),
        ]);

        let ordered = order_candidates(&episode, &names(&["VK", "goodstream"]), &names(&["Uqload"]));
        let servers: Vec<_> = ordered.iter().map(|(name, _)| *name).collect();
        assert_eq!(servers, ["vk", "goodstream", "vudeo"]);

        let plain = order_candidates(&episode, &[], &[]);
        let servers: Vec<_> = plain.iter().map(|(name, _)| *name).collect();
        assert_eq!(servers, ["vudeo", "uqload", "goodstream", "vk"]);
    }

    #[test]
    fn origin_headers_come_from_the_url() {
        assert_eq!(
            origin_headers("https://uqload.test:8443/embed-1.html?x=1"),
            Some((
                "https://uqload.test:8443/".to_string(),
                "https://uqload.test:8443".to_string()
            ))
        );
        assert_eq!(origin_headers("not a url"), None);
    }

    #[test]
    fn falls_through_to_next_server_and_unwraps_redirects() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let title_dir = dir.path().join("My_Show");
        let episode = resolved([
            Some("https://vudeo.test/1"),
            Some("https://strema.top/embed2/?id=https%3A%2F%2Fuqload.test%2Fe%2F2"),
            None,
            None,
            None,
        ]);
        let fetcher = Recorder {
            fail_hosts: vec!["vudeo.test"],
            ..Recorder::default()
        };

        let server = download_candidates(&fetcher, &episode, &title_dir, &[], &[])
            .expect("second server should work");

        assert_eq!(server, "uqload");
        assert!(title_dir.is_dir());
        let seen = fetcher.seen.lock().expect("lock seen");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].url, "https://uqload.test/e/2");
        assert_eq!(seen[1].referer.as_deref(), Some("https://uqload.test/"));
        assert_eq!(seen[1].origin.as_deref(), Some("https://uqload.test"));
        assert_eq!(seen[1].output_template, title_dir.join("S1E4.%(ext)s"));
    }

    #[test]
    fn no_candidates_or_all_failing_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let empty = resolved([None, None, None, None, None]);
        let fetcher = Recorder::default();
        let err = download_candidates(&fetcher, &empty, dir.path(), &[], &[])
            .expect_err("nothing to try");
        assert_eq!(err.to_string(), "no valid urls found");

        let episode = resolved([Some("https://vudeo.test/1"), None, None, None, None]);
        let failing = Recorder {
            fail_hosts: vec!["vudeo.test"],
            ..Recorder::default()
        };
        let err = download_candidates(&failing, &episode, dir.path(), &[], &[])
            .expect_err("only server fails");
        assert!(format!("{err:#}").starts_with("all servers failed"));
    }

    #[test]
    fn ytdlp_command_carries_headers_and_template() {
        let request = MediaRequest {
            url: "https://vk.test/v".to_string(),
            referer: Some("https://vk.test/".to_string()),
            origin: Some("https://vk.test".to_string()),
            output_template: PathBuf::from("/out/Show/S1E1.%(ext)s"),
        };
        let cmd = YtDlp::new("/opt/yt-dlp").command(&request);
        let args: Vec<_> = cmd.get_args().map(|arg| arg.to_string_lossy().into_owned()).collect();

        assert_eq!(cmd.get_program(), "/opt/yt-dlp");
        assert!(args.windows(2).any(|pair| pair == ["--add-header", "Referer:https://vk.test/"]));
        assert!(args.windows(2).any(|pair| pair == ["--add-header", "Origin:https://vk.test"]));
        assert!(args.windows(2).any(|pair| pair == ["--output", "/out/Show/S1E1.%(ext)s"]));
        assert_eq!(args.last().map(String::as_str), Some("https://vk.test/v"));
    }

    #[test]
    fn missing_binary_is_reported() {
        let request = MediaRequest {
            url: "https://vk.test/v".to_string(),
            referer: None,
            origin: None,
            output_template: PathBuf::from("unused.%(ext)s"),
        };
        let err = YtDlp::new("/definitely/missing/yt-dlp")
            .fetch(&request)
            .expect_err("binary does not exist");
        assert!(err.to_string().contains("failed to launch"));
    }
}

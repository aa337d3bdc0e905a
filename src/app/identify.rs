use std::sync::LazyLock;

use regex::Regex;

use super::model::{DiscoveryMode, ShowIdentity};

static NEW_LAYOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"www\.stardima\.com/tvshow/([^/#?]+)(?:/play/(\d+))?").expect("valid regex")
});
static LEGACY_SHOW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/tvshows/([^/#?]+)").expect("valid regex"));
static LEGACY_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/episodes/([^/#?]+)").expect("valid regex"));
static SEASON_EPISODE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+x\d+$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UrlMatch {
    pub(crate) slug: String,
    pub(crate) mode: DiscoveryMode,
    pub(crate) episode_id: Option<String>,
}

impl UrlMatch {
    pub(crate) fn show(&self) -> ShowIdentity {
        ShowIdentity::new(self.slug.clone(), self.mode)
    }
}

/// Classifies a catalog url. Matchers run newest layout first; `None` means
/// the url is not one this tool understands.
pub(crate) fn identify_url(raw: &str) -> Option<UrlMatch> {
    let raw = raw.trim();

    if let Some(caps) = NEW_LAYOUT.captures(raw) {
        return Some(UrlMatch {
            slug: caps[1].to_string(),
            mode: DiscoveryMode::SeasonApi,
            episode_id: caps.get(2).map(|m| m.as_str().to_string()),
        });
    }

    if let Some(caps) = LEGACY_SHOW.captures(raw) {
        return Some(UrlMatch {
            slug: caps[1].to_string(),
            mode: DiscoveryMode::CatalogShow,
            episode_id: None,
        });
    }

    if let Some(caps) = LEGACY_EPISODE.captures(raw) {
        return Some(UrlMatch {
            slug: strip_season_episode_suffix(&caps[1]),
            mode: DiscoveryMode::CatalogEpisode,
            episode_id: None,
        });
    }

    None
}

pub(crate) fn strip_season_episode_suffix(episode_slug: &str) -> String {
    SEASON_EPISODE_SUFFIX.replace(episode_slug, "").into_owned()
}

/// Listing pages are accepted by host alone; the page itself decides whether it
/// is a series or a movie.
pub(crate) fn identify_page_url(raw: &str) -> Option<ShowIdentity> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    let host = parsed.host_str()?;
    if host == "dimakids.com" || host.ends_with(".dimakids.com") {
        return Some(ShowIdentity::new(parsed.as_str(), DiscoveryMode::PageListing));
    }
    None
}

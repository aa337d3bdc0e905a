use std::collections::BTreeMap;
use std::sync::Mutex;

use log::debug;
use serde_json::Value;

use crate::http::{Transport, XHR_HEADER, get_json};

use super::decode::{EmbedTarget, SERVER_SLOTS, fetch_embed_slot, find_player_stream};
use super::enumerate::{SEASON_SITE, number_field_or};
use super::episode::parse_episode_key;
use super::model::{EpisodeRef, ResolvedEpisode, ServerSet};
use super::unwrap::{WRAPPER_FALLBACK, is_wrapper_url, unwrap_wrapper};

/// Turns one episode into its per-server stream urls. `None` means nothing
/// usable was found; callers treat it as a per-item failure.
pub(crate) trait LinkResolver: Sync {
    fn resolve(&self, episode: &EpisodeRef) -> Option<ResolvedEpisode>;
}

/// Positions the unwrapper's named results onto the wrapped server set.
pub(crate) fn remap_wrapped(resolved: &BTreeMap<String, String>) -> Vec<Option<String>> {
    let get = |name: &str| resolved.get(name).cloned();
    vec![
        get("uqload"),
        get("earnvids").or_else(|| get("streamhg")),
        get("darkibox"),
        get("goodstream"),
        get(WRAPPER_FALLBACK),
    ]
}

/// Legacy catalog episodes: five AJAX player slots per post.
pub(crate) struct CatalogResolver<'a> {
    transport: &'a dyn Transport,
}

impl<'a> CatalogResolver<'a> {
    pub(crate) fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }
}

impl LinkResolver for CatalogResolver<'_> {
    fn resolve(&self, episode: &EpisodeRef) -> Option<ResolvedEpisode> {
        let label = parse_episode_key(&episode.id, &episode.slug).to_string();
        let mut wrapper = None;
        let slots: Vec<Option<String>> = SERVER_SLOTS
            .map(|slot| match fetch_embed_slot(self.transport, &episode.id, slot) {
                Some(EmbedTarget::Direct(url)) => Some(url),
                Some(EmbedTarget::Wrapper(url)) => {
                    wrapper = Some(url);
                    None
                }
                None => None,
            })
            .collect();

        if let Some(wrapper) = wrapper
            && slots.iter().all(Option::is_none)
        {
            debug!("{label}: all slots wrapped, unwrapping {wrapper}");
            let resolved = unwrap_wrapper(self.transport, &wrapper);
            return Some(ResolvedEpisode::new(
                episode.clone(),
                label,
                ServerSet::Wrapped,
                remap_wrapped(&resolved),
                Some(wrapper),
            ));
        }

        Some(ResolvedEpisode::new(
            episode.clone(),
            label,
            ServerSet::Standard,
            slots,
            None,
        ))
    }
}

/// New-site episodes: one JSON lookup per episode id.
pub(crate) struct SeasonApiResolver<'a> {
    transport: &'a dyn Transport,
    show_id: String,
}

impl<'a> SeasonApiResolver<'a> {
    pub(crate) fn new(transport: &'a dyn Transport, show_id: &str) -> Self {
        Self {
            transport,
            show_id: show_id.to_string(),
        }
    }
}

impl LinkResolver for SeasonApiResolver<'_> {
    fn resolve(&self, episode: &EpisodeRef) -> Option<ResolvedEpisode> {
        let url = format!("{SEASON_SITE}/series/episode/{}", episode.id);
        let body = match get_json(self.transport, &url, &[XHR_HEADER]) {
            Ok(body) => body,
            Err(err) => {
                debug!("episode {} lookup failed: {err}", episode.id);
                return None;
            }
        };
        let data = body.get("episode").unwrap_or(&body);
        let watch_url = data
            .get("watch_url")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if watch_url.is_empty() {
            return None;
        }

        let season = number_field_or(data, &["season_number", "season"], episode.season);
        let number = number_field_or(data, &["episode_number", "number"], episode.number);
        let refreshed = EpisodeRef {
            season,
            number,
            slug: format!("{}-{season}x{number}", self.show_id),
            link: watch_url.to_string(),
            ..episode.clone()
        };
        let label = format!("S{season}E{number}");

        if is_wrapper_url(watch_url) {
            let resolved = unwrap_wrapper(self.transport, watch_url);
            return Some(ResolvedEpisode::new(
                refreshed,
                label,
                ServerSet::Wrapped,
                remap_wrapped(&resolved),
                Some(watch_url.to_string()),
            ));
        }

        Some(ResolvedEpisode::new(
            refreshed,
            label,
            ServerSet::Direct,
            vec![Some(watch_url.to_string())],
            Some(watch_url.to_string()),
        ))
    }
}

/// Listing-page episodes: the page itself carries the obfuscated player
/// script. A movie page that was already fetched during enumeration is used
/// once; later calls (link refreshes) fetch it again.
pub(crate) struct PageResolver<'a> {
    transport: &'a dyn Transport,
    prefetched: Mutex<Option<(String, String)>>,
}

impl<'a> PageResolver<'a> {
    pub(crate) fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            prefetched: Mutex::new(None),
        }
    }

    pub(crate) fn with_prefetched(transport: &'a dyn Transport, url: &str, html: String) -> Self {
        Self {
            transport,
            prefetched: Mutex::new(Some((url.to_string(), html))),
        }
    }

    fn take_prefetched(&self, url: &str) -> Option<String> {
        let mut slot = self.prefetched.lock().ok()?;
        if slot.as_ref().is_some_and(|(cached_url, _)| cached_url == url) {
            slot.take().map(|(_, html)| html)
        } else {
            None
        }
    }
}

impl LinkResolver for PageResolver<'_> {
    fn resolve(&self, episode: &EpisodeRef) -> Option<ResolvedEpisode> {
        let html = match self.take_prefetched(&episode.link) {
            Some(html) => html,
            None => match self.transport.get_text(&episode.link, &[]) {
                Ok(html) => html,
                Err(err) => {
                    debug!("episode page {} failed: {err}", episode.link);
                    return None;
                }
            },
        };

        let Some(stream) = find_player_stream(&html) else {
            debug!("no player stream on {}", episode.link);
            return None;
        };
        Some(ResolvedEpisode::new(
            episode.clone(),
            format!("S{}E{}", episode.season, episode.number),
            ServerSet::Hls,
            vec![Some(stream.clone())],
            Some(stream),
        ))
    }
}

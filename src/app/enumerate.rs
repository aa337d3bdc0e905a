use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use log::{debug, info};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::config::Config;
use crate::http::{Transport, XHR_HEADER, get_json, with_query};

use super::episode::parse_episode_key;
use super::model::{DiscoveryMode, EpisodeRef, ShowIdentity};

pub(crate) const SEASON_SITE: &str = "https://www.stardima.com";
pub(crate) const CATALOG_API: &str = "https://watch.stardima.com/watch/wp-json/wp/v2";

static SEASON_DATA_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-season-id=["'](\d+)["']"#).expect("valid regex"));
static SEASON_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/series/season/(\d+)").expect("valid regex"));
static SEASON_SCRIPT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"seasonId["']?\s*:\s*["']?(\d+)"#).expect("valid regex"));
static PAGE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>([^<]+)</title>").expect("valid regex"));
static EPISODE_TITLE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*\d+[x×]\d+.*$").expect("valid regex"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Upper bounds for brute-force `{slug}-{s}x{e}` probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProbeLimits {
    pub(crate) max_seasons: u32,
    pub(crate) max_episodes: u32,
    pub(crate) miss_limit: u32,
}

impl ProbeLimits {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            max_seasons: config.probe_max_seasons,
            max_episodes: config.probe_max_episodes,
            miss_limit: config.probe_miss_limit.max(1),
        }
    }
}

impl Default for ProbeLimits {
    fn default() -> Self {
        Self {
            max_seasons: 5,
            max_episodes: 99,
            miss_limit: 3,
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn value_to_u32(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Reads the first present key among `keys`, falling back to `default`.
pub(crate) fn number_field_or(entry: &Value, keys: &[&str], default: u32) -> u32 {
    keys.iter()
        .find_map(|key| value_to_u32(entry.get(*key)))
        .unwrap_or(default)
}

fn html_text(raw: &str) -> String {
    Html::parse_fragment(raw)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn extract_page_title(html: &str) -> Option<String> {
    let caps = PAGE_TITLE.captures(html)?;
    let title = html_text(&caps[1]);
    let title = title.split(" - ").next().unwrap_or(&title).trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Season ids from the three places the show page mentions them, de-duplicated
/// in first-seen order.
pub(crate) fn extract_season_ids(html: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    [&*SEASON_DATA_ATTR, &*SEASON_PATH, &*SEASON_SCRIPT_KEY]
        .into_iter()
        .flat_map(|re| re.captures_iter(html).map(|caps| caps[1].to_string()))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

pub(crate) fn parse_season_episodes(show_id: &str, body: &Value) -> Vec<EpisodeRef> {
    let Some(entries) = body.get("episodes").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = value_to_string(entry.get("id")?)?;
            let season = number_field_or(entry, &["season_number", "season"], 1);
            let number = number_field_or(entry, &["episode_number", "number"], 1);
            Some(EpisodeRef {
                id,
                season,
                number,
                slug: format!("{show_id}-{season}x{number}"),
                link: entry
                    .get("watch_url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

/// Season-API discovery. Fills `show.title` from the first page that has one.
pub(crate) fn enumerate_season_api(
    transport: &dyn Transport,
    show: &mut ShowIdentity,
    episode_id: Option<&str>,
) -> Vec<EpisodeRef> {
    let show_url = format!("{SEASON_SITE}/tvshow/{}", show.id);
    let mut season_ids = Vec::new();

    match transport.get_text(&show_url, &[]) {
        Ok(html) => {
            show.title = extract_page_title(&html);
            season_ids = extract_season_ids(&html);
        }
        Err(err) => debug!("show page {show_url} failed: {err}"),
    }

    if season_ids.is_empty()
        && let Some(episode_id) = episode_id
    {
        let play_url = format!("{show_url}/play/{episode_id}");
        match transport.get_text(&play_url, &[]) {
            Ok(html) => {
                season_ids = extract_season_ids(&html);
                if show.title.is_none() {
                    show.title = extract_page_title(&html);
                }
            }
            Err(err) => debug!("play page {play_url} failed: {err}"),
        }
    }
    info!("show {}: {} season(s) listed", show.id, season_ids.len());

    let mut episodes: Vec<EpisodeRef> = season_ids
        .iter()
        .flat_map(|season_id| {
            let url = format!("{SEASON_SITE}/series/season/{season_id}");
            match get_json(transport, &url, &[XHR_HEADER]) {
                Ok(body) => parse_season_episodes(&show.id, &body),
                Err(err) => {
                    debug!("season {season_id} failed: {err}");
                    Vec::new()
                }
            }
        })
        .collect();

    let mut seen = BTreeSet::new();
    episodes.retain(|episode| seen.insert(episode.id.clone()));

    if episodes.is_empty()
        && let Some(episode_id) = episode_id
    {
        info!("no seasons found, falling back to episode {episode_id} from the url");
        episodes.push(EpisodeRef {
            id: episode_id.to_string(),
            season: 1,
            number: 1,
            slug: format!("{}-1x1", show.id),
            link: String::new(),
        });
    }

    episodes
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CatalogShow {
    pub(crate) id: Option<u64>,
    pub(crate) title: String,
}

fn rendered_title(entry: &Value) -> Option<String> {
    let raw = entry.pointer("/title/rendered")?.as_str()?;
    Some(html_text(raw))
}

/// Looks the show up by slug; shows entered from an episode url may be missing
/// from the show index, in which case the title comes from their first episode.
pub(crate) fn fetch_catalog_show(
    transport: &dyn Transport,
    slug: &str,
    mode: DiscoveryMode,
) -> Option<CatalogShow> {
    let url = with_query(&format!("{CATALOG_API}/tvshows"), &[("slug", slug)]);
    match get_json(transport, &url, &[]) {
        Ok(Value::Array(items)) if !items.is_empty() => {
            let entry = &items[0];
            return Some(CatalogShow {
                id: entry.get("id").and_then(Value::as_u64),
                title: rendered_title(entry).unwrap_or_else(|| slug.to_string()),
            });
        }
        Ok(_) => {}
        Err(err) => debug!("show lookup for {slug} failed: {err}"),
    }

    if mode != DiscoveryMode::CatalogEpisode {
        return None;
    }

    let first = format!("{slug}-1x1");
    let url = with_query(&format!("{CATALOG_API}/episodes"), &[("slug", first.as_str())]);
    let items = get_json(transport, &url, &[]).ok()?;
    let title = rendered_title(items.as_array()?.first()?)?;
    Some(CatalogShow {
        id: None,
        title: EPISODE_TITLE_SUFFIX.replace(&title, "").trim().to_string(),
    })
}

fn catalog_entries(body: &Value) -> Vec<(String, String)> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let id = value_to_string(item.get("id")?)?;
                    let slug = item.get("slug")?.as_str()?;
                    let slug = urlencoding::decode(slug)
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| slug.to_string());
                    Some((id, slug))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Free-text search over the episode index. Returned slugs must contain the
/// show slug or one of its aliases' slug forms.
pub(crate) fn search_catalog_episodes(
    transport: &dyn Transport,
    slug: &str,
    aliases: &[String],
) -> BTreeMap<String, String> {
    let mut terms = vec![slug.to_string(), slug.replace('-', " ")];
    terms.extend(aliases.iter().cloned());
    terms.dedup();

    let slug_lower = slug.to_lowercase();
    let alias_slugs: Vec<String> = aliases
        .iter()
        .map(|alias| alias.to_lowercase().replace(' ', "-"))
        .collect();

    let mut found = BTreeMap::new();
    for term in &terms {
        let url = with_query(
            &format!("{CATALOG_API}/episodes"),
            &[("search", term.as_str()), ("per_page", "100")],
        );
        let body = match get_json(transport, &url, &[]) {
            Ok(body) => body,
            Err(err) => {
                debug!("episode search '{term}' failed: {err}");
                continue;
            }
        };

        for (id, episode_slug) in catalog_entries(&body) {
            let lower = episode_slug.to_lowercase();
            let belongs = lower.contains(&slug_lower)
                || alias_slugs.iter().any(|alias| lower.contains(alias.as_str()));
            if belongs {
                found.insert(id, episode_slug);
            }
        }
    }
    found
}

/// Probes `{slug}-{s}x{e}` one by one. A season ends after `miss_limit`
/// consecutive misses; failed requests count as misses.
pub(crate) fn probe_catalog_episodes(
    transport: &dyn Transport,
    slug: &str,
    limits: ProbeLimits,
) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();

    for season in 1..=limits.max_seasons {
        let mut consecutive_misses = 0;
        for episode in 1..=limits.max_episodes {
            let probe = format!("{slug}-{season}x{episode}");
            let url = with_query(&format!("{CATALOG_API}/episodes"), &[("slug", probe.as_str())]);

            let hit = match get_json(transport, &url, &[]) {
                Ok(body) => catalog_entries(&body).into_iter().next(),
                Err(err) => {
                    debug!("probe {probe} failed: {err}");
                    None
                }
            };

            match hit {
                Some((id, episode_slug)) => {
                    found.insert(id, episode_slug);
                    consecutive_misses = 0;
                }
                None => {
                    consecutive_misses += 1;
                    if consecutive_misses >= limits.miss_limit {
                        break;
                    }
                }
            }
        }
    }
    found
}

fn catalog_episode(id: String, slug: String) -> EpisodeRef {
    let (season, number) = parse_episode_key(&id, &slug)
        .season_episode()
        .unwrap_or((1, 1));
    EpisodeRef {
        id,
        season,
        number,
        slug,
        link: String::new(),
    }
}

/// Legacy catalog discovery: search and probing merged by episode id.
pub(crate) fn enumerate_catalog(
    transport: &dyn Transport,
    slug: &str,
    aliases: &[String],
    limits: ProbeLimits,
) -> Vec<EpisodeRef> {
    let mut found = search_catalog_episodes(transport, slug, aliases);
    info!("search found {} episode(s) for {slug}", found.len());
    let probed = probe_catalog_episodes(transport, slug, limits);
    info!("probing found {} episode(s) for {slug}", probed.len());
    found.extend(probed);

    found
        .into_iter()
        .map(|(id, episode_slug)| catalog_episode(id, episode_slug))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageListing {
    pub(crate) title: String,
    pub(crate) episodes: Vec<EpisodeRef>,
    pub(crate) is_movie: bool,
}

/// Listing pages keep their episodes in `div.moviesBlocks`; a page without that
/// container is a single movie whose stream lives on the page itself.
pub(crate) fn parse_page_listing(page_url: &str, html: &str) -> PageListing {
    let document = Html::parse_document(html);
    let select = |css: &str| Selector::parse(css).ok();

    let title = select("h1.text-center")
        .and_then(|sel| document.select(&sel).next())
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "Unknown Title".to_string());

    let container = select("div.moviesBlocks").and_then(|sel| document.select(&sel).next());
    let Some(container) = container else {
        return PageListing {
            title,
            episodes: vec![EpisodeRef {
                id: page_url.to_string(),
                season: 1,
                number: 1,
                slug: String::new(),
                link: page_url.to_string(),
            }],
            is_movie: true,
        };
    };

    let (Some(movie_sel), Some(link_sel), Some(badge_sel)) =
        (select("div.movie"), select("a"), select("div.badge-overd"))
    else {
        return PageListing {
            title,
            episodes: Vec::new(),
            is_movie: false,
        };
    };
    let base = url::Url::parse(page_url).ok();

    let episodes = container
        .select(&movie_sel)
        .filter_map(|movie| {
            let href = movie.select(&link_sel).next()?.value().attr("href")?;
            let badge = movie.select(&badge_sel).next()?.text().collect::<String>();
            let number = FIRST_NUMBER.find(&badge)?.as_str().parse::<u32>().ok()?;
            let link = match &base {
                Some(base) => base.join(href).ok()?.to_string(),
                None => href.to_string(),
            };
            Some(EpisodeRef {
                id: number.to_string(),
                season: 1,
                number,
                slug: String::new(),
                link,
            })
        })
        .collect();

    PageListing {
        title,
        episodes,
        is_movie: false,
    }
}

pub(crate) fn fetch_page_listing(
    transport: &dyn Transport,
    page_url: &str,
) -> Result<(PageListing, String)> {
    let html = transport
        .get_text(page_url, &[])
        .with_context(|| format!("failed to fetch page {page_url}"))?;
    Ok((parse_page_listing(page_url, &html), html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Canned, FakeTransport};
    use serde_json::json;

    fn probe_url(slug: &str) -> String {
        with_query(&format!("{CATALOG_API}/episodes"), &[("slug", slug)])
    }

    #[test]
    fn season_ids_are_deduplicated_across_patterns() {
        let html = r#"
            <li data-season-id="41">S1</li><li data-season-id='42'>S2</li>
            <a href="/series/season/41">again</a>
            <script>load({ seasonId: 43 }); load({"seasonId":"42"})</script>
        "#;
        assert_eq!(extract_season_ids(html), ["41", "42", "43"]);
    }

    #[test]
    fn page_title_is_trimmed_at_site_suffix() {
        assert_eq!(
            extract_page_title("<title>W.I.T.C.H &amp; Co - StarDima</title>").as_deref(),
            Some("W.I.T.C.H & Co")
        );
        assert_eq!(extract_page_title("<html></html>"), None);
    }

    #[test]
    fn season_api_collects_episodes_and_title() {
        let transport = FakeTransport::new()
            .get(
                &format!("{SEASON_SITE}/tvshow/abc"),
                r#"<title>Show - StarDima</title><div data-season-id="7"></div>"#,
            )
            .get(
                &format!("{SEASON_SITE}/series/season/7"),
                r#"{"episodes":[
                    {"id": 501, "season_number": 1, "episode_number": 2, "watch_url": "https://x.test/2"},
                    {"id": "500", "season": "1", "number": "1"},
                    {"title": "missing id"}
                ]}"#,
            );
        let mut show = ShowIdentity::new("abc", DiscoveryMode::SeasonApi);

        let episodes = enumerate_season_api(&transport, &mut show, None);

        assert_eq!(show.display_title(), "Show");
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].id, "501");
        assert_eq!((episodes[0].season, episodes[0].number), (1, 2));
        assert_eq!(episodes[0].slug, "abc-1x2");
        assert_eq!(episodes[1].id, "500");
        assert_eq!(episodes[1].link, "");
    }

    #[test]
    fn season_api_tries_play_page_then_synthesizes_single_episode() {
        let transport = FakeTransport::new()
            .get(&format!("{SEASON_SITE}/tvshow/abc"), "<html>no seasons</html>")
            .get(
                &format!("{SEASON_SITE}/tvshow/abc/play/56876"),
                "<title>Play Title - StarDima</title>",
            );
        let mut show = ShowIdentity::new("abc", DiscoveryMode::SeasonApi);

        let episodes = enumerate_season_api(&transport, &mut show, Some("56876"));

        assert_eq!(show.display_title(), "Play Title");
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].id, "56876");
        assert_eq!((episodes[0].season, episodes[0].number), (1, 1));
        assert_eq!(
            transport.request_count(&format!("GET {SEASON_SITE}/tvshow/abc/play/56876")),
            1
        );
    }

    #[test]
    fn season_failures_are_skipped() {
        let transport = FakeTransport::new()
            .get(
                &format!("{SEASON_SITE}/tvshow/abc"),
                r#"<a href="/series/season/1"></a><a href="/series/season/2"></a>"#,
            )
            .route(
                "GET",
                &format!("{SEASON_SITE}/series/season/1"),
                vec![Canned::Status(500)],
            )
            .get(
                &format!("{SEASON_SITE}/series/season/2"),
                r#"{"episodes":[{"id": 9, "season_number": 2, "episode_number": 1}]}"#,
            );
        let mut show = ShowIdentity::new("abc", DiscoveryMode::SeasonApi);

        let episodes = enumerate_season_api(&transport, &mut show, None);

        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].season, 2);
    }

    #[test]
    fn probing_stops_after_three_consecutive_misses() {
        let mut transport = FakeTransport::with_fallback_body("[]");
        for episode in 1..=12 {
            let slug = format!("show-1x{episode}");
            transport = transport.get(
                &probe_url(&slug),
                &json!([{ "id": 1000 + episode, "slug": slug }]).to_string(),
            );
        }
        let limits = ProbeLimits {
            max_seasons: 1,
            ..ProbeLimits::default()
        };

        let found = probe_catalog_episodes(&transport, "show", limits);

        assert_eq!(found.len(), 12);
        let probes = transport.requests();
        assert_eq!(probes.len(), 15);
        assert!(probes.iter().any(|line| line.ends_with("show-1x15")));
        assert!(!probes.iter().any(|line| line.ends_with("show-1x16")));
    }

    #[test]
    fn probing_counts_failed_requests_as_misses_and_moves_to_next_season() {
        let transport = FakeTransport::new().get(
            &probe_url("show-2x1"),
            r#"[{"id": 77, "slug": "show-2x1"}]"#,
        );
        let limits = ProbeLimits {
            max_seasons: 2,
            ..ProbeLimits::default()
        };

        let found = probe_catalog_episodes(&transport, "show", limits);

        assert_eq!(found.get("77").map(String::as_str), Some("show-2x1"));
        assert_eq!(transport.requests().len(), 3 + 4);
    }

    #[test]
    fn search_filters_by_slug_and_aliases() {
        let search = |term: &str| {
            with_query(
                &format!("{CATALOG_API}/episodes"),
                &[("search", term), ("per_page", "100")],
            )
        };
        let transport = FakeTransport::new()
            .get(
                &search("witch"),
                r#"[{"id": 1, "slug": "witch-1x1"}, {"id": 2, "slug": "unrelated-1x1"}]"#,
            )
            .route("GET", &search("w-i-t-c-h"), vec![Canned::Status(503)])
            .get(
                &search("w.i.t.c.h"),
                r#"[{"id": 3, "slug": "w-i-t-c-h-2x4"}, {"id": 1, "slug": "witch-1x1"}]"#,
            );
        let aliases = vec!["w-i-t-c-h".to_string(), "w.i.t.c.h".to_string()];

        let found = search_catalog_episodes(&transport, "witch", &aliases);

        assert_eq!(found.len(), 2);
        assert_eq!(found.get("3").map(String::as_str), Some("w-i-t-c-h-2x4"));
        assert!(!found.contains_key("2"));
    }

    #[test]
    fn catalog_enumeration_merges_by_id() {
        let transport = FakeTransport::with_fallback_body("[]")
            .get(
                &with_query(
                    &format!("{CATALOG_API}/episodes"),
                    &[("search", "show"), ("per_page", "100")],
                ),
                r#"[{"id": 10, "slug": "show-1x1"}, {"id": 30, "slug": "show-special"}]"#,
            )
            .get(&probe_url("show-1x1"), r#"[{"id": 10, "slug": "show-1x1"}]"#)
            .get(&probe_url("show-1x2"), r#"[{"id": 11, "slug": "show-1x2"}]"#);
        let limits = ProbeLimits {
            max_seasons: 1,
            ..ProbeLimits::default()
        };

        let episodes = enumerate_catalog(&transport, "show", &[], limits);

        let ids: Vec<_> = episodes.iter().map(|ep| ep.id.as_str()).collect();
        assert_eq!(ids, ["10", "11", "30"]);
        assert_eq!((episodes[1].season, episodes[1].number), (1, 2));
        assert_eq!((episodes[2].season, episodes[2].number), (1, 1));
    }

    #[test]
    fn catalog_show_from_episode_url_derives_title() {
        let transport = FakeTransport::new()
            .get(
                &with_query(&format!("{CATALOG_API}/tvshows"), &[("slug", "spies")]),
                "[]",
            )
            .get(
                &probe_url("spies-1x1"),
                r#"[{"id": 5, "slug": "spies-1x1", "title": {"rendered": "Spies &amp; Co: 1x1 Pilot"}}]"#,
            );

        let show = fetch_catalog_show(&transport, "spies", DiscoveryMode::CatalogEpisode)
            .expect("title should be derived");
        assert_eq!(show.title, "Spies & Co");
        assert_eq!(show.id, None);

        assert_eq!(
            fetch_catalog_show(&transport, "spies", DiscoveryMode::CatalogShow),
            None
        );
    }

    #[test]
    fn catalog_show_lookup_reads_rendered_title() {
        let transport = FakeTransport::new().get(
            &with_query(&format!("{CATALOG_API}/tvshows"), &[("slug", "witch")]),
            r#"[{"id": 321, "title": {"rendered": "W.I.T.C.H &#8211; Arabic"}}]"#,
        );
        let show = fetch_catalog_show(&transport, "witch", DiscoveryMode::CatalogShow)
            .expect("show should be found");
        assert_eq!(show.id, Some(321));
        assert_eq!(show.title, "W.I.T.C.H – Arabic");
    }

    #[test]
    fn listing_page_yields_numbered_episodes() {
        let html = r#"
            <h1 class="text-center"> My Show </h1>
            <div class="moviesBlocks">
              <div class="movie"><a href="/watch/ep-2"></a><div class="badge-overd">الحلقة 2</div></div>
              <div class="movie"><a href="https://cdn.dimakids.com/watch/ep-1"></a><div class="badge-overd">1</div></div>
              <div class="movie"><a href="/watch/no-badge"></a></div>
              <div class="movie"><div class="badge-overd">3</div></div>
            </div>
        "#;

        let listing = parse_page_listing("https://www.dimakids.com/series/my-show/", html);

        assert_eq!(listing.title, "My Show");
        assert!(!listing.is_movie);
        let pairs: Vec<_> = listing
            .episodes
            .iter()
            .map(|ep| (ep.number, ep.link.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                (2, "https://www.dimakids.com/watch/ep-2"),
                (1, "https://cdn.dimakids.com/watch/ep-1"),
            ]
        );
    }

    #[test]
    fn listing_without_container_is_a_movie() {
        let listing = parse_page_listing("https://www.dimakids.com/movie/x/", "<p>player</p>");
        assert!(listing.is_movie);
        assert_eq!(listing.title, "Unknown Title");
        assert_eq!(listing.episodes.len(), 1);
        assert_eq!(listing.episodes[0].link, "https://www.dimakids.com/movie/x/");
    }
}

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)x(\d+)").expect("valid regex"));
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("valid regex"));
static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^S(\d+)E(\d+)").expect("valid regex"));

/// Arabic "episode" marker used by catalog slugs that carry no `{s}x{e}` part.
const ARABIC_EPISODE_MARKER: &str = "الحلق";
const ARABIC_EPISODE_MARKER_ENCODED: &str = "%d8%a7%d9%84%d8%ad%d9%84%d9%82";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EpisodeKey {
    SeasonEpisode { season: u32, episode: u32 },
    Opaque(String),
}

impl EpisodeKey {
    pub(crate) fn season_episode(&self) -> Option<(u32, u32)> {
        match self {
            Self::SeasonEpisode { season, episode } => Some((*season, *episode)),
            Self::Opaque(_) => None,
        }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SeasonEpisode { season, episode } => write!(f, "S{season}E{episode}"),
            Self::Opaque(id) => write!(f, "E{id}"),
        }
    }
}

pub(crate) fn parse_episode_key(id: &str, slug: &str) -> EpisodeKey {
    if let Some(caps) = SEASON_EPISODE.captures(slug)
        && let (Ok(season), Ok(episode)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>())
    {
        return EpisodeKey::SeasonEpisode { season, episode };
    }

    if slug.contains(ARABIC_EPISODE_MARKER)
        || slug.to_lowercase().contains(ARABIC_EPISODE_MARKER_ENCODED)
    {
        let episode = TRAILING_NUMBER
            .captures(slug)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .unwrap_or(1);
        return EpisodeKey::SeasonEpisode { season: 1, episode };
    }

    EpisodeKey::Opaque(id.to_string())
}

pub(crate) fn parse_label(label: &str) -> Option<(u32, u32)> {
    let caps = LABEL.captures(label)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// `S{s}E{e}` labels sort numerically and come first; anything else sorts
/// after them by numeric id, then textual id.
pub(crate) fn compare_episodes(
    left_label: &str,
    left_id: &str,
    right_label: &str,
    right_id: &str,
) -> Ordering {
    match (parse_label(left_label), parse_label(right_label)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => match (left_id.parse::<u64>(), right_id.parse::<u64>()) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            _ => left_id.cmp(right_id),
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) episodes: Vec<u32>,
    pub(crate) warnings: Vec<String>,
}

/// Parses `all` or a comma list of numbers and `a-b` ranges into a sorted,
/// de-duplicated set of episode numbers within `1..=total`.
pub(crate) fn parse_episode_selection(input: &str, total: u32) -> Selection {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        return Selection {
            episodes: (1..=total).collect(),
            warnings: Vec::new(),
        };
    }

    let mut selected = BTreeSet::new();
    let mut warnings = Vec::new();
    let compact = trimmed.replace(' ', "");

    for part in compact.split(',').filter(|part| !part.is_empty()) {
        let Some((start, end)) = parse_selection_token(part) else {
            warnings.push(format!("skipping invalid input '{part}'"));
            continue;
        };

        if start > end {
            continue;
        }
        selected.extend(start.max(1)..=end.min(total));
        if start < 1 || end > total {
            warnings.push(format!("'{part}' is outside 1-{total}; extra episodes ignored"));
        }
    }

    Selection {
        episodes: selected.into_iter().collect(),
        warnings,
    }
}

fn parse_selection_token(part: &str) -> Option<(u32, u32)> {
    match part.split_once('-') {
        Some((start, end)) => Some((start.parse().ok()?, end.parse().ok()?)),
        None => {
            let number = part.parse().ok()?;
            Some((number, number))
        }
    }
}

/// Folder name for the page-listing tool: characters illegal in file names are dropped.
pub(crate) fn strip_illegal_chars(title: &str) -> String {
    title
        .chars()
        .filter(|ch| !matches!(ch, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect()
}

/// Folder name for the catalog tool: characters illegal in file names become `_`.
pub(crate) fn replace_illegal_chars(title: &str) -> String {
    title
        .chars()
        .map(|ch| match ch {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

pub(crate) fn pad_width(total: usize) -> usize {
    total.to_string().len().max(2)
}

pub(crate) fn episode_file_name(number: u32, total: usize, movie_title: Option<&str>) -> String {
    match movie_title {
        Some(title) => format!("{title}.mp4"),
        None => format!("{number:0width$}.mp4", width = pad_width(total)),
    }
}

pub(crate) fn format_speed(bytes_per_sec: f64) -> String {
    if bytes_per_sec < 1024.0 {
        format!("{bytes_per_sec:.1} B/s")
    } else if bytes_per_sec < 1024.0 * 1024.0 {
        format!("{:.1} KB/s", bytes_per_sec / 1024.0)
    } else {
        format!("{:.1} MB/s", bytes_per_sec / (1024.0 * 1024.0))
    }
}

use std::fmt;

pub(crate) const STANDARD_SERVERS: [&str; 5] = ["vudeo", "uqload", "mailru", "goodstream", "vk"];
pub(crate) const WRAPPED_SERVERS: [&str; 5] = ["uqload", "streamhg", "darkibox", "goodstream", "other"];
pub(crate) const DIRECT_SERVERS: [&str; 1] = ["direct"];
pub(crate) const HLS_SERVERS: [&str; 1] = ["hls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DiscoveryMode {
    /// `www.stardima.com/tvshow/{id}` pages backed by the season JSON endpoints.
    SeasonApi,
    CatalogShow,
    CatalogEpisode,
    /// Static listing pages whose episodes embed the player script directly.
    PageListing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShowIdentity {
    pub(crate) id: String,
    pub(crate) mode: DiscoveryMode,
    pub(crate) catalog_id: Option<u64>,
    pub(crate) title: Option<String>,
}

impl ShowIdentity {
    pub(crate) fn new(id: impl Into<String>, mode: DiscoveryMode) -> Self {
        Self {
            id: id.into(),
            mode,
            catalog_id: None,
            title: None,
        }
    }

    pub(crate) fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EpisodeRef {
    pub(crate) id: String,
    pub(crate) season: u32,
    pub(crate) number: u32,
    pub(crate) slug: String,
    pub(crate) link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ServerSet {
    Standard,
    Wrapped,
    Direct,
    Hls,
}

impl ServerSet {
    pub(crate) fn names(self) -> &'static [&'static str] {
        match self {
            Self::Standard => &STANDARD_SERVERS,
            Self::Wrapped => &WRAPPED_SERVERS,
            Self::Direct => &DIRECT_SERVERS,
            Self::Hls => &HLS_SERVERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServerCandidate {
    pub(crate) name: &'static str,
    pub(crate) url: Option<String>,
    pub(crate) position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedEpisode {
    pub(crate) episode: EpisodeRef,
    pub(crate) label: String,
    pub(crate) server_set: ServerSet,
    pub(crate) servers: Vec<ServerCandidate>,
    pub(crate) raw_url: Option<String>,
}

impl ResolvedEpisode {
    /// Pairs `urls` with the names of `server_set` by position; missing or
    /// empty slots stay `None`.
    pub(crate) fn new(
        episode: EpisodeRef,
        label: String,
        server_set: ServerSet,
        urls: Vec<Option<String>>,
        raw_url: Option<String>,
    ) -> Self {
        let mut urls = urls.into_iter();
        let servers = server_set
            .names()
            .iter()
            .copied()
            .enumerate()
            .map(|(idx, name)| ServerCandidate {
                name,
                url: urls.next().flatten().filter(|url| !url.trim().is_empty()),
                position: idx + 1,
            })
            .collect();

        Self {
            episode,
            label,
            server_set,
            servers,
            raw_url,
        }
    }

    pub(crate) fn is_wrapped(&self) -> bool {
        self.server_set == ServerSet::Wrapped
    }

    pub(crate) fn url_for(&self, name: &str) -> Option<&str> {
        self.servers
            .iter()
            .find(|candidate| candidate.name == name)
            .and_then(|candidate| candidate.url.as_deref())
    }

    pub(crate) fn available(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.servers
            .iter()
            .filter_map(|candidate| candidate.url.as_deref().map(|url| (candidate.name, url)))
    }

    pub(crate) fn first_url(&self) -> Option<&str> {
        self.available().next().map(|(_, url)| url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadOutcome {
    pub(crate) key: String,
    pub(crate) success: bool,
    pub(crate) attempts: u32,
    pub(crate) error: Option<String>,
}

impl DownloadOutcome {
    pub(crate) fn downloaded(key: &str, attempts: u32) -> Self {
        Self {
            key: key.to_string(),
            success: true,
            attempts,
            error: None,
        }
    }

    pub(crate) fn failed(key: &str, attempts: u32, error: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            success: false,
            attempts,
            error: Some(error.into()),
        }
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "{}: downloaded ({} attempt(s))", self.key, self.attempts),
            Some(err) => write!(
                f,
                "{}: failed after {} attempt(s): {err}",
                self.key, self.attempts
            ),
        }
    }
}

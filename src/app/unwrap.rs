use std::collections::BTreeMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde_json::json;

use crate::http::{Transport, XHR_HEADER, parse_json_body};

pub(crate) const WRAPPER_MARKER: &str = "hyperwatching.com/iframe/";
pub(crate) const WRAPPER_FALLBACK: &str = "hyperwatching";
const WRAPPER_LINK_API: &str = "https://hyperwatching.com/api/videos";

static CSRF_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"csrf:\s*["']([^"']+)["']"#).expect("valid regex"));
static SERVERS_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)servers:\s*\[(.*?)\]").expect("valid regex"));
static SERVER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id:\s*["'](\d+)["']"#).expect("valid regex"));
static SERVER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name:\s*["']([^"']+)["']"#).expect("valid regex"));
static REDIRECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([^&]+)").expect("valid regex"));

pub(crate) fn is_wrapper_url(url: &str) -> bool {
    url.contains(WRAPPER_MARKER)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WrapperPage {
    pub(crate) csrf: String,
    pub(crate) servers: Vec<(String, String)>,
}

/// Pulls the csrf token and `(id, name)` server pairs out of the iframe's
/// inline bootstrap. Ids and names are paired by position.
pub(crate) fn parse_wrapper_page(html: &str) -> Option<WrapperPage> {
    let csrf = CSRF_TOKEN
        .captures(html)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    let block = SERVERS_BLOCK.captures(html)?;
    let block = block.get(1)?.as_str();

    let ids = SERVER_ID.captures_iter(block).map(|caps| caps[1].to_string());
    let names = SERVER_NAME.captures_iter(block).map(|caps| caps[1].to_string());

    Some(WrapperPage {
        csrf,
        servers: ids.zip(names).collect(),
    })
}

pub(crate) fn wrapper_video_id(iframe_url: &str) -> &str {
    let tail = iframe_url
        .rsplit_once("/iframe/")
        .map(|(_, tail)| tail)
        .unwrap_or(iframe_url);
    let tail = tail.split('/').next().unwrap_or(tail);
    tail.split('?').next().unwrap_or(tail)
}

fn fallback(iframe_url: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(WRAPPER_FALLBACK.to_string(), iframe_url.to_string())])
}

/// Resolves a wrapper iframe into `server name -> url`. Servers that fail are
/// left out; when none resolve the iframe url itself is returned under
/// [`WRAPPER_FALLBACK`] so callers always have something to try.
pub(crate) fn unwrap_wrapper(
    transport: &dyn Transport,
    iframe_url: &str,
) -> BTreeMap<String, String> {
    let html = match transport.get_text(iframe_url, &[]) {
        Ok(html) => html,
        Err(err) => {
            debug!("wrapper page {iframe_url} failed: {err}");
            return fallback(iframe_url);
        }
    };
    let Some(page) = parse_wrapper_page(&html) else {
        debug!("wrapper page {iframe_url} has no server list");
        return fallback(iframe_url);
    };

    let api_url = format!("{WRAPPER_LINK_API}/{}/link", wrapper_video_id(iframe_url));
    let headers = [
        ("Referer", iframe_url),
        XHR_HEADER,
        ("Accept", "application/json"),
        ("X-CSRF-TOKEN", page.csrf.as_str()),
    ];

    let resolved: BTreeMap<String, String> = page
        .servers
        .iter()
        .filter_map(|(server_id, server_name)| {
            let body = json!({ "server_link_id": server_id });
            let response = transport
                .post_json(&api_url, &headers, &body)
                .and_then(|raw| parse_json_body(&raw));
            let data = match response {
                Ok(data) => data,
                Err(err) => {
                    debug!("wrapper server {server_name} ({server_id}) failed: {err}");
                    return None;
                }
            };
            if !data.get("success").and_then(|v| v.as_bool()).unwrap_or(false) {
                return None;
            }
            let url = data.get("watch_url")?.as_str()?.trim();
            (!url.is_empty()).then(|| (server_name.to_lowercase(), url.to_string()))
        })
        .collect();

    if resolved.is_empty() {
        fallback(iframe_url)
    } else {
        resolved
    }
}

/// `strema.top/embed…?id=<encoded url>` redirect pages carry the real target in `id`.
pub(crate) fn unwrap_embed_redirect(url: &str) -> String {
    if url.contains("strema.top/embed")
        && let Some(caps) = REDIRECT_ID.captures(url)
        && let Ok(decoded) = urlencoding::decode(&caps[1])
    {
        return decoded.into_owned();
    }
    url.to_string()
}

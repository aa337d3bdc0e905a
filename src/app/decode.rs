//! Regex decoders for the two obfuscation schemes: the player bootstrap
//! object embedded in page scripts, and the base64 `embed_url` payload
//! returned by the catalog's AJAX player endpoint.

use std::sync::LazyLock;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use log::debug;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::http::{Transport, parse_json_body};

use super::unwrap::is_wrapper_url;

pub(crate) const PLAYER_MARKER: &str = "stream.foupix.com";

pub(crate) const CATALOG_AJAX_URL: &str = "https://watch.stardima.com/watch/wp-admin/admin-ajax.php";
pub(crate) const SERVER_SLOTS: std::ops::RangeInclusive<u8> = 1..=5;

static PLAYER_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)const\s+\w+\s*=\s*(\{.{0,2048}?\});").expect("valid regex")
});
static PROTOCOL_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"jC1kO:\s*"([^"]+)""#).expect("valid regex"));
static DOMAIN_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"hF3nV:\s*"([^"]+)""#).expect("valid regex"));
static PATH_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"iA5pX:\s*"([^"]+)""#).expect("valid regex"));
static QUERY_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tN4qY:\s*"([^"]+)""#).expect("valid regex"));

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StreamFields {
    pub(crate) protocol: String,
    pub(crate) domain: String,
    pub(crate) path: String,
    pub(crate) query: String,
}

impl StreamFields {
    pub(crate) fn to_url(&self) -> String {
        format!(
            "{}://{}/{}?{}",
            self.protocol, self.domain, self.path, self.query
        )
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Decodes one script body. Scripts without the player marker, or whose
/// bootstrap object lacks any of the four fields, yield `None`.
pub(crate) fn decode_player_script(script: &str) -> Option<StreamFields> {
    if !script.contains(PLAYER_MARKER) {
        return None;
    }
    let object = PLAYER_OBJECT.captures(script)?;
    let object = object.get(1)?.as_str();

    Some(StreamFields {
        protocol: capture(&PROTOCOL_FIELD, object)?,
        domain: capture(&DOMAIN_FIELD, object)?,
        path: capture(&PATH_FIELD, object)?,
        query: capture(&QUERY_FIELD, object)?,
    })
}

/// Scans every `<script>` of a page and returns the first decodable stream url.
pub(crate) fn find_player_stream(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    document.select(&selector).find_map(|script| {
        let text = script.text().collect::<String>();
        decode_player_script(&text).map(|fields| fields.to_url())
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EmbedTarget {
    Direct(String),
    Wrapper(String),
}

/// Decodes the player endpoint's JSON: `embed_url` is base64, optionally
/// wrapping the real target behind a `url=` redirect parameter.
pub(crate) fn decode_embed_payload(body: &Value) -> Option<EmbedTarget> {
    let encoded = body.get("embed_url")?.as_str()?.trim();
    if encoded.is_empty() {
        return None;
    }
    let bytes = LENIENT_BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;

    let target = match decoded.rsplit_once("url=") {
        Some((_, tail)) => tail.trim().to_string(),
        None => decoded.trim().to_string(),
    };
    if target.is_empty() {
        return None;
    }

    if is_wrapper_url(&target) {
        Some(EmbedTarget::Wrapper(target))
    } else {
        Some(EmbedTarget::Direct(target))
    }
}

pub(crate) fn fetch_embed_slot(
    transport: &dyn Transport,
    post_id: &str,
    slot: u8,
) -> Option<EmbedTarget> {
    let slot = slot.to_string();
    let form = [
        ("action", "doo_player_ajax"),
        ("post", post_id),
        ("nume", slot.as_str()),
        ("type", "tv"),
    ];

    let body = match transport
        .post_form(CATALOG_AJAX_URL, &[], &form)
        .and_then(|body| parse_json_body(&body))
    {
        Ok(body) => body,
        Err(err) => {
            debug!("player slot {slot} for post {post_id} failed: {err}");
            return None;
        }
    };
    decode_embed_payload(&body)
}

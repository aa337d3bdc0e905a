use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::model::{ResolvedEpisode, ShowIdentity};

pub(crate) const LINKS_FILE: &str = "links.json";

/// The `links.json` artifact: episode number to resolved stream url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LinkExport {
    pub(crate) title: String,
    pub(crate) episodes: BTreeMap<u32, String>,
}

impl LinkExport {
    /// Numbers resolved episodes by their position in `resolved`, using the
    /// first available server url of each.
    pub(crate) fn from_resolved(title: &str, resolved: &[ResolvedEpisode]) -> Self {
        let episodes = (1u32..)
            .zip(resolved)
            .filter_map(|(position, episode)| {
                episode.first_url().map(|url| (position, url.to_string()))
            })
            .collect();
        Self {
            title: title.to_string(),
            episodes,
        }
    }
}

pub(crate) fn write_link_export(dir: &Path, export: &LinkExport) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(LINKS_FILE);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    export
        .serialize(&mut serializer)
        .context("failed to serialize link export")?;

    fs::write(&path, buf).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
pub(crate) fn read_link_export(path: &Path) -> Result<LinkExport> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn column_title(name: &str) -> String {
    match name {
        "mailru" => "MailRu".to_string(),
        "vk" => "VK".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

pub(crate) fn write_table(
    out: &mut impl Write,
    show: &ShowIdentity,
    resolved: &[ResolvedEpisode],
) -> Result<()> {
    writeln!(out, "=== {} ===", show.display_title())?;
    writeln!(out, "Show ID: {} | Total Episodes: {}", show.id, resolved.len())?;
    writeln!(out)?;

    for episode in resolved {
        writeln!(out, "{} (ID: {})", episode.label, episode.episode.id)?;
        for server in &episode.servers {
            if let Some(url) = &server.url {
                writeln!(
                    out,
                    "  [{}] {:12} {url}",
                    server.position,
                    column_title(server.name)
                )?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "Done! Extracted {} episodes.", resolved.len())?;
    Ok(())
}

fn episode_json(episode: &ResolvedEpisode) -> Value {
    let servers: serde_json::Map<String, Value> = episode
        .servers
        .iter()
        .map(|server| (server.name.to_string(), json!(server.url)))
        .collect();
    json!({
        "episode": episode.label,
        "post_id": episode.episode.id,
        "slug": episode.episode.slug,
        "servers": servers,
        "is_wrapped": episode.is_wrapped(),
        "raw_url": episode.raw_url,
    })
}

pub(crate) fn write_json(
    out: &mut impl Write,
    show: &ShowIdentity,
    resolved: &[ResolvedEpisode],
) -> Result<()> {
    let document = json!({
        "show": {
            "id": show.id,
            "catalog_id": show.catalog_id,
            "title": show.display_title(),
        },
        "episodes": resolved.iter().map(episode_json).collect::<Vec<_>>(),
    });
    serde_json::to_writer_pretty(&mut *out, &document).context("failed to write json")?;
    writeln!(out)?;
    Ok(())
}

/// Columns are the union of server names across episodes, in first-seen order,
/// so a show mixing server sets keeps every url.
pub(crate) fn write_csv(out: &mut impl Write, resolved: &[ResolvedEpisode]) -> Result<()> {
    let mut columns: Vec<&'static str> = Vec::new();
    for name in resolved
        .iter()
        .flat_map(|episode| episode.server_set.names().iter().copied())
    {
        if !columns.contains(&name) {
            columns.push(name);
        }
    }

    let mut writer = csv::Writer::from_writer(out);
    let header = ["Episode".to_string(), "PostID".to_string()]
        .into_iter()
        .chain(columns.iter().map(|name| column_title(name)));
    writer.write_record(header).context("failed to write csv header")?;

    for episode in resolved {
        let row = [episode.label.as_str(), episode.episode.id.as_str()]
            .into_iter()
            .chain(columns.iter().map(|name| episode.url_for(name).unwrap_or("")));
        writer.write_record(row).context("failed to write csv row")?;
    }
    writer.flush().context("failed to flush csv")?;
    Ok(())
}

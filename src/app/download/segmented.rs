use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use url::Url;

use crate::http::Transport;

use super::temp_path;

/// Segment urls of a media playlist: every non-empty line that is not a
/// `#` directive, resolved against the playlist url.
pub(crate) fn parse_playlist(playlist_url: &str, body: &str) -> Result<Vec<String>> {
    let base = Url::parse(playlist_url)
        .with_context(|| format!("invalid playlist url {playlist_url}"))?;

    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            base.join(line)
                .map(String::from)
                .with_context(|| format!("invalid segment reference {line}"))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SegmentProgress {
    pub(crate) done: usize,
    pub(crate) total: usize,
    pub(crate) bytes: u64,
    pub(crate) elapsed: Duration,
}

impl SegmentProgress {
    pub(crate) fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.done as f64 / self.total as f64
    }

    pub(crate) fn bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.bytes as f64 / secs } else { 0.0 }
    }
}

/// Fetches the playlist and appends every segment, in order, to `{dest}.tmp`,
/// which is renamed to `dest` once complete. On any failure both the temp
/// file and a stale `dest` are removed before the error is returned.
pub(crate) fn download_playlist(
    transport: &dyn Transport,
    playlist_url: &str,
    referer: &str,
    dest: &Path,
    mut progress: impl FnMut(&SegmentProgress),
) -> Result<u64> {
    let tmp = temp_path(dest);
    let result = write_segments(transport, playlist_url, referer, &tmp, &mut progress)
        .and_then(|bytes| {
            fs::rename(&tmp, dest)
                .with_context(|| format!("failed to move {} into place", dest.display()))?;
            Ok(bytes)
        });

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
        let _ = fs::remove_file(dest);
    }
    result
}

fn write_segments(
    transport: &dyn Transport,
    playlist_url: &str,
    referer: &str,
    tmp: &Path,
    progress: &mut impl FnMut(&SegmentProgress),
) -> Result<u64> {
    let headers = [("Referer", referer)];
    let body = transport
        .get_text(playlist_url, &headers)
        .context("failed to fetch playlist")?;
    let segments = parse_playlist(playlist_url, &body)?;
    if segments.is_empty() {
        bail!("no video segments found in the playlist");
    }

    let file =
        File::create(tmp).with_context(|| format!("failed to create {}", tmp.display()))?;
    let mut writer = BufWriter::new(file);
    let started = Instant::now();
    let mut bytes = 0u64;

    for (idx, segment) in segments.iter().enumerate() {
        let data = transport
            .get_bytes(segment, &headers)
            .with_context(|| format!("segment {}/{} failed", idx + 1, segments.len()))?;
        writer
            .write_all(&data)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        bytes += data.len() as u64;
        progress(&SegmentProgress {
            done: idx + 1,
            total: segments.len(),
            bytes,
            elapsed: started.elapsed(),
        });
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", tmp.display()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Canned, FakeTransport};

    const PLAYLIST: &str = "https://cdn.test/hls/ep1/index.m3u8?t=1";
    const PLAYLIST_BODY: &str =
        "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10,\nseg-1.ts\n\n#EXTINF:10,\n  /abs/seg-2.ts  \nhttps://other.test/seg-3.ts\n#EXT-X-ENDLIST\n";

    #[test]
    fn playlist_lines_are_joined_against_playlist_url() {
        assert_eq!(
            parse_playlist(PLAYLIST, PLAYLIST_BODY).expect("playlist should parse"),
            [
                "https://cdn.test/hls/ep1/seg-1.ts",
                "https://cdn.test/abs/seg-2.ts",
                "https://other.test/seg-3.ts",
            ]
        );
        assert!(parse_playlist("not a url", "seg.ts").is_err());
    }

    #[test]
    fn segments_are_appended_in_order_and_renamed() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let dest = dir.path().join("01.mp4");
        let transport = FakeTransport::new()
            .get(PLAYLIST, PLAYLIST_BODY)
            .get("https://cdn.test/hls/ep1/seg-1.ts", "AAA")
            .get("https://cdn.test/abs/seg-2.ts", "BB")
            .get("https://other.test/seg-3.ts", "C");
        let mut reports = Vec::new();

        let bytes = download_playlist(&transport, PLAYLIST, "https://page.test/", &dest, |p| {
            reports.push((p.done, p.total, p.bytes));
        })
        .expect("download should succeed");

        assert_eq!(bytes, 6);
        assert_eq!(fs::read_to_string(&dest).expect("read output"), "AAABBC");
        assert!(!temp_path(&dest).exists());
        assert_eq!(reports, [(1, 3, 3), (2, 3, 5), (3, 3, 6)]);
    }

    #[test]
    fn failed_segment_removes_temp_and_stale_output() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let dest = dir.path().join("02.mp4");
        fs::write(&dest, "stale").expect("write stale file");
        let transport = FakeTransport::new()
            .get(PLAYLIST, PLAYLIST_BODY)
            .get("https://cdn.test/hls/ep1/seg-1.ts", "AAA")
            .route("GET", "https://cdn.test/abs/seg-2.ts", vec![Canned::Status(403)]);

        let err = download_playlist(&transport, PLAYLIST, "https://page.test/", &dest, |_| {})
            .expect_err("segment failure should abort");

        assert!(format!("{err:#}").contains("segment 2/3 failed"));
        assert!(!dest.exists());
        assert!(!temp_path(&dest).exists());
    }

    #[test]
    fn empty_playlist_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let dest = dir.path().join("03.mp4");
        let transport = FakeTransport::new().get(PLAYLIST, "#EXTM3U\n#EXT-X-ENDLIST\n");

        let err = download_playlist(&transport, PLAYLIST, "", &dest, |_| {})
            .expect_err("empty playlist should fail");
        assert!(err.to_string().contains("no video segments"));
    }

    #[test]
    fn progress_fraction_and_speed() {
        let progress = SegmentProgress {
            done: 1,
            total: 4,
            bytes: 2048,
            elapsed: Duration::from_secs(2),
        };
        assert!((progress.fraction() - 0.25).abs() < f64::EPSILON);
        assert!((progress.bytes_per_sec() - 1024.0).abs() < f64::EPSILON);
    }
}

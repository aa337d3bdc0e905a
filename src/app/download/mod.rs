pub(crate) mod media;
pub(crate) mod segmented;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::warn;

use crate::config::Config;

use super::model::DownloadOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub(crate) max_attempts: u32,
    pub(crate) pause: Duration,
}

impl RetryPolicy {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_download_attempts.max(1),
            pause: Duration::from_secs(config.refresh_pause_secs),
        }
    }
}

pub(crate) fn temp_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Drives one episode through up to `policy.max_attempts` attempts. Every
/// attempt after the first asks `refresh` for a freshly resolved source; a
/// refresh that yields nothing ends the sequence early.
pub(crate) fn run_with_refresh<T>(
    key: &str,
    first: T,
    policy: RetryPolicy,
    mut attempt: impl FnMut(&T) -> Result<()>,
    mut refresh: impl FnMut() -> Option<T>,
) -> DownloadOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut source = first;
    let mut last_error = String::new();

    for attempt_no in 1..=max_attempts {
        if attempt_no > 1 {
            eprintln!("{key}: download failed, refreshing link ({attempt_no}/{max_attempts})...");
            match refresh() {
                Some(fresh) => source = fresh,
                None => {
                    warn!("{key}: could not refresh link, giving up");
                    return DownloadOutcome::failed(
                        key,
                        attempt_no - 1,
                        format!("could not refresh link after: {last_error}"),
                    );
                }
            }
            thread::sleep(policy.pause);
        }

        match attempt(&source) {
            Ok(()) => return DownloadOutcome::downloaded(key, attempt_no),
            Err(err) => {
                warn!("{key}: attempt {attempt_no}/{max_attempts} failed: {err:#}");
                last_error = format!("{err:#}");
            }
        }
    }

    DownloadOutcome::failed(key, max_attempts, last_error)
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use super::episode::compare_episodes;
use super::model::{EpisodeRef, ResolvedEpisode};
use super::resolve::LinkResolver;

/// Runs `job` over `items` on at most `workers` scoped threads. Results come
/// back in completion order; `on_done(position, total, &result)` fires on the
/// calling thread as each one arrives.
pub(crate) fn run_pool<T, R, F, P>(items: &[T], workers: usize, job: F, mut on_done: P) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
    P: FnMut(usize, usize, &R),
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, total);
    let cursor = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let cursor = &cursor;
            let job = &job;
            scope.spawn(move || {
                while let Some(item) = items.get(cursor.fetch_add(1, Ordering::Relaxed)) {
                    if tx.send(job(item)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(total);
        for (done, result) in rx.iter().enumerate() {
            on_done(done + 1, total, &result);
            results.push(result);
        }
        results
    })
}

#[derive(Debug, Default)]
pub(crate) struct ResolutionSummary {
    pub(crate) resolved: Vec<ResolvedEpisode>,
    pub(crate) failed: usize,
}

pub(crate) fn sort_resolved(resolved: &mut [ResolvedEpisode]) {
    resolved.sort_by(|left, right| {
        compare_episodes(&left.label, &left.episode.id, &right.label, &right.episode.id)
    });
}

/// Resolves every episode under the pool. Failures are counted, never fatal;
/// `progress` receives `(position, total, Some(label))` or `None` on failure.
pub(crate) fn resolve_all(
    resolver: &dyn LinkResolver,
    episodes: &[EpisodeRef],
    workers: usize,
    mut progress: impl FnMut(usize, usize, Option<&str>),
) -> ResolutionSummary {
    let results = run_pool(
        episodes,
        workers,
        |episode| resolver.resolve(episode),
        |position, total, result: &Option<ResolvedEpisode>| {
            progress(position, total, result.as_ref().map(|r| r.label.as_str()));
        },
    );

    let mut summary = ResolutionSummary::default();
    for result in results {
        match result {
            Some(resolved) => summary.resolved.push(resolved),
            None => summary.failed += 1,
        }
    }
    sort_resolved(&mut summary.resolved);
    summary
}

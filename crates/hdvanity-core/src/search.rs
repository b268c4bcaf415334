//! Vanity search over the wallet index space.
//!
//! Worker `k` of `W` scans indices `k, k + W, k + 2W, ...`. Matches go into a
//! shared ordered collector that keeps the `want` lowest indices; once it is
//! full its highest index becomes the stop bound, so every worker ends as soon
//! as it passes that index. The result is the `want` lowest matching indices
//! regardless of worker count or scheduling.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use hdvanity_pattern::Matcher;
use hdvanity_wallet::{Account, AddressEncoder, DerivationError, Wallet, HARDENED_OFFSET};

use crate::error::{Error, Result};
use crate::stats::{Progress, SearchStats};

const MIN_PROGRESS_INTERVAL_MS: u64 = 10;

/// Search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of threads (0 = auto)
    pub threads: usize,
    /// Milliseconds between progress samples
    pub progress_interval_ms: u64,
    /// Indices at or above this are never scanned
    pub index_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threads: 0, // Auto-detect
            progress_interval_ms: 250,
            index_limit: HARDENED_OFFSET,
        }
    }
}

impl SearchConfig {
    pub fn worker_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }

    fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(MIN_PROGRESS_INTERVAL_MS))
    }

    fn limit(&self) -> u64 {
        u64::from(self.index_limit.min(HARDENED_OFFSET))
    }
}

/// A wallet whose address matched, with the label of the matching pattern
#[derive(Debug, Clone)]
pub struct VanityMatch {
    pub wallet: Wallet,
    pub label: String,
}

impl VanityMatch {
    pub fn index(&self) -> u32 {
        self.wallet.index
    }
}

/// Keeps the `want` lowest-index matches and publishes the stop bound
struct Collector {
    want: usize,
    matches: Mutex<BTreeMap<u32, VanityMatch>>,
    bound: AtomicU64,
    failure: Mutex<Option<Error>>,
}

impl Collector {
    fn new(want: usize) -> Self {
        Self {
            want,
            matches: Mutex::new(BTreeMap::new()),
            bound: AtomicU64::new(u64::MAX),
            failure: Mutex::new(None),
        }
    }

    fn bound(&self) -> u64 {
        self.bound.load(Ordering::Acquire)
    }

    /// Returns the number of matches held afterwards
    fn offer(&self, found: VanityMatch) -> u32 {
        let mut matches = self.matches.lock().unwrap_or_else(PoisonError::into_inner);
        matches.insert(found.index(), found);
        if matches.len() > self.want {
            matches.pop_last();
        }
        if matches.len() == self.want {
            if let Some((&last, _)) = matches.last_key_value() {
                self.bound.store(u64::from(last), Ordering::Release);
            }
        }
        matches.len() as u32
    }

    fn fail(&self, err: Error) {
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        failure.get_or_insert(err);
    }

    fn finish(self, progress: &Progress) -> Result<Vec<VanityMatch>> {
        if let Some(err) = self.failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(err);
        }
        let matches = self.matches.into_inner().unwrap_or_else(PoisonError::into_inner);
        if matches.len() < self.want {
            return Err(Error::SearchExhausted {
                wanted: self.want as u32,
                found: matches.len() as u32,
                scanned: progress.scanned,
            });
        }
        Ok(matches.into_values().collect())
    }
}

/// Multi-threaded vanity search engine
pub struct VanitySearcher<'a> {
    encoder: &'a dyn AddressEncoder,
    config: SearchConfig,
}

impl<'a> VanitySearcher<'a> {
    pub fn new(encoder: &'a dyn AddressEncoder, config: SearchConfig) -> Self {
        Self { encoder, config }
    }

    /// Find the `want` lowest wallet indices under `account` whose address
    /// `matcher` accepts, sorted by index.
    ///
    /// Blocks until done. `on_progress` runs on the calling thread at the
    /// configured interval and once more after the workers have joined.
    pub fn search<M, F>(
        &self,
        account: &Account,
        matcher: &M,
        want: u32,
        mut on_progress: F,
    ) -> Result<Vec<VanityMatch>>
    where
        M: Matcher + ?Sized,
        F: FnMut(Progress),
    {
        matcher.validate()?;
        if want == 0 {
            return Ok(Vec::new());
        }

        let workers = self.config.worker_count().max(1);
        let limit = self.config.limit();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        info!(workers, want, limit, "starting vanity search");

        let stats = SearchStats::new();
        let collector = Collector::new(want as usize);
        let (done_tx, done_rx) = bounded::<()>(1);
        let interval = self.config.progress_interval();

        let joined = thread::scope(|scope| {
            let stats = &stats;
            let collector = &collector;
            let handle = scope.spawn(move || {
                pool.install(|| {
                    (0..workers).into_par_iter().for_each(|worker| {
                        self.scan(account, matcher, worker as u64, workers as u64, limit, stats, collector);
                    });
                });
                // Dropping the sender on panic also wakes the sampler
                let _ = done_tx.send(());
            });

            loop {
                match done_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => on_progress(stats.snapshot()),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            handle.join()
        });
        joined.map_err(|_| Error::WorkerPool("search worker panicked".into()))?;

        let progress = stats.snapshot();
        on_progress(progress);
        info!(
            scanned = progress.scanned,
            found = progress.found,
            skipped = progress.skipped,
            elapsed_ms = progress.elapsed.as_millis() as u64,
            "vanity search finished"
        );

        collector.finish(&progress)
    }

    #[allow(clippy::too_many_arguments)]
    fn scan<M: Matcher + ?Sized>(
        &self,
        account: &Account,
        matcher: &M,
        first: u64,
        stride: u64,
        limit: u64,
        stats: &SearchStats,
        collector: &Collector,
    ) {
        let mut index = first;
        while index < limit && index < collector.bound() && stats.is_running() {
            stats.begin_index();
            // `limit` never exceeds 2^31, so the index fits
            let index32 = index as u32;

            match Wallet::derive(account, self.encoder, index32) {
                Ok(wallet) => {
                    if let Some(label) = matcher.find(&wallet.address) {
                        debug!(index = index32, address = %wallet.address, label, "match");
                        let label = label.to_string();
                        let held = collector.offer(VanityMatch { wallet, label });
                        stats.set_found(held);
                    }
                }
                Err(DerivationError::InvalidChildKey { index }) => {
                    stats.record_skip();
                    warn!(index, "skipping index with invalid child key");
                }
                Err(err) => {
                    collector.fail(err.into());
                    stats.stop();
                }
            }

            stats.finish_index();
            index += stride;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdvanity_pattern::{Pattern, PatternMatcher};
    use hdvanity_wallet::{account_from_seed, P2pkh, Seed, SEED_LEN};

    fn account() -> Account {
        account_from_seed(&Seed::from_bytes([0x5a; SEED_LEN]), 0).unwrap()
    }

    fn config(threads: usize) -> SearchConfig {
        SearchConfig { threads, progress_interval_ms: 10, ..Default::default() }
    }

    #[test]
    fn test_matches_are_sorted_and_match() {
        let encoder = P2pkh::default();
        let matcher = PatternMatcher::single(Pattern::suffix("a")).unwrap();
        let searcher = VanitySearcher::new(&encoder, config(4));

        let found = searcher.search(&account(), &matcher, 3, |_| {}).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.windows(2).all(|w| w[0].index() < w[1].index()));
        for m in &found {
            assert!(m.wallet.address.ends_with('a'));
            assert_eq!(m.label, "a");
        }
    }

    #[test]
    fn test_want_zero_does_no_work() {
        let encoder = P2pkh::default();
        let matcher = PatternMatcher::single(Pattern::prefix("A")).unwrap();
        let mut samples = 0;
        let found = VanitySearcher::new(&encoder, config(2))
            .search(&account(), &matcher, 0, |_| samples += 1)
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(samples, 0);
    }

    #[test]
    fn test_invalid_pattern_rejected_before_work() {
        let encoder = P2pkh::default();
        let matcher = PatternMatcher::new(vec![]).unwrap();
        let mut samples = 0;
        let err = VanitySearcher::new(&encoder, config(2))
            .search(&account(), &matcher, 1, |_| samples += 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern(_)));
        assert_eq!(samples, 0);
    }

    #[test]
    fn test_exhausted_index_space() {
        let encoder = P2pkh::default();
        // '0' never appears in base58
        let matcher = PatternMatcher::single(Pattern::contains("0")).unwrap();
        let searcher = VanitySearcher::new(
            &encoder,
            SearchConfig { index_limit: 40, ..config(3) },
        );
        let err = searcher.search(&account(), &matcher, 1, |_| {}).unwrap_err();
        match err {
            Error::SearchExhausted { wanted, found, scanned } => {
                assert_eq!(wanted, 1);
                assert_eq!(found, 0);
                assert_eq!(scanned, 40);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_collector_keeps_lowest() {
        let account = account();
        let encoder = P2pkh::default();
        let collector = Collector::new(2);
        for index in [9u32, 4, 7, 1] {
            let wallet = Wallet::derive(&account, &encoder, index).unwrap();
            collector.offer(VanityMatch { wallet, label: String::new() });
        }
        assert_eq!(collector.bound(), 4);
        let progress = SearchStats::new().snapshot();
        let kept: Vec<u32> = collector.finish(&progress).unwrap().iter().map(|m| m.index()).collect();
        assert_eq!(kept, vec![1, 4]);
    }
}

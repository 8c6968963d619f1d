use crate::models::CompanyRecord;
use crate::nip::Nip;
use moka::future::Cache;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How long a lookup result (found or not) stays cached.
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Why a NIP has no company record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// The registry answered, but has no company under this NIP.
    NotRegistered,
    /// The registry rejected the NIP as invalid.
    RejectedByRegistry,
}

/// A cached lookup result. Absence is cached like a hit.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedLookup {
    Found(Arc<CompanyRecord>),
    Absent(Absence),
}

/// The cache-miss computation failed. Nothing was cached.
#[derive(Debug)]
pub struct ComputeFailed<E>(pub Arc<E>);

impl<E: fmt::Display> fmt::Display for ComputeFailed<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lookup computation failed: {}", self.0)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ComputeFailed<E> {}

/// Lookup cache keyed by canonical NIP.
///
/// Concurrent misses for the same NIP share a single computation: the first
/// caller runs it, the others await its result. Errors are handed to every
/// waiter but never stored, so the next call retries. If the computing caller
/// is dropped mid-flight, one of the waiters takes over the computation.
#[derive(Clone)]
pub struct LookupCache {
    entries: Cache<Nip, CachedLookup>,
}

impl LookupCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();

        Self { entries }
    }

    /// Returns the cached result for `key`, computing and caching it on a miss.
    pub async fn get_or_compute<F, E>(
        &self,
        key: Nip,
        compute: F,
    ) -> Result<CachedLookup, ComputeFailed<E>>
    where
        F: Future<Output = Result<CachedLookup, E>>,
        E: Send + Sync + 'static,
    {
        self.entries
            .try_get_with(key, compute)
            .await
            .map_err(ComputeFailed)
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(CACHE_TTL, 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn nip(raw: &str) -> Nip {
        Nip::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_absence_is_cached() {
        let cache = LookupCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = cache
                .get_or_compute(nip("1234567890"), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(CachedLookup::Absent(Absence::NotRegistered))
                })
                .await
                .unwrap();
            assert_eq!(result, CachedLookup::Absent(Absence::NotRegistered));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        cache.entries.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = LookupCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result = cache
                .get_or_compute(nip("1234567890"), async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<CachedLookup, _>("upstream down".to_string())
                })
                .await;
            let err = result.unwrap_err();
            assert_eq!(err.0.as_str(), "upstream down");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.entries.get(&nip("1234567890")).await, None);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_computation() {
        let cache = LookupCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![];
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute(nip("1234567890"), async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, String>(CachedLookup::Absent(Absence::RejectedByRegistry))
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(
                handle.await.unwrap(),
                CachedLookup::Absent(Absence::RejectedByRegistry)
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = LookupCache::new(Duration::from_millis(50), 100);
        let key = nip("1234567890");

        cache
            .get_or_compute(key.clone(), async {
                Ok::<_, String>(CachedLookup::Absent(Absence::NotRegistered))
            })
            .await
            .unwrap();
        assert!(cache.entries.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.entries.get(&key).await, None);
    }

    #[tokio::test]
    async fn test_cancelled_caller_hands_computation_to_waiter() {
        let cache = LookupCache::default();
        let key = nip("1234567890");

        let leader = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute(key, async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        Ok::<_, String>(CachedLookup::Absent(Absence::NotRegistered))
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let waiter = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .get_or_compute(key, async {
                        Ok::<_, String>(CachedLookup::Absent(Absence::RejectedByRegistry))
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());

        let result = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter must not hang on the cancelled computation")
            .unwrap()
            .unwrap();
        assert_eq!(result, CachedLookup::Absent(Absence::RejectedByRegistry));
        assert_eq!(
            cache.entries.get(&key).await,
            Some(CachedLookup::Absent(Absence::RejectedByRegistry))
        );
    }
}

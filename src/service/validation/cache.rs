use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::shared::entities::ValidationResult;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    result: ValidationResult,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub ttl: Duration,
}

/// TTL-bounded memo of liveness lookups keyed by phone number.
///
/// Entries are replaced, never updated in place. An entry past its expiry
/// is treated as absent and dropped on the read that notices it; `sweep`
/// removes the rest for callers that see many one-off numbers.
///
/// The cache is built explicitly and shared by `Arc`; it owns no external
/// resources, so dropping it is the whole teardown.
#[derive(Debug)]
pub struct ValidationCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for ValidationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ValidationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<ValidationResult> {
        let now = Utc::now();
        {
            let entry = self.entries.get(key)?;
            if now < entry.expires_at {
                return Some(entry.result.clone());
            }
        }
        self.entries
            .remove_if(key, |_, entry| now >= entry.expires_at);
        None
    }

    pub fn put(&self, key: impl Into<String>, result: ValidationResult) {
        let expires_at = self.expiry_for(result.observed_at);
        self.entries
            .insert(key.into(), CacheEntry { result, expires_at });
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = now < entry.expires_at;
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            log::debug!("[ValidationCache] swept expired entries removed={}", removed);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ttl: self.ttl,
        }
    }

    fn expiry_for(&self, observed_at: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| observed_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(number: &str, age: TimeDelta) -> ValidationResult {
        let mut result = ValidationResult::new(number, true, 0.95, "test");
        result.observed_at = Utc::now() - age;
        result
    }

    #[test]
    fn fresh_entry_is_returned() {
        let cache = ValidationCache::default();
        cache.put("212661234567", observed("212661234567", TimeDelta::zero()));
        let hit = cache.get("212661234567").expect("fresh entry");
        assert!(hit.is_live);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entry_older_than_ttl_is_absent_and_evicted() {
        let cache = ValidationCache::default();
        cache.put("212661234567", observed("212661234567", TimeDelta::hours(25)));
        assert_eq!(cache.get("212661234567"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn put_replaces_existing_entry() {
        let cache = ValidationCache::default();
        cache.put("1", observed("1", TimeDelta::zero()));
        cache.put("1", ValidationResult::new("1", false, 0.9, "test"));
        let hit = cache.get("1").expect("entry");
        assert!(!hit.is_live);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let cache = ValidationCache::new(Duration::from_secs(60));
        cache.put("old-1", observed("old-1", TimeDelta::minutes(5)));
        cache.put("old-2", observed("old-2", TimeDelta::minutes(2)));
        cache.put("new", observed("new", TimeDelta::seconds(1)));

        assert_eq!(cache.sweep(), 2);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                ttl: Duration::from_secs(60)
            }
        );
        assert!(cache.get("new").is_some());

        cache.clear();
        assert!(cache.is_empty());
    }
}

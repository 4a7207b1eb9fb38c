use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info, warn};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;

use super::cache::ValidationCache;
use crate::shared::config::LivenessConfig;
use crate::shared::entities::ValidationResult;
use crate::shared::ports::{LivenessError, LivenessPort};
use crate::shared::utils::{digits_only, mask_phone};

type Outcome = Option<Result<ValidationResult, LivenessError>>;

/// Lookup currently running for a number. Followers watch `outcome` until
/// the leader publishes its result or goes away.
struct PendingLookup {
    id: u64,
    outcome: watch::Receiver<Outcome>,
}

type InFlight = DashMap<String, PendingLookup>;

enum Role<'a> {
    Leader(Flight<'a>),
    Follower(watch::Receiver<Outcome>),
}

/// Cache-fronted liveness lookups with at most one external fetch in flight
/// per number.
///
/// Cloning is cheap and every clone shares the cache and in-flight table.
#[derive(Clone)]
pub struct LivenessValidator {
    port: Arc<dyn LivenessPort>,
    cache: Arc<ValidationCache>,
    in_flight: Arc<InFlight>,
    next_flight: Arc<AtomicU64>,
    timeout: Duration,
    batch_concurrency: usize,
}

impl LivenessValidator {
    pub fn new(port: Arc<dyn LivenessPort>, cache: Arc<ValidationCache>) -> Self {
        let defaults = LivenessConfig::default();
        Self {
            port,
            cache,
            in_flight: Arc::new(DashMap::new()),
            next_flight: Arc::new(AtomicU64::new(0)),
            timeout: defaults.timeout,
            batch_concurrency: defaults.batch_concurrency,
        }
    }

    pub fn from_config(
        port: Arc<dyn LivenessPort>,
        cache: Arc<ValidationCache>,
        config: &LivenessConfig,
    ) -> Self {
        Self::new(port, cache)
            .with_timeout(config.timeout)
            .with_batch_concurrency(config.batch_concurrency)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_batch_concurrency(mut self, batch_concurrency: usize) -> Self {
        self.batch_concurrency = batch_concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &Arc<ValidationCache> {
        &self.cache
    }

    pub async fn check(&self, number: &str) -> Result<ValidationResult, LivenessError> {
        self.check_with_timeout(number, self.timeout).await
    }

    /// Returns the cached result when fresh, otherwise fetches, caches and
    /// returns it. Failures are returned to the caller and never cached.
    ///
    /// Concurrent callers for one number share the first caller's lookup and
    /// its outcome, errors included. `timeout` bounds the whole call, waiting
    /// on another caller's lookup included. Dropping the returned future
    /// mid-fetch leaves the cache untouched; waiters then take over.
    pub async fn check_with_timeout(
        &self,
        number: &str,
        timeout: Duration,
    ) -> Result<ValidationResult, LivenessError> {
        let key = digits_only(number);
        if key.is_empty() {
            return Err(LivenessError::InvalidNumber(number.to_string()));
        }
        if let Some(hit) = self.cache.get(&key) {
            debug!("[LivenessValidator] cache hit number={}", mask_phone(&key));
            return Ok(hit);
        }

        let deadline = Instant::now() + timeout;
        let timeout_ms = timeout.as_millis() as u64;
        loop {
            let outcome = match self.join_or_lead(&key) {
                Role::Leader(flight) => {
                    let outcome = self.lead(&key, deadline, timeout_ms).await;
                    flight.finish(outcome.clone());
                    return outcome;
                }
                Role::Follower(outcome) => {
                    match tokio::time::timeout_at(deadline, wait_for_leader(outcome)).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            warn!(
                                "[LivenessValidator] gave up waiting on shared lookup number={} timeout_ms={}",
                                mask_phone(&key),
                                timeout_ms
                            );
                            return Err(LivenessError::Timeout(timeout_ms));
                        }
                    }
                }
            };
            match outcome {
                Some(outcome) => {
                    debug!(
                        "[LivenessValidator] coalesced onto shared lookup number={}",
                        mask_phone(&key)
                    );
                    return outcome;
                }
                // Leader was cancelled before publishing; try again.
                None => {
                    if let Some(hit) = self.cache.get(&key) {
                        return Ok(hit);
                    }
                }
            }
        }
    }

    /// Checks many numbers with at most `batch_concurrency` lookups running
    /// at once. Each distinct input gets its own result.
    pub async fn check_batch(
        &self,
        numbers: &[String],
    ) -> HashMap<String, Result<ValidationResult, LivenessError>> {
        let semaphore = Arc::new(Semaphore::new(self.batch_concurrency));
        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();
        for number in numbers {
            if !seen.insert(number.clone()) {
                continue;
            }
            let validator = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let number = number.clone();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let err = LivenessError::RequestFailed("batch closed".to_string());
                        return (number, Err(err));
                    }
                };
                let result = validator.check(&number).await;
                (number, result)
            });
        }

        let mut results = HashMap::with_capacity(seen.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((number, result)) => {
                    results.insert(number, result);
                }
                Err(err) => warn!("[LivenessValidator] batch task aborted: {}", err),
            }
        }
        info!(
            "[LivenessValidator] batch finished requested={} distinct={} concurrency={}",
            numbers.len(),
            results.len(),
            self.batch_concurrency
        );
        results
    }

    fn join_or_lead(&self, key: &str) -> Role<'_> {
        match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(pending) => Role::Follower(pending.get().outcome.clone()),
            Entry::Vacant(slot) => {
                let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                let (sender, outcome) = watch::channel(None);
                slot.insert(PendingLookup { id, outcome });
                Role::Leader(Flight {
                    table: &self.in_flight,
                    key: key.to_string(),
                    id,
                    sender,
                })
            }
        }
    }

    async fn lead(
        &self,
        key: &str,
        deadline: Instant,
        timeout_ms: u64,
    ) -> Result<ValidationResult, LivenessError> {
        // An earlier leader may have stored its result after our cache miss.
        if let Some(hit) = self.cache.get(key) {
            return Ok(hit);
        }
        let reply =
            match tokio::time::timeout_at(deadline, self.port.check(key.to_string())).await {
                Ok(Ok(reply)) => reply,
                Ok(Err(err)) => {
                    warn!(
                        "[LivenessValidator] lookup failed number={} err={}",
                        mask_phone(key),
                        err
                    );
                    return Err(err);
                }
                Err(_) => {
                    warn!(
                        "[LivenessValidator] lookup timed out number={} timeout_ms={}",
                        mask_phone(key),
                        timeout_ms
                    );
                    return Err(LivenessError::Timeout(timeout_ms));
                }
            };

        let result = ValidationResult::new(key, reply.is_live, reply.confidence, reply.source);
        self.cache.put(key, result.clone());
        info!(
            "[LivenessValidator] cached number={} is_live={} confidence={:.2} source={}",
            mask_phone(key),
            result.is_live,
            result.confidence,
            result.source
        );
        Ok(result)
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}

/// Resolves to the leader's outcome, or `None` when the leader went away
/// without publishing one.
async fn wait_for_leader(mut outcome: watch::Receiver<Outcome>) -> Outcome {
    loop {
        let current = outcome.borrow_and_update().clone();
        if current.is_some() {
            return current;
        }
        if outcome.changed().await.is_err() {
            let last = outcome.borrow().clone();
            return last;
        }
    }
}

/// Leader's handle on its in-flight entry. The entry is removed when the
/// handle drops, published or not.
struct Flight<'a> {
    table: &'a InFlight,
    key: String,
    id: u64,
    sender: watch::Sender<Outcome>,
}

impl Flight<'_> {
    fn finish(self, outcome: Result<ValidationResult, LivenessError>) {
        self.sender.send_replace(Some(outcome));
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let id = self.id;
        self.table.remove_if(&self.key, |_, pending| pending.id == id);
    }
}

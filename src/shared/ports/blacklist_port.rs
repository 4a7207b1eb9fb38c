use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlacklistPortError {
    #[error("read failed: {0}")]
    ReadFailed(String),
}

pub type BlacklistFuture<T> = Pin<Box<dyn Future<Output = Result<T, BlacklistPortError>> + Send>>;

pub trait BlacklistPort: Send + Sync {
    fn is_blacklisted(&self, number: &str) -> BlacklistFuture<bool>;
}

/// Exact-match blacklist held in memory.
#[derive(Debug, Default)]
pub struct InMemoryBlacklist {
    numbers: RwLock<HashSet<String>>,
}

impl InMemoryBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_numbers<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            numbers: RwLock::new(numbers.into_iter().map(Into::into).collect()),
        }
    }

    pub fn add(&self, number: impl Into<String>) {
        if let Ok(mut numbers) = self.numbers.write() {
            numbers.insert(number.into());
        }
    }

    pub fn remove(&self, number: &str) -> bool {
        self.numbers
            .write()
            .map(|mut numbers| numbers.remove(number))
            .unwrap_or(false)
    }
}

impl BlacklistPort for InMemoryBlacklist {
    fn is_blacklisted(&self, number: &str) -> BlacklistFuture<bool> {
        let result = self
            .numbers
            .read()
            .map(|numbers| numbers.contains(number))
            .map_err(|_| BlacklistPortError::ReadFailed("blacklist lock poisoned".to_string()));
        Box::pin(async move { result })
    }
}

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::shared::entities::Prefix;

#[derive(Debug, Error)]
pub enum RouteSourceError {
    #[error("read failed: {0}")]
    ReadFailed(String),
}

pub type RouteSourceFuture<T> = Pin<Box<dyn Future<Output = Result<T, RouteSourceError>> + Send>>;

pub trait RouteSourcePort: Send + Sync {
    fn get_active_prefixes(&self) -> RouteSourceFuture<Vec<Prefix>>;
}

/// Fixed prefix list, used for static deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRouteSource {
    prefixes: Vec<Prefix>,
}

impl StaticRouteSource {
    pub fn new(prefixes: Vec<Prefix>) -> Self {
        Self { prefixes }
    }
}

impl RouteSourcePort for StaticRouteSource {
    fn get_active_prefixes(&self) -> RouteSourceFuture<Vec<Prefix>> {
        let prefixes = self.prefixes.clone();
        Box::pin(async move { Ok(prefixes) })
    }
}

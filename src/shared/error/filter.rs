use thiserror::Error;

use crate::shared::ports::{BlacklistPortError, RouteSourceError};

/// Hard failures of the admission pipeline. Ordinary rejections are
/// `FilterDecision`s, not errors.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("blacklist lookup failed for source {number}: {source}")]
    Blacklist {
        number: String,
        #[source]
        source: BlacklistPortError,
    },
    #[error("route table refresh failed: {0}")]
    RouteSource(#[from] RouteSourceError),
}

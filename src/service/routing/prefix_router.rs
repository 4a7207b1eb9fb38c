use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{info, warn};

use crate::shared::entities::Prefix;
use crate::shared::ports::{RouteSourceError, RouteSourcePort};
use crate::shared::utils::strip_separators;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub prefix: String,
    pub gateway_id: String,
}

/// Active prefixes with unique values, in load order.
#[derive(Debug, Default)]
struct RouteTable {
    prefixes: Vec<Prefix>,
}

impl RouteTable {
    fn build(rows: Vec<Prefix>) -> Self {
        let mut seen = HashSet::new();
        let mut prefixes = Vec::with_capacity(rows.len());
        for mut row in rows {
            if !row.active {
                continue;
            }
            row.value = normalize(&row.value);
            if row.value.is_empty() {
                warn!("[PrefixRouter] skipping empty prefix gateway={}", row.gateway_id);
                continue;
            }
            if !seen.insert(row.value.clone()) {
                warn!(
                    "[PrefixRouter] duplicate active prefix={} gateway={} ignored",
                    row.value, row.gateway_id
                );
                continue;
            }
            prefixes.push(row);
        }
        Self { prefixes }
    }
}

fn normalize(number: &str) -> String {
    let cleaned = strip_separators(number);
    cleaned.trim_start_matches('+').to_string()
}

/// Longest-prefix router over a table that can be swapped while lookups
/// are running.
#[derive(Debug)]
pub struct PrefixRouter {
    table: ArcSwap<RouteTable>,
}

impl Default for PrefixRouter {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PrefixRouter {
    pub fn new(prefixes: Vec<Prefix>) -> Self {
        Self {
            table: ArcSwap::from_pointee(RouteTable::build(prefixes)),
        }
    }

    pub fn route(&self, dest_number: &str) -> Option<RouteMatch> {
        let number = normalize(dest_number);
        let table = self.table.load();
        table
            .prefixes
            .iter()
            .filter(|prefix| number.starts_with(prefix.value.as_str()))
            .max_by_key(|prefix| prefix.value.len())
            .map(|prefix| RouteMatch {
                prefix: prefix.value.clone(),
                gateway_id: prefix.gateway_id.clone(),
            })
    }

    /// Installs a new table and returns the number of usable prefixes.
    pub fn replace(&self, prefixes: Vec<Prefix>) -> usize {
        let table = RouteTable::build(prefixes);
        let count = table.prefixes.len();
        self.table.store(Arc::new(table));
        count
    }

    /// Reloads from `source`. On error the current table stays in place.
    pub async fn refresh(&self, source: &dyn RouteSourcePort) -> Result<usize, RouteSourceError> {
        let rows = source.get_active_prefixes().await?;
        let loaded = rows.len();
        let count = self.replace(rows);
        info!(
            "[PrefixRouter] route table refreshed rows={} active={}",
            loaded, count
        );
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.table.load().prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ports::{RouteSourceFuture, StaticRouteSource};

    #[test]
    fn longest_active_prefix_wins() {
        let router = PrefixRouter::new(vec![
            Prefix::active("21", "gw-generic"),
            Prefix::active("212", "gw-morocco"),
            Prefix::new("2126", "gw-morocco-mobile-legacy", false),
        ]);
        let hit = router.route("212661234567").expect("route");
        assert_eq!(hit.prefix, "212");
        assert_eq!(hit.gateway_id, "gw-morocco");
        assert_eq!(router.route("+213551234567").map(|m| m.prefix), Some("21".to_string()));
    }

    #[test]
    fn strips_plus_before_matching() {
        let router = PrefixRouter::new(vec![Prefix::active("+234", "gw-nigeria")]);
        let hit = router.route("+2348031234567").expect("route");
        assert_eq!(hit.prefix, "234");
        assert_eq!(router.route("+4420"), None);
    }

    #[test]
    fn later_duplicates_are_dropped() {
        let router = PrefixRouter::new(vec![
            Prefix::active("212", "gw-first"),
            Prefix::active("212", "gw-second"),
        ]);
        assert_eq!(router.len(), 1);
        assert_eq!(
            router.route("212661234567").map(|m| m.gateway_id),
            Some("gw-first".to_string())
        );
    }

    struct BrokenSource;

    impl RouteSourcePort for BrokenSource {
        fn get_active_prefixes(&self) -> RouteSourceFuture<Vec<Prefix>> {
            Box::pin(async { Err(RouteSourceError::ReadFailed("db down".to_string())) })
        }
    }

    #[tokio::test]
    async fn refresh_swaps_table_and_keeps_it_on_error() {
        let router = PrefixRouter::default();
        assert!(router.is_empty());

        let source = StaticRouteSource::new(vec![
            Prefix::active("212", "gw-morocco"),
            Prefix::new("234", "gw-nigeria", false),
        ]);
        assert_eq!(router.refresh(&source).await.expect("refresh"), 1);
        assert!(router.route("212661234567").is_some());
        assert!(router.route("2348031234567").is_none());

        assert!(router.refresh(&BrokenSource).await.is_err());
        assert_eq!(router.len(), 1);
    }
}

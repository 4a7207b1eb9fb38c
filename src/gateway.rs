use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::interface::db::PostgresAdapter;
use crate::interface::http::{LivenessHttpClient, NumVerifyClient, ScorerHttpClient};
use crate::service::classification::TranscriptClassifier;
use crate::service::dispatch::ActionDispatcher;
use crate::service::recognition::RecognitionService;
use crate::service::routing::{FilterPipeline, PrefixRouter};
use crate::service::validation::{LivenessValidator, TablePhoneValidator, ValidationCache};
use crate::shared::config::{
    self, AgentConfig, ClassifierConfig, DatabaseConfig, FilterConfig, LivenessConfig,
    LivenessProvider,
};
use crate::shared::ports::{
    BlacklistPort, CallRecordPort, InMemoryBlacklist, LivenessPort, NoopCallRecord,
    NoopSimRegistry,
    RouteSourcePort, SimRegistryPort, StaticAgentPool, StaticRouteSource,
};

#[derive(Clone, Debug, Default)]
pub struct GatewaySettings {
    pub filter: FilterConfig,
    pub liveness: LivenessConfig,
    pub classifier: ClassifierConfig,
    pub database: DatabaseConfig,
    pub agents: AgentConfig,
}

impl GatewaySettings {
    pub fn from_env() -> Self {
        Self {
            filter: config::filter_config().clone(),
            liveness: config::liveness_config().clone(),
            classifier: config::classifier_config().clone(),
            database: config::database_config().clone(),
            agents: config::agent_config().clone(),
        }
    }
}

struct Stores {
    blacklist: Arc<dyn BlacklistPort>,
    route_source: Arc<dyn RouteSourcePort>,
    sims: Arc<dyn SimRegistryPort>,
    records: Arc<dyn CallRecordPort>,
}

/// Fully wired admission and recognition paths.
pub struct Gateway {
    pub pipeline: FilterPipeline,
    pub recognition: RecognitionService,
    cache: Arc<ValidationCache>,
    route_source: Arc<dyn RouteSourcePort>,
}

impl Gateway {
    pub async fn from_env() -> Result<Self> {
        Self::build(&GatewaySettings::from_env()).await
    }

    pub async fn build(settings: &GatewaySettings) -> Result<Self> {
        let liveness_port = liveness_port(&settings.liveness)?;

        let stores = match settings.database.url {
            Some(_) => {
                let db = Arc::new(
                    PostgresAdapter::from_config(&settings.database)
                        .await
                        .context("failed to connect to database")?,
                );
                Stores {
                    blacklist: db.clone(),
                    route_source: db.clone(),
                    sims: db.clone(),
                    records: db,
                }
            }
            None => {
                warn!("[Gateway] DATABASE_URL not set, using in-memory blacklist and empty route table");
                Stores {
                    blacklist: Arc::new(InMemoryBlacklist::new()),
                    route_source: Arc::new(StaticRouteSource::default()),
                    sims: Arc::new(NoopSimRegistry::new()),
                    records: Arc::new(NoopCallRecord::new()),
                }
            }
        };
        let Stores {
            blacklist,
            route_source,
            sims,
            records,
        } = stores;

        let cache = Arc::new(ValidationCache::new(settings.liveness.cache_ttl));
        let liveness = LivenessValidator::from_config(
            liveness_port,
            Arc::clone(&cache),
            &settings.liveness,
        );
        let router = Arc::new(PrefixRouter::default());
        router
            .refresh(route_source.as_ref())
            .await
            .context("failed to load route table")?;

        let pipeline = FilterPipeline::new(
            blacklist,
            Arc::new(TablePhoneValidator::from_config(&settings.filter)),
            liveness,
            router,
            settings.filter.clone(),
        );

        let mut classifier = TranscriptClassifier::new(&settings.classifier)
            .context("failed to compile classification rules")?;
        if settings.classifier.scorer_enabled {
            let scorer = ScorerHttpClient::from_config(&settings.classifier)
                .context("failed to build scorer client")?;
            classifier = classifier.with_scorer(Arc::new(scorer));
        }

        let agents = StaticAgentPool::new(settings.agents.endpoints.clone());
        if agents.is_empty() {
            warn!("[Gateway] ASSISTED_AGENT_ENDPOINTS empty, ROUTE_TO_AI actions will fail");
        }
        let dispatcher = ActionDispatcher::new(Arc::new(agents), sims, records);
        let recognition = RecognitionService::new(Arc::new(classifier), Arc::new(dispatcher));

        info!(
            "[Gateway] ready routes={} cache_ttl_sec={} scorer={}",
            pipeline.router().len(),
            settings.liveness.cache_ttl.as_secs(),
            settings.classifier.scorer_enabled
        );
        Ok(Self {
            pipeline,
            recognition,
            cache,
            route_source,
        })
    }

    /// Reloads the active prefixes and swaps the route table.
    pub async fn refresh_routes(&self) -> Result<usize> {
        let count = self
            .pipeline
            .reload_routes(self.route_source.as_ref())
            .await
            .context("failed to refresh route table")?;
        Ok(count)
    }

    /// Drops expired liveness results.
    pub fn sweep_cache(&self) -> usize {
        self.cache.sweep()
    }

    pub fn cache(&self) -> &Arc<ValidationCache> {
        &self.cache
    }
}

fn liveness_port(config: &LivenessConfig) -> Result<Arc<dyn LivenessPort>> {
    let port: Arc<dyn LivenessPort> = match config.provider {
        LivenessProvider::WaValidator => Arc::new(
            LivenessHttpClient::from_config(config)
                .context("liveness API requires LIVENESS_API_URL and LIVENESS_API_KEY")?,
        ),
        LivenessProvider::NumVerify => Arc::new(
            NumVerifyClient::from_config(config)
                .context("numverify provider requires LIVENESS_API_KEY")?,
        ),
    };
    info!("[Gateway] liveness provider={:?}", config.provider);
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::entities::{Call, FilterAction};

    fn settings() -> GatewaySettings {
        let mut settings = GatewaySettings::default();
        settings.liveness.api_url = Some("http://127.0.0.1:9/validate".to_string());
        settings.liveness.api_key = Some("test-key".to_string());
        settings
    }

    #[tokio::test]
    async fn builds_without_database() {
        let gateway = Gateway::build(&settings()).await.expect("gateway");
        assert_eq!(gateway.refresh_routes().await.expect("refresh"), 0);
        assert_eq!(gateway.sweep_cache(), 0);

        let decision = gateway
            .pipeline
            .process_call(&Call::new("+2348012345678", "+2348031234567"))
            .await
            .expect("decision");
        assert_eq!(decision.action(), FilterAction::Reject);
    }

    #[tokio::test]
    async fn numverify_provider_needs_only_a_key() {
        let mut settings = GatewaySettings::default();
        settings.liveness.provider = LivenessProvider::NumVerify;
        assert!(Gateway::build(&settings).await.is_err());

        settings.liveness.api_key = Some("test-key".to_string());
        let gateway = Gateway::build(&settings).await.expect("gateway");
        assert_eq!(gateway.sweep_cache(), 0);
    }

    #[tokio::test]
    async fn liveness_settings_are_required() {
        assert!(Gateway::build(&GatewaySettings::default()).await.is_err());
    }
}

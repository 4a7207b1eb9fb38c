use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use call_gateway_core::config::FilterConfig;
use call_gateway_core::entities::{Call, FilterAction, Prefix};
use call_gateway_core::ports::{
    InMemoryBlacklist, LivenessFuture, LivenessPort, LivenessReply, StaticRouteSource,
};
use call_gateway_core::routing::{FilterPipeline, PrefixRouter};
use call_gateway_core::validation::{LivenessValidator, TablePhoneValidator, ValidationCache};

/// Stand-in for the messaging-channel API: counts lookups and answers
/// after a fixed delay.
struct SlowLiveness {
    calls: AtomicUsize,
    delay: Duration,
}

impl SlowLiveness {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LivenessPort for SlowLiveness {
    fn check(&self, _number: String) -> LivenessFuture {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(LivenessReply {
                is_live: true,
                confidence: 0.95,
                source: "e2e".to_string(),
            })
        })
    }
}

struct Gateway {
    pipeline: FilterPipeline,
    liveness: Arc<SlowLiveness>,
}

async fn gateway(ttl: Duration) -> Result<Gateway, Box<dyn std::error::Error>> {
    let liveness = SlowLiveness::new(Duration::from_millis(30));
    let router = Arc::new(PrefixRouter::default());
    let loaded = router
        .refresh(&StaticRouteSource::new(vec![
            Prefix::active("21", "gw-maghreb"),
            Prefix::active("212", "gw-morocco"),
            Prefix::new("2126", "gw-retired", false),
        ]))
        .await?;
    assert_eq!(loaded, 2);

    let pipeline = FilterPipeline::new(
        Arc::new(InMemoryBlacklist::from_numbers(["+2341234567890"])),
        Arc::new(TablePhoneValidator::default()),
        LivenessValidator::new(liveness.clone(), Arc::new(ValidationCache::new(ttl))),
        router,
        FilterConfig::default(),
    );
    Ok(Gateway { pipeline, liveness })
}

#[tokio::test]
async fn filter_pipeline_e2e() -> Result<(), Box<dyn std::error::Error>> {
    let gw = gateway(Duration::from_secs(3600)).await?;

    let blocked = gw
        .pipeline
        .process_call(&Call::new("+2341234567890", "+212661234567"))
        .await?;
    assert_eq!(blocked.action(), FilterAction::Blackhole);
    assert_eq!(gw.liveness.calls(), 0);

    let routed = gw
        .pipeline
        .process_call(&Call::new("+2348012345678", "+212661234567"))
        .await?;
    assert_eq!(routed.action(), FilterAction::Route);
    assert_eq!(routed.gateway_id(), Some("gw-morocco"));
    assert_eq!(routed.prefix(), Some("212"));

    // Same destination again: identical decision, answered from cache.
    let again = gw
        .pipeline
        .process_call(&Call::new("+2348012345678", "+212661234567"))
        .await?;
    assert_eq!(again, routed);
    assert_eq!(gw.liveness.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_calls_to_one_destination_share_a_lookup() -> Result<(), Box<dyn std::error::Error>>
{
    let gw = gateway(Duration::from_secs(3600)).await?;
    let call = Call::new("+2348012345678", "+212 661-234567");

    let (a, b, c) = tokio::join!(
        gw.pipeline.process_call(&call),
        gw.pipeline.process_call(&call),
        gw.pipeline.process_call(&call),
    );
    for decision in [a?, b?, c?] {
        assert_eq!(decision.gateway_id(), Some("gw-morocco"));
    }
    assert_eq!(gw.liveness.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn expired_validation_is_fetched_again() -> Result<(), Box<dyn std::error::Error>> {
    let gw = gateway(Duration::from_millis(50)).await?;
    let call = Call::new("+2348012345678", "+212661234567");

    gw.pipeline.process_call(&call).await?;
    tokio::time::sleep(Duration::from_millis(120)).await;
    let decision = gw.pipeline.process_call(&call).await?;

    assert!(decision.is_route());
    assert_eq!(gw.liveness.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn out_of_domain_destinations_never_reach_liveness() -> Result<(), Box<dyn std::error::Error>>
{
    let gw = gateway(Duration::from_secs(3600)).await?;

    let foreign = gw
        .pipeline
        .process_call(&Call::new("+2348012345678", "+2348031234567"))
        .await?;
    assert_eq!(foreign.action(), FilterAction::Reject);
    assert!(foreign.reason().contains("212"));

    let long = gw
        .pipeline
        .process_call(&Call::new("+2348012345678", "+2126612345678"))
        .await?;
    assert_eq!(long.action(), FilterAction::Reject);
    assert_eq!(
        long.reason(),
        "invalid destination length: expected 12 digits, got 13"
    );

    assert_eq!(gw.liveness.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn route_table_swap_applies_to_later_calls() -> Result<(), Box<dyn std::error::Error>> {
    let gw = gateway(Duration::from_secs(3600)).await?;
    let call = Call::new("+2348012345678", "+212661234567");

    gw.pipeline
        .router()
        .replace(vec![Prefix::active("2126", "gw-mobile")]);
    let decision = gw.pipeline.process_call(&call).await?;
    assert_eq!(decision.gateway_id(), Some("gw-mobile"));

    gw.pipeline.router().replace(Vec::new());
    let decision = gw.pipeline.process_call(&call).await?;
    assert_eq!(decision.action(), FilterAction::Reject);
    assert_eq!(decision.reason(), "no route found");
    Ok(())
}

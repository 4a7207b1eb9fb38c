use std::env;
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use call_gateway_core::config::FilterConfig;
use call_gateway_core::entities::{Call, FilterAction, Prefix};
use call_gateway_core::logging;
use call_gateway_core::ports::{InMemoryBlacklist, LivenessFuture, LivenessPort, LivenessReply};
use call_gateway_core::routing::{FilterPipeline, PrefixRouter};
use call_gateway_core::validation::{LivenessValidator, TablePhoneValidator, ValidationCache};

struct LiveEverywhere;

impl LivenessPort for LiveEverywhere {
    fn check(&self, _number: String) -> LivenessFuture {
        Box::pin(async {
            Ok(LivenessReply {
                is_live: true,
                confidence: 0.95,
                source: "e2e".to_string(),
            })
        })
    }
}

// Only test in this binary: the logger and its config are process-wide and
// must be installed from the environment set here.
#[tokio::test]
async fn decisions_are_logged_to_file_with_numbers_masked(
) -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let log_dir = temp.path().join("logs");
    env::set_var("LOG_MODE", "file");
    env::set_var("LOG_DIR", log_dir.to_string_lossy().as_ref());
    env::set_var("LOG_FILE_NAME", "call-gateway.log");
    env::set_var("LOG_FORMAT", "text");
    env::set_var("RUST_LOG", "info");
    logging::init();

    let pipeline = FilterPipeline::new(
        Arc::new(InMemoryBlacklist::from_numbers(["+2341234567890"])),
        Arc::new(TablePhoneValidator::default()),
        LivenessValidator::new(Arc::new(LiveEverywhere), Arc::new(ValidationCache::default())),
        Arc::new(PrefixRouter::new(vec![Prefix::active("212", "gw-morocco")])),
        FilterConfig::default(),
    );

    let blocked = pipeline
        .process_call(&Call::new("+2341234567890", "+212661234567"))
        .await?;
    assert_eq!(blocked.action(), FilterAction::Blackhole);
    let routed = pipeline
        .process_call(&Call::new("+2348012345678", "+212661234567"))
        .await?;
    assert_eq!(routed.gateway_id(), Some("gw-morocco"));

    let log_file = log_dir.join("call-gateway.log");
    assert!(log_file.exists(), "log file was not created");
    let contents = fs::read_to_string(&log_file)?;
    assert!(contents.contains("gate=blacklist decision=BLACKHOLE"));
    assert!(contents.contains("gate=route decision=ROUTE"));
    assert!(contents.contains("tail=4567"));
    for raw in ["661234567", "2341234567890", "8012345678"] {
        assert!(!contents.contains(raw), "raw number {raw} leaked to log");
    }
    Ok(())
}

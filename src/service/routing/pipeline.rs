use std::sync::Arc;

use log::{info, warn};

use super::prefix_router::PrefixRouter;
use crate::service::validation::{LivenessValidator, PhoneFormatValidator};
use crate::shared::config::{FilterConfig, LivenessFallback};
use crate::shared::entities::{Call, FilterDecision};
use crate::shared::error::FilterError;
use crate::shared::ports::{BlacklistPort, RouteSourcePort};
use crate::shared::utils::mask_phone;

pub const REASON_BLACKLISTED: &str = "source blacklisted";
pub const REASON_EMPTY_SOURCE: &str = "empty source";
pub const REASON_INVALID_FORMAT: &str = "invalid destination format";
pub const REASON_NOT_LIVE: &str = "destination not reachable on required channel";
pub const REASON_LIVENESS_UNAVAILABLE: &str = "destination liveness check unavailable";
pub const REASON_NO_ROUTE: &str = "no route found";

/// Ordered admission gates producing one terminal decision per call:
/// blacklist, source presence, destination format, termination domain,
/// liveness, then route lookup. The first decisive gate wins.
pub struct FilterPipeline {
    blacklist: Arc<dyn BlacklistPort>,
    phone_validator: Arc<dyn PhoneFormatValidator>,
    liveness: LivenessValidator,
    router: Arc<PrefixRouter>,
    config: FilterConfig,
}

impl FilterPipeline {
    pub fn new(
        blacklist: Arc<dyn BlacklistPort>,
        phone_validator: Arc<dyn PhoneFormatValidator>,
        liveness: LivenessValidator,
        router: Arc<PrefixRouter>,
        config: FilterConfig,
    ) -> Self {
        Self {
            blacklist,
            phone_validator,
            liveness,
            router,
            config,
        }
    }

    pub fn router(&self) -> &Arc<PrefixRouter> {
        &self.router
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Swaps in a fresh route table snapshot. On failure the current table
    /// stays in service.
    pub async fn reload_routes(&self, source: &dyn RouteSourcePort) -> Result<usize, FilterError> {
        Ok(self.router.refresh(source).await?)
    }

    /// Input problems become `Reject`/`Blackhole` decisions. Only failures
    /// of hard dependencies are returned as errors.
    pub async fn process_call(&self, call: &Call) -> Result<FilterDecision, FilterError> {
        let source = call.source_number.trim();
        let src_log = mask_phone(source);
        let dst_log = mask_phone(&call.dest_number);

        let blacklisted = self
            .blacklist
            .is_blacklisted(source)
            .await
            .map_err(|source_err| FilterError::Blacklist {
                number: src_log.clone(),
                source: source_err,
            })?;
        if blacklisted {
            info!(
                "[FilterPipeline] src={} dst={} gate=blacklist decision=BLACKHOLE",
                src_log, dst_log
            );
            return Ok(FilterDecision::blackhole(REASON_BLACKLISTED));
        }

        if source.is_empty() {
            info!(
                "[FilterPipeline] dst={} gate=source decision=REJECT empty source",
                dst_log
            );
            return Ok(FilterDecision::reject(REASON_EMPTY_SOURCE));
        }

        let validation = self.phone_validator.validate(&call.dest_number, None);
        if !validation.is_valid {
            info!(
                "[FilterPipeline] src={} dst={} gate=format decision=REJECT",
                src_log, dst_log
            );
            return Ok(FilterDecision::reject(REASON_INVALID_FORMAT));
        }

        if let Some(reason) =
            self.domain_violation(&validation.country_code, &validation.e164_digits())
        {
            info!(
                "[FilterPipeline] src={} dst={} gate=domain decision=REJECT reason={}",
                src_log, dst_log, reason
            );
            return Ok(FilterDecision::reject(reason));
        }

        match self.liveness.check(&validation.e164()).await {
            Ok(result) if !result.is_live => {
                info!(
                    "[FilterPipeline] src={} dst={} gate=liveness decision=REJECT confidence={:.2}",
                    src_log, dst_log, result.confidence
                );
                return Ok(FilterDecision::reject(REASON_NOT_LIVE));
            }
            Ok(_) => {}
            Err(err) => match self.config.liveness_fallback {
                LivenessFallback::FailOpen => {
                    warn!(
                        "[FilterPipeline] src={} dst={} gate=liveness check failed, continuing: {}",
                        src_log, dst_log, err
                    );
                }
                LivenessFallback::FailClosed => {
                    warn!(
                        "[FilterPipeline] src={} dst={} gate=liveness decision=REJECT check failed: {}",
                        src_log, dst_log, err
                    );
                    return Ok(FilterDecision::reject(REASON_LIVENESS_UNAVAILABLE));
                }
            },
        }

        match self.router.route(&validation.e164_digits()) {
            Some(hit) => {
                info!(
                    "[FilterPipeline] src={} dst={} gate=route decision=ROUTE prefix={} gateway={}",
                    src_log, dst_log, hit.prefix, hit.gateway_id
                );
                Ok(FilterDecision::route(hit.prefix, hit.gateway_id))
            }
            None => {
                info!(
                    "[FilterPipeline] src={} dst={} gate=route decision=REJECT no route",
                    src_log, dst_log
                );
                Ok(FilterDecision::reject(REASON_NO_ROUTE))
            }
        }
    }

    fn domain_violation(&self, country_code: &str, digits: &str) -> Option<String> {
        if country_code != self.config.required_country_code {
            return Some(format!(
                "destination outside termination domain: expected country code {}",
                self.config.required_country_code
            ));
        }
        if digits.len() != self.config.expected_length {
            return Some(format!(
                "invalid destination length: expected {} digits, got {}",
                self.config.expected_length,
                digits.len()
            ));
        }
        None
    }
}

pub mod assisted_handling_port;
pub mod blacklist_port;
pub mod call_record_port;
pub mod liveness_port;
pub mod route_source_port;
pub mod scorer_port;
pub mod sim_registry_port;

pub use assisted_handling_port::{
    AssistedHandlingPort, HandoffError, HandoffFuture, StaticAgentPool,
};
pub use blacklist_port::{BlacklistFuture, BlacklistPort, BlacklistPortError, InMemoryBlacklist};
pub use call_record_port::{CallRecordError, CallRecordFuture, CallRecordPort, NoopCallRecord};
pub use liveness_port::{LivenessError, LivenessFuture, LivenessPort, LivenessReply};
pub use route_source_port::{RouteSourceError, RouteSourceFuture, RouteSourcePort, StaticRouteSource};
pub use scorer_port::{ScorerError, ScorerFuture, ScorerPort};
pub use sim_registry_port::{NoopSimRegistry, SimRegistryError, SimRegistryFuture, SimRegistryPort};

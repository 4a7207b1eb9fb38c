pub mod pipeline;
pub mod prefix_router;

pub use pipeline::FilterPipeline;
pub use prefix_router::{PrefixRouter, RouteMatch};

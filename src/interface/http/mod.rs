pub mod liveness_client;
pub mod numverify_client;
pub mod scorer_client;

pub use liveness_client::LivenessHttpClient;
pub use numverify_client::NumVerifyClient;
pub use scorer_client::ScorerHttpClient;

pub mod cache;
pub mod liveness;
pub mod phone;

pub use cache::{CacheStats, ValidationCache};
pub use liveness::LivenessValidator;
pub use phone::{NumberType, PhoneFormatValidator, PhoneValidation, TablePhoneValidator};

pub mod call;
pub mod classification;
pub mod identifiers;
pub mod prefix;
pub mod records;
pub mod validation;

pub use call::{Call, FilterAction, FilterDecision};
pub use classification::{CallAction, CallCategory, Classification, Transcript};
pub use identifiers::{CallId, CallIdError, SimId};
pub use prefix::Prefix;
pub use records::{AuditEntry, ReplacementPriority, ReviewRecord, SimFlag};
pub use validation::ValidationResult;

pub mod dispatch;
pub mod filter;

pub use dispatch::DispatchError;
pub use filter::FilterError;

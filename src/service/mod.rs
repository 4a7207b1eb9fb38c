pub mod classification;
pub mod dispatch;
pub mod recognition;
pub mod routing;
pub mod validation;

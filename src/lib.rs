pub mod gateway;
pub mod interface;
pub mod service;
pub mod shared;

pub use service::{classification, dispatch, recognition, routing, validation};
pub use shared::{config, entities, error, logging, ports, utils};

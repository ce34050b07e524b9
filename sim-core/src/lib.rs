pub mod models;
pub mod normalize;
pub mod render;
pub mod service;

pub use models::*;
pub use service::{ServiceError, SimulatorService};

pub mod api;

pub use api::{ServiceError, SimulatorService};

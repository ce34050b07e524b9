mod client;

pub use client::{AUTH_HEADER, HttpSimulatorService};

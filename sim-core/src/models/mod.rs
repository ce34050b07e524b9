mod calculation;
mod client_state;
mod credentials;
mod simulation;

pub use calculation::{Assumptions, CalculationResult, Comparison, PfBreakdown, PjBreakdown};
pub use client_state::{AmountField, AnnualExpenses, ClientState, SimulationInput, TextField};
pub use credentials::{Credentials, SessionToken};
pub use simulation::{AnalysisRow, HistoryEntry, SavedSimulation, SimulationId};

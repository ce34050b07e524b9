use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    AnalysisRow, CalculationResult, Credentials, HistoryEntry, SavedSimulation, SessionToken,
    SimulationId, SimulationInput,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Missing, expired or rejected session token (HTTP 401 on an
    /// authenticated call). Always forces re-authentication.
    #[error("Not authorized")]
    Unauthorized,

    /// `/login` rejected the supplied credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Service returned HTTP {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// The remote calculation, authentication and persistence service.
///
/// Every method except [`login`](Self::login) and [`health`](Self::health)
/// sends the token as `X-Auth-Token` and maps a 401 to
/// [`ServiceError::Unauthorized`].
#[async_trait]
pub trait SimulatorService: Send + Sync {
    async fn health(&self) -> Result<(), ServiceError>;

    // Session
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ServiceError>;

    // Calculation
    async fn calculate(
        &self,
        token: &SessionToken,
        input: &SimulationInput,
    ) -> Result<CalculationResult, ServiceError>;

    // Saved simulations
    async fn save_simulation(
        &self,
        token: &SessionToken,
        input: &SimulationInput,
    ) -> Result<SimulationId, ServiceError>;

    async fn list_simulations(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<HistoryEntry>, ServiceError>;

    async fn get_simulation(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<SavedSimulation, ServiceError>;

    async fn delete_simulation(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<(), ServiceError>;

    async fn analysis(&self, token: &SessionToken) -> Result<Vec<AnalysisRow>, ServiceError>;

    // Rule configuration, edited as raw JSON
    async fn get_config(&self, token: &SessionToken) -> Result<Value, ServiceError>;

    async fn put_config(
        &self,
        token: &SessionToken,
        config: &Value,
    ) -> Result<(), ServiceError>;
}

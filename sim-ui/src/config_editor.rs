//! Raw JSON editor for the service's calculation parameters.

use std::sync::Arc;

use serde_json::Value;
use sim_core::{ServiceError, SimulatorService};
use tracing::{debug, warn};

use crate::messages::{CONFIG_INVALID, CONFIG_SAVED, LOGIN_FOR_CONFIG};
use crate::session::SessionManager;
use crate::surface::Surface;

#[derive(Debug, thiserror::Error)]
pub enum ConfigEditError {
    #[error("no active session")]
    NotLoggedIn,

    #[error("editor text is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub struct ConfigEditor {
    service: Arc<dyn SimulatorService>,
    surface: Arc<dyn Surface>,
    session: Arc<SessionManager>,
}

impl ConfigEditor {
    pub fn new(
        service: Arc<dyn SimulatorService>,
        surface: Arc<dyn Surface>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self {
            service,
            surface,
            session,
        }
    }

    /// Fetches the parameters and shows them pretty-printed. Returns the
    /// editor text.
    pub async fn load(&self) -> Option<String> {
        let token = self.session.token()?;
        let value = match self.service.get_config(&token).await {
            Ok(value) => value,
            Err(ServiceError::Status(status)) => {
                debug!(status, "config request refused");
                return None;
            }
            Err(e) => {
                self.session.check(&e, &token);
                warn!(error = %e, "cannot load config");
                self.surface.set_error(Some(LOGIN_FOR_CONFIG));
                return None;
            }
        };

        match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                self.surface.set_config_text(&text);
                Some(text)
            }
            Err(e) => {
                warn!(error = %e, "cannot format config");
                None
            }
        }
    }

    /// Parses `text` and uploads it. Nothing is sent when the text is not
    /// valid JSON.
    pub async fn save(
        &self,
        text: &str,
    ) -> Result<(), ConfigEditError> {
        let Some(token) = self.session.token() else {
            return Err(ConfigEditError::NotLoggedIn);
        };

        let outcome = match serde_json::from_str::<Value>(text) {
            Ok(value) => self
                .service
                .put_config(&token, &value)
                .await
                .map_err(ConfigEditError::from),
            Err(e) => Err(ConfigEditError::from(e)),
        };

        match &outcome {
            Ok(()) => self.surface.set_status(CONFIG_SAVED),
            Err(e) => {
                if let ConfigEditError::Service(service_error) = e {
                    self.session.check(service_error, &token);
                }
                warn!(error = %e, "config not saved");
                self.surface.set_error(Some(CONFIG_INVALID));
            }
        }
        outcome
    }
}

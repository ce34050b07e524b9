use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use sim_core::{
    AnalysisRow, CalculationResult, Credentials, HistoryEntry, SavedSimulation, ServiceError,
    SessionToken, SimulationId, SimulationInput, SimulatorService,
};

/// Header carrying the session token on every authenticated request.
pub const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Deserialize)]
struct LoginResponse {
    token: SessionToken,
}

/// [`SimulatorService`] speaking JSON over HTTP.
pub struct HttpSimulatorService {
    client: Client,
    base: Url,
}

impl HttpSimulatorService {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let base = Url::parse(base_url).map_err(|e| {
            ServiceError::Configuration(format!("invalid base url '{base_url}': {e}"))
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ServiceError::Configuration(format!(
                "base url '{base_url}' must be an absolute http(s) url"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("pfpj-simulator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::Transport(format!("HTTP client error: {e}")))?;

        Ok(Self { client, base })
    }

    /// Appends `segments` to the base path, percent-encoding each one.
    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `/simulations/{id}`. Saved ids look like `empresa/2025-01-01_101010`,
    /// so every `/`-separated part becomes its own path segment.
    fn simulation_url(
        &self,
        id: &str,
    ) -> Url {
        let parts = id.split('/').filter(|part| !part.is_empty() && *part != "..");
        self.endpoint(std::iter::once("simulations").chain(parts))
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&SessionToken>,
    ) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.header(AUTH_HEADER, token.as_str()),
            None => builder,
        }
    }

    /// Sends the request and maps transport failures, 401 and non-2xx
    /// statuses onto [`ServiceError`].
    async fn send(
        &self,
        builder: RequestBuilder,
    ) -> Result<Response, ServiceError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "service request failed");
            ServiceError::Transport(e.to_string())
        })?;

        let status = response.status();
        debug!(%status, url = %response.url().path(), "service response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ServiceError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SimulatorService for HttpSimulatorService {
    async fn health(&self) -> Result<(), ServiceError> {
        let url = self.endpoint(["health"]);
        self.send(self.request(Method::GET, url, None)).await?;
        Ok(())
    }

    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionToken, ServiceError> {
        let url = self.endpoint(["login"]);
        let builder = self.request(Method::POST, url, None).json(credentials);
        let response = match self.send(builder).await {
            Err(ServiceError::Unauthorized) => return Err(ServiceError::InvalidCredentials),
            other => other?,
        };
        let body: LoginResponse = Self::json(response).await?;
        Ok(body.token)
    }

    async fn calculate(
        &self,
        token: &SessionToken,
        input: &SimulationInput,
    ) -> Result<CalculationResult, ServiceError> {
        let url = self.endpoint(["calculate"]);
        let response = self
            .send(self.request(Method::POST, url, Some(token)).json(input))
            .await?;
        Self::json(response).await
    }

    async fn save_simulation(
        &self,
        token: &SessionToken,
        input: &SimulationInput,
    ) -> Result<SimulationId, ServiceError> {
        let url = self.endpoint(["simulations"]);
        let response = self
            .send(self.request(Method::POST, url, Some(token)).json(input))
            .await?;
        Self::json(response).await
    }

    async fn list_simulations(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<HistoryEntry>, ServiceError> {
        let url = self.endpoint(["simulations"]);
        let response = self.send(self.request(Method::GET, url, Some(token))).await?;
        Self::json(response).await
    }

    async fn get_simulation(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<SavedSimulation, ServiceError> {
        let url = self.simulation_url(id);
        let response = self.send(self.request(Method::GET, url, Some(token))).await?;
        Self::json(response).await
    }

    async fn delete_simulation(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<(), ServiceError> {
        let url = self.simulation_url(id);
        self.send(self.request(Method::DELETE, url, Some(token)))
            .await?;
        Ok(())
    }

    async fn analysis(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<AnalysisRow>, ServiceError> {
        let url = self.endpoint(["analysis"]);
        let response = self.send(self.request(Method::GET, url, Some(token))).await?;
        Self::json(response).await
    }

    async fn get_config(
        &self,
        token: &SessionToken,
    ) -> Result<Value, ServiceError> {
        let url = self.endpoint(["config"]);
        let response = self.send(self.request(Method::GET, url, Some(token))).await?;
        Self::json(response).await
    }

    async fn put_config(
        &self,
        token: &SessionToken,
        config: &Value,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint(["config"]);
        self.send(self.request(Method::PUT, url, Some(token)).json(config))
            .await?;
        Ok(())
    }
}

//! The simulator controller: wires input handling, session, calculation,
//! history, configuration and export together behind one cloneable handle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use sim_core::normalize::{edit_text, format_currency, parse_amount, validate_amount};
use sim_core::render::render_summary;
use sim_core::{
    AmountField, CalculationResult, ClientState, ServiceError, SimulationId, SimulatorService,
    TextField,
};
use sim_http::HttpSimulatorService;
use tracing::{debug, info, warn};

use crate::calc_client::CalculationClient;
use crate::config::ClientConfig;
use crate::config_editor::{ConfigEditError, ConfigEditor};
use crate::debounce::Debouncer;
use crate::export::{ExportError, Rasterizer, ReportExporter};
use crate::history::{AnalysisLine, HistoryLoader, HistoryRow};
use crate::lock;
use crate::messages::{SAVE_FAILED, SAVE_NEEDS_COMPANY, SAVED};
use crate::session::{LoginOutcome, SessionManager, TokenStore};
use crate::state::{Tab, ViewState};
use crate::surface::{Surface, paint};

/// HTTP client for the calculation service at `config.base_url`.
///
/// # Errors
/// [`ServiceError::Configuration`] when the base URL is not an absolute
/// `http`/`https` URL.
pub fn connect(config: &ClientConfig) -> Result<Arc<dyn SimulatorService>, ServiceError> {
    debug!(base_url = %config.base_url, "connecting");
    Ok(Arc::new(HttpSimulatorService::new(&config.base_url)?))
}

struct Inner {
    service: Arc<dyn SimulatorService>,
    surface: Arc<dyn Surface>,
    session: Arc<SessionManager>,
    state: Arc<Mutex<ClientState>>,
    view: Mutex<ViewState>,
    calc: Arc<CalculationClient>,
    history: HistoryLoader,
    config: ConfigEditor,
    exporter: ReportExporter,
    debouncer: Debouncer,
}

/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Simulator {
    inner: Arc<Inner>,
}

impl Simulator {
    pub fn new(
        service: Arc<dyn SimulatorService>,
        surface: Arc<dyn Surface>,
        tokens: Arc<dyn TokenStore>,
        rasterizer: Arc<dyn Rasterizer>,
        config: &ClientConfig,
    ) -> Self {
        let session = Arc::new(SessionManager::new(tokens, surface.clone()));
        let state = Arc::new(Mutex::new(ClientState::default()));
        let calc = Arc::new(CalculationClient::new(
            service.clone(),
            surface.clone(),
            session.clone(),
            state.clone(),
        ));
        let exporter = ReportExporter::new(
            surface.clone(),
            session.clone(),
            calc.clone(),
            state.clone(),
            rasterizer,
        )
        .with_output_dir(config.export_dir.clone())
        .with_assets(config.assets.clone());

        Self {
            inner: Arc::new(Inner {
                history: HistoryLoader::new(service.clone(), surface.clone(), session.clone()),
                config: ConfigEditor::new(service.clone(), surface.clone(), session.clone()),
                debouncer: Debouncer::new(config.debounce()),
                view: Mutex::new(ViewState::new()),
                service,
                surface,
                session,
                state,
                calc,
                exporter,
            }),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Snapshot of the pending inputs.
    pub fn state(&self) -> ClientState {
        lock(&self.inner.state).clone()
    }

    pub fn view(&self) -> ViewState {
        lock(&self.inner.view).clone()
    }

    pub fn last_result(&self) -> Option<CalculationResult> {
        self.inner.calc.last_result()
    }

    pub fn calculations_issued(&self) -> u64 {
        self.inner.calc.issued()
    }

    // ── input handling ──────────────────────────────────────────────────

    /// Handles typing into an amount field: stores the parsed value, flags
    /// negatives and schedules a calculation.
    pub fn input_amount(
        &self,
        field: AmountField,
        text: &str,
    ) {
        let value = parse_amount(text);
        self.inner
            .surface
            .set_field_error(field.name(), validate_amount(value));
        lock(&self.inner.state).set_amount(field, value);
        self.schedule_calculation();
    }

    pub fn input_text(
        &self,
        field: TextField,
        text: &str,
    ) {
        lock(&self.inner.state).set_text(field, text);
    }

    /// Switches the field to its raw, editable representation.
    pub fn focus(
        &self,
        field: AmountField,
    ) {
        let value = lock(&self.inner.state).amount(field);
        lock(&self.inner.view).focus(field);
        self.inner.surface.set_input(field.name(), &edit_text(value));
    }

    /// Switches the field back to formatted currency.
    pub fn blur(
        &self,
        field: AmountField,
    ) {
        let value = lock(&self.inner.state).amount(field);
        lock(&self.inner.view).blur(field);
        self.inner
            .surface
            .set_input(field.name(), &format_currency(value));
    }

    /// Restores defaults and redraws every input. Recalculates when a
    /// session exists.
    pub fn reset(&self) {
        lock(&self.inner.state).reset();
        self.render_inputs();
        for field in AmountField::ALL {
            self.inner.surface.set_field_error(field.name(), None);
        }
        self.render_summary();
        if self.inner.session.is_logged_in() {
            self.schedule_calculation();
        }
    }

    pub fn render_inputs(&self) {
        let state = self.state();
        for field in TextField::ALL {
            self.inner.surface.set_input(field.name(), state.text(field));
        }
        for field in AmountField::ALL {
            self.inner
                .surface
                .set_input(field.name(), &format_currency(state.amount(field)));
        }
    }

    pub fn render_summary(&self) {
        let state = self.state();
        paint(self.inner.surface.as_ref(), &render_summary(&state));
    }

    pub fn switch_tab(
        &self,
        tab: Tab,
    ) {
        if lock(&self.inner.view).switch_to(tab) {
            debug!(tab = tab.id(), "switching tab");
        }
        self.inner.surface.switch_tab(tab);
    }

    // ── calculation ─────────────────────────────────────────────────────

    /// Arms the debounce timer; when it fires the summary is redrawn and a
    /// calculation runs.
    pub fn schedule_calculation(&self) {
        let sim = self.clone();
        self.inner.debouncer.schedule(async move {
            sim.render_summary();
            sim.calculate().await;
        });
    }

    /// Disarms the debounce timer without calculating.
    pub fn cancel_pending(&self) {
        self.inner.debouncer.cancel();
    }

    /// Waits for a scheduled calculation, if any, to fire and finish.
    pub async fn settled(&self) {
        self.inner.debouncer.settled().await;
    }

    pub async fn calculate(&self) -> Option<CalculationResult> {
        self.inner.calc.calculate().await
    }

    // ── session ─────────────────────────────────────────────────────────

    /// Logs in and, on success, refreshes every view that needs a session.
    pub async fn login(
        &self,
        user: &str,
        password: &str,
    ) -> LoginOutcome {
        let outcome = self
            .inner
            .session
            .login(self.inner.service.as_ref(), user, password)
            .await;
        if outcome == LoginOutcome::LoggedIn {
            tokio::join!(
                self.calculate(),
                self.inner.history.refresh(),
                self.inner.config.load(),
            );
        }
        outcome
    }

    pub fn logout(&self) {
        self.inner.debouncer.cancel();
        self.inner.session.logout();
        lock(&self.inner.state).reset();
        self.render_inputs();
        self.render_summary();
        info!("logged out");
    }

    /// Startup check: raise the login overlay, or load the session views.
    pub async fn enforce_login(&self) {
        if !self.inner.session.is_logged_in() {
            self.inner.surface.set_login_visible(true);
            return;
        }
        self.inner.surface.set_login_visible(false);
        tokio::join!(self.inner.history.refresh(), self.inner.config.load());
    }

    // ── saved simulations ───────────────────────────────────────────────

    pub async fn save(&self) -> Option<SimulationId> {
        let token = self.inner.session.guard(None)?;

        let input = {
            let state = lock(&self.inner.state);
            if state.nome_empresa.is_empty() {
                None
            } else {
                Some(state.to_input())
            }
        };
        let Some(input) = input else {
            self.inner.surface.set_error(Some(SAVE_NEEDS_COMPANY));
            return None;
        };

        match self.inner.service.save_simulation(&token, &input).await {
            Ok(id) => {
                info!(id = %id.id, "simulation saved");
                self.inner.history.refresh().await;
                self.inner.surface.set_status(SAVED);
                Some(id)
            }
            Err(e) => {
                self.inner.session.check(&e, &token);
                warn!(error = %e, "simulation not saved");
                self.inner.surface.set_error(Some(SAVE_FAILED));
                None
            }
        }
    }

    pub async fn load_history(&self) -> Option<Vec<HistoryRow>> {
        self.inner.history.load_history().await
    }

    pub async fn load_analysis(&self) -> Option<Vec<AnalysisLine>> {
        self.inner.history.load_analysis().await
    }

    /// Replays a saved simulation into the form and recalculates it.
    pub async fn load_simulation(
        &self,
        id: &str,
    ) -> Option<CalculationResult> {
        let saved = self.inner.history.fetch_simulation(id).await?;

        lock(&self.inner.state).replay(&saved.input);
        self.render_inputs();
        self.switch_tab(Tab::Premissas);
        self.render_summary();
        self.calculate().await
    }

    pub async fn delete_simulation(
        &self,
        id: &str,
    ) -> bool {
        self.inner.history.delete_simulation(id).await
    }

    // ── parameters and export ───────────────────────────────────────────

    pub async fn load_config(&self) -> Option<String> {
        self.inner.config.load().await
    }

    pub async fn save_config(
        &self,
        text: &str,
    ) -> Result<(), ConfigEditError> {
        self.inner.config.save(text).await
    }

    pub async fn export(&self) -> Result<PathBuf, ExportError> {
        self.inner.exporter.export().await
    }
}

//! Shared fixtures: an in-memory service and a surface that records every
//! call made to it.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use sim_core::render::{Bar, PieSlice};
use sim_core::{
    AnalysisRow, CalculationResult, Credentials, HistoryEntry, SavedSimulation, ServiceError,
    SessionToken, SimulationId, SimulationInput, SimulatorService,
};
use sim_ui::export::{Rasterizer, TextPdfRasterizer};
use sim_ui::history::{AnalysisLine, HistoryRow};
use sim_ui::session::{MemoryTokenStore, TokenStore};
use sim_ui::state::Tab;
use sim_ui::{ClientConfig, Simulator, Surface};

pub const TOKEN: &str = "tok-test";
pub const USER: &str = "admin";
pub const PASSWORD: &str = "admin123";

type CalcHandler =
    Box<dyn Fn(&SimulationInput) -> (Duration, Result<CalculationResult, ServiceError>) + Send + Sync>;

/// Result whose savings equal `economia`, handy for telling replies apart.
pub fn result_with_savings(economia: Decimal) -> CalculationResult {
    let mut result = CalculationResult::default();
    result.pf.rendimento_anual = Decimal::from(60_000);
    result.pf.total_tributos = Decimal::from(9_000);
    result.pf.aliquota_efetiva = Decimal::new(15, 2);
    result.pj.total_impostos = Decimal::from(6_000);
    result.pj.impacto_pf = Decimal::from(1_000);
    result.pj.aliquota_efetiva_final = Decimal::new(10, 2);
    result.comparativo.economia_tributaria = economia;
    result.comparativo.aliquota_pf = Decimal::new(15, 2);
    result.comparativo.aliquota_pj_final = Decimal::new(10, 2);
    result
}

/// In-memory stand-in for the remote service. Every call is logged by
/// name; `calculate` answers through a replaceable handler.
pub struct StubService {
    calls: Mutex<Vec<&'static str>>,
    payloads: Mutex<Vec<SimulationInput>>,
    calc: Mutex<CalcHandler>,
    pub history: Mutex<Vec<HistoryEntry>>,
    pub analysis: Mutex<Vec<AnalysisRow>>,
    pub saved: Mutex<HashMap<String, SavedSimulation>>,
    pub config: Mutex<Value>,
    pub config_uploads: Mutex<Vec<Value>>,
    /// When set, every authenticated list call fails with this error.
    pub list_error: Mutex<Option<ServiceError>>,
    /// How long `list_simulations` waits before checking the token.
    pub list_delay: Mutex<Duration>,
}

impl Default for StubService {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            payloads: Mutex::new(Vec::new()),
            calc: Mutex::new(Box::new(|_: &SimulationInput| {
                (Duration::ZERO, Ok(result_with_savings(Decimal::from(100))))
            })),
            history: Mutex::new(Vec::new()),
            analysis: Mutex::new(Vec::new()),
            saved: Mutex::new(HashMap::new()),
            config: Mutex::new(json!({ "salario_minimo": 1518 })),
            config_uploads: Mutex::new(Vec::new()),
            list_error: Mutex::new(None),
            list_delay: Mutex::new(Duration::ZERO),
        }
    }
}

impl StubService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_calculate(
        &self,
        handler: impl Fn(&SimulationInput) -> (Duration, Result<CalculationResult, ServiceError>)
        + Send
        + Sync
        + 'static,
    ) {
        *self.calc.lock().unwrap() = Box::new(handler);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(
        &self,
        name: &str,
    ) -> usize {
        self.calls().iter().filter(|c| **c == name).count()
    }

    pub fn payloads(&self) -> Vec<SimulationInput> {
        self.payloads.lock().unwrap().clone()
    }

    fn record(
        &self,
        name: &'static str,
    ) {
        self.calls.lock().unwrap().push(name);
    }

    fn authorize(
        &self,
        token: &SessionToken,
    ) -> Result<(), ServiceError> {
        if token.as_str() == TOKEN {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }

    fn list_error(&self) -> Result<(), ServiceError> {
        match self.list_error.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SimulatorService for StubService {
    async fn health(&self) -> Result<(), ServiceError> {
        self.record("health");
        Ok(())
    }

    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionToken, ServiceError> {
        self.record("login");
        if credentials.login == USER && credentials.senha == PASSWORD {
            Ok(SessionToken::new(TOKEN))
        } else {
            Err(ServiceError::InvalidCredentials)
        }
    }

    async fn calculate(
        &self,
        token: &SessionToken,
        input: &SimulationInput,
    ) -> Result<CalculationResult, ServiceError> {
        self.record("calculate");
        self.payloads.lock().unwrap().push(input.clone());
        let (delay, reply) = {
            let handler = self.calc.lock().unwrap();
            (*handler)(input)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.authorize(token)?;
        reply
    }

    async fn save_simulation(
        &self,
        token: &SessionToken,
        input: &SimulationInput,
    ) -> Result<SimulationId, ServiceError> {
        self.record("save");
        self.authorize(token)?;
        let id = format!(
            "{}/2025-01-02_101010",
            input.nome_empresa.clone().unwrap_or_default().to_lowercase()
        );
        self.saved.lock().unwrap().insert(
            id.clone(),
            SavedSimulation {
                id: Some(id.clone()),
                input: input.clone(),
                ..Default::default()
            },
        );
        Ok(SimulationId { id })
    }

    async fn list_simulations(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<HistoryEntry>, ServiceError> {
        self.record("list");
        let delay = *self.list_delay.lock().unwrap();
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
        self.authorize(token)?;
        self.list_error()?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn get_simulation(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<SavedSimulation, ServiceError> {
        self.record("get");
        self.authorize(token)?;
        self.saved
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(ServiceError::Status(404))
    }

    async fn delete_simulation(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<(), ServiceError> {
        self.record("delete");
        self.authorize(token)?;
        self.saved
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or(ServiceError::Status(404))
    }

    async fn analysis(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<AnalysisRow>, ServiceError> {
        self.record("analysis");
        tokio::task::yield_now().await;
        self.authorize(token)?;
        self.list_error()?;
        Ok(self.analysis.lock().unwrap().clone())
    }

    async fn get_config(
        &self,
        token: &SessionToken,
    ) -> Result<Value, ServiceError> {
        self.record("get_config");
        self.authorize(token)?;
        Ok(self.config.lock().unwrap().clone())
    }

    async fn put_config(
        &self,
        token: &SessionToken,
        config: &Value,
    ) -> Result<(), ServiceError> {
        self.record("put_config");
        self.authorize(token)?;
        self.config_uploads.lock().unwrap().push(config.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Region(String, String),
    Bar(&'static str, Decimal),
    Pie(Decimal),
    Loading(bool),
    Status(String),
    Error(Option<String>),
    LoginVisible(bool),
    LoginError(Option<String>),
    Input(String, String),
    FieldError(String, Option<String>),
    History(Vec<HistoryRow>),
    HistoryPlaceholder(String),
    Analysis(Vec<AnalysisLine>),
    ConfigText(String),
    Tab(Tab),
}

/// Surface that keeps every call for later assertions.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<Event>>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(
        &self,
        event: Event,
    ) {
        self.events.lock().unwrap().push(event);
    }

    /// Every text written to region `id`, oldest first.
    pub fn region_writes(
        &self,
        id: &str,
    ) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Region(rid, text) if rid == id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn region(
        &self,
        id: &str,
    ) -> Option<String> {
        self.region_writes(id).pop()
    }

    pub fn input(
        &self,
        field: &str,
    ) -> Option<String> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|e| match e {
                Event::Input(f, text) if f == field => Some(text),
                _ => None,
            })
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(Some(m)) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors().pop()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn login_error(&self) -> Option<String> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|e| match e {
                Event::LoginError(m) => Some(m),
                _ => None,
            })
            .flatten()
    }

    pub fn overlay_shown_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == Event::LoginVisible(true))
            .count()
    }

    pub fn overlay_visible(&self) -> Option<bool> {
        self.events().into_iter().rev().find_map(|e| match e {
            Event::LoginVisible(v) => Some(v),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn set_region(
        &self,
        id: &str,
        text: &str,
    ) {
        self.push(Event::Region(id.to_string(), text.to_string()));
    }

    fn set_bar(
        &self,
        bar: &Bar,
    ) {
        self.push(Event::Bar(bar.id, bar.percent));
    }

    fn set_pie(
        &self,
        pie: &PieSlice,
    ) {
        self.push(Event::Pie(pie.degrees));
    }

    fn set_loading(
        &self,
        loading: bool,
    ) {
        self.push(Event::Loading(loading));
    }

    fn set_status(
        &self,
        text: &str,
    ) {
        self.push(Event::Status(text.to_string()));
    }

    fn set_error(
        &self,
        message: Option<&str>,
    ) {
        self.push(Event::Error(message.map(str::to_string)));
    }

    fn set_login_visible(
        &self,
        visible: bool,
    ) {
        self.push(Event::LoginVisible(visible));
    }

    fn set_login_error(
        &self,
        message: Option<&str>,
    ) {
        self.push(Event::LoginError(message.map(str::to_string)));
    }

    fn set_input(
        &self,
        field: &str,
        text: &str,
    ) {
        self.push(Event::Input(field.to_string(), text.to_string()));
    }

    fn set_field_error(
        &self,
        field: &str,
        message: Option<&str>,
    ) {
        self.push(Event::FieldError(field.to_string(), message.map(str::to_string)));
    }

    fn show_history(
        &self,
        rows: &[HistoryRow],
    ) {
        self.push(Event::History(rows.to_vec()));
    }

    fn show_history_placeholder(
        &self,
        text: &str,
    ) {
        self.push(Event::HistoryPlaceholder(text.to_string()));
    }

    fn show_analysis(
        &self,
        rows: &[AnalysisLine],
    ) {
        self.push(Event::Analysis(rows.to_vec()));
    }

    fn set_config_text(
        &self,
        text: &str,
    ) {
        self.push(Event::ConfigText(text.to_string()));
    }

    fn switch_tab(
        &self,
        tab: Tab,
    ) {
        self.push(Event::Tab(tab));
    }
}

/// Rasterizer that always fails, for exercising export cleanup.
pub struct FailingRasterizer;

#[async_trait]
impl Rasterizer for FailingRasterizer {
    async fn rasterize(
        &self,
        staged: &sim_ui::export::StagedDocument,
        _setup: &sim_ui::pdf::PageSetup,
    ) -> Result<Vec<u8>, sim_ui::export::ExportError> {
        assert!(staged.path().exists(), "document must be staged before rasterizing");
        Err(sim_ui::export::ExportError::Rasterize("engine unavailable".to_string()))
    }
}

pub struct Harness {
    pub sim: Simulator,
    pub service: Arc<StubService>,
    pub surface: Arc<RecordingSurface>,
    pub tokens: Arc<MemoryTokenStore>,
    pub export_dir: PathBuf,
}

impl Harness {
    pub fn token(&self) -> Option<SessionToken> {
        self.tokens.get().unwrap()
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pfpj-it-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn build(
    name: &str,
    tokens: MemoryTokenStore,
    rasterizer: Arc<dyn Rasterizer>,
) -> Harness {
    let service = StubService::new();
    let surface = RecordingSurface::new();
    let tokens = Arc::new(tokens);
    let export_dir = scratch_dir(name);
    let config = ClientConfig {
        export_dir: export_dir.clone(),
        ..ClientConfig::default()
    };
    let sim = Simulator::new(
        service.clone(),
        surface.clone(),
        tokens.clone(),
        rasterizer,
        &config,
    );
    Harness {
        sim,
        service,
        surface,
        tokens,
        export_dir,
    }
}

/// Simulator with an active session.
pub fn logged_in(name: &str) -> Harness {
    build(name, MemoryTokenStore::with_token(TOKEN), Arc::new(TextPdfRasterizer))
}

/// Simulator holding `token`, which the stub service does not accept.
pub fn with_session(
    name: &str,
    token: &str,
) -> Harness {
    build(name, MemoryTokenStore::with_token(token), Arc::new(TextPdfRasterizer))
}

pub fn logged_out(name: &str) -> Harness {
    build(name, MemoryTokenStore::new(), Arc::new(TextPdfRasterizer))
}

pub fn with_rasterizer(
    name: &str,
    rasterizer: Arc<dyn Rasterizer>,
) -> Harness {
    build(name, MemoryTokenStore::with_token(TOKEN), rasterizer)
}

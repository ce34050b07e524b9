//! Saved-simulation list and the aggregate analysis table.

use std::sync::Arc;

use rust_decimal::Decimal;
use sim_core::normalize::{format_currency, format_date, format_rate};
use sim_core::{
    AnalysisRow, HistoryEntry, SavedSimulation, ServiceError, SessionToken, SimulatorService,
};
use tracing::{debug, warn};

use crate::messages::{EMPTY_HISTORY, LOGIN_FOR_ANALYSIS, LOGIN_FOR_HISTORY};
use crate::session::SessionManager;
use crate::surface::Surface;

/// One line of the history list, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: String,
    pub empresa: String,
    pub cliente: String,
    pub data: String,
}

impl HistoryRow {
    /// `None` for entries without an id, which cannot be loaded or deleted.
    pub fn from_entry(entry: &HistoryEntry) -> Option<Self> {
        let id = entry.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        Some(Self {
            id: id.to_string(),
            empresa: or_dash(entry.nome_empresa.as_deref()),
            cliente: or_dash(entry.nome_cliente.as_deref()),
            data: format_date(entry.created_on()),
        })
    }
}

/// One row of the analysis table, every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisLine {
    pub data: String,
    pub empresa: String,
    pub cliente: String,
    pub rendimento_anual: String,
    pub total_tributos_pf: String,
    pub total_impostos_pj: String,
    pub impacto_pf: String,
    pub aliquota_pf: String,
    pub aliquota_pj_final: String,
    pub economia_tributaria: String,
}

impl AnalysisLine {
    pub fn cells(&self) -> [&str; 10] {
        [
            &self.data,
            &self.empresa,
            &self.cliente,
            &self.rendimento_anual,
            &self.total_tributos_pf,
            &self.total_impostos_pj,
            &self.impacto_pf,
            &self.aliquota_pf,
            &self.aliquota_pj_final,
            &self.economia_tributaria,
        ]
    }
}

impl From<&AnalysisRow> for AnalysisLine {
    fn from(row: &AnalysisRow) -> Self {
        let currency = |v: Option<Decimal>| format_currency(v.unwrap_or_default());
        let rate = |v: Option<Decimal>| format_rate(v.unwrap_or_default());
        Self {
            data: format_date(row.created_on()),
            empresa: or_dash(row.nome_empresa.as_deref()),
            cliente: or_dash(row.nome_cliente.as_deref()),
            rendimento_anual: currency(row.rendimento_anual),
            total_tributos_pf: currency(row.total_tributos_pf),
            total_impostos_pj: currency(row.total_impostos_pj),
            impacto_pf: currency(row.impacto_pf),
            aliquota_pf: rate(row.aliquota_pf),
            aliquota_pj_final: rate(row.aliquota_pj_final),
            economia_tributaria: currency(row.economia_tributaria),
        }
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Fetches and displays the persisted simulations.
///
/// Every operation is a no-op without a session. A 401 ends the session;
/// a non-2xx status leaves the display as it was.
pub struct HistoryLoader {
    service: Arc<dyn SimulatorService>,
    surface: Arc<dyn Surface>,
    session: Arc<SessionManager>,
}

impl HistoryLoader {
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

    pub async fn load_history(&self) -> Option<Vec<HistoryRow>> {
        let token = self.session.token()?;
        match self.service.list_simulations(&token).await {
            Ok(entries) => {
                let rows: Vec<HistoryRow> =
                    entries.iter().filter_map(HistoryRow::from_entry).collect();
                if rows.len() < entries.len() {
                    debug!(skipped = entries.len() - rows.len(), "history entries without id");
                }
                if rows.is_empty() {
                    self.surface.show_history_placeholder(EMPTY_HISTORY);
                } else {
                    self.surface.show_history(&rows);
                }
                Some(rows)
            }
            Err(e) => {
                self.report(&e, &token, LOGIN_FOR_HISTORY);
                None
            }
        }
    }

    pub async fn load_analysis(&self) -> Option<Vec<AnalysisLine>> {
        let token = self.session.token()?;
        match self.service.analysis(&token).await {
            Ok(rows) => {
                let lines: Vec<AnalysisLine> = rows.iter().map(AnalysisLine::from).collect();
                self.surface.show_analysis(&lines);
                Some(lines)
            }
            Err(e) => {
                self.report(&e, &token, LOGIN_FOR_ANALYSIS);
                None
            }
        }
    }

    /// Fetches one saved simulation by id. Replaying it is the caller's job.
    pub async fn fetch_simulation(
        &self,
        id: &str,
    ) -> Option<SavedSimulation> {
        let token = self.session.token()?;
        match self.service.get_simulation(&token, id).await {
            Ok(saved) => Some(saved),
            Err(e) => {
                self.session.check(&e, &token);
                warn!(id, error = %e, "cannot load saved simulation");
                None
            }
        }
    }

    /// Deletes one saved simulation, then refreshes both lists.
    pub async fn delete_simulation(
        &self,
        id: &str,
    ) -> bool {
        let Some(token) = self.session.token() else {
            return false;
        };
        if let Err(e) = self.service.delete_simulation(&token, id).await {
            self.session.check(&e, &token);
            warn!(id, error = %e, "cannot delete saved simulation");
            return false;
        }
        debug!(id, "saved simulation deleted");
        self.refresh().await;
        true
    }

    pub async fn refresh(&self) {
        self.load_history().await;
        self.load_analysis().await;
    }

    fn report(
        &self,
        error: &ServiceError,
        sent_with: &SessionToken,
        message: &str,
    ) {
        match error {
            ServiceError::Status(status) => {
                debug!(status, "list request refused, keeping current display");
            }
            other => {
                self.session.check(other, sent_with);
                if other.is_unauthorized() && self.session.is_logged_in() {
                    debug!("401 for a replaced session, keeping current display");
                    return;
                }
                warn!(error = %other, "list request failed");
                self.surface.set_error(Some(message));
            }
        }
    }
}

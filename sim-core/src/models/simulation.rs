use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CalculationResult, SimulationInput};

/// Parses the service's `created_at` value.
///
/// The service writes naive ISO-8601 local timestamps; RFC 3339 values with
/// an offset and bare dates are accepted as well.
fn parse_created_at(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Summary of a saved simulation, as listed by `GET /simulations`.
///
/// Every field may be null; an entry without an id cannot be addressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub nome_cliente: Option<String>,
    #[serde(default)]
    pub nome_empresa: Option<String>,
}

impl HistoryEntry {
    pub fn created_on(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_created_at)
    }
}

/// Full saved record returned by `GET /simulations/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSimulation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub nome_cliente: Option<String>,
    #[serde(default)]
    pub nome_empresa: Option<String>,
    #[serde(default)]
    pub input: SimulationInput,
    #[serde(default)]
    pub output: Option<CalculationResult>,
}

/// Response of `POST /simulations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationId {
    pub id: String,
}

/// Flattened aggregate of one saved simulation, as listed by
/// `GET /analysis`. Display only; absent figures render as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRow {
    pub created_at: Option<String>,
    pub nome_empresa: Option<String>,
    pub nome_cliente: Option<String>,
    pub rendimento_anual: Option<Decimal>,
    pub total_tributos_pf: Option<Decimal>,
    pub total_impostos_pj: Option<Decimal>,
    pub impacto_pf: Option<Decimal>,
    pub aliquota_pf: Option<Decimal>,
    pub aliquota_pj_final: Option<Decimal>,
    pub economia_tributaria: Option<Decimal>,
}

impl AnalysisRow {
    pub fn created_on(&self) -> Option<NaiveDate> {
        self.created_at.as_deref().and_then(parse_created_at)
    }
}

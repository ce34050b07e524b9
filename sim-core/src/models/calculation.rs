use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Individual-taxation (PF) figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PfBreakdown {
    pub rendimento_anual: Decimal,
    pub inss: Decimal,
    pub irpf: Decimal,
    pub total_tributos: Decimal,
    pub aliquota_efetiva: Decimal,
    pub receita_liquida: Decimal,
}

/// Corporate-taxation (PJ) figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PjBreakdown {
    pub irpj_total: Decimal,
    pub csll: Decimal,
    pub pis: Decimal,
    pub cofins: Decimal,
    pub iss: Decimal,
    pub total_impostos: Decimal,
    pub lucro_liquido: Decimal,
    pub dividendos: Decimal,
    /// Tax impact of the distributed dividends on the individual.
    pub impacto_pf: Decimal,
    pub aliquota_efetiva_final: Decimal,
}

/// Derived PF vs PJ comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// PF total minus PJ total (including the impact on the individual).
    /// Positive means the corporate structure pays less.
    pub economia_tributaria: Decimal,
    pub aliquota_pf: Decimal,
    pub aliquota_pj_final: Decimal,
    pub receita_liquida_pf: Decimal,
    pub lucro_liquido_pj: Decimal,
}

/// Parameters the service reports having used for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    pub annual_expenses: Decimal,
    pub min_wage_used: Decimal,
    pub presumed_profit_rate: Decimal,
    pub pis_rate: Decimal,
    pub cofins_rate: Decimal,
}

/// Immutable snapshot returned by the calculation service for one request.
/// A newer result replaces an older one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub pf: PfBreakdown,
    pub pj: PjBreakdown,
    pub comparativo: Comparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Assumptions>,
}

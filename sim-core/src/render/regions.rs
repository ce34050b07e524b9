//! Declarative region tables for every view.
//!
//! Each entry names a display region, where its value comes from and how it
//! is formatted. The detail, consolidated and print views share metrics and
//! differ only in region ids.

use rust_decimal::Decimal;

use crate::models::{CalculationResult, ClientState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Currency,
    Rate,
}

/// A figure read from a [`CalculationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PfRendimentoAnual,
    PfInss,
    PfIrpf,
    PfTotalTributos,
    PfAliquotaEfetiva,
    PfReceitaLiquida,
    PjIrpjTotal,
    PjCsll,
    PjPis,
    PjCofins,
    PjIss,
    PjTotalImpostos,
    PjLucroLiquido,
    PjDividendos,
    PjImpactoPf,
    PjAliquotaEfetivaFinal,
    CompEconomiaTributaria,
    CompAliquotaPf,
    CompAliquotaPjFinal,
    CompReceitaLiquidaPf,
    CompLucroLiquidoPj,
}

impl Metric {
    pub fn read(
        self,
        r: &CalculationResult,
    ) -> Decimal {
        match self {
            Self::PfRendimentoAnual => r.pf.rendimento_anual,
            Self::PfInss => r.pf.inss,
            Self::PfIrpf => r.pf.irpf,
            Self::PfTotalTributos => r.pf.total_tributos,
            Self::PfAliquotaEfetiva => r.pf.aliquota_efetiva,
            Self::PfReceitaLiquida => r.pf.receita_liquida,
            Self::PjIrpjTotal => r.pj.irpj_total,
            Self::PjCsll => r.pj.csll,
            Self::PjPis => r.pj.pis,
            Self::PjCofins => r.pj.cofins,
            Self::PjIss => r.pj.iss,
            Self::PjTotalImpostos => r.pj.total_impostos,
            Self::PjLucroLiquido => r.pj.lucro_liquido,
            Self::PjDividendos => r.pj.dividendos,
            Self::PjImpactoPf => r.pj.impacto_pf,
            Self::PjAliquotaEfetivaFinal => r.pj.aliquota_efetiva_final,
            Self::CompEconomiaTributaria => r.comparativo.economia_tributaria,
            Self::CompAliquotaPf => r.comparativo.aliquota_pf,
            Self::CompAliquotaPjFinal => r.comparativo.aliquota_pj_final,
            Self::CompReceitaLiquidaPf => r.comparativo.receita_liquida_pf,
            Self::CompLucroLiquidoPj => r.comparativo.lucro_liquido_pj,
        }
    }

    /// Effective-rate figures; everything else is a currency amount.
    pub fn is_rate(self) -> bool {
        matches!(
            self,
            Self::PfAliquotaEfetiva
                | Self::PjAliquotaEfetivaFinal
                | Self::CompAliquotaPf
                | Self::CompAliquotaPjFinal
        )
    }
}

/// A figure derived from the pending [`ClientState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMetric {
    RendimentoMensal,
    RendimentoAnual,
    ProLabore,
    ProLaboreAnual,
    IssFixo,
    SalarioMinimo,
    DespesasAnuais,
}

impl InputMetric {
    pub fn read(
        self,
        s: &ClientState,
    ) -> Decimal {
        let months = Decimal::from(12);
        match self {
            Self::RendimentoMensal => s.rendimento_mensal,
            Self::RendimentoAnual => s.rendimento_mensal.saturating_mul(months),
            Self::ProLabore => s.pro_labore,
            Self::ProLaboreAnual => s.pro_labore.saturating_mul(months),
            Self::IssFixo => s.iss_fixo,
            Self::SalarioMinimo => s.salario_minimo,
            Self::DespesasAnuais => s.total_expenses(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Result(Metric),
    Input(InputMetric),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub id: &'static str,
    pub source: Source,
    pub format: FormatKind,
}

impl Region {
    /// Result-backed region whose formatter follows the metric's tag.
    const fn metric(
        id: &'static str,
        metric: Metric,
        format: FormatKind,
    ) -> Self {
        Self {
            id,
            source: Source::Result(metric),
            format,
        }
    }

    const fn input(
        id: &'static str,
        metric: InputMetric,
    ) -> Self {
        Self {
            id,
            source: Source::Input(metric),
            format: FormatKind::Currency,
        }
    }
}

use FormatKind::{Currency, Rate};
use Metric::*;

pub const DETAIL: &[Region] = &[
    Region::metric("pf-rendimento", PfRendimentoAnual, Currency),
    Region::metric("pf-inss", PfInss, Currency),
    Region::metric("pf-irpf", PfIrpf, Currency),
    Region::metric("pf-total-tributos", PfTotalTributos, Currency),
    Region::metric("pf-aliquota", PfAliquotaEfetiva, Rate),
    Region::metric("pf-receita", PfReceitaLiquida, Currency),
    Region::metric("pj-irpj", PjIrpjTotal, Currency),
    Region::metric("pj-csll", PjCsll, Currency),
    Region::metric("pj-pis", PjPis, Currency),
    Region::metric("pj-cofins", PjCofins, Currency),
    Region::metric("pj-iss", PjIss, Currency),
    Region::metric("pj-total-impostos", PjTotalImpostos, Currency),
    Region::metric("pj-lucro", PjLucroLiquido, Currency),
    Region::metric("pj-dividendos", PjDividendos, Currency),
    Region::metric("pj-impacto-pf", PjImpactoPf, Currency),
    Region::metric("pj-aliquota-final", PjAliquotaEfetivaFinal, Rate),
    Region::metric("comp-economia", CompEconomiaTributaria, Currency),
    Region::metric("comp-aliquota-pf", CompAliquotaPf, Rate),
    Region::metric("comp-aliquota-pj", CompAliquotaPjFinal, Rate),
    Region::metric("comp-receita-pf", CompReceitaLiquidaPf, Currency),
    Region::metric("comp-lucro-pj", CompLucroLiquidoPj, Currency),
];

pub const CONSOLIDATED: &[Region] = &[
    Region::input("cons-rendimento", InputMetric::RendimentoMensal),
    Region::input("cons-prolabore", InputMetric::ProLabore),
    Region::input("cons-iss", InputMetric::IssFixo),
    Region::input("cons-salario", InputMetric::SalarioMinimo),
    Region::input("cons-despesas", InputMetric::DespesasAnuais),
    Region::metric("cons-pf-rendimento", PfRendimentoAnual, Currency),
    Region::metric("cons-pf-inss", PfInss, Currency),
    Region::metric("cons-pf-irpf", PfIrpf, Currency),
    Region::metric("cons-pf-total", PfTotalTributos, Currency),
    Region::metric("cons-pf-aliquota", PfAliquotaEfetiva, Rate),
    Region::metric("cons-pf-receita", PfReceitaLiquida, Currency),
    Region::metric("cons-pj-irpj", PjIrpjTotal, Currency),
    Region::metric("cons-pj-csll", PjCsll, Currency),
    Region::metric("cons-pj-pis", PjPis, Currency),
    Region::metric("cons-pj-cofins", PjCofins, Currency),
    Region::metric("cons-pj-iss", PjIss, Currency),
    Region::metric("cons-pj-total", PjTotalImpostos, Currency),
    Region::metric("cons-pj-lucro", PjLucroLiquido, Currency),
    Region::metric("cons-pj-dividendos", PjDividendos, Currency),
    Region::metric("cons-pj-impacto", PjImpactoPf, Currency),
    Region::metric("cons-pj-aliquota", PjAliquotaEfetivaFinal, Rate),
    Region::metric("cons-comp-economia", CompEconomiaTributaria, Currency),
    Region::metric("cons-comp-aliquota-pf", CompAliquotaPf, Rate),
    Region::metric("cons-comp-aliquota-pj", CompAliquotaPjFinal, Rate),
    Region::metric("cons-comp-receita-pf", CompReceitaLiquidaPf, Currency),
    Region::metric("cons-comp-lucro-pj", CompLucroLiquidoPj, Currency),
];

pub const PRINT: &[Region] = &[
    Region::input("print-rendimento", InputMetric::RendimentoMensal),
    Region::input("print-prolabore", InputMetric::ProLabore),
    Region::input("print-iss", InputMetric::IssFixo),
    Region::input("print-salario", InputMetric::SalarioMinimo),
    Region::input("print-despesas", InputMetric::DespesasAnuais),
    Region::metric("print-pf-rendimento", PfRendimentoAnual, Currency),
    Region::metric("print-pf-inss", PfInss, Currency),
    Region::metric("print-pf-irpf", PfIrpf, Currency),
    Region::metric("print-pf-total", PfTotalTributos, Currency),
    Region::metric("print-pf-aliquota", PfAliquotaEfetiva, Rate),
    Region::metric("print-pf-receita", PfReceitaLiquida, Currency),
    Region::metric("print-pj-irpj", PjIrpjTotal, Currency),
    Region::metric("print-pj-csll", PjCsll, Currency),
    Region::metric("print-pj-pis", PjPis, Currency),
    Region::metric("print-pj-cofins", PjCofins, Currency),
    Region::metric("print-pj-iss", PjIss, Currency),
    Region::metric("print-pj-total", PjTotalImpostos, Currency),
    Region::metric("print-pj-lucro", PjLucroLiquido, Currency),
    Region::metric("print-pj-dividendos", PjDividendos, Currency),
    Region::metric("print-pj-impacto", PjImpactoPf, Currency),
    Region::metric("print-pj-aliquota", PjAliquotaEfetivaFinal, Rate),
    Region::metric("print-comp-economia", CompEconomiaTributaria, Currency),
    Region::metric("print-comp-aliquota-pf", CompAliquotaPf, Rate),
    Region::metric("print-comp-aliquota-pj", CompAliquotaPjFinal, Rate),
    Region::metric("print-comp-receita-pf", CompReceitaLiquidaPf, Currency),
    Region::metric("print-comp-lucro-pj", CompLucroLiquidoPj, Currency),
    Region::metric("print-analise-tributos-pf", PfTotalTributos, Currency),
    Region::metric("print-analise-impostos-pj", PjTotalImpostos, Currency),
    Region::metric("print-analise-impacto-pf", PjImpactoPf, Currency),
];

/// Input summary shown beside the form; needs no calculation result.
pub const SUMMARY: &[Region] = &[
    Region::input("resumo-rendimento", InputMetric::RendimentoAnual),
    Region::input("resumo-despesas", InputMetric::DespesasAnuais),
    Region::input("resumo-prolabore", InputMetric::ProLaboreAnual),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn all_tables() -> [(&'static str, &'static [Region]); 4] {
        [
            ("detail", DETAIL),
            ("consolidated", CONSOLIDATED),
            ("print", PRINT),
            ("summary", SUMMARY),
        ]
    }

    #[test]
    fn rate_metrics_are_always_tagged_rate() {
        for (name, table) in all_tables() {
            for region in table {
                let expected = match region.source {
                    Source::Result(metric) if metric.is_rate() => Rate,
                    _ => Currency,
                };
                assert_eq!(region.format, expected, "{name}: {}", region.id);
            }
        }
    }

    #[test]
    fn region_ids_are_unique_across_views() {
        let mut seen = HashSet::new();
        for (_, table) in all_tables() {
            for region in table {
                assert!(seen.insert(region.id), "duplicate region id {}", region.id);
            }
        }
    }

    #[test]
    fn summary_reads_only_inputs() {
        assert!(SUMMARY.iter().all(|r| matches!(r.source, Source::Input(_))));
    }

    #[test]
    fn annualised_inputs_saturate_at_the_decimal_range() {
        let state = ClientState {
            rendimento_mensal: Decimal::MAX,
            pro_labore: Decimal::MIN,
            secretaria: Decimal::MAX,
            contador: Decimal::MAX,
            ..Default::default()
        };

        assert_eq!(InputMetric::RendimentoAnual.read(&state), Decimal::MAX);
        assert_eq!(InputMetric::ProLaboreAnual.read(&state), Decimal::MIN);
        assert_eq!(InputMetric::DespesasAnuais.read(&state), Decimal::MAX);
    }

    #[test]
    fn annualised_income_is_twelve_months() {
        let state = ClientState {
            rendimento_mensal: Decimal::new(5000, 0),
            ..Default::default()
        };

        assert_eq!(InputMetric::RendimentoAnual.read(&state), Decimal::new(60000, 0));
    }
}

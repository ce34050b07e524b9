//! Bar and pie geometry plus the advisory sentence.

use rust_decimal::Decimal;

use crate::models::CalculationResult;

/// Smallest divisor for the effective-rate bars, 1% of scale.
const RATE_SCALE_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

const FULL_TURN: Decimal = Decimal::from_parts(360, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub id: &'static str,
    /// Bar width as a percentage of the chart, 0..=100.
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieSlice {
    pub id: &'static str,
    /// Angle of the corporate-tax slice, 0..=360.
    pub degrees: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFrame {
    pub rate_bars: [Bar; 2],
    pub burden_bars: [Bar; 3],
    pub pie: Option<PieSlice>,
}

impl ChartFrame {
    pub fn from_result(result: &CalculationResult) -> Self {
        Self {
            rate_bars: rate_bars(result.comparativo.aliquota_pf, result.comparativo.aliquota_pj_final),
            burden_bars: burden_bars(result),
            pie: burden_pie(result),
        }
    }
}

/// `value` as a share of `max`, clamped to `0..=scale`. A quotient too
/// large to represent counts as a full bar.
fn share_of(
    value: Decimal,
    max: Decimal,
    scale: Decimal,
) -> Decimal {
    value
        .checked_div(max)
        .and_then(|ratio| ratio.checked_mul(scale))
        .unwrap_or(scale)
        .clamp(Decimal::ZERO, scale)
}

fn percent_of(
    value: Decimal,
    max: Decimal,
) -> Decimal {
    share_of(value, max, Decimal::ONE_HUNDRED)
}

/// Effective-rate bars, each normalized against the larger rate.
pub fn rate_bars(
    pf_rate: Decimal,
    pj_rate: Decimal,
) -> [Bar; 2] {
    let max = pf_rate.max(pj_rate).max(RATE_SCALE_FLOOR);
    [
        Bar {
            id: "bar-pf",
            percent: percent_of(pf_rate, max),
        },
        Bar {
            id: "bar-pj",
            percent: percent_of(pj_rate, max),
        },
    ]
}

/// PF taxes, PJ taxes and the dividend impact on the individual, each
/// normalized against the largest of the three.
pub fn burden_bars(result: &CalculationResult) -> [Bar; 3] {
    let pf_total = result.pf.total_tributos;
    let pj_total = result.pj.total_impostos;
    let impact = result.pj.impacto_pf;
    let max = pf_total.max(pj_total).max(impact).max(Decimal::ONE);
    [
        Bar {
            id: "bar-tributos-pf",
            percent: percent_of(pf_total, max),
        },
        Bar {
            id: "bar-impostos-pj",
            percent: percent_of(pj_total, max),
        },
        Bar {
            id: "bar-impacto-pf",
            percent: percent_of(impact, max),
        },
    ]
}

/// Share of corporate taxes in the whole corporate-side burden.
/// `None` when that burden is not positive.
pub fn burden_pie(result: &CalculationResult) -> Option<PieSlice> {
    let pj_total = result.pj.total_impostos;
    let burden = pj_total.saturating_add(result.pj.impacto_pf);
    if burden <= Decimal::ZERO {
        return None;
    }
    Some(PieSlice {
        id: "pie-pj",
        degrees: share_of(pj_total, burden, FULL_TURN),
    })
}

/// Recommendation picked from the sign of the tax savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    CorporateFavored,
    IndividualFavored,
    Equivalent,
}

impl Advisory {
    pub fn from_savings(savings: Decimal) -> Self {
        if savings > Decimal::ZERO {
            Self::CorporateFavored
        } else if savings < Decimal::ZERO {
            Self::IndividualFavored
        } else {
            Self::Equivalent
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::CorporateFavored => {
                "Com base nas premissas, a estrutura PJ apresenta menor carga tributária total e maior eficiência fiscal, indicando vantagem econômica em relação à PF."
            }
            Self::IndividualFavored => {
                "Com base nas premissas, a estrutura PF apresenta melhor resultado tributário total do que a PJ. Recomenda-se manter o modelo PF ou revisar as premissas."
            }
            Self::Equivalent => {
                "Com base nas premissas, os resultados entre PF e PJ são equivalentes. Avalie outros fatores operacionais antes de decidir."
            }
        }
    }
}

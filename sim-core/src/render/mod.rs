//! Render dispatcher: turns a state and a calculation result into display
//! text for named regions.
//!
//! Everything here is pure. Binding region ids to an actual display is the
//! caller's job.

pub mod charts;
pub mod regions;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{CalculationResult, ClientState};
use crate::normalize::{format_currency, format_date, format_rate};

pub use charts::{Advisory, Bar, ChartFrame, PieSlice};
pub use regions::{FormatKind, InputMetric, Metric, Region, Source};

/// Region ids that receive the advisory sentence, per view.
pub const ADVISORY_DETAIL: &str = "parecer-texto";
pub const ADVISORY_CONSOLIDATED: &str = "cons-parecer";
pub const ADVISORY_PRINT: &str = "print-parecer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRegion {
    pub id: &'static str,
    pub text: String,
}

impl RenderedRegion {
    fn new(
        id: &'static str,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

pub fn format_value(
    kind: FormatKind,
    value: Decimal,
) -> String {
    match kind {
        FormatKind::Currency => format_currency(value),
        FormatKind::Rate => format_rate(value),
    }
}

impl Region {
    pub fn value(
        &self,
        state: &ClientState,
        result: &CalculationResult,
    ) -> Decimal {
        match self.source {
            Source::Result(metric) => metric.read(result),
            Source::Input(metric) => metric.read(state),
        }
    }

    pub fn render(
        &self,
        state: &ClientState,
        result: &CalculationResult,
    ) -> RenderedRegion {
        RenderedRegion::new(self.id, format_value(self.format, self.value(state, result)))
    }
}

pub fn render_table(
    table: &[Region],
    state: &ClientState,
    result: &CalculationResult,
) -> Vec<RenderedRegion> {
    table.iter().map(|region| region.render(state, result)).collect()
}

/// Input summary regions, rendered from state alone.
pub fn render_summary(state: &ClientState) -> Vec<RenderedRegion> {
    regions::SUMMARY
        .iter()
        .filter_map(|region| match region.source {
            Source::Input(metric) => Some(RenderedRegion::new(
                region.id,
                format_value(region.format, metric.read(state)),
            )),
            Source::Result(_) => None,
        })
        .collect()
}

/// Everything a completed calculation writes to the live views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFrame {
    pub regions: Vec<RenderedRegion>,
    pub charts: ChartFrame,
    pub advisory: Advisory,
}

/// Detail, consolidated and chart views for one result. Each mapped region
/// appears exactly once.
pub fn render_result(
    state: &ClientState,
    result: &CalculationResult,
) -> ResultFrame {
    let advisory = Advisory::from_savings(result.comparativo.economia_tributaria);

    let mut written = render_table(regions::DETAIL, state, result);
    written.extend(render_table(regions::CONSOLIDATED, state, result));
    written.push(RenderedRegion::new(ADVISORY_DETAIL, advisory.text()));
    written.push(RenderedRegion::new(ADVISORY_CONSOLIDATED, advisory.text()));

    ResultFrame {
        regions: written,
        charts: ChartFrame::from_result(result),
        advisory,
    }
}

/// Printable report regions, including the header block.
pub fn render_print(
    state: &ClientState,
    result: &CalculationResult,
    today: NaiveDate,
) -> Vec<RenderedRegion> {
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    let mut written = vec![
        RenderedRegion::new("print-cliente", or_dash(&state.nome_cliente)),
        RenderedRegion::new("print-empresa", or_dash(&state.nome_empresa)),
        RenderedRegion::new("print-data", format_date(Some(today))),
    ];
    written.extend(render_table(regions::PRINT, state, result));
    written.push(RenderedRegion::new(
        ADVISORY_PRINT,
        Advisory::from_savings(result.comparativo.economia_tributaria).text(),
    ));
    written
}

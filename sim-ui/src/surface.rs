//! The display boundary. Orchestration code only ever talks to a
//! [`Surface`]; what a region, overlay or tab looks like is up to the
//! implementation.

use std::io::Write;
use std::sync::Mutex;

use sim_core::render::{Bar, PieSlice, RenderedRegion};
use sim_core::{AmountField, TextField};

use crate::history::{AnalysisLine, HistoryRow};
use crate::lock;
use crate::state::Tab;

pub trait Surface: Send + Sync {
    /// Replaces the text of a named output region.
    fn set_region(
        &self,
        id: &str,
        text: &str,
    );

    fn set_bar(
        &self,
        bar: &Bar,
    );

    fn set_pie(
        &self,
        pie: &PieSlice,
    );

    /// Loading indicator shown while a calculation is in flight.
    fn set_loading(
        &self,
        loading: bool,
    );

    fn set_status(
        &self,
        text: &str,
    );

    /// Shows the error banner, or hides it with `None`.
    fn set_error(
        &self,
        message: Option<&str>,
    );

    fn set_login_visible(
        &self,
        visible: bool,
    );

    fn set_login_error(
        &self,
        message: Option<&str>,
    );

    /// Replaces the displayed text of an input field.
    fn set_input(
        &self,
        field: &str,
        text: &str,
    );

    fn set_field_error(
        &self,
        field: &str,
        message: Option<&str>,
    );

    fn show_history(
        &self,
        rows: &[HistoryRow],
    );

    fn show_history_placeholder(
        &self,
        text: &str,
    );

    fn show_analysis(
        &self,
        rows: &[AnalysisLine],
    );

    fn set_config_text(
        &self,
        text: &str,
    );

    fn switch_tab(
        &self,
        tab: Tab,
    );
}

/// Writes every region in order.
pub fn paint(
    surface: &dyn Surface,
    regions: &[RenderedRegion],
) {
    for region in regions {
        surface.set_region(region.id, &region.text);
    }
}

/// Line-oriented surface for the terminal binary.
///
/// Output is plain `key: value` text so it can be piped or grepped.
pub struct ConsoleSurface<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Form label for a field name; unknown names print as given.
    fn field_label(field: &str) -> &str {
        AmountField::parse(field)
            .map(|f| f.label())
            .or_else(|| TextField::parse(field).map(|f| f.label()))
            .unwrap_or(field)
    }

    fn line(
        &self,
        text: std::fmt::Arguments<'_>,
    ) {
        let mut out = lock(&self.out);
        if let Err(e) = writeln!(out, "{text}") {
            tracing::debug!(error = %e, "console write failed");
        }
    }
}

impl<W: Write + Send> Surface for ConsoleSurface<W> {
    fn set_region(
        &self,
        id: &str,
        text: &str,
    ) {
        self.line(format_args!("{id}: {text}"));
    }

    fn set_bar(
        &self,
        bar: &Bar,
    ) {
        self.line(format_args!("{}: {:.1}%", bar.id, bar.percent));
    }

    fn set_pie(
        &self,
        pie: &PieSlice,
    ) {
        self.line(format_args!("{}: {:.1}deg", pie.id, pie.degrees));
    }

    fn set_loading(
        &self,
        _loading: bool,
    ) {
    }

    fn set_status(
        &self,
        text: &str,
    ) {
        self.line(format_args!("[status] {text}"));
    }

    fn set_error(
        &self,
        message: Option<&str>,
    ) {
        if let Some(message) = message {
            self.line(format_args!("[erro] {message}"));
        }
    }

    fn set_login_visible(
        &self,
        visible: bool,
    ) {
        if visible {
            self.line(format_args!("[login] sessão necessária"));
        }
    }

    fn set_login_error(
        &self,
        message: Option<&str>,
    ) {
        if let Some(message) = message {
            self.line(format_args!("[login] {message}"));
        }
    }

    fn set_input(
        &self,
        field: &str,
        text: &str,
    ) {
        self.line(format_args!("{} = {text}", Self::field_label(field)));
    }

    fn set_field_error(
        &self,
        field: &str,
        message: Option<&str>,
    ) {
        if let Some(message) = message {
            self.line(format_args!("{}: {message}", Self::field_label(field)));
        }
    }

    fn show_history(
        &self,
        rows: &[HistoryRow],
    ) {
        for row in rows {
            self.line(format_args!(
                "{}\t{}\t{}\t{}",
                row.id, row.empresa, row.cliente, row.data
            ));
        }
    }

    fn show_history_placeholder(
        &self,
        text: &str,
    ) {
        self.line(format_args!("{text}"));
    }

    fn show_analysis(
        &self,
        rows: &[AnalysisLine],
    ) {
        for row in rows {
            self.line(format_args!("{}", row.cells().join("\t")));
        }
    }

    fn set_config_text(
        &self,
        text: &str,
    ) {
        self.line(format_args!("{text}"));
    }

    fn switch_tab(
        &self,
        tab: Tab,
    ) {
        tracing::debug!(tab = tab.id(), "tab switched");
        self.line(format_args!("[aba] {}", tab.label()));
    }
}

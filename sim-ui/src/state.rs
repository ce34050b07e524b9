//! View state that lives outside the input store: the active tab and the
//! field currently being edited.

use sim_core::AmountField;

/// Panels of the simulator, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Premissas,
    Resultados,
    Consolidado,
    Graficos,
    Historico,
    Analise,
    Parametros,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Premissas,
        Tab::Resultados,
        Tab::Consolidado,
        Tab::Graficos,
        Tab::Historico,
        Tab::Analise,
        Tab::Parametros,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Tab::Premissas => "premissas",
            Tab::Resultados => "resultados",
            Tab::Consolidado => "consolidado",
            Tab::Graficos => "graficos",
            Tab::Historico => "historico",
            Tab::Analise => "analise",
            Tab::Parametros => "parametros",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Premissas => "Premissas",
            Tab::Resultados => "Resultados",
            Tab::Consolidado => "Consolidado",
            Tab::Graficos => "Gráficos",
            Tab::Historico => "Histórico",
            Tab::Analise => "Análise",
            Tab::Parametros => "Parâmetros",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.id() == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub tab: Tab,
    /// Field holding focus, shown in edit form instead of currency.
    pub editing: Option<AmountField>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the active tab actually changed.
    pub fn switch_to(
        &mut self,
        tab: Tab,
    ) -> bool {
        let changed = self.tab != tab;
        self.tab = tab;
        changed
    }

    pub fn focus(
        &mut self,
        field: AmountField,
    ) {
        self.editing = Some(field);
    }

    /// Clears focus if `field` holds it.
    pub fn blur(
        &mut self,
        field: AmountField,
    ) {
        if self.editing == Some(field) {
            self.editing = None;
        }
    }
}

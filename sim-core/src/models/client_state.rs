use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Numeric input fields of the simulation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountField {
    RendimentoMensal,
    ProLabore,
    IssFixo,
    SalarioMinimo,
    Secretaria,
    AluguelCondominio,
    Contador,
    OutrasDespesas,
}

impl AmountField {
    pub const ALL: [AmountField; 8] = [
        AmountField::RendimentoMensal,
        AmountField::ProLabore,
        AmountField::IssFixo,
        AmountField::SalarioMinimo,
        AmountField::Secretaria,
        AmountField::AluguelCondominio,
        AmountField::Contador,
        AmountField::OutrasDespesas,
    ];

    /// Field name as it appears in the request payload and the form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RendimentoMensal => "rendimento_mensal",
            Self::ProLabore => "pro_labore",
            Self::IssFixo => "iss_fixo",
            Self::SalarioMinimo => "salario_minimo",
            Self::Secretaria => "secretaria",
            Self::AluguelCondominio => "aluguel_condominio",
            Self::Contador => "contador",
            Self::OutrasDespesas => "outras_despesas",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RendimentoMensal => "Rendimento mensal",
            Self::ProLabore => "Pró-labore mensal",
            Self::IssFixo => "ISS fixo",
            Self::SalarioMinimo => "Salário mínimo",
            Self::Secretaria => "Secretária (anual)",
            Self::AluguelCondominio => "Aluguel e condomínio (anual)",
            Self::Contador => "Contador (anual)",
            Self::OutrasDespesas => "Outras despesas (anual)",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// `true` for the four annual expense categories.
    pub fn is_expense(&self) -> bool {
        matches!(
            self,
            Self::Secretaria | Self::AluguelCondominio | Self::Contador | Self::OutrasDespesas
        )
    }
}

/// Free-text input fields of the simulation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    NomeCliente,
    NomeEmpresa,
}

impl TextField {
    pub const ALL: [TextField; 2] = [TextField::NomeCliente, TextField::NomeEmpresa];

    pub fn name(&self) -> &'static str {
        match self {
            Self::NomeCliente => "nome_cliente",
            Self::NomeEmpresa => "nome_empresa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NomeCliente => "Cliente",
            Self::NomeEmpresa => "Empresa",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

/// Pending user input: the single source of truth for what the next
/// calculation request will carry.
///
/// Writes are last-write-wins and never rejected; validation of negative
/// amounts is reported per field by the caller, not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    pub nome_cliente: String,
    pub nome_empresa: String,
    pub rendimento_mensal: Decimal,
    pub pro_labore: Decimal,
    pub iss_fixo: Decimal,
    pub salario_minimo: Decimal,
    pub secretaria: Decimal,
    pub aluguel_condominio: Decimal,
    pub contador: Decimal,
    pub outras_despesas: Decimal,
}

impl ClientState {
    pub fn amount(
        &self,
        field: AmountField,
    ) -> Decimal {
        match field {
            AmountField::RendimentoMensal => self.rendimento_mensal,
            AmountField::ProLabore => self.pro_labore,
            AmountField::IssFixo => self.iss_fixo,
            AmountField::SalarioMinimo => self.salario_minimo,
            AmountField::Secretaria => self.secretaria,
            AmountField::AluguelCondominio => self.aluguel_condominio,
            AmountField::Contador => self.contador,
            AmountField::OutrasDespesas => self.outras_despesas,
        }
    }

    pub fn set_amount(
        &mut self,
        field: AmountField,
        value: Decimal,
    ) {
        let slot = match field {
            AmountField::RendimentoMensal => &mut self.rendimento_mensal,
            AmountField::ProLabore => &mut self.pro_labore,
            AmountField::IssFixo => &mut self.iss_fixo,
            AmountField::SalarioMinimo => &mut self.salario_minimo,
            AmountField::Secretaria => &mut self.secretaria,
            AmountField::AluguelCondominio => &mut self.aluguel_condominio,
            AmountField::Contador => &mut self.contador,
            AmountField::OutrasDespesas => &mut self.outras_despesas,
        };
        *slot = value;
    }

    pub fn text(
        &self,
        field: TextField,
    ) -> &str {
        match field {
            TextField::NomeCliente => &self.nome_cliente,
            TextField::NomeEmpresa => &self.nome_empresa,
        }
    }

    /// Stores the trimmed value.
    pub fn set_text(
        &mut self,
        field: TextField,
        value: &str,
    ) {
        let value = value.trim().to_string();
        match field {
            TextField::NomeCliente => self.nome_cliente = value,
            TextField::NomeEmpresa => self.nome_empresa = value,
        }
    }

    /// Restores every field to its zero/empty default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sum of the four annual expense categories, saturating at the
    /// `Decimal` range instead of overflowing.
    pub fn total_expenses(&self) -> Decimal {
        AmountField::ALL
            .into_iter()
            .filter(AmountField::is_expense)
            .fold(Decimal::ZERO, |total, field| {
                total.saturating_add(self.amount(field))
            })
    }

    /// Builds the request payload sent to `/calculate` and `/simulations`.
    pub fn to_input(&self) -> SimulationInput {
        SimulationInput {
            nome_cliente: Some(self.nome_cliente.clone()),
            nome_empresa: Some(self.nome_empresa.clone()),
            rendimento_mensal: self.rendimento_mensal,
            despesas_anuais: AnnualExpenses {
                secretaria: self.secretaria,
                aluguel_condominio: self.aluguel_condominio,
                contador: self.contador,
                outras_despesas: self.outras_despesas,
            },
            pro_labore: self.pro_labore,
            iss_fixo: self.iss_fixo,
            salario_minimo: self.salario_minimo,
        }
    }

    /// Overwrites the whole state with a previously saved input set.
    /// Missing names become empty strings.
    pub fn replay(
        &mut self,
        input: &SimulationInput,
    ) {
        *self = Self {
            nome_cliente: input.nome_cliente.clone().unwrap_or_default(),
            nome_empresa: input.nome_empresa.clone().unwrap_or_default(),
            rendimento_mensal: input.rendimento_mensal,
            pro_labore: input.pro_labore,
            iss_fixo: input.iss_fixo,
            salario_minimo: input.salario_minimo,
            secretaria: input.despesas_anuais.secretaria,
            aluguel_condominio: input.despesas_anuais.aluguel_condominio,
            contador: input.despesas_anuais.contador,
            outras_despesas: input.despesas_anuais.outras_despesas,
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnualExpenses {
    pub secretaria: Decimal,
    pub aluguel_condominio: Decimal,
    pub contador: Decimal,
    pub outras_despesas: Decimal,
}

/// Wire shape of a calculation request, also stored verbatim with saved
/// simulations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationInput {
    pub nome_cliente: Option<String>,
    pub nome_empresa: Option<String>,
    pub rendimento_mensal: Decimal,
    pub despesas_anuais: AnnualExpenses,
    pub pro_labore: Decimal,
    pub iss_fixo: Decimal,
    pub salario_minimo: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn field_names_round_trip_through_parse() {
        for field in AmountField::ALL {
            assert_eq!(AmountField::parse(field.name()), Some(field));
        }
        for field in TextField::ALL {
            assert_eq!(TextField::parse(field.name()), Some(field));
        }
        assert_eq!(AmountField::parse("nope"), None);
    }

    #[test]
    fn set_amount_is_last_write_wins() {
        let mut state = ClientState::default();
        state.set_amount(AmountField::Contador, dec!(100));
        state.set_amount(AmountField::Contador, dec!(-5));

        assert_eq!(state.amount(AmountField::Contador), dec!(-5));
    }

    #[test]
    fn set_text_trims_whitespace() {
        let mut state = ClientState::default();
        state.set_text(TextField::NomeEmpresa, "  Acme Ltda \n");

        assert_eq!(state.nome_empresa, "Acme Ltda");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = ClientState::default();
        state.set_text(TextField::NomeCliente, "Ana");
        state.set_amount(AmountField::RendimentoMensal, dec!(5000));
        state.reset();

        assert_eq!(state, ClientState::default());
    }

    #[test]
    fn total_expenses_sums_the_four_categories() {
        let state = ClientState {
            secretaria: dec!(24000),
            aluguel_condominio: dec!(30000),
            contador: dec!(12000),
            outras_despesas: dec!(1.5),
            ..Default::default()
        };

        assert_eq!(state.total_expenses(), dec!(66001.5));
    }

    #[test]
    fn total_expenses_saturates_instead_of_overflowing() {
        let state = ClientState {
            secretaria: Decimal::MAX,
            aluguel_condominio: Decimal::MAX,
            contador: dec!(1),
            ..Default::default()
        };

        assert_eq!(state.total_expenses(), Decimal::MAX);

        let state = ClientState {
            contador: Decimal::MIN,
            outras_despesas: dec!(-1),
            ..Default::default()
        };
        assert_eq!(state.total_expenses(), Decimal::MIN);
    }

    #[test]
    fn payload_nests_expenses_and_keeps_income() {
        let mut state = ClientState::default();
        state.set_amount(AmountField::RendimentoMensal, dec!(5000));

        let body = serde_json::to_value(state.to_input()).unwrap();

        assert_eq!(body["rendimento_mensal"].as_f64(), Some(5000.0));
        for key in ["secretaria", "aluguel_condominio", "contador", "outras_despesas"] {
            assert_eq!(body["despesas_anuais"][key].as_f64(), Some(0.0), "{key}");
        }
        assert_eq!(body["nome_cliente"], json!(""));
    }

    #[test]
    fn replay_tolerates_missing_fields() {
        let input: SimulationInput = serde_json::from_value(json!({
            "nome_empresa": "Acme",
            "nome_cliente": null,
            "rendimento_mensal": 8000,
            "despesas_anuais": { "contador": 1200.5 }
        }))
        .unwrap();

        let mut state = ClientState {
            pro_labore: dec!(999),
            ..Default::default()
        };
        state.replay(&input);

        assert_eq!(state.nome_empresa, "Acme");
        assert_eq!(state.nome_cliente, "");
        assert_eq!(state.rendimento_mensal, dec!(8000));
        assert_eq!(state.contador, dec!(1200.5));
        assert_eq!(state.pro_labore, Decimal::ZERO);
    }
}

//! User-facing status and error strings.

pub const LOGIN_TO_CALCULATE: &str = "Faça login para calcular.";
pub const LOGIN_TO_EXPORT: &str = "Faça login para gerar o PDF.";
pub const LOGIN_TO_CONTINUE: &str = "Faça login para continuar";
pub const LOGIN_FOR_HISTORY: &str = "Faça login para acessar o histórico.";
pub const LOGIN_FOR_ANALYSIS: &str = "Faça login para acessar a análise.";
pub const LOGIN_FOR_CONFIG: &str = "Faça login para acessar os parâmetros.";

pub const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";
pub const MISSING_CREDENTIALS: &str = "Informe usuario e senha.";
pub const INVALID_CREDENTIALS: &str = "Credenciais invalidas.";

pub const CALCULATING: &str = "Atualizando simulação";
pub const CALCULATED: &str = "Simulação atualizada";
pub const CALCULATION_FAILED: &str = "Não foi possível calcular. Verifique o backend.";

pub const EXPORTING: &str = "Gerando PDF...";
pub const EXPORTED: &str = "PDF gerado";
pub const EXPORT_NEEDS_RESULT: &str =
    "Preencha as premissas e aguarde o cálculo antes de gerar o PDF.";
pub const EXPORT_FAILED: &str = "Nao foi possivel gerar o PDF. Verifique o backend.";

pub const SAVE_NEEDS_COMPANY: &str = "Informe o nome da empresa para salvar.";
pub const SAVED: &str = "Simulação salva";
pub const SAVE_FAILED: &str = "Nao foi possivel salvar a simulacao.";

pub const EMPTY_HISTORY: &str = "Nenhuma simulação salva.";

pub const CONFIG_SAVED: &str = "Parâmetros salvos";
pub const CONFIG_INVALID: &str = "JSON inválido ou erro ao salvar parâmetros.";

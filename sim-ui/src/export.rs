//! Printable report export.
//!
//! The print view is hydrated on the surface, then a copy of it is staged
//! next to the output file for the [`Rasterizer`]. The staged copy is
//! removed when the export ends, whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use chrono::Local;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sim_core::ClientState;
use sim_core::render::{RenderedRegion, render_print};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::calc_client::CalculationClient;
use crate::lock;
use crate::messages::{
    EXPORT_FAILED, EXPORT_NEEDS_RESULT, EXPORTED, EXPORTING, LOGIN_TO_EXPORT,
};
use crate::pdf::{PageSetup, PdfLine, write_pdf};
use crate::session::SessionManager;
use crate::surface::{Surface, paint};

pub const PDF_MARGIN_MM: f32 = 10.0;

const REPORT_TITLE: &str = "Simulação PF x PJ";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no active session")]
    NotLoggedIn,

    #[error("no calculation result available")]
    NoResult,

    #[error("cannot stage print document '{path}': {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode print document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("rasterizer failed: {0}")]
    Rasterize(String),

    #[error("cannot write report '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Report sections and the labels of their rows, in print order.
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Identificação",
        &[
            ("print-cliente", "Cliente"),
            ("print-empresa", "Empresa"),
            ("print-data", "Data"),
        ],
    ),
    (
        "Premissas",
        &[
            ("print-rendimento", "Rendimento mensal"),
            ("print-prolabore", "Pró-labore mensal"),
            ("print-iss", "ISS fixo"),
            ("print-salario", "Salário mínimo"),
            ("print-despesas", "Despesas anuais"),
        ],
    ),
    (
        "Pessoa Física",
        &[
            ("print-pf-rendimento", "Rendimento anual"),
            ("print-pf-inss", "INSS"),
            ("print-pf-irpf", "IRPF"),
            ("print-pf-total", "Total de tributos"),
            ("print-pf-aliquota", "Alíquota efetiva"),
            ("print-pf-receita", "Receita líquida"),
        ],
    ),
    (
        "Pessoa Jurídica",
        &[
            ("print-pj-irpj", "IRPJ"),
            ("print-pj-csll", "CSLL"),
            ("print-pj-pis", "PIS"),
            ("print-pj-cofins", "COFINS"),
            ("print-pj-iss", "ISS"),
            ("print-pj-total", "Total de impostos"),
            ("print-pj-lucro", "Lucro líquido"),
            ("print-pj-dividendos", "Dividendos"),
            ("print-pj-impacto", "Impacto na PF"),
            ("print-pj-aliquota", "Alíquota efetiva final"),
        ],
    ),
    (
        "Comparativo",
        &[
            ("print-comp-economia", "Economia tributária"),
            ("print-comp-aliquota-pf", "Alíquota PF"),
            ("print-comp-aliquota-pj", "Alíquota PJ final"),
            ("print-comp-receita-pf", "Receita líquida PF"),
            ("print-comp-lucro-pj", "Lucro líquido PJ"),
        ],
    ),
    (
        "Análise",
        &[
            ("print-analise-tributos-pf", "Tributos PF"),
            ("print-analise-impostos-pj", "Impostos PJ"),
            ("print-analise-impacto-pf", "Impacto PF"),
        ],
    ),
    ("Parecer", &[("print-parecer", "")]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSection {
    pub heading: String,
    pub rows: Vec<PrintRow>,
}

/// Off-screen copy of the hydrated print view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintDocument {
    pub title: String,
    pub sections: Vec<PrintSection>,
    /// Embedded files the rasterizer may reference.
    pub assets: Vec<PathBuf>,
}

impl PrintDocument {
    pub fn from_regions(
        regions: &[RenderedRegion],
        assets: &[PathBuf],
    ) -> Self {
        let text_of = |id: &str| regions.iter().find(|r| r.id == id).map(|r| r.text.clone());

        let sections = SECTIONS
            .iter()
            .map(|(heading, rows)| PrintSection {
                heading: heading.to_string(),
                rows: rows
                    .iter()
                    .filter_map(|(id, label)| {
                        text_of(id).map(|value| PrintRow {
                            label: label.to_string(),
                            value,
                        })
                    })
                    .collect(),
            })
            .filter(|section| !section.rows.is_empty())
            .collect();

        Self {
            title: REPORT_TITLE.to_string(),
            sections,
            assets: assets.to_vec(),
        }
    }

    fn to_lines(&self) -> Vec<PdfLine> {
        let mut lines = vec![PdfLine::heading(&self.title), PdfLine::blank()];
        for section in &self.sections {
            lines.push(PdfLine {
                size: 12.0,
                ..PdfLine::heading(&section.heading)
            });
            for row in &section.rows {
                let text = if row.label.is_empty() {
                    row.value.clone()
                } else {
                    format!("{}: {}", row.label, row.value)
                };
                lines.push(PdfLine::body(text));
            }
            lines.push(PdfLine::blank());
        }
        lines
    }
}

/// A print document written to disk for the duration of one export.
/// Dropping it deletes the file.
#[derive(Debug)]
pub struct StagedDocument {
    path: PathBuf,
}

impl StagedDocument {
    pub async fn create(
        dir: &Path,
        filename: &str,
        document: &PrintDocument,
    ) -> Result<Self, ExportError> {
        let staged = Self {
            path: dir.join(format!(".{filename}.staging.json")),
        };
        let body = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(&staged.path, body)
            .await
            .map_err(|source| ExportError::Stage {
                path: staged.path.clone(),
                source,
            })?;
        debug!(path = %staged.path.display(), "print document staged");
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<PrintDocument, ExportError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ExportError::Stage {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Drop for StagedDocument {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "staged document removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "cannot remove staged document"),
        }
    }
}

/// Turns a staged print document into PDF bytes.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(
        &self,
        staged: &StagedDocument,
        setup: &PageSetup,
    ) -> Result<Vec<u8>, ExportError>;
}

/// Built-in rasterizer producing a text-only PDF.
pub struct TextPdfRasterizer;

#[async_trait]
impl Rasterizer for TextPdfRasterizer {
    async fn rasterize(
        &self,
        staged: &StagedDocument,
        setup: &PageSetup,
    ) -> Result<Vec<u8>, ExportError> {
        let document = staged.read().await?;
        Ok(write_pdf(&document.to_lines(), setup))
    }
}

/// Waits until every asset has either loaded or failed. Returns how many
/// loaded; failures are only logged.
pub async fn wait_for_assets(assets: &[PathBuf]) -> usize {
    let mut pending = JoinSet::new();
    for path in assets.iter().cloned() {
        pending.spawn(async move {
            let outcome = tokio::fs::read(&path).await;
            (path, outcome)
        });
    }

    let mut loaded = 0;
    while let Some(joined) = pending.join_next().await {
        match joined {
            Ok((_, Ok(_))) => loaded += 1,
            Ok((path, Err(e))) => {
                debug!(path = %path.display(), error = %e, "asset failed to load");
            }
            Err(e) => debug!(error = %e, "asset task ended abnormally"),
        }
    }
    loaded
}

fn collapse_whitespace(text: &str) -> String {
    static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());
    match WHITESPACE.as_ref() {
        Some(re) => re.replace_all(text, "_").into_owned(),
        None => text.split_whitespace().collect::<Vec<_>>().join("_"),
    }
}

/// `<client>_pf_pj.pdf`, whitespace runs turned into `_` and lowercased;
/// `simulacao` when the client name is empty.
pub fn report_filename(client: &str) -> String {
    let client = client.trim();
    let base = if client.is_empty() {
        "simulacao".to_string()
    } else {
        collapse_whitespace(client)
            .replace(['/', '\\'], "-")
            .to_lowercase()
    };
    format!("{base}_pf_pj.pdf")
}

pub struct ReportExporter {
    surface: Arc<dyn Surface>,
    session: Arc<SessionManager>,
    calc: Arc<CalculationClient>,
    state: Arc<Mutex<ClientState>>,
    rasterizer: Arc<dyn Rasterizer>,
    output_dir: PathBuf,
    assets: Vec<PathBuf>,
}

impl ReportExporter {
    pub fn new(
        surface: Arc<dyn Surface>,
        session: Arc<SessionManager>,
        calc: Arc<CalculationClient>,
        state: Arc<Mutex<ClientState>>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            surface,
            session,
            calc,
            state,
            rasterizer,
            output_dir: PathBuf::from("."),
            assets: Vec::new(),
        }
    }

    pub fn with_output_dir(
        mut self,
        dir: impl Into<PathBuf>,
    ) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_assets(
        mut self,
        assets: Vec<PathBuf>,
    ) -> Self {
        self.assets = assets;
        self
    }

    /// Writes the PDF report for the latest result and returns its path.
    pub async fn export(&self) -> Result<PathBuf, ExportError> {
        if self.session.guard(Some(LOGIN_TO_EXPORT)).is_none() {
            return Err(ExportError::NotLoggedIn);
        }
        self.surface.set_status(EXPORTING);

        let result = match self.calc.last_result() {
            Some(result) => result,
            None => match self.calc.calculate().await {
                Some(result) => result,
                None => {
                    self.surface.set_error(Some(EXPORT_NEEDS_RESULT));
                    return Err(ExportError::NoResult);
                }
            },
        };

        let state = lock(&self.state).clone();
        let printed = render_print(&state, &result, Local::now().date_naive());
        paint(self.surface.as_ref(), &printed);

        let filename = report_filename(&state.nome_cliente);
        let document = PrintDocument::from_regions(&printed, &self.assets);

        match self.produce(&filename, &document).await {
            Ok(path) => {
                info!(path = %path.display(), "report exported");
                self.surface.set_status(EXPORTED);
                Ok(path)
            }
            Err(e) => {
                warn!(error = %e, "report export failed");
                self.surface.set_error(Some(EXPORT_FAILED));
                Err(e)
            }
        }
    }

    async fn produce(
        &self,
        filename: &str,
        document: &PrintDocument,
    ) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| ExportError::Stage {
                path: self.output_dir.clone(),
                source,
            })?;

        let staged = StagedDocument::create(&self.output_dir, filename, document).await?;

        let loaded = wait_for_assets(&self.assets).await;
        debug!(loaded, total = self.assets.len(), "assets settled");

        let bytes = self
            .rasterizer
            .rasterize(&staged, &PageSetup::a4_portrait(PDF_MARGIN_MM))
            .await?;

        let path = self.output_dir.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| ExportError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn filename_collapses_whitespace_and_lowercases() {
        assert_eq!(report_filename("Ana  Maria\tSouza"), "ana_maria_souza_pf_pj.pdf");
        assert_eq!(report_filename(""), "simulacao_pf_pj.pdf");
        assert_eq!(report_filename("   "), "simulacao_pf_pj.pdf");
        assert_eq!(report_filename("A/B"), "a-b_pf_pj.pdf");
    }

    #[test]
    fn document_groups_regions_into_labelled_sections() {
        let regions = vec![
            RenderedRegion {
                id: "print-cliente",
                text: "Ana".to_string(),
            },
            RenderedRegion {
                id: "print-pf-aliquota",
                text: "26.11%".to_string(),
            },
            RenderedRegion {
                id: "print-parecer",
                text: "Texto".to_string(),
            },
        ];

        let document = PrintDocument::from_regions(&regions, &[]);

        let headings: Vec<&str> = document.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Identificação", "Pessoa Física", "Parecer"]);
        assert_eq!(
            document.sections[1].rows,
            vec![PrintRow {
                label: "Alíquota efetiva".to_string(),
                value: "26.11%".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn staged_document_is_removed_on_drop() {
        let dir = std::env::temp_dir().join(format!("pfpj-stage-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let document = PrintDocument::from_regions(&[], &[]);

        let staged = StagedDocument::create(&dir, "x_pf_pj.pdf", &document)
            .await
            .unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(staged.read().await.unwrap(), document);

        drop(staged);
        assert!(!path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn asset_wait_counts_only_loaded_files() {
        let dir = std::env::temp_dir().join(format!("pfpj-assets-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let logo = dir.join("logo.png");
        tokio::fs::write(&logo, b"png").await.unwrap();

        let loaded = wait_for_assets(&[logo, dir.join("missing.png")]).await;

        assert_eq!(loaded, 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! PDF report export against a scratch output directory.

mod support;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sim_core::{AmountField, ServiceError, TextField};
use sim_ui::export::ExportError;
use sim_ui::messages::{EXPORT_FAILED, EXPORT_NEEDS_RESULT, EXPORTED, LOGIN_TO_EXPORT};
use support::{FailingRasterizer, logged_in, logged_out, with_rasterizer};

fn files_in(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_export_without_session_writes_nothing() {
    let h = logged_out("export-anon");

    let outcome = h.sim.export().await;

    assert!(matches!(outcome, Err(ExportError::NotLoggedIn)));
    assert_eq!(h.surface.overlay_visible(), Some(true));
    assert_eq!(h.surface.last_error().as_deref(), Some(LOGIN_TO_EXPORT));
    assert!(files_in(&h.export_dir).is_empty());
}

#[tokio::test]
async fn test_export_writes_report_named_after_client() {
    let h = logged_in("export-ok");
    h.sim.input_text(TextField::NomeCliente, "Ana  Maria Souza");
    h.sim.input_amount(AmountField::RendimentoMensal, "5000");
    h.sim.cancel_pending();

    let path = h.sim.export().await.unwrap();

    assert_eq!(path, h.export_dir.join("ana_maria_souza_pf_pj.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(files_in(&h.export_dir), vec!["ana_maria_souza_pf_pj.pdf"]);
    assert_eq!(h.surface.statuses().last().map(String::as_str), Some(EXPORTED));
    assert!(h.surface.region("print-pf-total").is_some());
    // No result was cached, so the export calculated first.
    assert_eq!(h.service.count("calculate"), 1);
}

#[tokio::test]
async fn test_export_reuses_last_result() {
    let h = logged_in("export-cached");
    h.sim.calculate().await;

    h.sim.export().await.unwrap();

    assert_eq!(h.service.count("calculate"), 1);
    assert_eq!(files_in(&h.export_dir), vec!["simulacao_pf_pj.pdf"]);
}

#[tokio::test]
async fn test_failed_rasterizer_leaves_no_staged_document() {
    let h = with_rasterizer("export-fail", Arc::new(FailingRasterizer));
    h.sim.input_text(TextField::NomeCliente, "Ana");

    let outcome = h.sim.export().await;

    assert!(matches!(outcome, Err(ExportError::Rasterize(_))));
    assert!(files_in(&h.export_dir).is_empty());
    assert_eq!(h.surface.last_error().as_deref(), Some(EXPORT_FAILED));
}

#[tokio::test]
async fn test_export_without_result_never_rasterizes() {
    // A rasterizer call would surface as `Rasterize`, not `NoResult`.
    let h = with_rasterizer("export-no-result", Arc::new(FailingRasterizer));
    h.service
        .on_calculate(|_| (Duration::ZERO, Err(ServiceError::Status(503))));

    let outcome = h.sim.export().await;

    assert!(matches!(outcome, Err(ExportError::NoResult)));
    assert_eq!(h.surface.last_error().as_deref(), Some(EXPORT_NEEDS_RESULT));
    assert!(files_in(&h.export_dir).is_empty());
}

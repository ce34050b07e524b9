//! Login, logout and startup session checks.

mod support;

use std::time::Duration;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sim_core::{AmountField, ClientState, TextField};
use sim_ui::messages::{INVALID_CREDENTIALS, LOGIN_TO_CONTINUE, MISSING_CREDENTIALS};
use sim_ui::session::LoginOutcome;
use support::{Event, PASSWORD, TOKEN, USER, logged_in, logged_out, with_session};

#[tokio::test]
async fn test_blank_credentials_send_nothing() {
    let h = logged_out("login-blank");

    for (user, password) in [("", PASSWORD), (USER, "   "), ("", "")] {
        assert_eq!(h.sim.login(user, password).await, LoginOutcome::MissingFields);
    }

    assert!(h.service.calls().is_empty());
    assert_eq!(h.surface.login_error().as_deref(), Some(MISSING_CREDENTIALS));
    assert!(h.token().is_none());
}

#[tokio::test]
async fn test_rejected_credentials_keep_session_absent() {
    let h = logged_out("login-rejected");

    assert_eq!(h.sim.login(USER, "wrong").await, LoginOutcome::Rejected);

    assert_eq!(h.service.calls(), vec!["login"]);
    assert_eq!(h.surface.login_error().as_deref(), Some(INVALID_CREDENTIALS));
    assert!(h.token().is_none());
    assert!(!h.sim.session().is_logged_in());
}

#[tokio::test]
async fn test_successful_login_stores_token_and_loads_views() {
    let h = logged_out("login-ok");

    assert_eq!(h.sim.login(&format!(" {USER} "), PASSWORD).await, LoginOutcome::LoggedIn);

    assert_eq!(h.token().map(|t| t.as_str().to_string()), Some(TOKEN.to_string()));
    assert_eq!(h.surface.overlay_visible(), Some(false));
    assert_eq!(h.surface.login_error(), None);
    for call in ["calculate", "list", "analysis", "get_config"] {
        assert_eq!(h.service.count(call), 1, "{call}");
    }
    assert!(
        h.surface
            .events()
            .iter()
            .any(|e| matches!(e, Event::ConfigText(text) if text.contains("salario_minimo")))
    );
}

#[tokio::test]
async fn test_logout_clears_token_and_resets_inputs() {
    let h = logged_in("logout");
    h.sim.input_text(TextField::NomeCliente, "Ana");
    h.sim.input_amount(AmountField::RendimentoMensal, "7000");

    h.sim.logout();

    assert!(h.token().is_none());
    assert_eq!(h.sim.state(), ClientState::default());
    assert_eq!(h.surface.overlay_visible(), Some(true));
    assert_eq!(h.surface.statuses().last().map(String::as_str), Some(LOGIN_TO_CONTINUE));
    assert_eq!(h.surface.input("nome_cliente").as_deref(), Some(""));

    // The pending edit must not reach the service after logout.
    h.sim.settled().await;
    assert_eq!(h.service.count("calculate"), 0);
}

#[tokio::test]
async fn test_startup_without_session_only_raises_overlay() {
    let h = logged_out("startup-anon");

    h.sim.enforce_login().await;

    assert_eq!(h.surface.events(), vec![Event::LoginVisible(true)]);
    assert!(h.service.calls().is_empty());
}

#[tokio::test]
async fn test_startup_with_session_loads_lists_and_parameters() {
    let h = logged_in("startup-session");

    h.sim.enforce_login().await;

    assert_eq!(h.surface.overlay_visible(), Some(false));
    assert_eq!(h.service.count("list"), 1);
    assert_eq!(h.service.count("analysis"), 1);
    assert_eq!(h.service.count("get_config"), 1);
    assert_eq!(h.service.count("calculate"), 0);
}

#[tokio::test]
async fn test_inputs_survive_a_rejected_login() {
    let h = logged_out("login-keeps-state");
    h.sim.input_amount(AmountField::IssFixo, "1.200");
    h.sim.cancel_pending();

    h.sim.login(USER, "nope").await;

    assert_eq!(h.sim.state().iss_fixo, dec!(1200));
}

#[tokio::test(start_paused = true)]
async fn test_late_rejection_of_old_token_keeps_new_session() {
    let h = with_session("stale-401", "tok-old");
    *h.service.list_delay.lock().unwrap() = Duration::from_secs(2);
    let stale = tokio::spawn({
        let sim = h.sim.clone();
        async move { sim.load_history().await }
    });
    tokio::time::sleep(Duration::from_millis(5)).await;

    *h.service.list_delay.lock().unwrap() = Duration::ZERO;
    assert_eq!(h.sim.login(USER, PASSWORD).await, LoginOutcome::LoggedIn);
    assert_eq!(stale.await.unwrap(), None);

    assert!(h.sim.session().is_logged_in());
    assert_eq!(h.token().map(|t| t.as_str().to_string()), Some(TOKEN.to_string()));
    assert_eq!(h.surface.overlay_visible(), Some(false));
    assert_eq!(h.surface.overlay_shown_count(), 0);
    assert_eq!(h.surface.last_error(), None);
}

//! Remote calculation with last-request-wins ordering.
//!
//! Each call takes a sequence number and aborts the request task of the
//! call before it. A response is rendered only if its sequence number is
//! still the latest one issued when it arrives.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use sim_core::render::render_result;
use sim_core::{CalculationResult, ClientState, ServiceError, SimulatorService};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::lock;
use crate::messages::{
    CALCULATED, CALCULATING, CALCULATION_FAILED, LOGIN_TO_CALCULATE, SESSION_EXPIRED,
};
use crate::session::SessionManager;
use crate::surface::{Surface, paint};

pub struct CalculationClient {
    service: Arc<dyn SimulatorService>,
    surface: Arc<dyn Surface>,
    session: Arc<SessionManager>,
    state: Arc<Mutex<ClientState>>,
    issued: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
    last: Mutex<Option<CalculationResult>>,
}

impl CalculationClient {
    pub fn new(
        service: Arc<dyn SimulatorService>,
        surface: Arc<dyn Surface>,
        session: Arc<SessionManager>,
        state: Arc<Mutex<ClientState>>,
    ) -> Self {
        Self {
            service,
            surface,
            session,
            state,
            issued: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            last: Mutex::new(None),
        }
    }

    /// Most recent result that was rendered.
    pub fn last_result(&self) -> Option<CalculationResult> {
        lock(&self.last).clone()
    }

    /// Number of calculations started so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Sends the current inputs and renders the answer.
    ///
    /// Returns `None` without rendering when there is no session, when the
    /// call fails, or when a later call superseded this one.
    pub async fn calculate(&self) -> Option<CalculationResult> {
        let token = self.session.guard(Some(LOGIN_TO_CALCULATE))?;

        let input = lock(&self.state).to_input();

        self.surface.set_loading(true);
        self.surface.set_error(None);
        self.surface.set_status(CALCULATING);

        let service = self.service.clone();
        let sent_with = token.clone();
        // Numbering and handle swap happen under one lock so the latest
        // number always owns the surviving request.
        let (seq, request) = {
            let mut in_flight = lock(&self.in_flight);
            let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            let request = tokio::spawn(async move { service.calculate(&token, &input).await });
            if let Some(previous) = in_flight.replace(request.abort_handle()) {
                previous.abort();
            }
            (seq, request)
        };
        debug!(seq, "calculation requested");

        let outcome = request.await;

        {
            let mut in_flight = lock(&self.in_flight);
            if self.issued.load(Ordering::SeqCst) != seq {
                debug!(seq, "discarding superseded calculation response");
                return None;
            }
            in_flight.take();
        }
        self.surface.set_loading(false);
        self.surface.set_status(CALCULATED);

        match outcome {
            Ok(Ok(result)) => {
                *lock(&self.last) = Some(result.clone());
                self.render(&result);
                Some(result)
            }
            Ok(Err(ServiceError::Unauthorized)) => {
                if self.session.expire(&sent_with) || !self.session.is_logged_in() {
                    self.surface.set_error(Some(SESSION_EXPIRED));
                }
                None
            }
            Ok(Err(e)) => {
                warn!(seq, error = %e, "calculation failed");
                self.surface.set_error(Some(CALCULATION_FAILED));
                None
            }
            Err(e) => {
                warn!(seq, error = %e, "calculation task ended abnormally");
                self.surface.set_error(Some(CALCULATION_FAILED));
                None
            }
        }
    }

    /// Paints detail, consolidated and chart views for `result`.
    fn render(
        &self,
        result: &CalculationResult,
    ) {
        let state = lock(&self.state).clone();
        let frame = render_result(&state, result);

        paint(self.surface.as_ref(), &frame.regions);
        for bar in frame.charts.rate_bars.iter().chain(&frame.charts.burden_bars) {
            self.surface.set_bar(bar);
        }
        if let Some(pie) = &frame.charts.pie {
            self.surface.set_pie(pie);
        }
    }
}

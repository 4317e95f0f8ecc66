//! Liveness and readiness probes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, web};

/// Shared readiness flag flipped once startup wiring completes.
#[derive(Clone, Default)]
pub struct HealthState {
    ready: Arc<AtomicBool>,
}

impl HealthState {
    /// Create a not-yet-ready state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service ready to accept traffic.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Liveness probe: the process is up.
#[get("/healthz/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Readiness probe: startup wiring has completed.
#[get("/healthz/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if state.is_ready() {
        HttpResponse::Ok().finish()
    } else {
        HttpResponse::ServiceUnavailable().finish()
    }
}

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, Span};
use crate::metrics::{CounterService, Metric};
use crate::models::reservation::Reservation;

/// Span covering one create request through the hypermedia surface. It is
/// handed back to [`ReservationEventHandler::after_create`] by the same request.
#[derive(Debug)]
pub struct CreateSpan {
    span: Span,
    started: Instant,
}

impl CreateSpan {
    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Instrumentation fired around writes made through the generic `/reservations` surface.
#[derive(Clone)]
pub struct ReservationEventHandler {
    counter: Arc<CounterService>,
}

impl ReservationEventHandler {
    pub fn new(counter: Arc<CounterService>) -> Self {
        Self { counter }
    }

    pub fn counters(&self) -> &CounterService {
        &self.counter
    }

    pub fn before_create(&self, reservation: &Reservation) -> CreateSpan {
        let span = info_span!("reservation.create", reservation = %reservation.name);
        span.in_scope(|| info!("Persisting reservation"));
        CreateSpan {
            span,
            started: Instant::now(),
        }
    }

    pub fn after_create(&self, create_span: CreateSpan, reservation: &Reservation) {
        let CreateSpan { span, started } = create_span;
        span.in_scope(|| {
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "Created reservation for {}.", reservation.name);
        });
        drop(span);

        self.counter.increment(Metric::Count);
        self.counter.increment(Metric::Create);
    }

    pub fn after_save(&self, reservation: &Reservation) {
        info!("Updated reservation for {}.", reservation.name);
        self.counter.increment(Metric::Save);
    }

    pub fn after_delete(&self, reservation: &Reservation) {
        info!("Removed reservation for {}.", reservation.name);
        self.counter.decrement_count();
        self.counter.increment(Metric::Delete);
    }
}

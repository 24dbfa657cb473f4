//! Booking hand-off.

use std::future::Future;

use tracing::{debug, warn};

use crate::api::ApiError;
use crate::domain::{BookingChannel, TransportOption};

/// Backend that records booking clicks.
pub trait BookingRecorder {
    fn record_booking(&self, option_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Record a booking and return where to send the traveler.
///
/// Recording is best effort: a failure is logged and the channel is
/// returned regardless.
pub async fn book<R: BookingRecorder>(recorder: &R, option: &TransportOption) -> BookingChannel {
    match recorder.record_booking(&option.id).await {
        Ok(()) => debug!(id = %option.id, "booking recorded"),
        Err(e) => warn!(id = %option.id, error = %e, "failed to record booking"),
    }
    option.booking.channel()
}

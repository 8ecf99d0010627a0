//! Fire-and-forget "booking completed" events.
//!
//! The booking handler publishes after commit and never waits on consumers.
//! Downstream subsystems (notifications, report generation) subscribe to the
//! broadcast channel and must tolerate at-least-once delivery; a lagging
//! subscriber only loses its own backlog.

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct BookingCompleted {
    pub booking_id: Uuid,
    pub show_id: Uuid,
    pub user_id: Uuid,
    pub seats: i64,
}

pub type EventSender = broadcast::Sender<BookingCompleted>;

pub fn channel() -> (EventSender, broadcast::Receiver<BookingCompleted>) {
    broadcast::channel(EVENT_BUFFER)
}

/// In-process consumer that records completed bookings in the log. Stands in
/// for the external notification subsystem.
pub fn spawn_logging_consumer(mut rx: broadcast::Receiver<BookingCompleted>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    tracing::info!(
                        booking_id = %event.booking_id,
                        show_id = %event.show_id,
                        user_id = %event.user_id,
                        seats = event.seats,
                        "booking completed"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "booking event consumer fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

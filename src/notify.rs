//! Fire-and-forget notification dispatch. Lifecycle events are handed to a
//! background task over an unbounded channel; delivery is at-most-once and
//! failures are logged, never surfaced to the operation that produced them.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};

use crate::types::{Appointment, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Booked,
    Confirmed,
    Cancelled,
    Rescheduled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient: UserId,
    pub kind: EventKind,
    pub appointment: Appointment,
}

/// Delivery channel for lifecycle events, e.g. the mailer.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync + 'static {
    fn deliver(&self, notification: &Notification) -> Result<(), String>;
}

/// Sink that only writes to the log. Used when no mailer is wired up.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, notification: &Notification) -> Result<(), String> {
        info!(
            recipient = notification.recipient,
            kind = ?notification.kind,
            appointment = %notification.appointment.id,
            "notification"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: UnboundedSender<Notification>,
}

impl NotificationSender {
    pub fn send(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification dropped, dispatcher is gone");
        }
    }

    /// Both participants get the event.
    pub fn send_to_parties(&self, kind: EventKind, appointment: &Appointment) {
        for recipient in [appointment.student_id, appointment.counselor_id] {
            self.send(Notification {
                recipient,
                kind,
                appointment: appointment.clone(),
            });
        }
    }

    /// A sender with no dispatcher behind it; every event is dropped.
    pub fn disconnected() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }
}

/// Spawns the dispatcher task and returns the handle the stores send into.
/// The task runs until every sender is dropped; pending events are abandoned
/// on process shutdown.
pub fn spawn_dispatcher<S: NotificationSink>(sink: S) -> NotificationSender {
    let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            if let Err(err) = sink.deliver(&notification) {
                warn!(
                    %err,
                    recipient = notification.recipient,
                    "Failed to deliver notification"
                );
            }
        }
    });
    NotificationSender { tx }
}

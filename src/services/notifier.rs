use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::database::models::{Request, RequestStatus, User};

/// Outbound events for the delivery collaborator. Each carries the worker's
/// chat identity and enough data to render a plain-text message.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NotificationEvent {
    #[serde(rename_all = "camelCase")]
    RequestConfirmed {
        chat_id: String,
        worker_name: String,
        request_date: NaiveDate,
    },
    #[serde(rename_all = "camelCase")]
    RequestDecided {
        chat_id: String,
        worker_name: String,
        request_date: NaiveDate,
        status: RequestStatus,
    },
    #[serde(rename_all = "camelCase")]
    ReminderDue {
        chat_id: String,
        worker_name: String,
        deadline_date: NaiveDate,
        days_until_deadline: i64,
        target_year: i64,
        target_month: i64,
    },
}

impl NotificationEvent {
    pub fn confirmed(worker: &User, request: &Request) -> Self {
        NotificationEvent::RequestConfirmed {
            chat_id: worker.chat_id.clone(),
            worker_name: worker.name.clone(),
            request_date: request.request_date,
        }
    }

    pub fn decided(worker: &User, request: &Request) -> Self {
        NotificationEvent::RequestDecided {
            chat_id: worker.chat_id.clone(),
            worker_name: worker.name.clone(),
            request_date: request.request_date,
            status: request.status,
        }
    }

    pub fn chat_id(&self) -> &str {
        match self {
            NotificationEvent::RequestConfirmed { chat_id, .. }
            | NotificationEvent::RequestDecided { chat_id, .. }
            | NotificationEvent::ReminderDue { chat_id, .. } => chat_id,
        }
    }

    /// Plain-text rendering handed to the delivery channel.
    pub fn text(&self) -> String {
        match self {
            NotificationEvent::RequestConfirmed { request_date, .. } => {
                format!("Your day-off request for {} was received and is awaiting review.", request_date)
            }
            NotificationEvent::RequestDecided { request_date, status, .. } => {
                format!("Your day-off request for {} was {}.", request_date, status)
            }
            NotificationEvent::ReminderDue {
                deadline_date,
                days_until_deadline,
                target_year,
                target_month,
                ..
            } => format!(
                "You have not submitted day-off requests for {}-{:02} yet. The deadline is {} ({} day(s) left).",
                target_year, target_month, deadline_date, days_until_deadline
            ),
        }
    }
}

/// Fire-and-forget dispatch: state-mutating code hands events to a queue and
/// moves on, so a slow or failing delivery channel never holds a database
/// transaction open. The draining task stands in for the real delivery
/// collaborator, which owns retries and channel formatting.
#[derive(Clone)]
pub struct NotificationService {
    tx: UnboundedSender<NotificationEvent>,
}

impl NotificationService {
    /// Spawn the dispatcher task and return a handle to it. Must be called
    /// from within a tokio runtime.
    pub fn new() -> Self {
        let (tx, mut rx) = unbounded_channel::<NotificationEvent>();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                log::info!("notify {}: {}", event.chat_id(), event.text());
            }
            log::debug!("notification dispatcher stopped");
        });

        Self { tx }
    }

    /// A handle whose receiver is returned to the caller instead of being
    /// drained. Tests use this to observe exactly what was dispatched.
    pub fn channel() -> (Self, UnboundedReceiver<NotificationEvent>) {
        let (tx, rx) = unbounded_channel::<NotificationEvent>();
        (Self { tx }, rx)
    }

    /// Hand an event to the dispatcher. Ok means the queue accepted it;
    /// actual delivery happens later and independently.
    pub fn dispatch(&self, event: NotificationEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|err| anyhow!("notification dispatcher unavailable: {}", err))
    }

    /// Dispatch where the caller does not care about the outcome beyond a
    /// log line (submission/decision confirmations).
    pub fn dispatch_best_effort(&self, event: NotificationEvent) {
        if let Err(err) = self.dispatch(event) {
            log::warn!("dropping notification: {}", err);
        }
    }
}

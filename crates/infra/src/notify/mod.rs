//! New-request notifications.
//!
//! `submit` never talks to a mail server. It hands a [`NewRequestNotice`] to a
//! bounded [`NotificationQueue`]; a background task drains the queue and calls
//! a [`Notifier`]. A full queue, a closed queue or a failed delivery is logged
//! and otherwise ignored: the submitted request stands either way.

use std::future::Future;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use lablink_lending::RequestRecord;

pub mod log;
pub mod smtp;

pub use log::LogNotifier;
pub use smtp::SmtpNotifier;

/// What the admin is told about a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequestNotice {
    pub request_id: String,
    pub student_name: String,
    pub reg_no: String,
    pub item_name: String,
    pub return_date: NaiveDate,
}

impl NewRequestNotice {
    pub fn from_request(request: &RequestRecord) -> Self {
        Self {
            request_id: request.request_id.to_string(),
            student_name: request.student_name.clone(),
            reg_no: request.reg_no.clone(),
            item_name: request.item_name.clone(),
            return_date: request.return_date,
        }
    }

    pub fn subject(&self) -> String {
        format!("New Request: {}", self.student_name)
    }

    pub fn body(&self) -> String {
        format!(
            "Student {} ({}) wants {}. Return by: {}",
            self.student_name, self.reg_no, self.item_name, self.return_date
        )
    }
}

/// Notification delivery error. Only ever logged.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notifier misconfigured: {0}")]
    Config(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Transport(String),
}

/// Out-of-band delivery of new-request notices to a fixed recipient.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        notice: &NewRequestNotice,
    ) -> impl Future<Output = Result<(), NotifierError>> + Send;
}

/// Producer side of the notification queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: Option<mpsc::Sender<NewRequestNotice>>,
}

impl NotificationQueue {
    /// Create a bounded queue; the receiver goes to [`spawn_notification_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NewRequestNotice>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// A queue that drops everything (tests, tools).
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Enqueue without waiting. Returns whether the notice was accepted.
    pub fn enqueue(&self, notice: NewRequestNotice) -> bool {
        let Some(tx) = &self.tx else {
            debug!(request_id = %notice.request_id, "notifications disabled; notice dropped");
            return false;
        };

        match tx.try_send(notice) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(notice)) => {
                warn!(request_id = %notice.request_id, "notification queue full; notice dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(notice)) => {
                warn!(request_id = %notice.request_id, "notification worker gone; notice dropped");
                false
            }
        }
    }
}

/// Spawn the task that drains the queue into `notifier`.
///
/// The task ends once every [`NotificationQueue`] clone has been dropped and
/// the queue is empty.
pub fn spawn_notification_worker<N>(
    notifier: N,
    mut rx: mpsc::Receiver<NewRequestNotice>,
) -> JoinHandle<()>
where
    N: Notifier + 'static,
{
    tokio::spawn(async move {
        while let Some(notice) = rx.recv().await {
            match notifier.notify(&notice).await {
                Ok(()) => debug!(request_id = %notice.request_id, "notification delivered"),
                Err(err) => warn!(
                    request_id = %notice.request_id,
                    error = %err,
                    "notification failed"
                ),
            }
        }
        debug!("notification queue closed; worker stopping");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recording {
        seen: Arc<Mutex<Vec<NewRequestNotice>>>,
        fail: bool,
    }

    impl Notifier for Recording {
        async fn notify(&self, notice: &NewRequestNotice) -> Result<(), NotifierError> {
            self.seen.lock().unwrap().push(notice.clone());
            if self.fail {
                return Err(NotifierError::Transport("smtp down".to_string()));
            }
            Ok(())
        }
    }

    fn notice(n: usize) -> NewRequestNotice {
        NewRequestNotice {
            request_id: format!("r{n}"),
            student_name: "Kiran".to_string(),
            reg_no: "20BCS0101".to_string(),
            item_name: "Arduino Uno".to_string(),
            return_date: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
        }
    }

    #[test]
    fn body_names_student_item_and_return_date() {
        let n = notice(1);
        assert_eq!(n.subject(), "New Request: Kiran");
        assert_eq!(
            n.body(),
            "Student Kiran (20BCS0101) wants Arduino Uno. Return by: 2026-10-24"
        );
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (queue, _rx) = NotificationQueue::channel(1);
        assert!(queue.enqueue(notice(1)));
        assert!(!queue.enqueue(notice(2)));
    }

    #[test]
    fn closed_or_disabled_queue_drops() {
        let (queue, rx) = NotificationQueue::channel(4);
        drop(rx);
        assert!(!queue.enqueue(notice(1)));
        assert!(!NotificationQueue::disabled().enqueue(notice(2)));
    }

    #[tokio::test]
    async fn worker_keeps_going_after_failures() {
        let notifier = Recording {
            fail: true,
            ..Recording::default()
        };
        let (queue, rx) = NotificationQueue::channel(8);
        let handle = spawn_notification_worker(notifier.clone(), rx);

        for i in 0..3 {
            assert!(queue.enqueue(notice(i)));
        }
        drop(queue);
        handle.await.unwrap();

        let seen = notifier.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].request_id, "r2");
    }
}

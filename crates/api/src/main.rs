use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use lablink_api::app::{AppServices, build_app};
use lablink_infra::notify::{LogNotifier, NotificationQueue, SmtpNotifier, spawn_notification_worker};
use lablink_infra::store::{InMemorySnapshotStore, JsonFileSnapshotStore, SnapshotStore};
use lablink_infra::{Config, LendingEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lablink_observability::init();

    let config = Config::from_env().context("invalid configuration")?;

    let (queue, rx) = NotificationQueue::channel(config.notify_queue);
    let notifier_task = match &config.smtp {
        Some(smtp) => {
            let notifier = SmtpNotifier::new(smtp, &config.notify_from, &config.notify_to)
                .context("invalid SMTP configuration")?;
            info!(host = %smtp.host, port = smtp.port, to = %config.notify_to, "mailing new requests");
            spawn_notification_worker(notifier, rx)
        }
        None => {
            warn!("SMTP_HOST not set; new-request notifications are only logged");
            spawn_notification_worker(LogNotifier::new(config.notify_to.clone()), rx)
        }
    };

    let store: Arc<dyn SnapshotStore> = match &config.data_file {
        Some(path) => {
            let store = JsonFileSnapshotStore::new(path);
            info!(path = %store.path().display(), "using JSON snapshot store");
            Arc::new(store)
        }
        None => {
            warn!("LABLINK_DATA_FILE not set; state is kept in memory only");
            Arc::new(InMemorySnapshotStore::new())
        }
    };

    let engine = LendingEngine::open(store, queue).context("failed to load lab state")?;
    let services = Arc::new(AppServices::new(Arc::new(engine), config.admin.clone()));
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router (and with it the queue sender) is gone; let queued notices drain.
    if tokio::time::timeout(Duration::from_secs(5), notifier_task).await.is_err() {
        warn!("notification worker did not finish in time");
    }
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

use std::sync::Arc;
use std::time::Duration;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::sleep;
use tracing::{debug, error, info, warn, info_span, Instrument};
use crate::state::AppState;
use crate::domain::models::email_job::{retry_backoff, EmailJob, STATUS_DEAD, STATUS_PENDING};

pub const EMAIL_BATCH_SIZE: i32 = 10;
pub const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub async fn start_email_worker(state: Arc<AppState>) {
    info!("Starting email queue worker...");
    let interval = Duration::from_secs(state.config.email_worker_interval_secs.max(1));

    loop {
        process_email_queue_once(&state, EMAIL_BATCH_SIZE).await;
        sleep(interval).await;
    }
}

pub async fn start_rate_limit_janitor(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
    loop {
        ticker.tick().await;
        let tracked = state.rate_limiters.prune();
        debug!(tracked, "Pruned idle rate limit buckets");
    }
}

/// Claims and delivers one batch of due jobs. Returns how many were delivered.
pub async fn process_email_queue_once(state: &AppState, batch: i32) -> usize {
    let lease = ChronoDuration::seconds(state.config.email_processing_lease_secs);
    let jobs = match state.email_job_repo.claim_due(batch, Utc::now() - lease).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Failed to claim email jobs: {:?}", e);
            return 0;
        }
    };

    let mut delivered = 0;
    for job in jobs {
        let span = info_span!(
            "email_job",
            job_id = %job.id,
            kind = %job.kind,
            tenant_id = job.tenant_id.as_deref().unwrap_or("-"),
            attempt = job.attempts + 1
        );

        if deliver(state, &job).instrument(span).await {
            delivered += 1;
        }
    }
    delivered
}

async fn deliver(state: &AppState, job: &EmailJob) -> bool {
    match state.email_service.send(&job.recipient, &job.subject, &job.html_body).await {
        Ok(()) => {
            info!("Email job completed");
            if let Err(e) = state.email_job_repo.mark_completed(&job.id).await {
                error!("Failed to mark email job as completed: {:?}", e);
            }
            true
        }
        Err(e) => {
            let attempts = job.attempts + 1;
            let err_msg = e.to_string();
            let (status, retry_at) = if attempts >= job.max_attempts {
                warn!(attempts, "Email job exhausted its attempts, moving to dead letter: {}", err_msg);
                (STATUS_DEAD, Utc::now())
            } else {
                let retry_at = Utc::now() + retry_backoff(attempts);
                warn!(attempts, retry_at = %retry_at, "Email job failed, rescheduling: {}", err_msg);
                (STATUS_PENDING, retry_at)
            };

            if let Err(up_err) = state.email_job_repo.record_failure(&job.id, attempts, status, &err_msg, retry_at).await {
                error!("Failed to record email job failure: {:?}", up_err);
            }
            false
        }
    }
}

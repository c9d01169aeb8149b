mod common;

use agency_saas::background::process_email_queue_once;
use agency_saas::domain::ports::EmailJobRepository;
use axum::http::StatusCode;
use common::{TestApp, PLATFORM_ADMIN_EMAIL};
use serde_json::Value;

async fn queued_app(max_attempts: i32) -> TestApp {
    TestApp::with_config(|c| {
        c.email_queue_enabled = true;
        c.email_max_attempts = max_attempts;
    }).await
}

async fn jobs(app: &TestApp, status: &str) -> Vec<Value> {
    let token = app.super_admin_token().await;
    let (code, body) = app.call("GET", &format!("/api/saas/email-jobs?status={}", status), Some(&token), &[], None).await;
    assert_eq!(code, StatusCode::OK, "{}", body);
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn test_notifications_are_queued_then_delivered() {
    let app = queued_app(3).await;

    let (status, _) = app.register("Acme Realty", "owner@acme.com", "acme").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(app.mailer.sent().is_empty(), "queued mail must not be sent inline");

    let pending = jobs(&app, "pending").await;
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|j| j["attempts"] == 0));
    assert!(pending.iter().all(|j| j.get("html_body").is_none()));

    let delivered = process_email_queue_once(&app.state, 10).await;
    assert_eq!(delivered, 2);
    assert_eq!(app.mailer.sent_to("owner@acme.com").len(), 1);
    assert_eq!(app.mailer.sent_to(PLATFORM_ADMIN_EMAIL).len(), 1);

    assert_eq!(jobs(&app, "completed").await.len(), 2);
    assert_eq!(process_email_queue_once(&app.state, 10).await, 0);
}

#[tokio::test]
async fn test_failed_delivery_is_rescheduled_with_backoff() {
    let app = queued_app(3).await;
    app.mailer.set_failing(true);
    app.register("Acme Realty", "owner@acme.com", "acme").await;

    assert_eq!(process_email_queue_once(&app.state, 10).await, 0);

    let pending = jobs(&app, "pending").await;
    assert_eq!(pending.len(), 2);
    for job in &pending {
        assert_eq!(job["attempts"], 1);
        assert_eq!(job["last_error"].as_str().map(|e| e.contains("mock provider down")), Some(true));
        let execute_at: chrono::DateTime<chrono::Utc> = job["execute_at"].as_str().unwrap().parse().unwrap();
        assert!(execute_at > chrono::Utc::now());
    }

    // Nothing is due until the backoff elapses
    app.mailer.set_failing(false);
    assert_eq!(process_email_queue_once(&app.state, 10).await, 0);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_exhausted_job_goes_dead_and_can_be_retried() {
    let app = queued_app(1).await;
    app.mailer.set_failing(true);
    app.register("Acme Realty", "owner@acme.com", "acme").await;

    assert_eq!(process_email_queue_once(&app.state, 10).await, 0);
    let dead = jobs(&app, "dead").await;
    assert_eq!(dead.len(), 2);
    assert!(jobs(&app, "pending").await.is_empty());

    let token = app.super_admin_token().await;
    let job_id = dead[0]["id"].as_str().unwrap();

    let (status, body) = app.call("POST", &format!("/api/saas/email-jobs/{}/retry", job_id), Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["attempts"], 0);

    app.mailer.set_failing(false);
    assert_eq!(process_email_queue_once(&app.state, 10).await, 1);
    assert_eq!(app.mailer.sent().len(), 1);

    let (status, _) = app.call("POST", &format!("/api/saas/email-jobs/{}/retry", job_id), Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.call("POST", "/api/saas/email-jobs/unknown/retry", Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_email_job_listing_is_admin_only_and_validated() {
    let app = queued_app(3).await;
    let tenant = app.create_tenant("acme").await;

    let (status, _) = app.call("GET", "/api/saas/email-jobs", Some(&tenant.token), &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.super_admin_token().await;
    let (status, _) = app.call("GET", "/api/saas/email-jobs?status=exploded", Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call("GET", "/api/saas/email-jobs?limit=1", Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_jobs_abandoned_mid_delivery_are_reclaimed_after_the_lease() {
    let app = TestApp::with_config(|c| {
        c.email_queue_enabled = true;
        c.email_processing_lease_secs = 0;
    }).await;
    app.register("Acme Realty", "owner@acme.com", "acme").await;

    // A worker claims the batch and dies before delivering anything
    let stale_before = chrono::Utc::now() - chrono::Duration::minutes(5);
    let claimed = app.state.email_job_repo.claim_due(10, stale_before).await.unwrap();
    assert_eq!(claimed.len(), 2);
    assert_eq!(jobs(&app, "processing").await.len(), 2);
    assert!(jobs(&app, "pending").await.is_empty());

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert_eq!(process_email_queue_once(&app.state, 10).await, 2);
    assert_eq!(app.mailer.sent_to("owner@acme.com").len(), 1);
    assert!(jobs(&app, "processing").await.is_empty());
    assert_eq!(jobs(&app, "completed").await.len(), 2);
}

#[tokio::test]
async fn test_jobs_inside_their_lease_are_left_alone() {
    let app = queued_app(3).await;
    app.register("Acme Realty", "owner@acme.com", "acme").await;

    let stale_before = chrono::Utc::now() - chrono::Duration::minutes(5);
    assert_eq!(app.state.email_job_repo.claim_due(10, stale_before).await.unwrap().len(), 2);

    assert_eq!(process_email_queue_once(&app.state, 10).await, 0);
    assert!(app.mailer.sent().is_empty());
    assert_eq!(jobs(&app, "processing").await.len(), 2);
}

mod common;

use axum::{body::Body, http::{header, Request, StatusCode}};
use common::{parse_body, TestApp, PLATFORM_ADMIN_EMAIL};
use serde_json::json;
use tokio::task::JoinSet;
use tower::ServiceExt;

#[tokio::test]
async fn test_register_creates_pending_tenant_and_notifies() {
    let app = TestApp::new().await;

    let (status, body) = app.register("Acme Realty", "Owner@Acme.com", "Acme").await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["plan"], "free");
    assert_eq!(body["subdomain"], "acme");
    assert_eq!(body["email"], "owner@acme.com");
    assert!(body.get("db_name").is_none(), "database name must not leak");

    let owner_mail = app.mailer.sent_to("owner@acme.com");
    assert_eq!(owner_mail.len(), 1);
    assert!(owner_mail[0].html_body.contains("acme"));
    assert_eq!(app.mailer.sent_to(PLATFORM_ADMIN_EMAIL).len(), 1);
}

#[tokio::test]
async fn test_duplicate_email_returns_existing_tenant() {
    let app = TestApp::new().await;

    let (status, first) = app.register("Acme Realty", "owner@acme.com", "acme").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.register("Acme Again", "OWNER@acme.com", "acme-two").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["existing"]["id"], first["id"]);
    assert_eq!(body["existing"]["subdomain"], "acme");
}

#[tokio::test]
async fn test_taken_subdomain_conflicts() {
    let app = TestApp::new().await;

    let (status, _) = app.register("Acme Realty", "owner@acme.com", "acme").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.register("Other", "other@example.com", "ACME").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.get("existing").is_none());
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app.register("Acme", "not-an-email", "acme").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.register("Acme", "owner@acme.com", "-bad-").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.register("Acme", "owner@acme.com", "admin").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_subdomain_availability() {
    let app = TestApp::new().await;
    app.register("Acme", "owner@acme.com", "acme").await;

    let (status, body) = app.call("GET", "/api/tenants/check-subdomain/acme", None, &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (_, body) = app.call("GET", "/api/tenants/check-subdomain/Fresh-Name", None, &[], None).await;
    assert_eq!(body["available"], true);
    assert_eq!(body["subdomain"], "fresh-name");

    let (_, body) = app.call("GET", "/api/tenants/check-subdomain/ab", None, &[], None).await;
    assert_eq!(body["available"], false);
    assert!(body["reason"].is_string());
}

#[tokio::test]
async fn test_platform_endpoints_require_super_admin() {
    let app = TestApp::new().await;

    let (status, _) = app.call("GET", "/api/tenants", None, &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let tenant = app.create_tenant("acme").await;
    let (status, _) = app.call("GET", "/api/tenants", Some(&tenant.token), &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.super_admin_token().await;
    let (status, body) = app.call("GET", "/api/tenants", Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_approval_provisions_admin_and_starts_trial() {
    let app = TestApp::new().await;
    let (_, body) = app.register("Acme Realty", "owner@acme.com", "acme").await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = app.approve(&id).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["tenant"]["status"], "approved");
    assert!(body["tenant"]["approved_at"].is_string());
    assert!(body["tenant"]["trial_ends_at"].is_string());
    assert_eq!(body["tenant"]["trial_ends_at"], body["tenant"]["next_billing_at"]);

    let credentials = &body["admin_credentials"];
    assert_eq!(credentials["email"], "owner@acme.com");
    let password = credentials["password"].as_str().unwrap();
    assert_eq!(password.len(), 16);

    let approved_mail = app.mailer.sent_to("owner@acme.com");
    assert!(approved_mail.iter().any(|m| m.subject.contains("is live") && m.html_body.contains(password)));

    let (status, body) = app.login("acme", "owner@acme.com", password).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["principal"]["role"], "admin");
}

#[tokio::test]
async fn test_approving_twice_conflicts() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, _) = app.approve(&tenant.id).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reject_then_approve_keeps_single_admin() {
    let app = TestApp::new().await;
    let token = app.super_admin_token().await;
    let (_, body) = app.register("Acme Realty", "owner@acme.com", "acme").await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = app.call(
        "POST",
        &format!("/api/tenants/{}/reject", id),
        Some(&token),
        &[],
        Some(json!({ "reason": "Incomplete details" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["status_reason"], "Incomplete details");

    let (status, body) = app.approve(&id).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["tenant"]["status_reason"].is_null());
}

#[tokio::test]
async fn test_reject_without_body_is_accepted() {
    let app = TestApp::new().await;
    let token = app.super_admin_token().await;
    let (_, body) = app.register("Acme Realty", "owner@acme.com", "acme").await;
    let id = body["id"].as_str().unwrap();

    let (status, body) = app.call("POST", &format!("/api/tenants/{}/reject", id), Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
}

#[tokio::test]
async fn test_suspend_and_reactivate() {
    let app = TestApp::new().await;
    let token = app.super_admin_token().await;
    let tenant = app.create_tenant("acme").await;

    let (status, body) = app.call(
        "POST",
        &format!("/api/tenants/{}/suspend", tenant.id),
        Some(&token),
        &[],
        Some(json!({ "reason": "Unpaid invoice" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "suspended");

    let (status, _) = app.tenant_call("acme", "GET", "/api/public/site", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.login("acme", &tenant.admin_email, &tenant.admin_password).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.call("POST", &format!("/api/tenants/{}/reactivate", tenant.id), Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    let (status, _) = app.tenant_call("acme", "GET", "/api/public/site", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_transitions_conflict() {
    let app = TestApp::new().await;
    let token = app.super_admin_token().await;
    let (_, body) = app.register("Acme Realty", "owner@acme.com", "acme").await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app.call("POST", &format!("/api/tenants/{}/suspend", id), Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.call("POST", &format!("/api/tenants/{}/reactivate", id), Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.call("POST", "/api/tenants/does-not-exist/approve", Some(&token), &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = TestApp::new().await;
    let token = app.super_admin_token().await;
    app.create_tenant("approved-one").await;
    app.register("Waiting", "waiting@example.com", "waiting").await;

    let (_, body) = app.call("GET", "/api/tenants?status=pending", Some(&token), &[], None).await;
    let pending = body.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["subdomain"], "waiting");

    let (_, body) = app.call("GET", "/api/tenants?status=approved", Some(&token), &[], None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_super_admin_sets_any_plan() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    app.set_plan(&tenant.id, "enterprise").await;
    app.set_plan(&tenant.id, "free").await;

    let token = app.super_admin_token().await;
    let (_, body) = app.call("GET", &format!("/api/tenants/{}", tenant.id), Some(&token), &[], None).await;
    assert_eq!(body["plan"], "free");

    let plan_mail: Vec<_> = app.mailer.sent_to(&tenant.admin_email)
        .into_iter()
        .filter(|m| m.subject.starts_with("Your plan is now"))
        .collect();
    assert_eq!(plan_mail.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_with_same_email_report_the_winner() {
    let app = TestApp::new().await;

    let mut set = JoinSet::new();
    for i in 0..8 {
        let router = app.router.clone();
        set.spawn(async move {
            let body = json!({ "name": "Acme Realty", "email": "owner@acme.com", "subdomain": format!("acme{}", i) });
            let request = Request::builder()
                .method("POST")
                .uri("/api/tenants/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let response = router.oneshot(request).await.unwrap();
            (response.status(), parse_body(response).await)
        });
    }

    let mut results = Vec::new();
    while let Some(res) = set.join_next().await {
        results.push(res.unwrap());
    }

    let winners: Vec<_> = results.iter().filter(|(status, _)| *status == StatusCode::CREATED).collect();
    assert_eq!(winners.len(), 1, "{:?}", results);
    let winner_id = winners[0].1["id"].as_str().unwrap();

    for (status, body) in results.iter().filter(|(status, _)| *status != StatusCode::CREATED) {
        assert_eq!(*status, StatusCode::CONFLICT, "{}", body);
        assert_eq!(body["existing"]["id"], winner_id, "{}", body);
    }
}

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_plan_catalogue_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app.call("GET", "/api/saas/plans", None, &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let plans = body.as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["plan"], "free");
    assert_eq!(plans[0]["max_users"], 2);
    assert_eq!(plans[2]["plan"], "enterprise");
    assert!(plans[2]["max_users"].is_null());
}

#[tokio::test]
async fn test_upgrade_only_moves_up() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, body) = app.tenant_call("acme", "POST", "/api/saas/upgrade", Some(&tenant.token), Some(json!({ "plan": "pro" }))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["plan"], "pro");

    let (status, _) = app.tenant_call("acme", "POST", "/api/saas/upgrade", Some(&tenant.token), Some(json!({ "plan": "pro" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.tenant_call("acme", "POST", "/api/saas/upgrade", Some(&tenant.token), Some(json!({ "plan": "free" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.tenant_call("acme", "POST", "/api/saas/upgrade", Some(&tenant.token), Some(json!({ "plan": "platinum" }))).await;
    assert!(status.is_client_error());

    let (status, body) = app.tenant_call("acme", "POST", "/api/saas/upgrade", Some(&tenant.token), Some(json!({ "plan": "enterprise" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "enterprise");

    let plan_mail = app.mailer.sent_to(&tenant.admin_email)
        .into_iter()
        .filter(|m| m.subject.starts_with("Your plan is now"))
        .count();
    assert_eq!(plan_mail, 2);
}

#[tokio::test]
async fn test_subscription_reports_usage() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, body) = app.tenant_call("acme", "GET", "/api/saas/subscription", Some(&tenant.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "free");
    assert_eq!(body["status"], "approved");
    assert_eq!(body["usage"]["users"], 1);
    assert_eq!(body["usage"]["listings"], 0);
    assert_eq!(body["limits"]["max_listings"], 10);
    assert!(body["trial_ends_at"].is_string());
}

#[tokio::test]
async fn test_free_plan_user_limit() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let user = |email: &str| json!({ "email": email, "name": "Member", "password": "MemberPass123" });

    let (status, _) = app.tenant_call("acme", "POST", "/api/dashboard/users", Some(&tenant.token), Some(user("one@acme.com"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.tenant_call("acme", "POST", "/api/dashboard/users", Some(&tenant.token), Some(user("two@acme.com"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("Upgrade"));

    app.set_plan(&tenant.id, "pro").await;
    let (status, _) = app.tenant_call("acme", "POST", "/api/dashboard/users", Some(&tenant.token), Some(user("two@acme.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_free_plan_listing_limit() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let listing = |n: usize| json!({
        "title": format!("Listing {}", n),
        "property_type": "house",
        "listing_type": "rent",
        "price": 1200.0,
        "city": "Porto",
    });

    for n in 0..10 {
        let (status, body) = app.tenant_call("acme", "POST", "/api/properties", Some(&tenant.token), Some(listing(n))).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }
    let (status, _) = app.tenant_call("acme", "POST", "/api/properties", Some(&tenant.token), Some(listing(10))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, stats) = app.tenant_call("acme", "GET", "/api/dashboard/stats", Some(&tenant.token), None).await;
    assert_eq!(stats["properties"], 10);
    assert_eq!(stats["usage"]["listings"], 10);
}

#[tokio::test]
async fn test_custom_domain_limits() {
    let app = TestApp::new().await;
    let acme = app.create_tenant("acme").await;
    let beta = app.create_tenant("beta").await;

    let add = |domain: &str| json!({ "domain": domain });

    let (status, _) = app.tenant_call("acme", "POST", "/api/website/domains", Some(&acme.token), Some(add("acme.com"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.set_plan(&acme.id, "pro").await;
    let (status, _) = app.tenant_call("acme", "POST", "/api/website/domains", Some(&acme.token), Some(add("shop.agencyhub.test"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.tenant_call("acme", "POST", "/api/website/domains", Some(&acme.token), Some(add("https://acme.com/"))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["custom_domains"], json!(["acme.com"]));

    let (status, _) = app.tenant_call("acme", "POST", "/api/website/domains", Some(&acme.token), Some(add("acme.org"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.set_plan(&beta.id, "pro").await;
    let (status, _) = app.tenant_call("beta", "POST", "/api/website/domains", Some(&beta.token), Some(add("ACME.com"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.tenant_call("acme", "DELETE", "/api/website/domains/acme.com", Some(&acme.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.tenant_call("acme", "DELETE", "/api/website/domains/acme.com", Some(&acme.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.tenant_call("beta", "POST", "/api/website/domains", Some(&beta.token), Some(add("acme.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
}

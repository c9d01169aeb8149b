mod common;

use axum::http::StatusCode;
use common::{TestApp, SUPER_ADMIN_EMAIL};
use serde_json::json;

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, _) = app.login("acme", &tenant.admin_email, "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.login("acme", "ghost@acme.com", &tenant.admin_password).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.login("nobody", &tenant.admin_email, &tenant.admin_password).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, body) = app.login("acme", &tenant.admin_email.to_uppercase(), &tenant.admin_password).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["csrf_token"].is_string());
    assert!(body["expires_in"].as_i64().unwrap() > 0);
    assert_eq!(body["principal"]["tenant_id"], tenant.id.as_str());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;
    app.create_tenant("acme").await;

    let (status, _) = app.tenant_call("acme", "GET", "/api/dashboard/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.tenant_call("acme", "GET", "/api/dashboard/stats", Some("garbage.token.value"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_is_bound_to_its_tenant() {
    let app = TestApp::new().await;
    let acme = app.create_tenant("acme").await;
    app.create_tenant("beta").await;

    let (status, _) = app.tenant_call("acme", "GET", "/api/dashboard/stats", Some(&acme.token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.tenant_call("beta", "GET", "/api/dashboard/stats", Some(&acme.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_super_admin_token_not_accepted_by_tenant_routes() {
    let app = TestApp::new().await;
    app.create_tenant("acme").await;
    let admin = app.super_admin_token().await;

    let (status, _) = app.tenant_call("acme", "GET", "/api/dashboard/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_for_both_principal_kinds() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, body) = app.call("GET", "/api/auth/me", Some(&tenant.token), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "tenant_user");
    assert_eq!(body["email"], tenant.admin_email.as_str());
    assert!(body["permissions"].as_array().unwrap().iter().any(|p| p == "users:manage"));

    let admin = app.super_admin_token().await;
    let (status, body) = app.call("GET", "/api/auth/me", Some(&admin), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "super_admin");
    assert_eq!(body["email"], SUPER_ADMIN_EMAIL);
}

#[tokio::test]
async fn test_cookie_auth_requires_csrf_for_mutations() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;
    let (_, login) = app.login("acme", &tenant.admin_email, &tenant.admin_password).await;
    let token = login["token"].as_str().unwrap();
    let csrf = login["csrf_token"].as_str().unwrap();
    let cookie = format!("access_token={}", token);

    // Reads work with the cookie alone
    let (status, _) = app.call(
        "GET",
        "/api/dashboard/stats",
        None,
        &[("x-tenant-subdomain", "acme"), ("cookie", cookie.as_str())],
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);

    let agent = json!({ "name": "Jane Doe", "email": "jane@acme.com" });

    let (status, _) = app.call(
        "POST",
        "/api/dashboard/agents",
        None,
        &[("x-tenant-subdomain", "acme"), ("cookie", cookie.as_str())],
        Some(agent.clone()),
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(
        "POST",
        "/api/dashboard/agents",
        None,
        &[("x-tenant-subdomain", "acme"), ("cookie", cookie.as_str()), ("x-csrf-token", "not-the-token")],
        Some(agent.clone()),
    ).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.call(
        "POST",
        "/api/dashboard/agents",
        None,
        &[("x-tenant-subdomain", "acme"), ("cookie", cookie.as_str()), ("x-csrf-token", csrf)],
        Some(agent),
    ).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, _) = app.tenant_call(
        "acme",
        "POST",
        "/api/auth/change-password",
        Some(&tenant.token),
        Some(json!({ "current_password": "wrong", "new_password": "BrandNewPass1" })),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.tenant_call(
        "acme",
        "POST",
        "/api/auth/change-password",
        Some(&tenant.token),
        Some(json!({ "current_password": tenant.admin_password, "new_password": "short" })),
    ).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.tenant_call(
        "acme",
        "POST",
        "/api/auth/change-password",
        Some(&tenant.token),
        Some(json!({ "current_password": tenant.admin_password, "new_password": "BrandNewPass1" })),
    ).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.login("acme", &tenant.admin_email, &tenant.admin_password).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.login("acme", &tenant.admin_email, "BrandNewPass1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deactivated_user_cannot_log_in() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, member) = app.tenant_call(
        "acme",
        "POST",
        "/api/dashboard/users",
        Some(&tenant.token),
        Some(json!({ "email": "agent@acme.com", "name": "Agent", "password": "AgentPass123" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED, "{}", member);

    let (status, _) = app.tenant_call(
        "acme",
        "PUT",
        &format!("/api/dashboard/users/{}", member["id"].as_str().unwrap()),
        Some(&tenant.token),
        Some(json!({ "is_active": false })),
    ).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.login("acme", "agent@acme.com", "AgentPass123").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_issued_token_stops_working_once_user_is_deactivated_or_deleted() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, member) = app.tenant_call(
        "acme",
        "POST",
        "/api/dashboard/users",
        Some(&tenant.token),
        Some(json!({ "email": "partner@acme.com", "name": "Partner", "password": "PartnerPass123", "role": "admin" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED, "{}", member);
    let member_path = format!("/api/dashboard/users/{}", member["id"].as_str().unwrap());

    let (status, login) = app.login("acme", "partner@acme.com", "PartnerPass123").await;
    assert_eq!(status, StatusCode::OK);
    let member_token = login["token"].as_str().unwrap().to_string();

    let (status, _) = app.tenant_call("acme", "GET", "/api/dashboard/users", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.tenant_call("acme", "PUT", &member_path, Some(&tenant.token), Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.tenant_call("acme", "GET", "/api/dashboard/users", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let ghost = json!({ "title": "Ghost", "property_type": "house", "listing_type": "sale", "price": 1.0, "city": "Porto" });
    let (status, _) = app.tenant_call("acme", "POST", "/api/properties", Some(&member_token), Some(ghost.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call("GET", "/api/auth/me", Some(&member_token), &[], None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.tenant_call("acme", "DELETE", &member_path, Some(&tenant.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.tenant_call("acme", "GET", "/api/dashboard/users", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.tenant_call("acme", "POST", "/api/properties", Some(&member_token), Some(ghost)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, listings) = app.tenant_call("acme", "GET", "/api/properties", Some(&tenant.token), None).await;
    assert_eq!(listings["total"], 0);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    let (status, _) = app.tenant_call("acme", "POST", "/api/auth/logout", Some(&tenant.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_is_rate_limited_per_client() {
    let app = TestApp::with_config(|c| c.auth_rate_limit_per_minute = 2).await;
    let body = json!({ "email": "nobody@platform.test", "password": "whatever1" });

    for _ in 0..2 {
        let (status, _) = app.call("POST", "/api/auth/admin/login", None, &[("x-forwarded-for", "10.0.0.1")], Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = app.call("POST", "/api/auth/admin/login", None, &[("x-forwarded-for", "10.0.0.1")], Some(body.clone())).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = app.call("POST", "/api/auth/admin/login", None, &[("x-forwarded-for", "10.0.0.2")], Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Health stays outside the limiter
    let (status, _) = app.call("GET", "/health", None, &[("x-forwarded-for", "10.0.0.1")], None).await;
    assert_eq!(status, StatusCode::OK);
}

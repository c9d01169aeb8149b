mod common;

use agency_saas::infra::tenant_connections::TenantConnections;
use axum::{body::Body, http::{Request, StatusCode}};
use common::TestApp;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;
use tower::ServiceExt;

async fn site_via(app: &TestApp, headers: &[(&str, &str)]) -> (StatusCode, serde_json::Value) {
    app.call("GET", "/api/public/site", None, headers, None).await
}

#[tokio::test]
async fn test_host_casing_resolves_same_tenant() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;

    for host in ["acme.agencyhub.test", "ACME.AGENCYHUB.TEST", "AcMe.AgencyHub.Test", "acme.agencyhub.test:8080", "acme.agencyhub.test."] {
        let (status, body) = site_via(&app, &[("host", host)]).await;
        assert_eq!(status, StatusCode::OK, "host {} did not resolve", host);
        assert_eq!(body["id"], tenant.id.as_str(), "host {} resolved elsewhere", host);
    }
}

#[tokio::test]
async fn test_origin_and_explicit_header_resolution() {
    let app = TestApp::new().await;
    let acme = app.create_tenant("acme").await;
    let beta = app.create_tenant("beta").await;

    let (status, body) = site_via(&app, &[("origin", "https://Acme.agencyhub.test")]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], acme.id.as_str());

    // Origin wins over Host
    let (_, body) = site_via(&app, &[("origin", "https://beta.agencyhub.test"), ("host", "acme.agencyhub.test")]).await;
    assert_eq!(body["id"], beta.id.as_str());

    // Explicit header wins over both
    let (_, body) = site_via(&app, &[
        ("x-tenant-subdomain", "ACME"),
        ("origin", "https://beta.agencyhub.test"),
        ("host", "beta.agencyhub.test"),
    ]).await;
    assert_eq!(body["id"], acme.id.as_str());
}

#[tokio::test]
async fn test_unknown_and_unapproved_tenants_are_not_found() {
    let app = TestApp::new().await;
    app.register("Pending Homes", "pending@example.com", "pending-homes").await;

    let (status, _) = site_via(&app, &[("host", "pending-homes.agencyhub.test")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = site_via(&app, &[("host", "nobody.agencyhub.test")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = site_via(&app, &[("host", "localhost")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = site_via(&app, &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_custom_domain_resolution() {
    let app = TestApp::new().await;
    let tenant = app.create_tenant("acme").await;
    app.set_plan(&tenant.id, "pro").await;

    let (status, body) = app.tenant_call(
        "acme",
        "POST",
        "/api/website/domains",
        Some(&tenant.token),
        Some(json!({ "domain": "AcmeHomes.com" })),
    ).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["domain"], "acmehomes.com");

    for host in ["acmehomes.com", "ACMEHOMES.COM", "www.AcmeHomes.com"] {
        let (status, body) = site_via(&app, &[("host", host)]).await;
        assert_eq!(status, StatusCode::OK, "host {} did not resolve", host);
        assert_eq!(body["id"], tenant.id.as_str());
    }
}

#[tokio::test]
async fn test_concurrent_first_access_opens_one_pool() {
    let dir = std::env::temp_dir().join(format!("agency_saas_conn_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let connections = Arc::new(TenantConnections::new(
        format!("sqlite://{}/{{db}}.db", dir.display()),
        None,
    ));

    let mut set = JoinSet::new();
    for _ in 0..16 {
        let connections = connections.clone();
        set.spawn(async move { connections.get("tenant_race").await.unwrap() });
    }
    let mut stores = Vec::new();
    while let Some(res) = set.join_next().await {
        stores.push(res.unwrap());
    }

    assert_eq!(connections.connections_opened(), 1);
    assert!(stores.iter().all(|s| Arc::ptr_eq(s, &stores[0])));
    assert_eq!(stores[0].db_name, "tenant_race");

    let again = connections.get("tenant_race").await.unwrap();
    assert!(Arc::ptr_eq(&again, &stores[0]));

    connections.get("tenant_other").await.unwrap();
    assert_eq!(connections.connections_opened(), 2);

    let mut names = connections.cached_names();
    names.sort();
    assert_eq!(names, vec!["tenant_other".to_string(), "tenant_race".to_string()]);

    drop(stores);
    drop(again);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_concurrent_requests_reuse_tenant_connection() {
    let app = TestApp::new().await;
    app.create_tenant("acme").await;
    let opened = app.state.tenant_connections.connections_opened();

    let mut set = JoinSet::new();
    for i in 0..12 {
        let router = app.router.clone();
        let host = if i % 2 == 0 { "acme.agencyhub.test" } else { "ACME.agencyhub.test" };
        set.spawn(async move {
            let request = Request::builder()
                .uri("/api/public/site")
                .header("host", host)
                .body(Body::empty())
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        });
    }
    let mut statuses = Vec::new();
    while let Some(res) = set.join_next().await {
        statuses.push(res.unwrap());
    }

    assert!(statuses.iter().all(|s| *s == StatusCode::OK));
    assert_eq!(app.state.tenant_connections.connections_opened(), opened);

    let (_, health) = app.call("GET", "/health", None, &[], None).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["tenant_connections"], opened);
}

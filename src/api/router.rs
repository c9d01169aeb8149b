use axum::{
    body::Body,
    extract::Request,
    middleware::from_fn_with_state,
    routing::{get, post, put, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{agent, auth, dashboard, health, lead, member, property, public, role, saas, tenant, website};
use crate::api::middleware::rate_limit::{general_limit, strict_limit};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Endpoints open to anonymous callers that are worth brute-forcing or spamming.
    let strict = Router::new()
        .route("/api/tenants/register", post(tenant::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/admin/login", post(auth::admin_login))
        .route("/api/public/leads", post(public::submit_lead))
        .route_layer(from_fn_with_state(state.clone(), strict_limit));

    Router::new()
        // Platform: tenant lifecycle
        .route("/api/tenants/check-subdomain/{subdomain}", get(tenant::check_subdomain))
        .route("/api/tenants", get(tenant::list_tenants))
        .route("/api/tenants/{id}", get(tenant::get_tenant))
        .route("/api/tenants/{id}/approve", post(tenant::approve_tenant))
        .route("/api/tenants/{id}/reject", post(tenant::reject_tenant))
        .route("/api/tenants/{id}/suspend", post(tenant::suspend_tenant))
        .route("/api/tenants/{id}/reactivate", post(tenant::reactivate_tenant))
        .route("/api/tenants/{id}/plan", put(tenant::set_plan))

        // Auth
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/change-password", post(auth::change_password))

        // Dashboard
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/users", get(member::list_members).post(member::create_member))
        .route("/api/dashboard/users/{user_id}", put(member::update_member).delete(member::delete_member))
        .route("/api/dashboard/roles", get(role::list_roles).post(role::create_role))
        .route("/api/dashboard/roles/{role_id}", put(role::update_role).delete(role::delete_role))
        .route("/api/dashboard/permissions", get(role::list_permissions))
        .route("/api/dashboard/leads", get(lead::list_leads).post(lead::create_lead))
        .route("/api/dashboard/leads/{lead_id}", get(lead::get_lead).put(lead::update_lead).delete(lead::delete_lead))
        .route("/api/dashboard/agents", get(agent::list_agents).post(agent::create_agent))
        .route("/api/dashboard/agents/{agent_id}", get(agent::get_agent).put(agent::update_agent).delete(agent::delete_agent))

        // Listings
        .route("/api/properties", get(property::list_properties).post(property::create_property))
        .route("/api/properties/{property_id}", get(property::get_property).put(property::update_property).delete(property::delete_property))

        // Storefront
        .route("/api/public/site", get(public::site))
        .route("/api/public/properties", get(public::list_properties))
        .route("/api/public/properties/{property_id}", get(public::get_property))
        .route("/api/public/agents", get(public::list_agents))

        // Website & domains
        .route("/api/website", get(website::get_website).put(website::update_website))
        .route("/api/website/domains", post(website::add_domain))
        .route("/api/website/domains/{domain}", delete(website::remove_domain))

        // Plans, billing & email queue
        .route("/api/saas/plans", get(saas::list_plans))
        .route("/api/saas/subscription", get(saas::subscription))
        .route("/api/saas/upgrade", post(saas::upgrade))
        .route("/api/saas/email-jobs", get(saas::list_email_jobs))
        .route("/api/saas/email-jobs/{id}/retry", post(saas::retry_email_job))

        .merge(strict)
        .layer(from_fn_with_state(state.clone(), general_limit))

        .route("/health", get(health::health_check))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        tenant_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

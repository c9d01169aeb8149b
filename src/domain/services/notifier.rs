use std::sync::Arc;

use serde_json::{json, Value};
use tera::{Context, Tera};
use tracing::{info, warn};

use crate::domain::{
    models::email_job::{EmailJob, OutboundEmail},
    ports::{EmailJobRepository, EmailService},
};
use crate::domain::services::defaults;
use crate::error::AppError;

pub const PLATFORM_NAME: &str = "AgencyHub";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    RegistrationReceived,
    NewRegistrationAdmin,
    TenantApproved,
    TenantRejected,
    TenantSuspended,
    PlanChanged,
    NewLead,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::RegistrationReceived => "registration_received",
            EmailKind::NewRegistrationAdmin => "new_registration_admin",
            EmailKind::TenantApproved => "tenant_approved",
            EmailKind::TenantRejected => "tenant_rejected",
            EmailKind::TenantSuspended => "tenant_suspended",
            EmailKind::PlanChanged => "plan_changed",
            EmailKind::NewLead => "new_lead",
        }
    }

    fn template_name(&self) -> String {
        format!("emails/{}.html", self.as_str())
    }

    fn subject_template(&self) -> &'static str {
        match self {
            EmailKind::RegistrationReceived => defaults::REGISTRATION_RECEIVED_SUBJECT,
            EmailKind::NewRegistrationAdmin => defaults::ADMIN_NEW_REGISTRATION_SUBJECT,
            EmailKind::TenantApproved => defaults::TENANT_APPROVED_SUBJECT,
            EmailKind::TenantRejected => defaults::TENANT_REJECTED_SUBJECT,
            EmailKind::TenantSuspended => defaults::TENANT_SUSPENDED_SUBJECT,
            EmailKind::PlanChanged => defaults::PLAN_CHANGED_SUBJECT,
            EmailKind::NewLead => defaults::NEW_LEAD_SUBJECT,
        }
    }
}

/// Embedded email templates, registered under `emails/<kind>.html`.
pub fn email_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("emails/base.html", include_str!("../../templates/emails/base.html")),
        ("emails/registration_received.html", include_str!("../../templates/emails/registration_received.html")),
        ("emails/new_registration_admin.html", include_str!("../../templates/emails/new_registration_admin.html")),
        ("emails/tenant_approved.html", include_str!("../../templates/emails/tenant_approved.html")),
        ("emails/tenant_rejected.html", include_str!("../../templates/emails/tenant_rejected.html")),
        ("emails/tenant_suspended.html", include_str!("../../templates/emails/tenant_suspended.html")),
        ("emails/plan_changed.html", include_str!("../../templates/emails/plan_changed.html")),
        ("emails/new_lead.html", include_str!("../../templates/emails/new_lead.html")),
    ])
    .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
    Ok(tera)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Queued(String),
    Sent,
}

/// Renders notification emails and hands them to the queue or straight to the mailer.
pub struct Notifier {
    queue_enabled: bool,
    max_attempts: i32,
    jobs: Arc<dyn EmailJobRepository>,
    mailer: Arc<dyn EmailService>,
    templates: Arc<Tera>,
}

impl Notifier {
    pub fn new(
        queue_enabled: bool,
        max_attempts: i32,
        jobs: Arc<dyn EmailJobRepository>,
        mailer: Arc<dyn EmailService>,
        templates: Arc<Tera>,
    ) -> Self {
        Self { queue_enabled, max_attempts, jobs, mailer, templates }
    }

    pub fn render(&self, kind: EmailKind, tenant_id: Option<&str>, recipient: &str, data: Value) -> Result<OutboundEmail, AppError> {
        let mut context = Context::from_value(data)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid email context: {}", e)))?;
        context.insert("platform_name", PLATFORM_NAME);

        let html_body = self.templates.render(&kind.template_name(), &context)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;
        let subject = Tera::one_off(kind.subject_template(), &context, false)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera subject render error: {:?}", e)))?;

        Ok(OutboundEmail {
            kind: kind.as_str().to_string(),
            tenant_id: tenant_id.map(str::to_string),
            recipient: recipient.to_string(),
            subject,
            html_body,
        })
    }

    pub async fn notify(&self, email: OutboundEmail) -> Result<Delivery, AppError> {
        if self.queue_enabled {
            let job = self.jobs.create(&EmailJob::new(email, self.max_attempts)).await?;
            info!(job_id = %job.id, kind = %job.kind, "Email job queued");
            return Ok(Delivery::Queued(job.id));
        }

        self.mailer.send(&email.recipient, &email.subject, &email.html_body).await?;
        info!(kind = %email.kind, "Email sent synchronously");
        Ok(Delivery::Sent)
    }

    /// Renders and delivers, logging instead of returning any failure.
    pub async fn notify_quietly(&self, kind: EmailKind, tenant_id: Option<&str>, recipient: &str, data: Value) -> Option<Delivery> {
        let result = match self.render(kind, tenant_id, recipient, data) {
            Ok(email) => self.notify(email).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(delivery) => Some(delivery),
            Err(e) => {
                warn!(kind = kind.as_str(), "Notification failed: {:?}", e);
                None
            }
        }
    }
}

pub fn plan_context(tenant_name: &str, previous: &str, limits: &crate::domain::models::plan::PlanLimits) -> Value {
    json!({
        "tenant_name": tenant_name,
        "previous_plan": previous,
        "plan": limits.plan,
        "max_users": limits.max_users,
        "max_listings": limits.max_listings,
        "max_custom_domains": limits.max_custom_domains,
        "monthly_price": limits.monthly_price,
    })
}

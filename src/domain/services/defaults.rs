pub mod perms {
    pub const DASHBOARD_VIEW: &str = "dashboard:view";
    pub const PROPERTIES_READ: &str = "properties:read";
    pub const PROPERTIES_WRITE: &str = "properties:write";
    pub const LEADS_READ: &str = "leads:read";
    pub const LEADS_WRITE: &str = "leads:write";
    pub const AGENTS_READ: &str = "agents:read";
    pub const AGENTS_WRITE: &str = "agents:write";
    pub const USERS_MANAGE: &str = "users:manage";
    pub const ROLES_MANAGE: &str = "roles:manage";
    pub const WEBSITE_MANAGE: &str = "website:manage";
    pub const BILLING_MANAGE: &str = "billing:manage";
}

pub const PERMISSIONS: &[(&str, &str)] = &[
    (perms::DASHBOARD_VIEW, "View dashboard statistics"),
    (perms::PROPERTIES_READ, "View property listings"),
    (perms::PROPERTIES_WRITE, "Create, edit and delete property listings"),
    (perms::LEADS_READ, "View leads"),
    (perms::LEADS_WRITE, "Create, edit and delete leads"),
    (perms::AGENTS_READ, "View agents"),
    (perms::AGENTS_WRITE, "Create, edit and delete agents"),
    (perms::USERS_MANAGE, "Manage dashboard users"),
    (perms::ROLES_MANAGE, "Manage roles and their permissions"),
    (perms::WEBSITE_MANAGE, "Edit website content, SEO settings and domains"),
    (perms::BILLING_MANAGE, "View subscription and change plan"),
];

pub const ADMIN_ROLE: &str = "admin";

pub struct DefaultRole {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: &'static [&'static str],
}

pub const DEFAULT_ROLES: &[DefaultRole] = &[
    DefaultRole {
        name: ADMIN_ROLE,
        description: "Full access to the agency workspace",
        permissions: &[
            perms::DASHBOARD_VIEW, perms::PROPERTIES_READ, perms::PROPERTIES_WRITE,
            perms::LEADS_READ, perms::LEADS_WRITE, perms::AGENTS_READ, perms::AGENTS_WRITE,
            perms::USERS_MANAGE, perms::ROLES_MANAGE, perms::WEBSITE_MANAGE, perms::BILLING_MANAGE,
        ],
    },
    DefaultRole {
        name: "agent",
        description: "Manages listings and follows up on leads",
        permissions: &[
            perms::DASHBOARD_VIEW, perms::PROPERTIES_READ, perms::PROPERTIES_WRITE,
            perms::LEADS_READ, perms::LEADS_WRITE, perms::AGENTS_READ,
        ],
    },
    DefaultRole {
        name: "viewer",
        description: "Read-only access",
        permissions: &[perms::DASHBOARD_VIEW, perms::PROPERTIES_READ, perms::LEADS_READ, perms::AGENTS_READ],
    },
];

pub fn is_known_permission(name: &str) -> bool {
    PERMISSIONS.iter().any(|(p, _)| *p == name)
}

pub const REGISTRATION_RECEIVED_SUBJECT: &str = "We received your registration for {{ tenant_name }}";
pub const ADMIN_NEW_REGISTRATION_SUBJECT: &str = "New tenant registration: {{ tenant_name }} ({{ subdomain }})";
pub const TENANT_APPROVED_SUBJECT: &str = "{{ tenant_name }} is live! Your login details";
pub const TENANT_REJECTED_SUBJECT: &str = "Your registration for {{ tenant_name }}";
pub const TENANT_SUSPENDED_SUBJECT: &str = "{{ tenant_name }} has been suspended";
pub const PLAN_CHANGED_SUBJECT: &str = "Your plan is now {{ plan }}";
pub const NEW_LEAD_SUBJECT: &str = "New enquiry from {{ lead_name }}";

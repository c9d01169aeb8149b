pub mod auth_service;
pub mod defaults;
pub mod notifier;
pub mod provisioning;
pub mod tenant_resolver;

pub mod agent;
pub mod auth;
pub mod email_job;
pub mod lead;
pub mod plan;
pub mod property;
pub mod role;
pub mod super_admin;
pub mod tenant;
pub mod user;

pub mod agent;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod lead;
pub mod member;
pub mod property;
pub mod public;
pub mod role;
pub mod saas;
pub mod tenant;
pub mod website;

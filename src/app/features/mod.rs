pub mod account;
pub mod audit_log;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod fractions;
pub mod invites;
pub mod join_requests;
pub mod maintenance;
pub mod members;
pub mod onboarding;
pub mod organization;
pub mod suppliers;
pub mod tickets;

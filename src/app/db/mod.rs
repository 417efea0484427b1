//! Data access. Modules for tenant-owned tables take an
//! [`OrgScope`](crate::app::tenant::OrgScope) as their first parameter;
//! `users`, `sessions` and the identity half of `organizations` are global.

pub mod audit_events;
pub mod documents;
pub mod fractions;
pub mod join_requests;
pub mod maintenance;
pub mod organization_invites;
pub mod organizations;
pub mod sessions;
pub mod suppliers;
pub mod tickets;
pub mod users;

pub use users::{find_by_email, NewUser, User};

/// Fresh primary key for tenant-owned rows.
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

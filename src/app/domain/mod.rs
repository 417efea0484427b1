pub mod document_category;
pub mod effective_role;
pub mod email;
pub mod fraction_role;
pub mod join_request_status;
pub mod organization_id;
pub mod organization_name;
pub mod organization_role;
pub mod password;
pub mod supplier_category;
pub mod ticket;
pub mod user_id;
pub mod validation_helpers;

pub use document_category::DocumentCategory;
pub use effective_role::{Action, EffectiveRole};
pub use email::Email;
pub use fraction_role::FractionRole;
pub use join_request_status::JoinRequestStatus;
pub use organization_id::OrganizationId;
pub use organization_name::{OrganizationName, Slug};
pub use organization_role::OrganizationRole;
pub use password::{HashedPassword, Password};
pub use supplier_category::SupplierCategory;
pub use ticket::{TicketPriority, TicketStatus};
pub use user_id::UserId;

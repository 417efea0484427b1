//! Effective role resolution and the permission table.
//!
//! Precedence: an owner or admin membership wins unconditionally. A plain
//! member's fraction role is consulted only for fraction-scoped actions; for
//! everything else the member is just a member.

use serde::Serialize;
use strum_macros::{Display, EnumIter};

use super::{FractionRole, OrganizationRole};

/// Everything a handler can ask permission for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    ViewOrganization,
    CreateTicket,
    CreateJoinRequest,
    ManageTickets,
    DeleteTicket,
    CreateFraction,
    DeleteFraction,
    EditFraction,
    ManageFractionResidents,
    ManageSuppliers,
    ManageMaintenance,
    ManageDocuments,
    ManageMembers,
    ManageInvites,
    ReviewJoinRequests,
    UpdateOrganization,
    TransferOwnership,
}

impl Action {
    /// Actions whose answer depends on the caller's role in one fraction.
    pub fn is_fraction_scoped(self) -> bool {
        matches!(self, Action::EditFraction | Action::ManageFractionResidents)
    }
}

/// The role an authorization decision is made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "role", rename_all = "snake_case")]
pub enum EffectiveRole {
    Organization(OrganizationRole),
    Fraction(FractionRole),
}

impl EffectiveRole {
    /// Resolve the role for `action`. `fraction_role` is the caller's role in
    /// the fraction the action targets, if any.
    pub fn resolve(
        org_role: OrganizationRole,
        fraction_role: Option<FractionRole>,
        action: Action,
    ) -> Self {
        if org_role.is_manager() || !action.is_fraction_scoped() {
            return EffectiveRole::Organization(org_role);
        }
        match fraction_role {
            Some(role) => EffectiveRole::Fraction(role),
            None => EffectiveRole::Organization(org_role),
        }
    }

    pub fn allows(self, action: Action) -> bool {
        use Action::*;

        match self {
            EffectiveRole::Organization(OrganizationRole::Owner) => true,
            EffectiveRole::Organization(OrganizationRole::Admin) => action != TransferOwnership,
            EffectiveRole::Organization(OrganizationRole::Member)
            | EffectiveRole::Fraction(FractionRole::FractionMember) => {
                matches!(action, ViewOrganization | CreateTicket | CreateJoinRequest)
            }
            EffectiveRole::Fraction(FractionRole::FractionOwnerAdmin) => matches!(
                action,
                ViewOrganization
                    | CreateTicket
                    | CreateJoinRequest
                    | EditFraction
                    | ManageFractionResidents
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn org(role: OrganizationRole) -> EffectiveRole {
        EffectiveRole::Organization(role)
    }

    #[test]
    fn owner_can_do_everything() {
        assert!(Action::iter().all(|a| org(OrganizationRole::Owner).allows(a)));
    }

    #[test]
    fn admin_cannot_transfer_ownership() {
        let admin = org(OrganizationRole::Admin);
        assert!(admin.allows(Action::DeleteFraction));
        assert!(admin.allows(Action::ManageInvites));
        assert!(!admin.allows(Action::TransferOwnership));
    }

    #[test]
    fn member_cannot_delete_fraction() {
        let member = org(OrganizationRole::Member);
        assert!(member.allows(Action::CreateTicket));
        assert!(!member.allows(Action::DeleteFraction));
        assert!(!member.allows(Action::ManageSuppliers));
    }

    #[test]
    fn manager_role_wins_over_fraction_role() {
        let role = EffectiveRole::resolve(
            OrganizationRole::Admin,
            Some(FractionRole::FractionMember),
            Action::EditFraction,
        );
        assert_eq!(role, org(OrganizationRole::Admin));
    }

    #[test]
    fn fraction_role_only_counts_for_fraction_actions() {
        let owner_admin = Some(FractionRole::FractionOwnerAdmin);

        let edit = EffectiveRole::resolve(OrganizationRole::Member, owner_admin, Action::EditFraction);
        assert_eq!(edit, EffectiveRole::Fraction(FractionRole::FractionOwnerAdmin));
        assert!(edit.allows(Action::EditFraction));

        let delete =
            EffectiveRole::resolve(OrganizationRole::Member, owner_admin, Action::DeleteFraction);
        assert_eq!(delete, org(OrganizationRole::Member));
        assert!(!delete.allows(Action::DeleteFraction));
    }

    #[test]
    fn plain_resident_cannot_edit_fraction() {
        let role = EffectiveRole::resolve(
            OrganizationRole::Member,
            Some(FractionRole::FractionMember),
            Action::EditFraction,
        );
        assert!(!role.allows(Action::EditFraction));
    }

    #[test]
    fn decisions_are_stable_when_repeated() {
        for action in Action::iter() {
            let first = EffectiveRole::resolve(OrganizationRole::Member, None, action).allows(action);
            let second = EffectiveRole::resolve(OrganizationRole::Member, None, action).allows(action);
            assert_eq!(first, second);
        }
    }
}

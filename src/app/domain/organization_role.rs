use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Organization-level role carried by a membership row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
    sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrganizationRole {
    Owner,
    Admin,
    Member,
}

impl OrganizationRole {
    pub fn label(self) -> &'static str {
        match self {
            OrganizationRole::Owner => "Owner",
            OrganizationRole::Admin => "Administrator",
            OrganizationRole::Member => "Member",
        }
    }

    /// Owners and admins run the condominium.
    pub fn is_manager(self) -> bool {
        match self {
            OrganizationRole::Owner | OrganizationRole::Admin => true,
            OrganizationRole::Member => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn string_form_round_trips_for_every_role() {
        for role in OrganizationRole::iter() {
            assert_eq!(role.to_string().parse::<OrganizationRole>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("superuser".parse::<OrganizationRole>().is_err());
    }
}

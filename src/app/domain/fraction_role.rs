use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Role of a user within one fraction (apartment). Independent from the
/// organization role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
    sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FractionRole {
    FractionOwnerAdmin,
    FractionMember,
}

impl FractionRole {
    pub fn label(self) -> &'static str {
        match self {
            FractionRole::FractionOwnerAdmin => "Fraction owner",
            FractionRole::FractionMember => "Fraction resident",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_role_has_a_label() {
        assert!(FractionRole::iter().all(|r| !r.label().is_empty()));
        assert_eq!(FractionRole::FractionOwnerAdmin.label(), "Fraction owner");
    }

    #[test]
    fn uses_snake_case_storage_names() {
        assert_eq!(FractionRole::FractionOwnerAdmin.to_string(), "fraction_owner_admin");
        assert_eq!(
            "fraction_member".parse::<FractionRole>().unwrap(),
            FractionRole::FractionMember
        );
    }
}

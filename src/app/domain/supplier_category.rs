use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SupplierCategory {
    Plumbing,
    Electrical,
    Elevator,
    Cleaning,
    Gardening,
    Security,
    Other,
}

impl SupplierCategory {
    pub fn label(self) -> &'static str {
        match self {
            SupplierCategory::Plumbing => "Plumbing",
            SupplierCategory::Electrical => "Electrical",
            SupplierCategory::Elevator => "Elevator",
            SupplierCategory::Cleaning => "Cleaning",
            SupplierCategory::Gardening => "Gardening",
            SupplierCategory::Security => "Security",
            SupplierCategory::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_has_a_label() {
        assert!(SupplierCategory::iter().all(|c| !c.label().is_empty()));
        assert_eq!(SupplierCategory::Elevator.label(), "Elevator");
    }

    #[test]
    fn parses_storage_name() {
        assert_eq!("gardening".parse::<SupplierCategory>().unwrap(), SupplierCategory::Gardening);
    }
}

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DocumentCategory {
    Minutes,
    Regulation,
    Insurance,
    Budget,
    Invoice,
    Other,
}

impl DocumentCategory {
    pub fn label(self) -> &'static str {
        match self {
            DocumentCategory::Minutes => "Meeting minutes",
            DocumentCategory::Regulation => "Regulation",
            DocumentCategory::Insurance => "Insurance",
            DocumentCategory::Budget => "Budget",
            DocumentCategory::Invoice => "Invoice",
            DocumentCategory::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_has_a_label() {
        assert!(DocumentCategory::iter().all(|c| !c.label().is_empty()));
        assert_eq!(DocumentCategory::Minutes.label(), "Meeting minutes");
    }

    #[test]
    fn unknown_category_does_not_fall_back() {
        assert!("receipts".parse::<DocumentCategory>().is_err());
        assert!(serde_json::from_str::<DocumentCategory>("\"receipts\"").is_err());
    }
}

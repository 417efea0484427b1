use validator::ValidationError;

use super::validation_helpers;

/// Display name of a condominium.
#[derive(Debug, Clone)]
pub struct OrganizationName(String);

impl OrganizationName {
    const MAX_LEN: usize = 120;

    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let t = validation_helpers::required_text(name.as_ref(), "name", Self::MAX_LEN)?;
        Ok(Self(t))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base slug for this name. Uniqueness is resolved by the caller.
    pub fn slug(&self) -> Slug {
        Slug::from_name(&self.0)
    }
}

/// URL-safe organization handle: lowercase ASCII letters, digits and single
/// dashes, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slug(String);

impl Slug {
    const MAX_LEN: usize = 60;

    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        for c in name.chars().map(fold_accent) {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.truncate(Self::MAX_LEN);
        let slug = slug.trim_end_matches('-').to_string();
        if slug.is_empty() {
            Self("condominium".to_string())
        } else {
            Self(slug)
        }
    }

    /// Variant used when the base slug is taken: `name-2`, `name-3`, ...
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Common Portuguese/Latin accented letters map to their base letter.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_accented_name() {
        let name = OrganizationName::new("  Edifício São João, Bloco B ").unwrap();
        assert_eq!(name.as_str(), "Edifício São João, Bloco B");
        assert_eq!(name.slug().as_str(), "edificio-sao-joao-bloco-b");
    }

    #[test]
    fn slug_never_empty() {
        assert_eq!(Slug::from_name("!!!").as_str(), "condominium");
    }

    #[test]
    fn suffix_appends_counter() {
        assert_eq!(Slug::from_name("Torre").with_suffix(2).as_str(), "torre-2");
    }

    #[test]
    fn blank_name_rejected() {
        assert!(OrganizationName::new("   ").is_err());
    }
}

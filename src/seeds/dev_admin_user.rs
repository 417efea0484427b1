use std::env;

use async_trait::async_trait;
use rand::{seq::SliceRandom, Rng};
use sqlx::SqlitePool;

use crate::app::{
    db::{self, fractions::NewFraction, NewUser},
    domain::{Email, FractionRole, HashedPassword, OrganizationName, Password, UserId},
    error::AppError,
    features::onboarding,
    tenant,
};
use crate::seeds::{Seed, SeedOutcome};

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGIT: &[u8] = b"0123456789";

const DEMO_FRACTIONS: &[(&str, &str)] = &[
    ("1A", "First floor, left"),
    ("1B", "First floor, right"),
    ("2A", "Second floor, left"),
    ("Garage 3", "Parking space"),
];

fn pick(rng: &mut impl Rng, set: &[u8]) -> char {
    set[rng.random_range(0..set.len())] as char
}

/// 15 chars with at least one upper, lower and digit.
fn random_password() -> String {
    let mut rng = rand::rng();
    let mut chars = vec![pick(&mut rng, UPPER), pick(&mut rng, LOWER), pick(&mut rng, DIGIT)];
    let all: Vec<u8> = UPPER.iter().chain(LOWER).chain(DIGIT).copied().collect();
    for _ in 0..12 {
        chars.push(pick(&mut rng, &all));
    }
    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

/// Owner account plus a demo condominium with a few fractions, driven by
/// `SEED_ADMIN_EMAIL`.
pub struct DevAdminUser;

#[async_trait]
impl Seed for DevAdminUser {
    fn version(&self) -> i64 {
        20261001120000
    }

    fn description(&self) -> &str {
        "dev_admin_user"
    }

    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, AppError> {
        let email = match env::var("SEED_ADMIN_EMAIL") {
            Ok(s) if !s.trim().is_empty() => s,
            _ => return Ok(SeedOutcome::Skipped),
        };
        let Ok(email) = Email::new(&email) else {
            tracing::warn!("SEED_ADMIN_EMAIL is not a valid address");
            return Ok(SeedOutcome::Skipped);
        };
        if db::find_by_email(pool, &email).await?.is_some() {
            return Ok(SeedOutcome::Applied);
        }

        let password = Password::new(random_password()).map_err(AppError::validation)?;
        let password_hash = HashedPassword::from_password(&password).map_err(|_| AppError::Internal)?;
        let user_id = UserId::new();
        db::users::insert(
            pool,
            &NewUser {
                id: user_id.clone(),
                email: email.clone(),
                name: Some("Demo Administrator".to_string()),
                password_hash,
                verified: true,
            },
        )
        .await?;

        let name = OrganizationName::new("Edifício Demo").map_err(AppError::validation)?;
        let organization_id = onboarding::create_organization(pool, &user_id, &name, "Lisboa").await?;
        let (scope, _) = tenant::require_org_member(pool, &user_id, &organization_id).await?;

        for (index, (fraction_name, description)) in DEMO_FRACTIONS.iter().enumerate() {
            let fraction = NewFraction {
                id: db::new_id(),
                name: fraction_name.to_string(),
                description: description.to_string(),
            };
            db::fractions::insert(&scope, pool, &fraction).await?;
            if index == 0 {
                db::fractions::upsert_member(&scope, pool, &fraction.id, &user_id, FractionRole::FractionOwnerAdmin)
                    .await?;
            }
        }

        eprintln!(
            "Created admin: {} / {}",
            email.as_str(),
            std::str::from_utf8(password.as_bytes()).unwrap_or("<utf8?>")
        );
        Ok(SeedOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_password_meets_strength_rules() {
        for _ in 0..20 {
            let raw = random_password();
            assert_eq!(raw.len(), 15);
            assert!(Password::new(raw).is_ok());
        }
    }
}

//! Authentication service.
//!
//! Password registration and login, plus bearer token handling in the
//! `token` submodule.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, ValidatedClaims, decode_token, issue_token};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;

use cerveceria_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Legal drinking age in Chile.
const MIN_AGE_YEARS: i32 = 18;

/// Registration input.
#[derive(Debug)]
pub struct Registration<'r> {
    pub name: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub phone: Option<&'r str>,
    pub birth_date: Option<NaiveDate>,
}

/// Authentication service.
///
/// Handles user registration and login against the users table.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UnderMinimumAge` if the birth date is under 18 years back.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;

        if let Some(birth_date) = registration.birth_date {
            validate_age(birth_date)?;
        }

        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(
                registration.name,
                &email,
                &password_hash,
                registration.phone,
                registration.birth_date,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountDisabled` for soft-deleted accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(&email.to_lowercase())?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "La contraseña debe tener al menos {MIN_PASSWORD_LENGTH} caracteres"
        )));
    }

    Ok(())
}

fn validate_age(birth_date: NaiveDate) -> Result<(), AuthError> {
    validate_age_at(birth_date, Utc::now().date_naive())
}

fn validate_age_at(birth_date: NaiveDate, today: NaiveDate) -> Result<(), AuthError> {
    // Feb 29 birthdays count as completed once Feb has passed in a
    // non-leap year.
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    if age < MIN_AGE_YEARS {
        return Err(AuthError::UnderMinimumAge);
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short_rejected() {
        let result = validate_password("abc123");
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    }

    #[test]
    fn test_password_minimum_length_accepted() {
        assert!(validate_password("abcd1234").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_age_check() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();

        let adult = NaiveDate::from_ymd_opt(1996, 8, 23).unwrap();
        assert!(validate_age_at(adult, today).is_ok());

        let minor = NaiveDate::from_ymd_opt(2010, 8, 23).unwrap();
        assert!(matches!(
            validate_age_at(minor, today),
            Err(AuthError::UnderMinimumAge)
        ));
    }

    #[test]
    fn test_leap_day_birth_date_minor_rejected() {
        let birth = NaiveDate::from_ymd_opt(2012, 2, 29).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert!(matches!(
            validate_age_at(birth, today),
            Err(AuthError::UnderMinimumAge)
        ));
    }

    #[test]
    fn test_leap_day_birth_date_turns_eighteen_in_march() {
        let birth = NaiveDate::from_ymd_opt(2008, 2, 29).unwrap();

        let feb_28 = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert!(matches!(
            validate_age_at(birth, feb_28),
            Err(AuthError::UnderMinimumAge)
        ));

        let mar_1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(validate_age_at(birth, mar_1).is_ok());
    }

    #[test]
    fn test_eighteenth_birthday_is_accepted() {
        let birth = NaiveDate::from_ymd_opt(2008, 8, 23).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert!(validate_age_at(birth, today).is_ok());

        let day_before = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
        assert!(matches!(
            validate_age_at(birth, day_before),
            Err(AuthError::UnderMinimumAge)
        ));
    }

    #[test]
    fn test_garbage_hash_rejected() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}

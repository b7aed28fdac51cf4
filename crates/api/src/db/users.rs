//! User and address repository.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use cerveceria_core::{AddressId, Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::{Address, User};

#[derive(FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    phone: Option<String>,
    birth_date: Option<NaiveDate>,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self.role.parse::<UserRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(User {
            id: self.id,
            name: self.name,
            email,
            phone: self.phone,
            birth_date: self.birth_date,
            role,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AddressRow {
    id: AddressId,
    user_id: UserId,
    street: String,
    number: String,
    comuna: String,
    city: String,
    region: String,
    postal_code: Option<String>,
    country: String,
    is_primary: bool,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            street: row.street,
            number: row.number,
            comuna: row.comuna,
            city: row.city,
            region: row.region,
            postal_code: row.postal_code,
            country: row.country,
            is_primary: row.is_primary,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, phone, birth_date, role, active, created_at, updated_at";

/// Fields for inserting a new address.
#[derive(Debug)]
pub struct NewAddress {
    pub street: String,
    pub number: String,
    pub comuna: String,
    pub city: String,
    pub region: String,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub is_primary: bool,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
        phone: Option<&str>,
        birth_date: Option<NaiveDate>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email, password_hash, phone, birth_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, phone, birth_date, role, active, created_at, updated_at",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(phone)
        .bind(birth_date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if RepositoryError::is_unique_violation(&e) {
                RepositoryError::Conflict("email already registered".to_string())
            } else {
                RepositoryError::Database(e)
            }
        })?;

        row.into_user()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get the stored password hash for a user, for login verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(hash)
    }

    /// Update a user's profile fields. `None` leaves a field unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: Option<&str>,
        phone: Option<&str>,
        birth_date: Option<NaiveDate>,
        password_hash: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users
             SET name = COALESCE($2, name),
                 phone = COALESCE($3, phone),
                 birth_date = COALESCE($4, birth_date),
                 password_hash = COALESCE($5, password_hash),
                 updated_at = now()
             WHERE id = $1
             RETURNING id, name, email, phone, birth_date, role, active, created_at, updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(birth_date)
        .bind(password_hash)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_user()
    }

    /// Soft-delete a user (`active = false`). Orders and reviews keep
    /// their references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn soft_delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List a user's addresses, primary first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT id, user_id, street, number, comuna, city, region,
                    postal_code, country, is_primary, created_at
             FROM addresses
             WHERE user_id = $1
             ORDER BY is_primary DESC, created_at",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    /// Delete one address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist
    /// or belongs to someone else.
    pub async fn delete_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Add an address for a user.
    ///
    /// When the new address is marked primary, any previous primary is
    /// demoted in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_address(
        &self,
        user_id: UserId,
        address: NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if address.is_primary {
            sqlx::query("UPDATE addresses SET is_primary = FALSE WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(
            "INSERT INTO addresses
                 (user_id, street, number, comuna, city, region, postal_code, country, is_primary)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'Chile'), $9)
             RETURNING id, user_id, street, number, comuna, city, region,
                       postal_code, country, is_primary, created_at",
        )
        .bind(user_id)
        .bind(&address.street)
        .bind(&address.number)
        .bind(&address.comuna)
        .bind(&address.city)
        .bind(&address.region)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.is_primary)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Address::from(row))
    }
}

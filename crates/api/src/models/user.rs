//! User domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use cerveceria_core::{AddressId, Email, UserId, UserRole};

/// A registered user (domain type).
///
/// The password hash never leaves the repository layer; login fetches it
/// through a dedicated query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Contact phone, optional.
    pub phone: Option<String>,
    /// Date of birth, used for the legal drinking age check.
    pub birth_date: Option<NaiveDate>,
    /// `cliente` or `admin`.
    pub role: UserRole,
    /// Soft-delete flag; inactive users cannot log in.
    pub active: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A shipping address belonging to a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning user.
    pub user_id: UserId,
    pub street: String,
    pub number: String,
    /// Chilean municipal district.
    pub comuna: String,
    pub city: String,
    pub region: String,
    pub postal_code: Option<String>,
    pub country: String,
    /// Default shipping address for checkout.
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

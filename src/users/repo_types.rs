use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::blood_type::BloodType;

/// Raw `users` row.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub wallet_address: String,
    pub name: String,
    pub blood_type: String,
    pub age: i32,
    pub location: Option<String>,
    pub emergency_contact: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A registered donor profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub wallet_address: String,
    pub name: String,
    pub blood_type: BloodType,
    pub age: i32,
    pub location: Option<String>,
    pub emergency_contact: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            blood_type: r.blood_type.parse()?,
            id: r.id,
            wallet_address: r.wallet_address,
            name: r.name,
            age: r.age,
            location: r.location,
            emergency_contact: r.emergency_contact,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub wallet_address: String,
    pub name: String,
    pub blood_type: BloodType,
    pub age: i32,
    pub location: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Validated partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub blood_type: Option<BloodType>,
    pub age: Option<i32>,
    pub location: Option<String>,
    pub emergency_contact: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

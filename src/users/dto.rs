use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{blood_type::BloodType, users::repo_types::User};

/// Body of `POST /profile` and `POST /users/register`.
///
/// Every field is optional at the serde level so missing values surface as
/// field-level validation errors instead of a generic parse failure.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CreateProfileRequest {
    pub wallet_address: Option<String>,
    pub name: Option<String>,
    pub blood_type: Option<String>,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Body of `PUT /profile`. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub blood_type: Option<String>,
    pub age: Option<i64>,
    pub location: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BindWalletRequest {
    pub wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileCreatedResponse {
    pub token: String,
    pub user: User,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// What other users may see: no emergency contact, no age.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub wallet_address: String,
    pub name: String,
    pub blood_type: BloodType,
    pub location: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            wallet_address: u.wallet_address,
            name: u.name,
            blood_type: u.blood_type,
            location: u.location,
            created_at: u.created_at,
        }
    }
}

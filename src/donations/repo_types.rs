use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::blood_type::BloodType;

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| anyhow::anyhow!("unknown {} {:?}", stringify!($name), s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

text_enum!(Urgency {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

text_enum!(RequestStatus {
    Pending => "pending",
    Fulfilled => "fulfilled",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, FromRow)]
pub struct DonationRequestRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_type: String,
    pub units_needed: i32,
    pub hospital_name: String,
    pub hospital_address: String,
    pub description: Option<String>,
    pub urgency: String,
    pub status: String,
    pub needed_by: Option<OffsetDateTime>,
    pub blockchain_tx_hash: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct DonationRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_type: BloodType,
    pub units_needed: i32,
    pub hospital_name: String,
    pub hospital_address: String,
    pub description: Option<String>,
    pub urgency: Urgency,
    pub status: RequestStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub needed_by: Option<OffsetDateTime>,
    pub blockchain_tx_hash: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<DonationRequestRow> for DonationRequest {
    type Error = anyhow::Error;

    fn try_from(r: DonationRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            blood_type: r.blood_type.parse()?,
            urgency: r.urgency.parse()?,
            status: r.status.parse()?,
            id: r.id,
            user_id: r.user_id,
            units_needed: r.units_needed,
            hospital_name: r.hospital_name,
            hospital_address: r.hospital_address,
            description: r.description,
            needed_by: r.needed_by,
            blockchain_tx_hash: r.blockchain_tx_hash,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonationRequest {
    pub user_id: Uuid,
    pub blood_type: BloodType,
    pub units_needed: i32,
    pub hospital_name: String,
    pub hospital_address: String,
    pub description: Option<String>,
    pub urgency: Urgency,
    pub needed_by: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub blood_type: Option<BloodType>,
    pub urgency: Option<Urgency>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DonationRow {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub request_id: Option<Uuid>,
    pub blood_type: String,
    pub units: i32,
    pub donation_center: String,
    pub notes: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub verified_on_chain: bool,
    pub donation_date: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub request_id: Option<Uuid>,
    pub blood_type: BloodType,
    pub units: i32,
    pub donation_center: String,
    pub notes: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub verified_on_chain: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub donation_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<DonationRow> for Donation {
    type Error = anyhow::Error;

    fn try_from(r: DonationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            blood_type: r.blood_type.parse()?,
            id: r.id,
            donor_id: r.donor_id,
            request_id: r.request_id,
            units: r.units,
            donation_center: r.donation_center,
            notes: r.notes,
            blockchain_tx_hash: r.blockchain_tx_hash,
            verified_on_chain: r.verified_on_chain,
            donation_date: r.donation_date,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonation {
    pub donor_id: Uuid,
    pub request_id: Option<Uuid>,
    pub blood_type: BloodType,
    pub units: i32,
    pub donation_center: String,
    pub notes: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub donation_date: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_parse_their_labels() {
        for u in Urgency::ALL {
            assert_eq!(u.as_str().parse::<Urgency>().unwrap(), *u);
        }
        for s in RequestStatus::ALL {
            assert_eq!(s.as_str().parse::<RequestStatus>().unwrap(), *s);
        }
        assert!("urgent".parse::<Urgency>().is_err());
        assert!("Pending".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn row_with_unknown_enum_is_rejected() {
        let now = OffsetDateTime::now_utc();
        let row = DonationRequestRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            blood_type: "A+".into(),
            units_needed: 2,
            hospital_name: "General".into(),
            hospital_address: "1 Main St".into(),
            description: None,
            urgency: "extreme".into(),
            status: "pending".into(),
            needed_by: None,
            blockchain_tx_hash: None,
            created_at: now,
            updated_at: now,
        };
        assert!(DonationRequest::try_from(row).is_err());
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::donations::repo_types::{Donation, DonationRequest};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CreateDonationRequestBody {
    pub blood_type: Option<String>,
    pub units_needed: Option<i64>,
    pub hospital_name: Option<String>,
    pub hospital_address: Option<String>,
    pub description: Option<String>,
    pub urgency: Option<String>,
    pub needed_by: Option<String>, // RFC 3339
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
    pub blood_type: Option<String>,
    pub urgency: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AttachTxHashBody {
    pub blockchain_tx_hash: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RecordDonationBody {
    pub request_id: Option<Uuid>,
    pub blood_type: Option<String>,
    pub units: Option<i64>,
    pub donation_center: Option<String>,
    pub notes: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    pub donation_date: Option<String>, // RFC 3339
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DonationRequestResponse {
    pub donation_request: DonationRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DonationRequestList {
    pub data: Vec<DonationRequest>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct DonationResponse {
    pub donation: Donation,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DonationList {
    pub data: Vec<Donation>,
    pub limit: i64,
    pub offset: i64,
}

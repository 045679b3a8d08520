use serde::{Deserialize, Serialize};

use crate::users::{repo_types::User, services::LoginOutcome};

/// Request body for `POST /auth/wallet-login`.
#[derive(Debug, Deserialize)]
pub struct WalletLoginRequest {
    pub wallet_address: Option<String>,
}

/// Request body for `POST /auth/verify-signature`.
#[derive(Debug, Deserialize)]
pub struct SignatureLoginRequest {
    pub wallet_address: Option<String>,
    pub signature: Option<String>,
    pub message: Option<String>,
}

/// Response for both login flows.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub needs_profile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        match outcome {
            LoginOutcome::Authenticated { token, user } => Self {
                token: Some(token),
                user: Some(user),
                needs_profile: false,
                message: None,
            },
            LoginOutcome::NeedsProfile => Self {
                token: None,
                user: None,
                needs_profile: true,
                message: Some("User not found. Please create profile first."),
            },
        }
    }
}

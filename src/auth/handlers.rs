use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::dto::{LoginResponse, SignatureLoginRequest, WalletLoginRequest},
    error::AppError,
    state::AppState,
    users::services::{IdentityService, LoginOutcome},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/wallet-login", post(wallet_login))
        .route("/auth/verify-signature", post(verify_signature))
}

/// Unknown wallets answer 404 with `needs_profile: true`.
#[instrument(skip(svc, payload))]
pub async fn wallet_login(
    State(svc): State<IdentityService>,
    payload: Result<Json<WalletLoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoginResponse>), AppError> {
    let Json(payload) = payload?;
    let outcome = svc
        .login_by_wallet(payload.wallet_address.as_deref())
        .await?;
    let status = match outcome {
        LoginOutcome::Authenticated { .. } => StatusCode::OK,
        LoginOutcome::NeedsProfile => StatusCode::NOT_FOUND,
    };
    Ok((status, Json(outcome.into())))
}

/// Unknown signers answer 200 with `needs_profile: true`; bad signatures 401.
#[instrument(skip(svc, payload))]
pub async fn verify_signature(
    State(svc): State<IdentityService>,
    payload: Result<Json<SignatureLoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let outcome = svc
        .login_by_signature(
            payload.wallet_address.as_deref(),
            payload.signature.as_deref(),
            payload.message.as_deref(),
        )
        .await?;
    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::dto::CreateProfileRequest;
    use axum::extract::FromRef;

    fn wallet_body(wallet: &str) -> Result<Json<WalletLoginRequest>, JsonRejection> {
        Ok(Json(WalletLoginRequest {
            wallet_address: Some(wallet.into()),
        }))
    }

    #[tokio::test]
    async fn unknown_wallet_is_not_found_with_needs_profile() {
        let state = AppState::fake();
        let svc = IdentityService::from_ref(&state);
        let (status, Json(body)) = wallet_login(State(svc), wallet_body("0xabc")).await.unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.needs_profile);
        assert!(body.token.is_none());

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["needs_profile"], true);
        assert!(json.get("token").is_none());
    }

    #[tokio::test]
    async fn known_wallet_gets_token() {
        let state = AppState::fake();
        let svc = IdentityService::from_ref(&state);
        svc.create_profile(&CreateProfileRequest {
            wallet_address: Some("0xabc".into()),
            name: Some("Dana".into()),
            blood_type: Some("B-".into()),
            age: Some(45),
            ..Default::default()
        })
        .await
        .unwrap();

        let (status, Json(body)) = wallet_login(State(svc), wallet_body("0xabc")).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(!body.needs_profile);
        assert!(body.token.is_some());
        assert_eq!(body.user.unwrap().name, "Dana");
    }
}

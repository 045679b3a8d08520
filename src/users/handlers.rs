use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    state::AppState,
    users::{
        dto::{
            BindWalletRequest, CreateProfileRequest, ProfileCreatedResponse, ProfileResponse,
            PublicUser, UpdateProfileRequest,
        },
        services::IdentityService,
    },
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/profile",
        post(create_profile).get(get_profile).put(update_profile),
    )
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(create_profile))
        .route("/users/:id", get(show_user))
        .route("/users/:id/wallet", put(bind_wallet))
}

#[instrument(skip(svc, payload))]
pub async fn create_profile(
    State(svc): State<IdentityService>,
    payload: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileCreatedResponse>), AppError> {
    let Json(payload) = payload?;
    let (token, user) = svc.create_profile(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProfileCreatedResponse {
            token,
            user,
            message: "Profile created successfully",
        }),
    ))
}

#[instrument(skip(svc))]
pub async fn get_profile(
    State(svc): State<IdentityService>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = svc.get_profile(user_id).await?;
    Ok(Json(ProfileResponse {
        user,
        message: None,
    }))
}

#[instrument(skip(svc, payload))]
pub async fn update_profile(
    State(svc): State<IdentityService>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let Json(payload) = payload?;
    let user = svc.update_profile(user_id, &payload).await?;
    Ok(Json(ProfileResponse {
        user,
        message: Some("Profile updated successfully"),
    }))
}

#[instrument(skip(svc))]
pub async fn show_user(
    State(svc): State<IdentityService>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    let user = svc.get_profile(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(svc, payload))]
pub async fn bind_wallet(
    State(svc): State<IdentityService>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<BindWalletRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let Json(payload) = payload?;
    let user = svc
        .bind_wallet(caller, id, payload.wallet_address.as_deref())
        .await?;
    Ok(Json(ProfileResponse {
        user,
        message: None,
    }))
}

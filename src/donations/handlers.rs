use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    state::AppState,
};

use super::dto::{
    AttachTxHashBody, CreateDonationRequestBody, DonationList, DonationRequestList,
    DonationRequestResponse, DonationResponse, ListRequestsQuery, Pagination, RecordDonationBody,
};
use super::{repo, services};

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/donation-requests",
            get(list_requests).post(create_request),
        )
        .route("/donation-requests/:id/blockchain", put(attach_tx_hash))
}

pub fn donation_routes() -> Router<AppState> {
    Router::new()
        .route("/donations", post(record_donation))
        .route("/donations/user/:user_id", get(list_user_donations))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<DonationRequestList>, AppError> {
    let filter = services::validate_filter(&query)?;
    let data = repo::list_requests(&state.db, &filter).await?;
    Ok(Json(DonationRequestList {
        data,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateDonationRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<DonationRequestResponse>), AppError> {
    let Json(payload) = payload?;
    let new = services::validate_new_request(user_id, &payload)?;
    let donation_request = repo::insert_request(&state.db, &new).await?;
    info!(%user_id, request_id = %donation_request.id, "donation request created");
    Ok((
        StatusCode::CREATED,
        Json(DonationRequestResponse {
            donation_request,
            message: Some("Donation request created successfully"),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn attach_tx_hash(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<AttachTxHashBody>, JsonRejection>,
) -> Result<Json<DonationRequestResponse>, AppError> {
    let Json(payload) = payload?;
    let hash = services::validate_tx_hash(payload.blockchain_tx_hash.as_deref())?;
    let donation_request = repo::set_request_tx_hash(&state.db, id, user_id, &hash)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation request not found".into()))?;
    info!(%user_id, request_id = %id, "blockchain hash attached");
    Ok(Json(DonationRequestResponse {
        donation_request,
        message: None,
    }))
}

#[instrument(skip(state, payload))]
pub async fn record_donation(
    State(state): State<AppState>,
    AuthUser(donor_id): AuthUser,
    payload: Result<Json<RecordDonationBody>, JsonRejection>,
) -> Result<(StatusCode, Json<DonationResponse>), AppError> {
    let Json(payload) = payload?;
    let new = services::validate_new_donation(donor_id, &payload)?;
    if let Some(request_id) = new.request_id {
        if !repo::request_exists(&state.db, request_id).await? {
            return Err(AppError::invalid(
                "request_id",
                "The selected request id is invalid.",
            ));
        }
    }
    let donation = repo::insert_donation(&state.db, &new).await?;
    info!(%donor_id, donation_id = %donation.id, "donation recorded");
    Ok((
        StatusCode::CREATED,
        Json(DonationResponse {
            donation,
            message: "Donation recorded successfully",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_user_donations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(p): Query<Pagination>,
) -> Result<Json<DonationList>, AppError> {
    let (limit, offset) = services::pagination(&p);
    let data = repo::list_donations_by_donor(&state.db, user_id, limit, offset).await?;
    Ok(Json(DonationList {
        data,
        limit,
        offset,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // These paths reject before touching the database.

    #[tokio::test]
    async fn invalid_filter_is_422() {
        let query = ListRequestsQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        let err = list_requests(State(AppState::fake()), Query(query))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn invalid_request_body_is_422() {
        let body = CreateDonationRequestBody {
            blood_type: Some("Z".into()),
            ..Default::default()
        };
        let err = create_request(State(AppState::fake()), AuthUser(Uuid::new_v4()), Ok(Json(body)))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn malformed_tx_hash_is_422() {
        let body = AttachTxHashBody {
            blockchain_tx_hash: Some("0xnothex".into()),
        };
        let err = attach_tx_hash(
            State(AppState::fake()),
            AuthUser(Uuid::new_v4()),
            Path(Uuid::new_v4()),
            Ok(Json(body)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

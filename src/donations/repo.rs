use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::donations::repo_types::{
    Donation, DonationRequest, DonationRequestRow, DonationRow, NewDonation, NewDonationRequest,
    RequestFilter,
};

const REQUEST_COLUMNS: &str = "id, user_id, blood_type, units_needed, hospital_name, \
                               hospital_address, description, urgency, status, needed_by, \
                               blockchain_tx_hash, created_at, updated_at";

const DONATION_COLUMNS: &str = "id, donor_id, request_id, blood_type, units, donation_center, \
                                notes, blockchain_tx_hash, verified_on_chain, donation_date, \
                                created_at";

// ---- Donation requests ----

pub async fn insert_request(
    db: &PgPool,
    new: &NewDonationRequest,
) -> anyhow::Result<DonationRequest> {
    let row = sqlx::query_as::<_, DonationRequestRow>(&format!(
        r#"
        INSERT INTO donation_requests
            (user_id, blood_type, units_needed, hospital_name, hospital_address,
             description, urgency, needed_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(new.user_id)
    .bind(new.blood_type.as_str())
    .bind(new.units_needed)
    .bind(&new.hospital_name)
    .bind(&new.hospital_address)
    .bind(&new.description)
    .bind(new.urgency.as_str())
    .bind(new.needed_by)
    .fetch_one(db)
    .await
    .context("insert donation request")?;
    row.try_into()
}

/// Newest first; `None` filters match everything.
pub async fn list_requests(
    db: &PgPool,
    filter: &RequestFilter,
) -> anyhow::Result<Vec<DonationRequest>> {
    let rows = sqlx::query_as::<_, DonationRequestRow>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
          FROM donation_requests
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::text IS NULL OR blood_type = $2)
           AND ($3::text IS NULL OR urgency = $3)
         ORDER BY created_at DESC
         LIMIT $4 OFFSET $5
        "#
    ))
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.blood_type.map(|bt| bt.as_str()))
    .bind(filter.urgency.map(|u| u.as_str()))
    .bind(filter.limit)
    .bind(filter.offset)
    .fetch_all(db)
    .await
    .context("list donation requests")?;
    rows.into_iter().map(DonationRequest::try_from).collect()
}

pub async fn request_exists(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS (SELECT 1 FROM donation_requests WHERE id = $1)"#,
    )
    .bind(id)
    .fetch_one(db)
    .await
    .context("check donation request")?;
    Ok(exists)
}

/// `None` when the request does not exist or belongs to someone else.
pub async fn set_request_tx_hash(
    db: &PgPool,
    id: Uuid,
    owner: Uuid,
    tx_hash: &str,
) -> anyhow::Result<Option<DonationRequest>> {
    let row = sqlx::query_as::<_, DonationRequestRow>(&format!(
        r#"
        UPDATE donation_requests
           SET blockchain_tx_hash = $3,
               updated_at         = now()
         WHERE id = $1 AND user_id = $2
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner)
    .bind(tx_hash)
    .fetch_optional(db)
    .await
    .context("set donation request tx hash")?;
    row.map(DonationRequest::try_from).transpose()
}

// ---- Donations ----

pub async fn insert_donation(db: &PgPool, new: &NewDonation) -> anyhow::Result<Donation> {
    let row = sqlx::query_as::<_, DonationRow>(&format!(
        r#"
        INSERT INTO donations
            (donor_id, request_id, blood_type, units, donation_center, notes,
             blockchain_tx_hash, donation_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {DONATION_COLUMNS}
        "#
    ))
    .bind(new.donor_id)
    .bind(new.request_id)
    .bind(new.blood_type.as_str())
    .bind(new.units)
    .bind(&new.donation_center)
    .bind(&new.notes)
    .bind(&new.blockchain_tx_hash)
    .bind(new.donation_date)
    .fetch_one(db)
    .await
    .context("insert donation")?;
    row.try_into()
}

pub async fn list_donations_by_donor(
    db: &PgPool,
    donor_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Donation>> {
    let rows = sqlx::query_as::<_, DonationRow>(&format!(
        r#"
        SELECT {DONATION_COLUMNS}
          FROM donations
         WHERE donor_id = $1
         ORDER BY donation_date DESC, created_at DESC
         LIMIT $2 OFFSET $3
        "#
    ))
    .bind(donor_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list donations by donor")?;
    rows.into_iter().map(Donation::try_from).collect()
}

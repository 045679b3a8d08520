use lazy_static::lazy_static;
use regex::Regex;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use crate::{
    blood_type::BloodType,
    donations::{
        dto::{CreateDonationRequestBody, ListRequestsQuery, Pagination, RecordDonationBody},
        repo_types::{NewDonation, NewDonationRequest, RequestFilter, RequestStatus, Urgency},
    },
    error::{AppError, FieldErrors},
    users::validation::MAX_STRING,
};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

fn is_tx_hash(s: &str) -> bool {
    lazy_static! {
        static ref TX_HASH_RE: Regex = Regex::new(r"^0x[0-9a-fA-F]{64}$").unwrap();
    }
    TX_HASH_RE.is_match(s)
}

/// Lowercased transaction hash, or a field error.
pub fn check_tx_hash(errors: &mut FieldErrors, value: &str) -> Option<String> {
    let hash = value.trim();
    if is_tx_hash(hash) {
        Some(hash.to_ascii_lowercase())
    } else {
        errors.add(
            "blockchain_tx_hash",
            "The blockchain tx hash must be 0x followed by 64 hex characters.",
        );
        None
    }
}

fn check_blood_type(errors: &mut FieldErrors, value: Option<&str>) -> Option<BloodType> {
    let Some(raw) = value else {
        errors.add("blood_type", "The blood type field is required.");
        return None;
    };
    match raw.trim().parse() {
        Ok(bt) => Some(bt),
        Err(_) => {
            errors.add("blood_type", "The selected blood type is invalid.");
            None
        }
    }
}

fn check_units(errors: &mut FieldErrors, field: &'static str, value: Option<i64>) -> Option<i32> {
    let Some(units) = value else {
        errors.add(field, format!("The {} field is required.", field.replace('_', " ")));
        return None;
    };
    match i32::try_from(units) {
        Ok(n) if n >= 1 => Some(n),
        _ => {
            errors.add(field, format!("The {} must be a positive integer.", field.replace('_', " ")));
            None
        }
    }
}

fn check_label(errors: &mut FieldErrors, field: &'static str, value: Option<&str>) -> Option<String> {
    let text = value.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        errors.add(field, format!("The {} field is required.", field.replace('_', " ")));
        return None;
    }
    if text.chars().count() > MAX_STRING {
        errors.add(
            field,
            format!("The {} may not be greater than {MAX_STRING} characters.", field.replace('_', " ")),
        );
        return None;
    }
    Some(text.to_string())
}

fn check_timestamp(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<OffsetDateTime> {
    match OffsetDateTime::parse(raw.trim(), &Rfc3339) {
        Ok(ts) => Some(ts),
        Err(_) => {
            errors.add(field, format!("The {} must be an RFC 3339 timestamp.", field.replace('_', " ")));
            None
        }
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_filter<T: std::str::FromStr>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&str>,
) -> Option<T> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, format!("The selected {} is invalid.", field.replace('_', " ")));
            None
        }
    }
}

/// Limit defaults to 20 and is clamped to 1..=100; negative offsets become 0.
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

pub fn validate_new_request(
    user_id: Uuid,
    body: &CreateDonationRequestBody,
) -> Result<NewDonationRequest, AppError> {
    let mut errors = FieldErrors::new();

    let blood_type = check_blood_type(&mut errors, body.blood_type.as_deref());
    let units_needed = check_units(&mut errors, "units_needed", body.units_needed);
    let hospital_name = check_label(&mut errors, "hospital_name", body.hospital_name.as_deref());
    let hospital_address =
        check_label(&mut errors, "hospital_address", body.hospital_address.as_deref());
    let urgency = match body.urgency.as_deref().map(str::trim) {
        None | Some("") => Some(Urgency::Medium),
        raw => parse_filter::<Urgency>(&mut errors, "urgency", raw),
    };
    let needed_by = body
        .needed_by
        .as_deref()
        .and_then(|raw| check_timestamp(&mut errors, "needed_by", raw));

    match (blood_type, units_needed, hospital_name, hospital_address, urgency) {
        (Some(blood_type), Some(units_needed), Some(hospital_name), Some(hospital_address), Some(urgency))
            if errors.is_empty() =>
        {
            Ok(NewDonationRequest {
                user_id,
                blood_type,
                units_needed,
                hospital_name,
                hospital_address,
                description: optional_text(body.description.as_deref()),
                urgency,
                needed_by,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}

pub fn validate_filter(query: &ListRequestsQuery) -> Result<RequestFilter, AppError> {
    let mut errors = FieldErrors::new();
    let status = parse_filter::<RequestStatus>(&mut errors, "status", query.status.as_deref());
    let blood_type = parse_filter::<BloodType>(&mut errors, "blood_type", query.blood_type.as_deref());
    let urgency = parse_filter::<Urgency>(&mut errors, "urgency", query.urgency.as_deref());
    errors.into_result()?;

    let (limit, offset) = page(query.limit, query.offset);
    Ok(RequestFilter {
        status,
        blood_type,
        urgency,
        limit,
        offset,
    })
}

pub fn validate_tx_hash(value: Option<&str>) -> Result<String, AppError> {
    let mut errors = FieldErrors::new();
    let Some(raw) = value else {
        return Err(AppError::invalid(
            "blockchain_tx_hash",
            "The blockchain tx hash field is required.",
        ));
    };
    match check_tx_hash(&mut errors, raw) {
        Some(hash) => Ok(hash),
        None => Err(AppError::Validation(errors)),
    }
}

pub fn validate_new_donation(donor_id: Uuid, body: &RecordDonationBody) -> Result<NewDonation, AppError> {
    let mut errors = FieldErrors::new();

    let blood_type = check_blood_type(&mut errors, body.blood_type.as_deref());
    let units = check_units(&mut errors, "units", body.units);
    let donation_center = check_label(&mut errors, "donation_center", body.donation_center.as_deref());
    let blockchain_tx_hash = body
        .blockchain_tx_hash
        .as_deref()
        .and_then(|raw| check_tx_hash(&mut errors, raw));
    let donation_date = match body.donation_date.as_deref() {
        Some(raw) => check_timestamp(&mut errors, "donation_date", raw),
        None => {
            errors.add("donation_date", "The donation date field is required.");
            None
        }
    };

    match (blood_type, units, donation_center, donation_date) {
        (Some(blood_type), Some(units), Some(donation_center), Some(donation_date))
            if errors.is_empty() =>
        {
            Ok(NewDonation {
                donor_id,
                request_id: body.request_id,
                blood_type,
                units,
                donation_center,
                notes: optional_text(body.notes.as_deref()),
                blockchain_tx_hash,
                donation_date,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}

pub fn pagination(p: &Pagination) -> (i64, i64) {
    page(p.limit, p.offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const HASH: &str = "0x5C504ED432CB51138BCF09AA5E8A410DD4A1E204EF84BFED1BE16DFBA1B22060";

    fn request_body() -> CreateDonationRequestBody {
        CreateDonationRequestBody {
            blood_type: Some("AB-".into()),
            units_needed: Some(3),
            hospital_name: Some("St. Mary".into()),
            hospital_address: Some("12 Harbour Rd".into()),
            description: Some("  ".into()),
            urgency: None,
            needed_by: Some("2025-11-10T08:00:00Z".into()),
        }
    }

    fn donation_body() -> RecordDonationBody {
        RecordDonationBody {
            request_id: None,
            blood_type: Some("O+".into()),
            units: Some(1),
            donation_center: Some("Central Blood Bank".into()),
            notes: None,
            blockchain_tx_hash: Some(HASH.into()),
            donation_date: Some("2025-11-03T22:10:32+01:00".into()),
        }
    }

    fn errors_of(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn request_defaults_to_medium_urgency() {
        let owner = Uuid::new_v4();
        let new = validate_new_request(owner, &request_body()).unwrap();
        assert_eq!(new.user_id, owner);
        assert_eq!(new.urgency, Urgency::Medium);
        assert_eq!(new.blood_type, BloodType::AbNeg);
        assert_eq!(new.description, None);
        assert_eq!(new.needed_by, Some(datetime!(2025-11-10 08:00 UTC)));
    }

    #[test]
    fn request_rejects_bad_fields() {
        let body = CreateDonationRequestBody {
            units_needed: Some(0),
            urgency: Some("asap".into()),
            hospital_name: None,
            needed_by: Some("tomorrow".into()),
            ..request_body()
        };
        let errors = errors_of(validate_new_request(Uuid::new_v4(), &body).unwrap_err());
        for field in ["units_needed", "urgency", "hospital_name", "needed_by"] {
            assert!(errors.contains(field), "{field} should be reported");
        }
        assert!(!errors.contains("blood_type"));
    }

    #[test]
    fn filter_parses_known_values_and_clamps_page() {
        let query = ListRequestsQuery {
            status: Some("pending".into()),
            blood_type: Some("B+".into()),
            urgency: None,
            limit: Some(1000),
            offset: Some(-5),
        };
        let filter = validate_filter(&query).unwrap();
        assert_eq!(filter.status, Some(RequestStatus::Pending));
        assert_eq!(filter.blood_type, Some(BloodType::BPos));
        assert_eq!(filter.urgency, None);
        assert_eq!((filter.limit, filter.offset), (MAX_LIMIT, 0));
    }

    #[test]
    fn filter_rejects_unknown_status() {
        let query = ListRequestsQuery {
            status: Some("lost".into()),
            ..Default::default()
        };
        assert!(errors_of(validate_filter(&query).unwrap_err()).contains("status"));
    }

    #[test]
    fn default_page() {
        assert_eq!(pagination(&Pagination::default()), (DEFAULT_LIMIT, 0));
        assert_eq!(page(Some(0), Some(10)), (1, 10));
    }

    #[test]
    fn tx_hash_is_normalized() {
        assert_eq!(validate_tx_hash(Some(HASH)).unwrap(), HASH.to_ascii_lowercase());
        assert!(validate_tx_hash(Some("0x1234")).is_err());
        assert!(validate_tx_hash(None).is_err());
    }

    #[test]
    fn donation_is_validated() {
        let donor = Uuid::new_v4();
        let new = validate_new_donation(donor, &donation_body()).unwrap();
        assert_eq!(new.donor_id, donor);
        assert_eq!(new.units, 1);
        assert_eq!(new.blockchain_tx_hash.as_deref(), Some(&*HASH.to_ascii_lowercase()));
        assert_eq!(new.donation_date, datetime!(2025-11-03 21:10:32 UTC));
    }

    #[test]
    fn donation_requires_date_and_positive_units() {
        let body = RecordDonationBody {
            units: Some(-2),
            donation_date: None,
            ..donation_body()
        };
        let errors = errors_of(validate_new_donation(Uuid::new_v4(), &body).unwrap_err());
        assert!(errors.contains("units"));
        assert!(errors.contains("donation_date"));
    }
}

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    blood_type::BloodType,
    error::{AppError, FieldErrors},
    users::{
        dto::{CreateProfileRequest, UpdateProfileRequest},
        repo_types::{NewUser, ProfileChanges},
    },
};

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 65;
pub const MAX_STRING: usize = 255;

fn is_evm_address(s: &str) -> bool {
    lazy_static! {
        static ref EVM_ADDRESS_RE: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
    }
    EVM_ADDRESS_RE.is_match(s)
}

/// Trims the address; EVM addresses are lowercased so checksummed and plain
/// spellings name the same wallet.
pub fn normalize_wallet(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_evm_address(trimmed) {
        trimmed.to_ascii_lowercase()
    } else {
        trimmed.to_string()
    }
}

pub fn check_wallet(errors: &mut FieldErrors, value: Option<&str>) -> Option<String> {
    let Some(raw) = value else {
        errors.add("wallet_address", "The wallet address field is required.");
        return None;
    };
    let wallet = normalize_wallet(raw);
    if wallet.is_empty() {
        errors.add("wallet_address", "The wallet address field is required.");
        return None;
    }
    if wallet.chars().count() > MAX_STRING {
        errors.add(
            "wallet_address",
            format!("The wallet address may not be greater than {MAX_STRING} characters."),
        );
        return None;
    }
    Some(wallet)
}

/// Required non-empty string used by login requests.
pub fn check_required(errors: &mut FieldErrors, field: &'static str, value: Option<&str>) {
    if value.map_or(true, |v| v.trim().is_empty()) {
        errors.add(field, format!("The {} field is required.", field.replace('_', " ")));
    }
}

fn check_name(errors: &mut FieldErrors, raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        errors.add("name", "The name field is required.");
        return None;
    }
    if name.chars().count() > MAX_STRING {
        errors.add(
            "name",
            format!("The name may not be greater than {MAX_STRING} characters."),
        );
        return None;
    }
    Some(name.to_string())
}

fn check_blood_type(errors: &mut FieldErrors, raw: &str) -> Option<BloodType> {
    match raw.trim().parse::<BloodType>() {
        Ok(bt) => Some(bt),
        Err(_) => {
            errors.add("blood_type", "The selected blood type is invalid.");
            None
        }
    }
}

fn check_age(errors: &mut FieldErrors, age: i64) -> Option<i32> {
    if age < MIN_AGE {
        errors.add("age", format!("The age must be at least {MIN_AGE}."));
        return None;
    }
    if age > MAX_AGE {
        errors.add("age", format!("The age may not be greater than {MAX_AGE}."));
        return None;
    }
    i32::try_from(age).ok()
}

/// Optional free text: absent is fine, present-but-blank is not.
fn check_optional_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&str>,
) -> Option<String> {
    let raw = value?;
    let text = raw.trim();
    if text.is_empty() {
        errors.add(field, format!("The {} must be a non-empty string.", field.replace('_', " ")));
        return None;
    }
    Some(text.to_string())
}

pub fn validate_new_profile(req: &CreateProfileRequest) -> Result<NewUser, AppError> {
    let mut errors = FieldErrors::new();

    let wallet_address = check_wallet(&mut errors, req.wallet_address.as_deref());
    let name = match req.name.as_deref() {
        Some(raw) => check_name(&mut errors, raw),
        None => {
            errors.add("name", "The name field is required.");
            None
        }
    };
    let blood_type = match req.blood_type.as_deref() {
        Some(raw) => check_blood_type(&mut errors, raw),
        None => {
            errors.add("blood_type", "The blood type field is required.");
            None
        }
    };
    let age = match req.age {
        Some(age) => check_age(&mut errors, age),
        None => {
            errors.add("age", "The age field is required.");
            None
        }
    };
    let location = check_optional_text(&mut errors, "location", req.location.as_deref());
    let emergency_contact =
        check_optional_text(&mut errors, "emergency_contact", req.emergency_contact.as_deref());

    match (wallet_address, name, blood_type, age) {
        (Some(wallet_address), Some(name), Some(blood_type), Some(age)) if errors.is_empty() => {
            Ok(NewUser {
                wallet_address,
                name,
                blood_type,
                age,
                location,
                emergency_contact,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}

pub fn validate_profile_changes(req: &UpdateProfileRequest) -> Result<ProfileChanges, AppError> {
    let mut errors = FieldErrors::new();

    let changes = ProfileChanges {
        name: req.name.as_deref().and_then(|raw| check_name(&mut errors, raw)),
        blood_type: req
            .blood_type
            .as_deref()
            .and_then(|raw| check_blood_type(&mut errors, raw)),
        age: req.age.and_then(|age| check_age(&mut errors, age)),
        location: check_optional_text(&mut errors, "location", req.location.as_deref()),
        emergency_contact: check_optional_text(
            &mut errors,
            "emergency_contact",
            req.emergency_contact.as_deref(),
        ),
    };

    errors.into_result()?;
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CreateProfileRequest {
        CreateProfileRequest {
            wallet_address: Some("0xAbCdEf0123456789abcdef0123456789ABCDEF01".into()),
            name: Some("Alice".into()),
            blood_type: Some("O-".into()),
            age: Some(30),
            location: None,
            emergency_contact: None,
        }
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_complete_profile() {
        let new = validate_new_profile(&alice()).unwrap();
        assert_eq!(new.wallet_address, "0xabcdef0123456789abcdef0123456789abcdef01");
        assert_eq!(new.name, "Alice");
        assert_eq!(new.blood_type, BloodType::ONeg);
        assert_eq!(new.age, 30);
    }

    #[test]
    fn non_evm_wallets_keep_their_case() {
        assert_eq!(normalize_wallet("  GABC123  "), "GABC123");
    }

    #[test]
    fn age_bounds_are_inclusive() {
        for (age, ok) in [(17, false), (18, true), (65, true), (66, false)] {
            let req = CreateProfileRequest {
                age: Some(age),
                ..alice()
            };
            assert_eq!(validate_new_profile(&req).is_ok(), ok, "age {age}");
        }
    }

    #[test]
    fn unknown_blood_type_is_a_field_error() {
        let req = CreateProfileRequest {
            blood_type: Some("X+".into()),
            ..alice()
        };
        let errors = field_errors(validate_new_profile(&req).unwrap_err());
        assert!(errors.contains("blood_type"));
        assert!(!errors.contains("age"));
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = field_errors(validate_new_profile(&CreateProfileRequest::default()).unwrap_err());
        for field in ["wallet_address", "name", "blood_type", "age"] {
            assert!(errors.contains(field), "{field} should be reported");
        }
    }

    #[test]
    fn name_length_is_capped() {
        let req = CreateProfileRequest {
            name: Some("n".repeat(256)),
            ..alice()
        };
        assert!(field_errors(validate_new_profile(&req).unwrap_err()).contains("name"));

        let req = CreateProfileRequest {
            name: Some("n".repeat(255)),
            ..alice()
        };
        assert!(validate_new_profile(&req).is_ok());
    }

    #[test]
    fn blank_optional_text_is_rejected() {
        let req = CreateProfileRequest {
            location: Some("   ".into()),
            ..alice()
        };
        assert!(field_errors(validate_new_profile(&req).unwrap_err()).contains("location"));
    }

    #[test]
    fn partial_update_only_carries_supplied_fields() {
        let req = UpdateProfileRequest {
            age: Some(40),
            ..Default::default()
        };
        let changes = validate_profile_changes(&req).unwrap();
        assert_eq!(
            changes,
            ProfileChanges {
                age: Some(40),
                ..Default::default()
            }
        );
    }

    #[test]
    fn partial_update_validates_supplied_fields() {
        let req = UpdateProfileRequest {
            age: Some(66),
            blood_type: Some("AB+".into()),
            ..Default::default()
        };
        let errors = field_errors(validate_profile_changes(&req).unwrap_err());
        assert!(errors.contains("age"));
        assert!(!errors.contains("blood_type"));
    }
}

use lazy_static::lazy_static;
use mongodb::bson::Document;
use regex::Regex;

use crate::error::UserError;
use crate::users::dto::{CreateUserRequest, UpdateUserRequest};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref MOBILE_RE: Regex = Regex::new(r"^\d{10}$").unwrap();
}

/// Keys that must never reach the store through the update path, no matter
/// what upstream produced. Schema validation already excludes them; this is
/// an independent boundary, not a shortcut.
const FORBIDDEN_UPDATE_FIELDS: &[&str] = &[
    "_id",
    "id",
    "password",
    "password_hash",
    "username",
    "email",
    "created_at",
];

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_RE.is_match(mobile)
}

/// Structural checks on a creation payload, before any business logic or I/O.
pub fn validate_create(payload: &CreateUserRequest) -> Result<(), UserError> {
    let username_len = payload.username.trim().chars().count();
    if !(3..=50).contains(&username_len) {
        return Err(UserError::InvalidData(
            "Username must be between 3 and 50 characters".into(),
        ));
    }

    if !is_valid_email(payload.email.trim()) {
        return Err(UserError::InvalidData("Invalid email address".into()));
    }

    validate_optional_fields(&payload.full_name, &payload.mobile)
}

/// Per-field checks on a partial update; absent fields are left untouched.
pub fn validate_update(payload: &UpdateUserRequest) -> Result<(), UserError> {
    validate_optional_fields(&payload.full_name, &payload.mobile)
}

fn validate_optional_fields(
    full_name: &Option<String>,
    mobile: &Option<String>,
) -> Result<(), UserError> {
    if let Some(full_name) = full_name {
        if full_name.trim().chars().count() > 100 {
            return Err(UserError::InvalidData(
                "Full name must be at most 100 characters".into(),
            ));
        }
    }

    if let Some(mobile) = mobile {
        if !is_valid_mobile(mobile) {
            return Err(UserError::InvalidData(
                "Mobile must be exactly 10 digits".into(),
            ));
        }
    }

    Ok(())
}

/// Strip protected fields from a proposed update before it reaches the
/// repository.
pub fn sanitize_update(mut fields: Document) -> Document {
    for key in FORBIDDEN_UPDATE_FIELDS {
        fields.remove(key);
    }
    fields
}

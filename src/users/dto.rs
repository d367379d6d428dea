use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial-update request. Absent fields are left untouched; the payload
/// has no slot for username, email or anything password-related.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub is_active: Option<bool>,
}

/// Public part of the user returned to the client. Structurally excludes
/// the password hash: there is no field that could hold it.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: &str, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message.to_string()),
            data: Some(data),
        }
    }

    pub fn success_message(message: &str) -> Self {
        Self {
            status: "success",
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: "error",
            message: Some(message),
            data: None,
        }
    }
}

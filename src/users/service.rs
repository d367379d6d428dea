use std::sync::Arc;

use mongodb::bson::{oid::ObjectId, DateTime, Document};
use time::OffsetDateTime;
use tracing::instrument;

use crate::config::PasswordPolicy;
use crate::error::{UserError, UserResult};
use crate::users::dto::{CreateUserRequest, PublicUser, UpdateUserRequest};
use crate::users::model::StoredUser;
use crate::users::password;
use crate::users::repo::UserRepository;
use crate::users::validate;

/// Business-logic layer over the user repository. Owns validation,
/// normalization, hashing and timestamping; holds no per-request state, so
/// a clone per in-flight request is free.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    policy: PasswordPolicy,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, policy: PasswordPolicy) -> Self {
        Self { repo, policy }
    }

    #[instrument(skip(self, payload), fields(username = %payload.username))]
    pub async fn add_user(&self, payload: CreateUserRequest) -> UserResult<PublicUser> {
        validate::validate_create(&payload)?;

        if let Err(reason) = self.policy.validate_strength(&payload.password) {
            tracing::warn!(reason = %reason, "password validation failed");
            return Err(UserError::InvalidData(reason));
        }

        let password_hash =
            password::hash_password(&payload.password).map_err(|e| UserError::Internal(e.to_string()))?;

        let now = OffsetDateTime::now_utc();
        let user = StoredUser {
            id: None,
            username: payload.username.trim().to_lowercase(),
            email: payload.email.trim().to_lowercase(),
            password_hash,
            full_name: payload.full_name.map(|name| name.trim().to_string()),
            mobile: payload.mobile,
            is_active: payload.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(user).await?;
        tracing::info!(username = %created.username, "user created");
        Ok(created.into_public())
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: &str) -> UserResult<PublicUser> {
        ObjectId::parse_str(id).map_err(|_| UserError::InvalidId)?;

        let user = self.repo.get_by_id(id).await?.ok_or(UserError::NotFound)?;
        Ok(user.into_public())
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> UserResult<PublicUser> {
        let user = self
            .repo
            .get_by_username(username)
            .await?
            .ok_or(UserError::NotFound)?;
        Ok(user.into_public())
    }

    #[instrument(skip(self, payload))]
    pub async fn update_user(&self, id: &str, payload: UpdateUserRequest) -> UserResult<PublicUser> {
        ObjectId::parse_str(id).map_err(|_| UserError::InvalidId)?;
        validate::validate_update(&payload)?;

        let mut fields = Document::new();
        if let Some(full_name) = payload.full_name {
            fields.insert("full_name", full_name.trim().to_string());
        }
        if let Some(mobile) = payload.mobile {
            fields.insert("mobile", mobile);
        }
        if let Some(is_active) = payload.is_active {
            fields.insert("is_active", is_active);
        }

        // Defense in depth: the typed payload cannot name protected fields,
        // but the merge document is scrubbed anyway.
        let mut fields = validate::sanitize_update(fields);
        fields.insert(
            "updated_at",
            DateTime::from_time_0_3(OffsetDateTime::now_utc()),
        );

        let updated = self
            .repo
            .update(id, fields)
            .await?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = %id, "user updated");
        Ok(updated.into_public())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        ObjectId::parse_str(id).map_err(|_| UserError::InvalidId)?;

        if !self.repo.delete(id).await? {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}

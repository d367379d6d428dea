use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::dto::PublicUser;

/// User record as stored in the users collection. This is the only type
/// that carries the password hash; it never crosses the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    /// Store-assigned id; absent until the document is inserted.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    // Documents written before this field existed read as active.
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(with = "bson::serde_helpers::time_0_3_offsetdatetime_as_bson_datetime")]
    pub created_at: OffsetDateTime,
    #[serde(with = "bson::serde_helpers::time_0_3_offsetdatetime_as_bson_datetime")]
    pub updated_at: OffsetDateTime,
}

fn default_is_active() -> bool {
    true
}

impl StoredUser {
    /// Shape the record for the outside world, dropping the password hash.
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            mobile: self.mobile,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document, to_document, Bson, DateTime};

    fn stored_user() -> StoredUser {
        let now = OffsetDateTime::now_utc();
        StoredUser {
            id: Some(ObjectId::new()),
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            full_name: None,
            mobile: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn into_public_drops_the_hash_and_hex_encodes_the_id() {
        let user = stored_user();
        let id = user.id.unwrap();
        let public = user.into_public();
        assert_eq!(public.id, id.to_hex());
        assert_eq!(public.username, "alice");
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn is_active_defaults_to_true_for_legacy_documents() {
        let doc = doc! {
            "_id": ObjectId::new(),
            "username": "bob",
            "email": "b@x.com",
            "password_hash": "hash",
            "full_name": Bson::Null,
            "mobile": Bson::Null,
            "created_at": DateTime::now(),
            "updated_at": DateTime::now(),
        };
        let user: StoredUser = from_document(doc).unwrap();
        assert!(user.is_active);
    }

    #[test]
    fn unsaved_user_serializes_without_an_id() {
        let mut user = stored_user();
        user.id = None;
        let doc = to_document(&user).unwrap();
        assert!(!doc.contains_key("_id"));
        assert!(doc.contains_key("password_hash"));
    }
}

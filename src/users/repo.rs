use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::users::model::StoredUser;

/// Data-access interface for user records. Implementations own all store
/// I/O; no business logic lives behind this trait.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, failing with `Duplicate` when the username or
    /// email is already taken.
    async fn create(&self, user: StoredUser) -> UserResult<StoredUser>;

    /// Fetch by id. A syntactically invalid id reads as absent; callers
    /// that want a distinct error validate the format themselves.
    async fn get_by_id(&self, id: &str) -> UserResult<Option<StoredUser>>;

    async fn get_by_username(&self, username: &str) -> UserResult<Option<StoredUser>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<StoredUser>>;

    /// Partial `$set` merge onto the existing record; returns the record
    /// after the merge, or `None` when no record matches.
    async fn update(&self, id: &str, fields: Document) -> UserResult<Option<StoredUser>>;

    /// True iff a record existed and was removed.
    async fn delete(&self, id: &str) -> UserResult<bool>;
}

/// MongoDB implementation of the user repository.
pub struct MongoUserRepository {
    collection: Collection<StoredUser>,
}

impl MongoUserRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<StoredUser>(collection_name);
        Self { collection }
    }

    /// Unique indexes on username and email. The create path pre-checks for
    /// duplicates, but only these indexes close the check-then-insert race
    /// between concurrent creates.
    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_username_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("user indexes created");
        Ok(())
    }
}

fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_err)) => write_err.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create(&self, user: StoredUser) -> UserResult<StoredUser> {
        let existing = self
            .collection
            .find_one(doc! {
                "$or": [
                    { "username": &user.username },
                    { "email": &user.email },
                ]
            })
            .await?;
        if existing.is_some() {
            return Err(UserError::Duplicate);
        }

        let result = self.collection.insert_one(&user).await.map_err(|e| {
            if is_duplicate_key_error(&e) {
                // A concurrent create won the race; the unique index
                // rejected this insert.
                UserError::Duplicate
            } else {
                UserError::from(e)
            }
        })?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| UserError::Database("insert returned a non-ObjectId id".into()))?;

        let created = self
            .collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| UserError::Database("freshly inserted user not found".into()))?;

        tracing::info!(user_id = %id, "user created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> UserResult<Option<StoredUser>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let user = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_username(&self, username: &str) -> UserResult<Option<StoredUser>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<StoredUser>> {
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, id: &str, fields: Document) -> UserResult<Option<StoredUser>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": fields })
            .with_options(options)
            .await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> UserResult<bool> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }
}

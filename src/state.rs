use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};

use crate::config::AppConfig;
use crate::users::repo::MongoUserRepository;
use crate::users::service::UserService;

/// Shared application state. The Mongo client is created once at startup;
/// handles cloned from it are safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: UserService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let mut options = ClientOptions::parse(&config.mongo.url)
            .await
            .context("parse MONGO_URL")?;
        options.max_pool_size = Some(100);
        options.min_pool_size = Some(5);
        options.connect_timeout = Some(Duration::from_secs(10));
        options.server_selection_timeout = Some(Duration::from_secs(30));

        let client = Client::with_options(options)?;
        let db = client.database(&config.mongo.db_name);

        db.run_command(doc! { "ping": 1 })
            .await
            .context("connect to database")?;
        tracing::info!(db = %config.mongo.db_name, "connected to MongoDB");

        let repo = MongoUserRepository::new(&db, &config.mongo.users_collection);
        repo.init_indexes().await.context("create user indexes")?;

        let users = UserService::new(Arc::new(repo), config.password.clone());

        Ok(Self { db, users })
    }
}

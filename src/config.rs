use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MongoSettings {
    pub url: String,
    pub db_name: String,
    pub users_collection: String,
}

/// Configurable password-strength rules.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_digit: bool,
    pub require_special_char: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_digit: true,
            require_special_char: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo: MongoSettings,
    pub password: PasswordPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongo = MongoSettings {
            url: std::env::var("MONGO_URL")
                .unwrap_or_else(|_| "mongodb://localhost:27017".into()),
            db_name: std::env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "user_access_control".into()),
            users_collection: std::env::var("USERS_COLLECTION")
                .unwrap_or_else(|_| "users".into()),
        };
        let password = PasswordPolicy {
            min_length: std::env::var("MIN_PASSWORD_LENGTH")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(8),
            require_uppercase: env_flag("REQUIRE_UPPERCASE", true),
            require_digit: env_flag("REQUIRE_DIGITS", true),
            require_special_char: env_flag("REQUIRE_SPECIAL_CHARS", true),
        };
        Ok(Self { mongo, password })
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(default)
}

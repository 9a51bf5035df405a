use config::{Config, ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct HttpSettings {
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub http: HttpSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load environment variables from a .env file if present
        dotenv().ok();

        let mut s = Config::new();

        s.set_default("database.host", "localhost")?;
        s.set_default("database.user", "postgres")?;
        s.set_default("database.password", "")?;
        s.set_default("database.database", "messages")?;
        s.set_default("database.port", 5432_i64)?;
        s.set_default("http.port", 3000_i64)?;

        // Add in settings from the environment (with a prefix of APP)
        // Eg. `APP_DATABASE__HOST=db.example.com` would set `database.host`
        s.merge(Environment::with_prefix("APP").separator("__"))?;

        s.try_into()
    }
}

use std::env;

use auth::AuthSettings;
use auth::PasswordPolicy;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use serde::Deserialize;

/// Longest accepted token lifetime: one year.
pub const MAX_EXPIRATION_HOURS: i64 = 24 * 366;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token signing configuration.
///
/// The secret is redacted from `Debug` output.
#[derive(Debug, Deserialize)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub expiration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT_SECRET or JWT__SECRET, DATABASE_URL or
    ///    DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    ///
    /// Fails when no signing secret is configured.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("database.max_connections", 5)?
            .set_default("server.http_port", 8080)?
            .set_default("jwt.expiration_hours", 24)?
            .set_default("password.min_length", 6)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__").try_parsing(true))
            // Conventional single-underscore names win over everything else
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_EXPIRATION_HOURS).contains(&self.jwt.expiration_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}",
                MAX_EXPIRATION_HOURS
            )));
        }
        Ok(())
    }

    /// Settings handed to the authenticator at startup.
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            token_ttl_hours: self.jwt.expiration_hours,
            password_policy: PasswordPolicy::with_min_length(self.password.min_length),
        }
    }
}

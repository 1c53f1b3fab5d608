use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
}

/// Reads settings from `.env`, an optional `trivia.toml` and `TRIVIA_*` variables,
/// e.g. `TRIVIA_DATABASE__URL=sqlite:/var/lib/trivia.db`.
pub fn get_settings() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    let builder = Config::builder()
        .add_source(File::with_name("trivia").required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("_")
                .separator("__"),
        );
    build_settings(builder)
}

fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    builder
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 8080_i64)?
        .set_default("database.url", "sqlite:trivia.db")?
        .set_default("database.max_connections", 5_i64)?
        .build()?
        .try_deserialize()
}

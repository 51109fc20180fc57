use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub storage: StorageSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub mode: ApiMode,
    pub log_level: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    /// JSON array holding the whole transaction log.
    pub data_file: PathBuf,
    /// Directory the cashier pages are read from.
    pub pages_dir: PathBuf,
}

/// Which flavour of the transaction API the server exposes.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApiMode {
    /// Free-form records keyed by a caller supplied `transactionId`.
    Ledger,
    /// Server computed sales addressed by list position, plus the static pages.
    Cashier,
    /// Sales history keyed by a unique string `transactionId`, newest first.
    Sales,
}

impl std::fmt::Display for ApiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiMode::Ledger => write!(f, "ledger"),
            ApiMode::Cashier => write!(f, "cashier"),
            ApiMode::Sales => write!(f, "sales"),
        }
    }
}

impl Settings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 5000)?
        .set_default("application.mode", "ledger")?
        .set_default("application.log_level", "info")?
        .set_default("storage.data_file", "transactions.json")?
        .set_default("storage.pages_dir", ".")?
        .add_source(File::with_name("configuration").required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        // Hosting platforms hand the port over as a bare PORT variable
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_is_read_from_lowercase_names() {
        let mode: ApiMode = serde_json::from_str("\"cashier\"").unwrap();
        assert_eq!(mode, ApiMode::Cashier);
        let mode: ApiMode = serde_json::from_str("\"sales\"").unwrap();
        assert_eq!(mode, ApiMode::Sales);
        assert!(serde_json::from_str::<ApiMode>("\"register\"").is_err());
    }

    #[test]
    fn environment_overrides_nested_settings() {
        std::env::set_var("APP_APPLICATION__MODE", "sales");
        std::env::set_var("APP_STORAGE__DATA_FILE", "/tmp/pentol-env.json");
        std::env::set_var("PORT", "5123");

        let settings = get_configuration();

        std::env::remove_var("APP_APPLICATION__MODE");
        std::env::remove_var("APP_STORAGE__DATA_FILE");
        std::env::remove_var("PORT");

        let settings = settings.unwrap();
        assert_eq!(settings.application.mode, ApiMode::Sales);
        assert_eq!(settings.storage.data_file, PathBuf::from("/tmp/pentol-env.json"));
        assert_eq!(settings.application.port, 5123);
    }

    #[test]
    fn address_joins_host_and_port() {
        let settings = Settings {
            application: ApplicationSettings {
                host: "0.0.0.0".to_string(),
                port: 5000,
                mode: ApiMode::Ledger,
                log_level: "info".to_string(),
            },
            storage: StorageSettings {
                data_file: PathBuf::from("transactions.json"),
                pages_dir: PathBuf::from("."),
            },
        };

        assert_eq!(settings.address(), "0.0.0.0:5000");
    }
}

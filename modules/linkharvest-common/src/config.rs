use std::path::PathBuf;

use crate::error::HarvestError;

const DEFAULT_CONFIG_PATH: &str = "linkharvest.toml";

/// Which search API to call, with its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCredentials {
    GoogleCse { api_key: String, engine_id: String },
    Serper { api_key: String },
}

impl ProviderCredentials {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderCredentials::GoogleCse { .. } => "google-cse",
            ProviderCredentials::Serper { .. } => "serper",
        }
    }
}

/// Application configuration loaded from environment variables.
/// Contains only secrets and env-specific values; sheet layout, flows,
/// and the blacklist live in the TOML FileConfig.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Raw service account JSON for the spreadsheet.
    pub service_account_json: String,
    pub provider: ProviderCredentials,
    pub config_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, HarvestError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key → value lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarvestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                HarvestError::setup(format!("{key} environment variable is required"))
            })
        };

        let service_account_json = required("GCP_SA_KEY")?;

        let provider = match get("SEARCH_PROVIDER").as_deref().map(str::trim) {
            None | Some("google-cse") => ProviderCredentials::GoogleCse {
                api_key: required("GOOGLE_API_KEY")?,
                engine_id: required("SEARCH_ENGINE_ID")?,
            },
            Some("serper") => ProviderCredentials::Serper {
                api_key: required("SERPER_API_KEY")?,
            },
            Some(other) => {
                return Err(HarvestError::setup(format!(
                    "SEARCH_PROVIDER must be 'google-cse' or 'serper', got '{other}'"
                )))
            }
        };

        let config_path = get("LINKHARVEST_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        Ok(Self {
            service_account_json,
            provider,
            config_path,
        })
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  GCP_SA_KEY: <{} chars>", self.service_account_json.chars().count());
        tracing::info!("  SEARCH_PROVIDER: {}", self.provider.name());
        match &self.provider {
            ProviderCredentials::GoogleCse { api_key, engine_id } => {
                tracing::info!("  GOOGLE_API_KEY: {}", key_preview(api_key));
                tracing::info!("  SEARCH_ENGINE_ID: {}", key_preview(engine_id));
            }
            ProviderCredentials::Serper { api_key } => {
                tracing::info!("  SERPER_API_KEY: {}", key_preview(api_key));
            }
        }
        tracing::info!("  LINKHARVEST_CONFIG: {}", self.config_path.display());
    }
}

/// First five characters of a secret plus its length in characters.
fn key_preview(val: &str) -> String {
    let n = val.chars().take(5).map(char::len_utf8).sum::<usize>();
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

// src/config.rs
use crate::ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::ai::{GeminiClient, TextGenerator};
use crate::store::supabase::SupabaseSettings;
use crate::store::{MemoryStore, RemoteStore, SupabaseStore};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
/// The only secret read from the environment.
pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address the board is served from; share links point here.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_port() -> u16 {
    4010
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreSettings {
    Memory {
        #[serde(default)]
        seed_file: Option<PathBuf>,
        #[serde(default)]
        admins: Vec<AdminAccount>,
    },
    Supabase {
        url: String,
        anon_key: String,
        #[serde(default)]
        service_key: Option<String>,
        #[serde(default)]
        timeout_seconds: Option<u64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_ai_timeout(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_ai_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: AppConfig,
    production: AppConfig,
}

impl AppConfig {
    /// Load the section for the current environment and pick up the AI
    /// credential from `API_KEY`. Runs before logging is set up, so it
    /// reports only through its result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(
            &Self::config_path(path),
            &Self::get_environment(),
            std::env::var(API_KEY_VAR).ok(),
        )
    }

    pub fn config_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    fn load_from(config_path: &Path, environment: &str, api_key: Option<String>) -> Result<Self> {
        if !config_path.exists() {
            anyhow::bail!(
                "{} not found. Server cannot start without configuration.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let mut config = Self::from_yaml(&content, environment)?;
        config.api_key = api_key.filter(|k| !k.trim().is_empty());
        Ok(config)
    }

    pub fn get_environment() -> String {
        std::env::var("JOBOFFICER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content).context("Failed to parse config")?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    pub fn build_store(&self) -> Result<Arc<dyn RemoteStore>> {
        match &self.store {
            StoreSettings::Memory { seed_file, admins } => {
                let mut store = MemoryStore::new(self.auth.jwt_secret.clone());
                for admin in admins {
                    store = store.with_admin(&admin.email, &admin.password);
                }
                if let Some(path) = seed_file {
                    store = store.with_seed_file(path)?;
                }
                info!("Using in-memory job store ({} admins)", admins.len());
                Ok(Arc::new(store))
            }
            StoreSettings::Supabase {
                url,
                anon_key,
                service_key,
                timeout_seconds,
            } => {
                info!("Using hosted job store at {}", url);
                let store = SupabaseStore::new(SupabaseSettings {
                    url: url.clone(),
                    anon_key: anon_key.clone(),
                    service_key: service_key.clone(),
                    timeout_seconds: *timeout_seconds,
                })?;
                Ok(Arc::new(store))
            }
        }
    }

    pub fn build_generator(&self) -> Result<Arc<dyn TextGenerator>> {
        let client = GeminiClient::new(
            self.api_key.clone(),
            Some(self.ai.base_url.clone()),
            Some(self.ai.model.clone()),
            self.ai.timeout_seconds,
        )?;
        Ok(Arc::new(client))
    }
}

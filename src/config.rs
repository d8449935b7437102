use crate::llm::CompletionSettings;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

/// Origins allowed to call the HTTP endpoints when none are configured.
const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:8000",
    "http://127.0.0.1:8000",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Interface to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Token validity window in minutes
    #[arg(long, env = "TOKEN_TTL_MINUTES")]
    pub token_ttl_minutes: Option<i64>,

    /// Ceiling on one completion call, in seconds
    #[arg(long, env = "COMPLETION_TIMEOUT_SECS")]
    pub completion_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_minutes: i64,
    pub seed_user: String,
    pub seed_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.allowed_origins", DEFAULT_ALLOWED_ORIGINS.to_vec())?
            .set_default("auth.secret", "YOUR_SUPER_SECRET_KEY_REPLACE_ME")?
            .set_default("auth.token_ttl_minutes", 30)?
            .set_default("auth.seed_user", "testuser")?
            .set_default("auth.seed_password", "password123")?
            .set_default("completion.request_timeout_secs", 15)?;

        // 2. Optional config file: explicit path first, ./config.* fallback
        if let Some(path) = cli.config.as_deref() {
            builder = builder.add_source(File::with_name(path));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }

        // 3. Environment variables (prefixed with RELAY_)
        // E.g. RELAY_SERVER__PORT=9000, RELAY_AUTH__SECRET=...
        builder = builder.add_source(
            Environment::with_prefix("RELAY")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins"),
        );

        // 4. SECRET_KEY is also honored without the RELAY_ prefix.
        if let Ok(val) = env::var("SECRET_KEY") {
            if !val.trim().is_empty() {
                builder = builder.set_override("auth.secret", val)?;
            }
        }

        // 5. Manual CLI overrides
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(ttl) = cli.token_ttl_minutes {
            builder = builder.set_override("auth.token_ttl_minutes", ttl)?;
        }
        if let Some(ceiling) = cli.completion_timeout_secs {
            builder = builder.set_override("completion.request_timeout_secs", ceiling)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}

pub fn load_completion_settings() -> Result<CompletionSettings, String> {
    let base_url = std::env::var("LLM_BASE_URL")
        .map_err(|_| "Missing required env var: LLM_BASE_URL".to_string())?;
    if base_url.trim().is_empty() {
        return Err("LLM_BASE_URL cannot be empty".to_string());
    }

    let model = std::env::var("LLM_MODEL")
        .map_err(|_| "Missing required env var: LLM_MODEL".to_string())?;
    if model.trim().is_empty() {
        return Err("LLM_MODEL cannot be empty".to_string());
    }

    let api_key = std::env::var("LLM_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty());

    Ok(CompletionSettings {
        base_url,
        api_key,
        model,
    })
}

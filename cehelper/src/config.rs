use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::provider::ProviderConfig;
use crate::sanitizer::Extraction;
use crate::{Error, Result};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Process-wide settings, read once at startup
#[derive(Parser, Debug, Clone)]
#[command(name = "cehelper", version, about, long_about = None)]
pub struct Settings {
    /// Port the webhook listens on
    #[arg(long, env = "WEBHOOK_PORT", default_value_t = 8443)]
    pub port: u16,

    /// PEM encoded TLS certificate
    #[arg(long, env = "TLS_CERT_FILE", default_value = "/tls/tls.crt")]
    pub tls_cert: PathBuf,

    /// PEM encoded TLS private key
    #[arg(long, env = "TLS_KEY_FILE", default_value = "/tls/tls.key")]
    pub tls_key: PathBuf,

    /// Chat-completions URL of a local inference server, takes precedence over OpenAI
    #[arg(long, env = "LOCAL_LLM_URL")]
    pub local_llm_url: Option<String>,

    /// Model requested from the local inference server
    #[arg(long, env = "LOCAL_LLM_MODEL", default_value = "mistral-nemo")]
    pub local_llm_model: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI model
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o")]
    pub openai_model: String,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// How the corrected resource is located in the model reply
    #[arg(long, env = "EXTRACTION", value_enum, default_value_t = Extraction::LineScan)]
    pub extraction: Extraction,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Settings {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Resolves the completion backend, a local server wins over OpenAI
    pub fn provider(&self) -> Result<ProviderConfig> {
        if let Some(url) = non_blank(self.local_llm_url.as_deref()) {
            return Ok(ProviderConfig::Local {
                url: url.to_string(),
                model: self.local_llm_model.clone(),
            });
        }

        if let Some(api_key) = non_blank(self.openai_api_key.as_deref()) {
            return Ok(ProviderConfig::Hosted {
                api_key: api_key.to_string(),
                base_url: self.openai_base_url.clone(),
                model: self.openai_model.clone(),
            });
        }

        Err(Error::NoProvider)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

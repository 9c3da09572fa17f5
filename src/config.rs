//! Configuration for the processing agent, its provider and secrets

use std::path::Path;
use serde::{Deserialize, Serialize};
use log::debug;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: usize = 1500;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_SECRET_NAME: &str = "openai-api-key";
pub const DEFAULT_PROJECT_ENV: &str = "GCP_PROJECT_ID";
pub const DEFAULT_INSTRUCTIONS: &str
  = "Convert the following JSON data to a well-structured, readable \
     Markdown format. Use appropriate markdown features like headers, \
     lists, tables, code blocks, etc. Make it visually appealing and \
     easy to read.";

/// LLM provider configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig
{   /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Request timeout in seconds; client default when unset
    pub timeout_secs: Option<u64>
}

/// Where and how the credential is looked up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsConfig
{   /// Secret identifier, also the source of the env var name
    pub secret_name: String
  , /// Env var holding the cloud project id
    pub project_env: String
  , /// Secret Manager API base URL (if custom)
    pub secret_manager_base: Option<String>
  , /// Metadata server host (if custom)
    pub metadata_host: Option<String>
}

impl Default for SecretsConfig
{   fn default() -> Self
    {   SecretsConfig
        {   secret_name: DEFAULT_SECRET_NAME.to_string()
          , project_env: DEFAULT_PROJECT_ENV.to_string()
          , secret_manager_base: None
          , metadata_host: None
        }
    }
}

/// Processing agent configuration, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig
{   /// Model identifier sent with every completion
    pub model: String
  , /// Response-length cap
    pub max_tokens: usize
  , /// Sampling temperature
    pub temperature: f32
  , /// System instruction used when the caller gives none
    pub default_instructions: String
  , pub provider: ProviderConfig
  , pub secrets: SecretsConfig
}

impl Default for AgentConfig
{   fn default() -> Self
    {   AgentConfig
        {   model: DEFAULT_MODEL.to_string()
          , max_tokens: DEFAULT_MAX_TOKENS
          , temperature: DEFAULT_TEMPERATURE
          , default_instructions: DEFAULT_INSTRUCTIONS.to_string()
          , provider: ProviderConfig::default()
          , secrets: SecretsConfig::default()
        }
    }
}

impl AgentConfig
{   /// Load a config from a JSON file; missing fields take defaults
    pub fn load(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading agent config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let config: AgentConfig = serde_json::from_str(&text)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the provider would refuse anyway
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.model.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "model must not be empty".to_string()
            ));
        }
        if self.max_tokens == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "max_tokens must be positive".to_string()
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("temperature {} outside 0.0..=2.0", self.temperature)
            ));
        }
        if self.secrets.secret_name.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "secret_name must not be empty".to_string()
            ));
        }
        Ok(())
    }
}

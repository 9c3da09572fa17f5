//! Google Secret Manager backend

use std::time::Duration;
use base64::Engine;
use log::{debug, trace, warn, error};
use serde::Deserialize;

pub const SECRET_MANAGER_API_BASE: &str
  = "https://secretmanager.googleapis.com";
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

const METADATA_TOKEN_PATH: &str
  = "/computeMetadata/v1/instance/service-accounts/default/token";
const CONNECT_TIMEOUT_SECS: u64 = 2;

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse
{   payload: SecretPayload
}

#[derive(Debug, Deserialize)]
struct SecretPayload
{   #[serde(default)]
    data: String
}

#[derive(Debug, Deserialize)]
struct MetadataToken
{   access_token: String
}

/// Where the OAuth bearer token comes from
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource
{   /// A pre-issued token (e.g. `gcloud auth print-access-token`)
    Static(String)
  , /// The GCE metadata server at `host`
    Metadata
    {   host: String
    }
}

impl std::fmt::Debug for TokenSource
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   match self
        {   TokenSource::Static(_) => write!(f, "Static(<redacted>)")
          , TokenSource::Metadata { host } => {
              write!(f, "Metadata {{ host: {:?} }}", host)
            }
        }
    }
}

impl TokenSource
{   /// Static token from the environment if set, else the metadata server
    pub fn from_env(config: &crate::config::SecretsConfig) -> Self
    {   if let Some(token) = std::env::var(ACCESS_TOKEN_ENV)
          .ok()
          .filter(|t| !t.is_empty())
        {   debug!("Using access token from {}", ACCESS_TOKEN_ENV);
            return TokenSource::Static(token);
        }
        let host = config.metadata_host
          .clone()
          .or_else(|| std::env::var(METADATA_HOST_ENV).ok())
          .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string());
        TokenSource::Metadata { host }
    }
}

/// Resolves secrets from `projects/{project}/secrets/{name}/versions/latest`
#[derive(Debug)]
pub struct SecretManagerResolver
{   project: String
  , api_base: String
  , token_source: TokenSource
  , http_client: reqwest::Client
}

impl SecretManagerResolver
{   pub fn new(
      project: impl Into<String>
    , api_base: Option<String>
    , token_source: TokenSource
    ) -> Self
    {   let project = project.into();
        debug!("Creating SecretManagerResolver for project {}", project);
        let http_client = reqwest::Client::builder()
          .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
          .build()
          .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
          });
        SecretManagerResolver
        {   project
          , api_base: api_base
              .unwrap_or_else(|| SECRET_MANAGER_API_BASE.to_string())
          , token_source
          , http_client
        }
    }

    /// `None` when the project env var is unset or empty
    pub fn from_env(config: &crate::config::SecretsConfig)
      -> Option<Self>
    {   let project = std::env::var(&config.project_env)
          .ok()
          .filter(|p| !p.is_empty())?;
        Some(SecretManagerResolver::new(
          project
        , config.secret_manager_base.clone()
        , TokenSource::from_env(config)
        ))
    }

    pub fn project(&self) -> &str
    {   &self.project
    }

    /// Resource name of the latest version of `secret`
    pub fn secret_path(&self, secret: &str) -> String
    {   format!(
          "projects/{}/secrets/{}/versions/latest",
          self.project, secret
        )
    }

    async fn access_token(&self)
      -> Result<String, crate::error::Error>
    {   match &self.token_source
        {   TokenSource::Static(token) => Ok(token.clone())
          , TokenSource::Metadata { host } => {
              let url = format!("http://{}{}", host, METADATA_TOKEN_PATH);
              trace!("Fetching access token from {}", url);
              let response = self.http_client
                .get(&url)
                .header("Metadata-Flavor", "Google")
                .send()
                .await
                .map_err(|e| {
                  crate::error::Error::SecretBackend(
                    format!("metadata server unreachable: {}", e)
                  )
                })?;
              let status = response.status();
              if !status.is_success()
              {   return Err(crate::error::Error::SecretBackend(
                    format!("metadata server returned {}", status)
                  ));
              }
              let token: MetadataToken = response.json().await
                .map_err(|e| {
                  crate::error::Error::ParseError(e.to_string())
                })?;
              Ok(token.access_token)
            }
        }
    }

    /// Fetch and decode the latest version of `secret`
    pub async fn access(&self, secret: &str)
      -> Result<String, crate::error::Error>
    {   let token = self.access_token().await?;
        let url = format!(
          "{}/v1/{}:access",
          self.api_base.trim_end_matches('/'),
          self.secret_path(secret)
        );
        debug!("Accessing secret {}", self.secret_path(secret));

        let response = self.http_client
          .get(&url)
          .bearer_auth(token)
          .send()
          .await
          .map_err(|e| {
            error!("Secret Manager HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Secret Manager response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            return Err(crate::error::Error::ApiError
            {   status: status.as_u16()
              , message: error_text
            });
        }

        let body: AccessSecretVersionResponse = response.json().await
          .map_err(|e| {
            crate::error::Error::ParseError(e.to_string())
          })?;

        decode_payload(&body.payload.data)
    }
}

/// Base64 payload to UTF-8 text
fn decode_payload(data: &str) -> Result<String, crate::error::Error>
{   let bytes = base64::engine::general_purpose::STANDARD
      .decode(data)
      .map_err(|e| {
        crate::error::Error::SecretBackend(
          format!("payload is not base64: {}", e)
        )
      })?;
    String::from_utf8(bytes).map_err(|e| {
      crate::error::Error::SecretBackend(
        format!("payload is not UTF-8: {}", e)
      )
    })
}

#[async_trait::async_trait]
impl super::SecretResolver for SecretManagerResolver
{   fn name(&self) -> &str
    {   "secret-manager"
    }

    async fn resolve(&self, secret: &str) -> Option<String>
    {   match self.access(secret).await
        {   Ok(value) => Some(value)
          , Err(e) => {
              warn!("Failed to get secret from Secret Manager: {}", e);
              None
            }
        }
    }
}

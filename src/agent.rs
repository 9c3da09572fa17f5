//! The processing agent: credential at construction, JSON to markdown on demand

use std::fmt;
use std::path::Path;
use log::{debug, info, warn, error};
use serde_json::Value;

use crate::config::AgentConfig;
use crate::markdown;
use crate::providers::{CompletionProvider, OpenAiClient};
use crate::request::CompletionRequest;
use crate::secrets::{Credential, ResolverChain};

/// Outcome of a conversion; both variants are renderable markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion
{   /// Provider output, verbatim
    Markdown(String)
  , /// A diagnostic template embedding the input
    Diagnostic(String)
}

impl Conversion
{   pub fn as_str(&self) -> &str
    {   match self
        {   Conversion::Markdown(text) | Conversion::Diagnostic(text) => text
        }
    }

    pub fn into_text(self) -> String
    {   match self
        {   Conversion::Markdown(text) | Conversion::Diagnostic(text) => text
        }
    }

    pub fn is_diagnostic(&self) -> bool
    {   matches!(self, Conversion::Diagnostic(_))
    }
}

impl fmt::Display for Conversion
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}

enum Mode
{   Unconfigured
  , Configured(Box<dyn CompletionProvider>)
}

/// Converts JSON values to markdown through an LLM.
///
/// The mode is fixed when the agent is built: without a credential every
/// call returns the "integration unavailable" template.
pub struct ProcessingAgent
{   config: AgentConfig
  , mode: Mode
}

impl fmt::Debug for ProcessingAgent
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("ProcessingAgent")
          .field("model", &self.config.model)
          .field("configured", &self.is_configured())
          .finish()
    }
}

impl ProcessingAgent
{   /// Load `.env`, then resolve the credential with default settings
    pub async fn new() -> Self
    {   match dotenvy::dotenv()
        {   Ok(path) => debug!("Loaded environment from {}", path.display())
          , Err(e) => debug!("No .env loaded: {}", e)
        }
        ProcessingAgent::from_config(AgentConfig::default()).await
    }

    /// Resolve the credential through Secret Manager and the environment
    pub async fn from_config(config: AgentConfig) -> Self
    {   let chain = ResolverChain::from_config(&config.secrets);
        ProcessingAgent::with_resolvers(config, &chain).await
    }

    /// Resolve the credential through a caller-built chain
    pub async fn with_resolvers(
      config: AgentConfig
    , chain: &ResolverChain
    ) -> Self
    {   let credential = chain.resolve(&config.secrets.secret_name).await;
        ProcessingAgent::with_credential(config, credential)
    }

    /// Build from an already-resolved credential (or its absence)
    pub fn with_credential(
      config: AgentConfig
    , credential: Option<Credential>
    ) -> Self
    {   let Some(credential) = credential else
        {   warn!(
              "{} not found. Using fallback markdown conversion.",
              crate::secrets::env::env_var_name(&config.secrets.secret_name)
            );
            return ProcessingAgent::unconfigured(config);
        };

        match OpenAiClient::new(credential, &config.provider)
        {   Ok(client) => {
              info!("Processing agent configured with model {}", config.model);
              ProcessingAgent::with_provider(config, Box::new(client))
            }
          , Err(e) => {
              error!("Could not build completion client: {}", e);
              ProcessingAgent::unconfigured(config)
            }
        }
    }

    /// Use a specific completion backend
    pub fn with_provider(
      config: AgentConfig
    , provider: Box<dyn CompletionProvider>
    ) -> Self
    {   ProcessingAgent
        {   config
          , mode: Mode::Configured(provider)
        }
    }

    /// An agent that always returns the unavailable template
    pub fn unconfigured(config: AgentConfig) -> Self
    {   ProcessingAgent
        {   config
          , mode: Mode::Unconfigured
        }
    }

    pub fn is_configured(&self) -> bool
    {   matches!(self.mode, Mode::Configured(_))
    }

    pub fn config(&self) -> &AgentConfig
    {   &self.config
    }

    /// The request `convert` would send for `value`
    pub fn build_request(
      &self
    , value: &Value
    , instructions: Option<&str>
    ) -> CompletionRequest
    {   CompletionRequest
        {   model: self.config.model.clone()
          , system_message: instructions
              .unwrap_or(&self.config.default_instructions)
              .to_string()
          , prompt: markdown::pretty_json(value)
          , max_tokens: self.config.max_tokens
          , temperature: self.config.temperature
        }
    }

    /// Convert any JSON value; never fails
    pub async fn convert(
      &self
    , value: &Value
    , instructions: Option<&str>
    ) -> Conversion
    {   let provider = match &self.mode
        {   Mode::Unconfigured => {
              debug!("No credential, returning unavailable template");
              return Conversion::Diagnostic(markdown::unavailable(value));
            }
          , Mode::Configured(provider) => provider
        };

        let request = self.build_request(value, instructions);
        match provider.complete(&request).await
        {   Ok(text) => Conversion::Markdown(text)
          , Err(e) => {
              error!("Completion failed: {}", e);
              Conversion::Diagnostic(markdown::api_error(&e, value))
            }
        }
    }

    /// `convert`, flattened to text
    pub async fn json_to_markdown(
      &self
    , value: &Value
    , instructions: Option<&str>
    ) -> String
    {   self.convert(value, instructions).await.into_text()
    }

    /// Read JSON from `input`, convert, write markdown to `output`
    pub async fn try_process_file(
      &self
    , input: impl AsRef<Path>
    , output: impl AsRef<Path>
    , instructions: Option<&str>
    ) -> Result<Conversion, crate::error::Error>
    {   let input = input.as_ref();
        let output = output.as_ref();
        debug!("Processing {} -> {}", input.display(), output.display());

        let text = tokio::fs::read_to_string(input).await?;
        let value: Value = serde_json::from_str(&text)?;
        let conversion = self.convert(&value, instructions).await;
        tokio::fs::write(output, conversion.as_str()).await?;
        Ok(conversion)
    }

    /// `try_process_file` as a success flag; diagnostics still count as success
    pub async fn process_file(
      &self
    , input: impl AsRef<Path>
    , output: impl AsRef<Path>
    , instructions: Option<&str>
    ) -> bool
    {   match self.try_process_file(input, output, instructions).await
        {   Ok(_) => true
          , Err(e) => {
              error!("Error processing file: {}", e);
              false
            }
        }
    }
}

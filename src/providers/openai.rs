use std::fmt;
use std::time::Duration;
use log::{debug, trace, error};

use crate::request::{ChatResponse, CompletionRequest, ErrorResponse};
use crate::secrets::Credential;

pub const OPENAI_API_BASE: &str
  = "https://api.openai.com/v1";

/// OpenAI-compatible chat completions client
pub struct OpenAiClient
{   credential: Credential
  , api_base: String
  , http_client: reqwest::Client
}

impl fmt::Debug for OpenAiClient
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("OpenAiClient")
          .field("api_base", &self.api_base)
          .field("credential", &self.credential)
          .finish()
    }
}

impl OpenAiClient
{   /// Create a client for the given credential
    pub fn new(
      credential: Credential
    , config: &crate::config::ProviderConfig
    ) -> Result<Self, crate::error::Error>
    {   let api_base = config.api_base
          .clone()
          .unwrap_or_else(|| OPENAI_API_BASE.to_string());
        debug!("Creating OpenAiClient for {}", api_base);

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })?;

        Ok(OpenAiClient
        {   credential
          , api_base
          , http_client
        })
    }

    pub fn api_base(&self) -> &str
    {   &self.api_base
    }

    fn endpoint(&self) -> String
    {   format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl super::CompletionProvider for OpenAiClient
{   async fn complete(
      &self
    , request: &CompletionRequest
    ) -> Result<String, crate::error::Error>
    {   debug!("Sending completion for model: {}", request.model);

        let body = request.to_chat_request();
        trace!("OpenAI request: {:?}", body);

        let response = self.http_client
          .post(self.endpoint())
          .header(
            "Authorization"
          , format!("Bearer {}", self.credential.expose())
          )
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("OpenAI response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
              .map(|e| e.describe())
              .unwrap_or(error_text);
            error!("OpenAI API error {}: {}", status, message);
            return Err(crate::error::Error::ApiError
            {   status: status.as_u16()
              , message
            });
        }

        let chat_response: ChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        let choice = chat_response.choices
          .into_iter()
          .next()
          .ok_or_else(|| {
            error!("No choices in response");
            crate::error::Error::NoChoicesInResponse
          })?;

        if let Some(reason) = &choice.finish_reason
        {   debug!("Completion finished: {}", reason);
        }

        choice.message.content.ok_or_else(|| {
          error!("Completion carried no content");
          crate::error::Error::EmptyCompletion
        })
    }
}

//! Completion request types and OpenAI-compatible wire format

use serde::{Deserialize, Serialize};

/// Provider-neutral completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   /// Model name
    pub model: String
  , /// System instruction
    pub system_message: String
  , /// User message (the serialized JSON payload)
    pub prompt: String
  , /// Max tokens to generate
    pub max_tokens: usize
  , /// Temperature for sampling
    pub temperature: f32
}

impl CompletionRequest
{   /// Map onto the chat-completions wire body
    pub fn to_chat_request(&self) -> ChatRequest
    {   ChatRequest
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "system".to_string()
                , content: Some(self.system_message.clone())
              }
            , ChatMessage
              {   role: "user".to_string()
                , content: Some(self.prompt.clone())
              }
            ]
          , max_tokens: Some(self.max_tokens)
          , temperature: Some(self.temperature)
          , stream: Some(false)
        }
    }
}

// ===== Wire Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , /// Null when the model produced no text
    pub content: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , pub finish_reason: Option<String>
}

/// Error body returned by OpenAI-compatible APIs
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse
{   pub error: ErrorDetail
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail
{   pub message: String
  , #[serde(default, rename = "type")]
    pub kind: Option<String>
}

impl ErrorResponse
{   /// `message (kind)`, or just the message when no kind was sent
    pub fn describe(&self) -> String
    {   match &self.error.kind
        {   Some(kind) => format!("{} ({})", self.error.message, kind)
          , None => self.error.message.clone()
        }
    }
}

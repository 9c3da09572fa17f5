use std::fmt;

/// Error type for reportmd operations.
/// Implements Clone so failures can be embedded in diagnostics
/// and handed around without ownership games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// HTTP transport error
    HttpError(String)
  , /// API returned a non-success status
    ApiError
    {   status: u16
      , message: String
    }
  , /// Failed to parse an API response
    ParseError(String)
  , /// No choices in completion response
    NoChoicesInResponse
  , /// First choice carried no message content
    EmptyCompletion
  , /// Secret backend lookup failed
    SecretBackend(String)
  , /// Filesystem error
    Io(String)
  , /// Invalid JSON input
    Json(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Timeout error
    Timeout
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError { status, message } => {
              write!(f, "API error ({}): {}", status, message)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::EmptyCompletion => {
              write!(f, "API response contained no message content")
            }
          , Error::SecretBackend(msg) => {
              write!(f, "Secret backend error: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::Json(msg) => {
              write!(f, "Invalid JSON: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Json(e.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

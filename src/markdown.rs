//! Fixed diagnostic templates shown when no real conversion happened

use serde_json::Value;

pub const UNAVAILABLE_MARKER: &str = "⚠️ OpenAI Integration Not Available";
pub const API_ERROR_MARKER: &str = "❌ OpenAI API Error";
pub const RAW_DATA_LABEL: &str = "**Raw Data:**";

/// Two-space indented JSON, the form embedded in prompts and diagnostics
pub fn pretty_json(value: &Value) -> String
{   // Serializing a Value cannot fail: keys are always strings
    serde_json::to_string_pretty(value)
      .unwrap_or_else(|_| value.to_string())
}

/// Shown when no credential was resolved at construction
pub fn unavailable(value: &Value) -> String
{   format!(
r#"
# {marker}

The OpenAI API integration is not configured properly. This could be due to:

- Missing API key in environment variables or Google Secret Manager
- Incorrect secret name in Secret Manager
- Network connectivity issues

{raw}
```json
{json}
```

To fix this, ensure:
1. Your OpenAI API key is properly set in the environment
2. For production: The secret `openai-api-key` exists in Google Secret Manager
3. For local development: The `OPENAI_API_KEY` is set in your `.env` file
"#,
      marker = UNAVAILABLE_MARKER,
      raw = RAW_DATA_LABEL,
      json = pretty_json(value),
    )
}

/// Shown when the completion call failed
pub fn api_error(error: &crate::error::Error, value: &Value) -> String
{   format!(
r#"
# {marker}

Failed to process data with OpenAI API: {error}

This might be due to:
- API rate limits or quota exceeded
- Network connectivity issues
- Invalid API key or model access

{raw}
```json
{json}
```

Please check your OpenAI API configuration and try again.
"#,
      marker = API_ERROR_MARKER,
      error = error,
      raw = RAW_DATA_LABEL,
      json = pretty_json(value),
    )
}

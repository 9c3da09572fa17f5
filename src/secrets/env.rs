use log::trace;

/// Derive the env var name for a secret: `openai-api-key` -> `OPENAI_API_KEY`
pub fn env_var_name(secret: &str) -> String
{   secret.to_uppercase().replace('-', "_")
}

/// Reads secrets from process environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvResolver;

impl EnvResolver
{   pub fn new() -> Self
    {   EnvResolver
    }
}

#[async_trait::async_trait]
impl super::SecretResolver for EnvResolver
{   fn name(&self) -> &str
    {   "environment"
    }

    async fn resolve(&self, secret: &str) -> Option<String>
    {   let var = env_var_name(secret);
        trace!("Looking up env var {}", var);
        std::env::var(var).ok()
    }
}

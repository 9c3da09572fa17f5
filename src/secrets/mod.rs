//! Layered credential resolution
//!
//! A [`ResolverChain`] asks each [`SecretResolver`] in order and keeps the
//! first non-empty value. Resolvers never fail outward: a backend that
//! errors is logged and treated as having nothing.

use std::fmt;
use log::{debug, info};

pub mod env;
pub mod gcp;

pub use env::EnvResolver;
pub use gcp::{SecretManagerResolver, TokenSource};

/// An API credential plus the name of the resolver that produced it
#[derive(Clone, PartialEq, Eq)]
pub struct Credential
{   value: String
  , source: String
}

impl Credential
{   pub fn new(
      value: impl Into<String>
    , source: impl Into<String>
    ) -> Self
    {   Credential
        {   value: value.into()
          , source: source.into()
        }
    }

    /// The raw token, for building auth headers
    pub fn expose(&self) -> &str
    {   &self.value
    }

    /// Which resolver supplied this credential
    pub fn source(&self) -> &str
    {   &self.source
    }
}

impl fmt::Debug for Credential
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("Credential")
          .field("value", &"<redacted>")
          .field("source", &self.source)
          .finish()
    }
}

/// One source of secrets
#[async_trait::async_trait]
pub trait SecretResolver: Send + Sync
{   /// Short label used in logs and [`Credential::source`]
    fn name(&self) -> &str;

    /// Look up `secret`; `None` on absence or any failure
    async fn resolve(&self, secret: &str) -> Option<String>;
}

/// Ordered resolver sequence
pub struct ResolverChain
{   resolvers: Vec<Box<dyn SecretResolver>>
}

impl ResolverChain
{   pub fn new(resolvers: Vec<Box<dyn SecretResolver>>) -> Self
    {   debug!(
          "Creating resolver chain with {} resolvers",
          resolvers.len()
        );
        ResolverChain { resolvers }
    }

    /// Secret Manager when a project is configured, then the environment
    pub fn from_config(config: &crate::config::SecretsConfig) -> Self
    {   let mut resolvers: Vec<Box<dyn SecretResolver>> = Vec::new();
        match SecretManagerResolver::from_env(config)
        {   Some(resolver) => resolvers.push(Box::new(resolver))
          , None => {
              debug!(
                "{} not set, skipping Secret Manager",
                config.project_env
              );
            }
        }
        resolvers.push(Box::new(EnvResolver::new()));
        ResolverChain::new(resolvers)
    }

    pub fn len(&self) -> usize
    {   self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.resolvers.is_empty()
    }

    /// Labels of the resolvers, in lookup order
    pub fn names(&self) -> Vec<&str>
    {   self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// First non-empty value wins
    pub async fn resolve(&self, secret: &str) -> Option<Credential>
    {   for resolver in &self.resolvers
        {   match resolver.resolve(secret).await
            {   Some(value) if !value.is_empty() => {
                  info!(
                    "Resolved secret {} from {}",
                    secret, resolver.name()
                  );
                  return Some(Credential::new(value, resolver.name()));
                }
              , Some(_) => {
                  debug!(
                    "{} returned an empty value for {}",
                    resolver.name(), secret
                  );
                }
              , None => {
                  debug!("{} has no value for {}", resolver.name(), secret);
                }
            }
        }
        debug!("Secret {} not found in any source", secret);
        None
    }
}

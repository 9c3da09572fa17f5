use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reportmd::config::SecretsConfig;
use reportmd::secrets::{EnvResolver, SecretManagerResolver, TokenSource};
use reportmd::{AgentConfig, ProcessingAgent, ResolverChain, SecretResolver};

const SECRET_PATH: &str
  = "/v1/projects/test-project/secrets/openai-api-key/versions/latest:access";
const METADATA_PATH: &str
  = "/computeMetadata/v1/instance/service-accounts/default/token";

fn static_resolver(server: &MockServer) -> SecretManagerResolver
{   SecretManagerResolver::new(
      "test-project"
    , Some(server.uri())
    , TokenSource::Static("static-token".to_string())
    )
}

#[tokio::test]
async fn test_get_secret_from_secret_manager()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path(SECRET_PATH))
      .and(header("Authorization", "Bearer static-token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "name": "projects/test-project/secrets/openai-api-key/versions/3",
        "payload": {"data": "c2VjcmV0LWFwaS1rZXk="}
      })))
      .expect(1)
      .mount(&server)
      .await;

    let value = static_resolver(&server).resolve("openai-api-key").await;

    assert_eq!(value.as_deref(), Some("secret-api-key"));
}

#[tokio::test]
async fn test_token_from_metadata_server()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path(METADATA_PATH))
      .and(header("Metadata-Flavor", "Google"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "meta-token",
        "expires_in": 3599,
        "token_type": "Bearer"
      })))
      .expect(1)
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path(SECRET_PATH))
      .and(header("Authorization", "Bearer meta-token"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "payload": {"data": "c2VjcmV0LWFwaS1rZXk="}
      })))
      .expect(1)
      .mount(&server)
      .await;

    let resolver = SecretManagerResolver::new(
      "test-project"
    , Some(server.uri())
    , TokenSource::Metadata { host: server.address().to_string() }
    );

    assert_eq!(
      resolver.access("openai-api-key").await.unwrap()
    , "secret-api-key"
    );
}

#[tokio::test]
async fn test_permission_denied_is_absence()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path(SECRET_PATH))
      .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
      .mount(&server)
      .await;

    let resolver = static_resolver(&server);

    assert!(matches!(
      resolver.access("openai-api-key").await
    , Err(reportmd::Error::ApiError { status: 403, .. })
    ));
    assert!(resolver.resolve("openai-api-key").await.is_none());
}

#[tokio::test]
async fn test_undecodable_payload_is_absence()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path(SECRET_PATH))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "payload": {"data": "%%%"}
      })))
      .mount(&server)
      .await;

    assert!(static_resolver(&server).resolve("openai-api-key").await.is_none());
}

#[tokio::test]
#[serial]
async fn test_backend_failure_falls_back_to_env()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    std::env::set_var("REPORTMD_FALLBACK_TEST_KEY", "fallback-key");
    let resolvers: Vec<Box<dyn SecretResolver>> = vec![
      Box::new(static_resolver(&server))
    , Box::new(EnvResolver::new())
    ];
    let chain = ResolverChain::new(resolvers);
    let credential = chain.resolve("reportmd-fallback-test-key").await;
    std::env::remove_var("REPORTMD_FALLBACK_TEST_KEY");

    let credential = credential.unwrap();
    assert_eq!(credential.expose(), "fallback-key");
    assert_eq!(credential.source(), "environment");
}

#[tokio::test]
#[serial]
async fn test_secret_manager_wins_over_env()
{   let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path(
        "/v1/projects/test-project/secrets/reportmd-priority-key/versions/latest:access"
      ))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "payload": {"data": "c2VjcmV0LWFwaS1rZXk="}
      })))
      .mount(&server)
      .await;

    std::env::set_var("REPORTMD_PRIORITY_KEY", "env-key");
    let resolvers: Vec<Box<dyn SecretResolver>> = vec![
      Box::new(static_resolver(&server))
    , Box::new(EnvResolver::new())
    ];
    let chain = ResolverChain::new(resolvers);
    let credential = chain.resolve("reportmd-priority-key").await;
    std::env::remove_var("REPORTMD_PRIORITY_KEY");

    let credential = credential.unwrap();
    assert_eq!(credential.expose(), "secret-api-key");
    assert_eq!(credential.source(), "secret-manager");
}

// ===== Default chain, process environment =====

#[tokio::test]
#[serial]
async fn test_env_key_resolves_without_backend()
{   std::env::remove_var("GCP_PROJECT_ID");
    std::env::set_var("OPENAI_API_KEY", "X");

    let chain = ResolverChain::from_config(&SecretsConfig::default());
    let credential = chain.resolve("openai-api-key").await;
    std::env::remove_var("OPENAI_API_KEY");

    assert_eq!(chain.names(), vec!["environment"]);
    assert_eq!(credential.unwrap().expose(), "X");
}

#[tokio::test]
#[serial]
async fn test_nothing_configured_is_absence()
{   std::env::remove_var("GCP_PROJECT_ID");
    std::env::remove_var("OPENAI_API_KEY");

    let chain = ResolverChain::from_config(&SecretsConfig::default());

    assert!(chain.resolve("openai-api-key").await.is_none());
}

#[tokio::test]
#[serial]
async fn test_project_env_adds_secret_manager()
{   std::env::set_var("GCP_PROJECT_ID", "test-project");
    let chain = ResolverChain::from_config(&SecretsConfig::default());
    std::env::remove_var("GCP_PROJECT_ID");

    assert_eq!(chain.names(), vec!["secret-manager", "environment"]);
}

#[tokio::test]
#[serial]
async fn test_agent_configuration_follows_env()
{   std::env::remove_var("GCP_PROJECT_ID");

    std::env::set_var("OPENAI_API_KEY", "test-key-123");
    let configured = ProcessingAgent::from_config(AgentConfig::default()).await;
    std::env::remove_var("OPENAI_API_KEY");
    let unconfigured = ProcessingAgent::from_config(AgentConfig::default()).await;

    assert!(configured.is_configured());
    assert_eq!(configured.config().model, "gpt-4o-mini");
    assert!(!unconfigured.is_configured());
}

//! reportmd: render JSON report data as markdown through an LLM.
//!
//! The [`ProcessingAgent`] resolves its credential once (Google Secret
//! Manager when a project is configured, then the environment) and turns
//! any JSON value into markdown. Without a credential, or when the
//! completion call fails, it returns a diagnostic template that embeds the
//! input instead of an error.
//!
//! ```no_run
//! # async fn demo() {
//! let agent = reportmd::ProcessingAgent::new().await;
//! let text = agent
//!   .json_to_markdown(&serde_json::json!({"revenue": 10}), None)
//!   .await;
//! println!("{}", text);
//! # }
//! ```

/*

reportmd/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and crate docs
│   ├── main.rs         # reportmd CLI
│   ├── error.rs        # Error type
│   ├── config.rs       # Agent, provider and secret settings
│   ├── agent.rs        # ProcessingAgent and Conversion
│   ├── markdown.rs     # Diagnostic templates
│   ├── request.rs      # Completion request and wire types
│   ├── report.rs       # filters.json / reports.json selection
│   ├── providers/      # Completion backends
│   │   ├── mod.rs
│   │   └── openai.rs
│   └── secrets/        # Layered credential lookup
│       ├── mod.rs
│       ├── env.rs
│       └── gcp.rs
└── tests/

*/

pub mod error;
pub mod config;
pub mod markdown;
pub mod request;
pub mod providers;
pub mod secrets;
pub mod agent;
pub mod report;

pub use agent::{Conversion, ProcessingAgent};
pub use config::AgentConfig;
pub use error::Error;
pub use providers::CompletionProvider;
pub use secrets::{Credential, ResolverChain, SecretResolver};

//! # advisor-client
//!
//! Async client for the AI Academic Advisor backend. It covers the data layer
//! behind every dashboard page: a fetch wrapper with a hard timeout, a capped
//! exponential retry policy, schema-tolerant parsing, and a generic
//! three-state page loader.
//!
//! ## Quick Start
//!
//! ```no_run
//! use advisor_client::{AdvisorApiClient, Config, PageContext, PageLoadState};
//! use advisor_client::pages::RoadmapPage;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load configuration from config.toml
//! let config = Config::new()?;
//!
//! // Career and country are passed in explicitly
//! let context = PageContext::new().with_career("Software Engineer");
//! let client = AdvisorApiClient::new(config).with_context(context);
//!
//! let roadmap = client.page(RoadmapPage);
//! match roadmap.load().await {
//!     PageLoadState::Loaded(steps) => println!("{} steps", steps.len()),
//!     PageLoadState::Failed(message) => eprintln!("{message}"),
//!     PageLoadState::Loading => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Create a `config.toml` file; every key is optional:
//!
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:5000"
//! timeout_ms = 10000
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 1000
//! max_delay_ms = 10000
//!
//! [session]
//! path = ".advisor-session.json"
//! ```
//!
//! ## Failure handling
//!
//! - Missing inputs (no career selected, not logged in) fail immediately
//!   without touching the network.
//! - Timeouts, transport errors and non-2xx responses are retried with delays
//!   of 1s, 2s and 4s (capped at 10s), then surfaced with a readable message.
//! - Payloads of an unexpected shape load as empty data and log a warning.
//! - Account calls never resend on a 4xx, and calls that change server state
//!   (registration, photo, password) are sent once. A rejection reports the
//!   server's own `error`/`message` text.

pub mod api_client;
pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod notify;
pub mod pages;
pub mod retry;
pub mod schema;
pub mod validation;
pub mod view;

// Re-export commonly used types at the crate root
pub use api_client::AdvisorApiClient;
pub use config::Config;
pub use context::{CountryDefault, KeyValueStore, PageContext};
pub use error::LoadError;
pub use fetch::{Fetch, FetchError, FetchRequest, FetchResponse, FailureKind, HttpFetcher};
pub use loader::{PageLoadState, PageLoader, PageSource};
pub use notify::{Notification, Notifier};
pub use retry::{RetryConfig, RetryPolicy};

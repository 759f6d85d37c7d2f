//! Generic three-state page loader.
//!
//! Every dashboard page follows the same lifecycle: go to `Loading`, check its
//! inputs, fetch through the retry policy, parse leniently, and settle in
//! `Loaded` or `Failed`. [`PageSource`] captures what differs between pages;
//! [`PageLoader`] is the part they share.

use crate::config::ApiConfig;
use crate::context::PageContext;
use crate::error::LoadError;
use crate::fetch::{Fetch, FetchRequest};
use crate::notify::Notifier;
use crate::retry::RetryPolicy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoadState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> PageLoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PageLoadState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            PageLoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PageLoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: &PageLoadState<T>) -> bool {
        matches!(
            (self, next),
            (PageLoadState::Loading, PageLoadState::Loaded(_))
                | (PageLoadState::Loading, PageLoadState::Failed(_))
                | (PageLoadState::Failed(_), PageLoadState::Loading)
                | (PageLoadState::Loaded(_), PageLoadState::Loading)
                | (PageLoadState::Loading, PageLoadState::Loading)
        )
    }
}

/// Shared, observable page state.
#[derive(Clone)]
pub struct StateCell<T> {
    state: Arc<RwLock<PageLoadState<T>>>,
    last_loaded: Arc<RwLock<Option<Instant>>>,
    load_count: Arc<RwLock<u32>>,
}

impl<T: Clone> StateCell<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(PageLoadState::Loading)),
            last_loaded: Arc::new(RwLock::new(None)),
            load_count: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn get_state(&self) -> PageLoadState<T> {
        self.state.read().await.clone()
    }

    /// Apply a transition; illegal ones are logged and ignored.
    pub async fn set_state(&self, new_state: PageLoadState<T>) -> bool {
        let mut state = self.state.write().await;

        if !state.can_transition_to(&new_state) {
            warn!("Ignoring illegal page state transition");
            return false;
        }

        match &new_state {
            PageLoadState::Loaded(_) => {
                *self.last_loaded.write().await = Some(Instant::now());
            }
            PageLoadState::Loading => {
                *self.load_count.write().await += 1;
            }
            PageLoadState::Failed(_) => {}
        }

        *state = new_state;
        true
    }

    /// Number of times the page entered `Loading`.
    pub async fn get_load_count(&self) -> u32 {
        *self.load_count.read().await
    }

    pub async fn is_loaded(&self) -> bool {
        matches!(*self.state.read().await, PageLoadState::Loaded(_))
    }

    pub async fn last_loaded_duration(&self) -> Option<std::time::Duration> {
        self.last_loaded
            .read()
            .await
            .map(|instant| instant.elapsed())
    }
}

impl<T: Clone> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cleared when the page goes away; late results are then discarded.
#[derive(Debug, Clone)]
pub struct ActiveGuard(Arc<AtomicBool>);

impl ActiveGuard {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn deactivate(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn activate(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Default for ActiveGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// What one dashboard page fetches and how it reads the answer.
pub trait PageSource: Send + Sync {
    type Data: Clone + Send + Sync;

    /// Human-readable name used in messages, e.g. "career roadmap".
    fn resource(&self) -> &'static str;

    /// Build the request, or fail fast when a required input is absent.
    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError>;

    /// Turn a successful body into view data. Never fails: payloads of the
    /// wrong shape become empty data.
    fn parse(&self, body: &str) -> Self::Data;
}

pub struct PageLoader<S: PageSource, F: Fetch> {
    source: S,
    fetcher: F,
    api: ApiConfig,
    context: PageContext,
    retry_policy: RetryPolicy,
    notifier: Notifier,
    state: StateCell<S::Data>,
    guard: ActiveGuard,
}

impl<S: PageSource, F: Fetch> PageLoader<S, F> {
    pub fn new(source: S, fetcher: F, api: ApiConfig, context: PageContext) -> Self {
        Self {
            source,
            fetcher,
            api,
            context,
            retry_policy: RetryPolicy::default(),
            notifier: Notifier::disabled(),
            state: StateCell::new(),
            guard: ActiveGuard::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> StateCell<S::Data> {
        self.state.clone()
    }

    pub fn guard(&self) -> ActiveGuard {
        self.guard.clone()
    }

    pub async fn current(&self) -> PageLoadState<S::Data> {
        self.state.get_state().await
    }

    /// Run the full load lifecycle and return the state it settled in.
    pub async fn load(&self) -> PageLoadState<S::Data> {
        let resource = self.source.resource();
        self.state.set_state(PageLoadState::Loading).await;

        let outcome = self.fetch_data().await;

        if !self.guard.is_active() {
            debug!("Discarding {} result: page no longer active", resource);
            return self.state.get_state().await;
        }

        let next = match outcome {
            Ok(data) => {
                info!("Loaded {}", resource);
                PageLoadState::Loaded(data)
            }
            Err(err) => {
                error!("Failed to load {}: {}", resource, err);
                if err.is_retryable() {
                    self.notifier.error(err.to_string());
                }
                PageLoadState::Failed(err.to_string())
            }
        };
        self.state.set_state(next.clone()).await;
        next
    }

    /// Start over with a fresh retry budget.
    pub async fn reload(&self) -> PageLoadState<S::Data> {
        info!("Reloading {}", self.source.resource());
        self.load().await
    }

    async fn fetch_data(&self) -> Result<S::Data, LoadError> {
        let request = self
            .source
            .request(&self.api, &self.context)?
            .with_timeout(self.api.timeout());
        request.header_map().map_err(LoadError::InvalidRequest)?;

        let response = self
            .retry_policy
            .retry(self.source.resource(), || self.fetcher.fetch(&request))
            .await?;

        Ok(self.source.parse(&response.body))
    }
}

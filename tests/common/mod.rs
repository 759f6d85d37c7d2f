#![allow(dead_code)]

use advisor_client::config::ApiConfig;
use advisor_client::fetch::{Fetch, FetchError, FetchOutcome, FetchRequest, FetchResponse};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Replays canned outcomes and records every request it sees.
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<FetchOutcome>>,
    fallback: Option<FetchOutcome>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<FetchOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Answer every call with the same outcome.
    pub fn always(outcome: FetchOutcome) -> Self {
        Self {
            fallback: Some(outcome),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Fetch for ScriptedFetcher {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = FetchOutcome> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(request.url.clone());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Err(FetchError::network("script exhausted")));
        async move { outcome }
    }
}

pub fn ok(body: &str) -> FetchOutcome {
    Ok(FetchResponse {
        status_code: 200,
        body: body.to_string(),
    })
}

pub fn test_api() -> ApiConfig {
    ApiConfig {
        base_url: "http://advisor.test".to_string(),
        timeout_ms: 1000,
    }
}

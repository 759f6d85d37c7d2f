use crate::config::Config;
use crate::context::PageContext;
use crate::dto::*;
use crate::error::LoadError;
use crate::fetch::{Fetch, FetchError, FetchRequest, HttpFetcher};
use crate::loader::{PageLoader, PageSource};
use crate::notify::Notifier;
use crate::retry::RetryPolicy;
use crate::schema::extract_object;
use crate::validation::{validate_email, validate_password, validate_registration};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Whether a one-shot POST may be repeated after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Safe to resend: transport failures and 5xx are retried, 4xx are not.
    Idempotent,
    /// Changes server state; sent exactly once.
    Once,
}

impl Delivery {
    fn should_retry(self, err: &FetchError) -> bool {
        match self {
            Delivery::Idempotent => !err.is_client_error(),
            Delivery::Once => false,
        }
    }
}

/// Client for the advisor backend: page loaders plus the one-shot account calls.
pub struct AdvisorApiClient<F: Fetch = HttpFetcher> {
    fetcher: F,
    config: Arc<Config>,
    context: PageContext,
    retry_policy: RetryPolicy,
    notifier: Notifier,
}

impl AdvisorApiClient<HttpFetcher> {
    pub fn new(config: Config) -> Self {
        Self::with_fetcher(config, HttpFetcher::new())
    }
}

impl<F: Fetch> AdvisorApiClient<F> {
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        let retry_policy = RetryPolicy::new(config.retry_config());
        Self {
            fetcher,
            config: Arc::new(config),
            context: PageContext::default(),
            retry_policy,
            notifier: Notifier::disabled(),
        }
    }

    pub fn with_context(mut self, context: PageContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.retry_policy = self.retry_policy.with_notifier(notifier.clone());
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut PageContext {
        &mut self.context
    }

    /// Get current session token
    pub fn get_session_token(&self) -> Option<String> {
        self.context.session_token.clone()
    }

    /// Set session token (useful for restoring sessions)
    pub fn set_session_token(&mut self, token: String) {
        self.context.session_token = Some(token);
    }

    /// A loader for `source`, bound to this client's fetcher and a snapshot of
    /// its context.
    pub fn page<S: PageSource>(&self, source: S) -> PageLoader<S, &F> {
        PageLoader::new(
            source,
            &self.fetcher,
            self.config.api.clone(),
            self.context.clone(),
        )
        .with_retry_policy(self.retry_policy.clone())
        .with_notifier(self.notifier.clone())
    }

    async fn post_json<T: Serialize>(
        &self,
        resource: &str,
        path: &str,
        payload: &T,
        delivery: Delivery,
    ) -> Result<String, LoadError> {
        let body = serde_json::to_value(payload)
            .map_err(|err| LoadError::InvalidRequest(err.to_string()))?;
        let request = FetchRequest::post(self.config.api.endpoint(path), body)
            .with_bearer(self.context.session_token.as_deref())
            .with_timeout(self.config.api.timeout());
        request.header_map().map_err(LoadError::InvalidRequest)?;

        let result = self
            .retry_policy
            .retry_if(
                resource,
                || self.fetcher.fetch(&request),
                |err| delivery.should_retry(err),
            )
            .await;

        match result {
            Ok(response) => {
                debug!("{} response: {}", resource, response.body);
                Ok(response.body)
            }
            Err(err) => {
                let err = Self::rejection(err);
                self.notifier.error(err.to_string());
                Err(err)
            }
        }
    }

    /// Prefer the server's own `{error|message}` text over the generic one.
    fn rejection(err: FetchError) -> LoadError {
        let (Some(status), Some(body)) = (err.status_code, err.body.as_deref()) else {
            return err.into();
        };
        let reply: ApiMessage = extract_object(body, None).unwrap_or_default();
        match reply.error.or(reply.message) {
            Some(message) if !message.trim().is_empty() => LoadError::Rejected { status, message },
            _ => err.into(),
        }
    }

    fn message_of(body: &str) -> ApiMessage {
        extract_object(body, None).unwrap_or_default()
    }

    // ========================================================================
    // Account Operations
    // ========================================================================

    /// Log in and record the session in the client's context.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginResponse, LoadError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(LoadError::Validation("Password is required".to_string()));
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let body = self
            .post_json("login", "/api/login", &request, Delivery::Idempotent)
            .await?;
        let response: LoginResponse = extract_object(&body, None).unwrap_or_default();

        if let Some(token) = &response.token {
            let email = response.email.clone().unwrap_or(request.email);
            info!("Logged in as {}", email);
            self.notifier.info(format!("Logged in as {email}"));
            self.context.session_token = Some(token.clone());
            self.context.user_email = Some(email);
            self.context.user_id = response.user_id();
        }

        Ok(response)
    }

    pub fn logout(&mut self) {
        self.context.session_token = None;
        self.context.user_id = None;
        self.context.user_email = None;
    }

    pub async fn submit_registration(
        &self,
        request: &RegistrationRequest,
    ) -> Result<ApiMessage, LoadError> {
        validate_registration(request)?;
        let body = self
            .post_json("registration", "/api/submit_registration", request, Delivery::Once)
            .await?;
        Ok(Self::message_of(&body))
    }

    pub async fn update_settings(&self, settings: &UserSettings) -> Result<ApiMessage, LoadError> {
        if let Some(email) = &settings.email {
            validate_email(email)?;
        }
        let body = self
            .post_json("settings", "/api/update_setting", settings, Delivery::Idempotent)
            .await?;
        Ok(Self::message_of(&body))
    }

    pub async fn upload_photo(&self, upload: &PhotoUpload) -> Result<ApiMessage, LoadError> {
        if !upload.data_url.starts_with("data:image/") {
            return Err(LoadError::Validation(
                "Please choose an image file".to_string(),
            ));
        }
        let body = self
            .post_json("profile photo", "/api/upload_photo", upload, Delivery::Once)
            .await?;
        Ok(Self::message_of(&body))
    }

    pub async fn update_password(&self, update: &PasswordUpdate) -> Result<ApiMessage, LoadError> {
        validate_password(&update.new_password)?;
        if update.new_password == update.current_password {
            return Err(LoadError::Validation(
                "New password must differ from the current one".to_string(),
            ));
        }
        let body = self
            .post_json("password", "/api/update_password", update, Delivery::Once)
            .await?;
        Ok(Self::message_of(&body))
    }
}

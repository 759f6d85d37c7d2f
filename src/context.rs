//! Explicit page context.
//!
//! Pages never read a global store directly. The caller builds a
//! [`PageContext`], either by hand or from a [`KeyValueStore`], and hands it to
//! the loader.

use crate::error::LoadError;
use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

pub const CAREER_TARGET_KEY: &str = "careerTarget";
pub const COUNTRY_KEY: &str = "selectedCountry";
pub const USER_EMAIL_KEY: &str = "userEmail";
pub const USER_ID_KEY: &str = "userId";
pub const TOKEN_KEY: &str = "token";

pub const NO_CAREER_MESSAGE: &str =
    "No career target found. Please select a career target to continue.";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// A JSON object on disk; the CLI's session between invocations.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> HashMap<String, String> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!("Ignoring unreadable session file {:?}: {}", self.path, err);
            HashMap::new()
        })
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        debug!("Session saved to {:?}", self.path);
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_all();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// How a page fills in the country when none was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryDefault {
    Empty,
    Usa,
}

impl CountryDefault {
    pub fn value(self) -> &'static str {
        match self {
            CountryDefault::Empty => "",
            CountryDefault::Usa => "USA",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub career_target: Option<String>,
    pub country: Option<String>,
    pub user_email: Option<String>,
    pub user_id: Option<String>,
    pub session_token: Option<String>,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_career(mut self, career: impl Into<String>) -> Self {
        self.career_target = Some(career.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn from_store(store: &dyn KeyValueStore) -> Self {
        Self {
            career_target: store.get(CAREER_TARGET_KEY),
            country: store.get(COUNTRY_KEY),
            user_email: store.get(USER_EMAIL_KEY),
            user_id: store.get(USER_ID_KEY),
            session_token: store.get(TOKEN_KEY),
        }
    }

    pub fn save_to(&self, store: &dyn KeyValueStore) -> Result<()> {
        let fields = [
            (CAREER_TARGET_KEY, &self.career_target),
            (COUNTRY_KEY, &self.country),
            (USER_EMAIL_KEY, &self.user_email),
            (USER_ID_KEY, &self.user_id),
            (TOKEN_KEY, &self.session_token),
        ];
        for (key, value) in fields {
            match value {
                Some(value) => store.set(key, value)?,
                None => store.remove(key)?,
            }
        }
        Ok(())
    }

    /// The selected career, rejecting blank values.
    pub fn require_career(&self) -> Result<&str, LoadError> {
        self.career_target
            .as_deref()
            .map(str::trim)
            .filter(|career| !career.is_empty())
            .ok_or_else(|| LoadError::PreconditionMissing(NO_CAREER_MESSAGE.to_string()))
    }

    pub fn require_email(&self) -> Result<&str, LoadError> {
        self.user_email
            .as_deref()
            .filter(|email| !email.is_empty())
            .ok_or_else(|| {
                LoadError::PreconditionMissing(
                    "No signed-in user found. Please log in to continue.".to_string(),
                )
            })
    }

    pub fn require_token(&self) -> Result<&str, LoadError> {
        self.session_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                LoadError::PreconditionMissing(
                    "Session expired. Please log in again.".to_string(),
                )
            })
    }

    pub fn country_or(&self, default: CountryDefault) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() => country.to_string(),
            _ => default.value().to_string(),
        }
    }
}

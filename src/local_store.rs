//! Local key/value persistence for data that outlives one clerking session.
//!
//! One JSON object on disk, rewritten whole on every write. A missing file
//! is an empty store.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config;
use crate::models::LocationInfo;

pub const STORE_FILE_NAME: &str = "local_store.json";

pub const KEY_USER_EMAIL: &str = "userEmail";
pub const KEY_PREVIOUS_CASES: &str = "previousCases";
pub const KEY_LOCATION_INFO: &str = "locationInfo";
pub const KEY_ONBOARDING_COMPLETE: &str = "onboardingComplete";

/// Number of recent diagnoses fed back into case generation.
pub const RECENT_CASES_WINDOW: usize = 10;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Local store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Local store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct LocalStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl LocalStore {
    /// Open the store at its default location under the app data dir.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(config::app_data_dir().join(STORE_FILE_NAME))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Map::new()
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened local store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed read. A value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed local store value");
                None
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        self.entries
            .insert(key.to_string(), serde_json::to_value(value)?);
        self.flush()
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    // ── Typed accessors ─────────────────────────────────────

    pub fn user_email(&self) -> Option<String> {
        self.get(KEY_USER_EMAIL)
    }

    pub fn set_user_email(&mut self, email: &str) -> Result<(), StoreError> {
        self.set(KEY_USER_EMAIL, &email)
    }

    pub fn clear_user_email(&mut self) -> Result<(), StoreError> {
        self.remove(KEY_USER_EMAIL)
    }

    /// Every diagnosis seen so far, oldest first.
    pub fn previous_cases(&self) -> Vec<String> {
        self.get(KEY_PREVIOUS_CASES).unwrap_or_default()
    }

    /// The last [`RECENT_CASES_WINDOW`] diagnoses, oldest first.
    pub fn recent_cases(&self) -> Vec<String> {
        let all = self.previous_cases();
        let start = all.len().saturating_sub(RECENT_CASES_WINDOW);
        all[start..].to_vec()
    }

    pub fn record_case(&mut self, diagnosis: &str) -> Result<(), StoreError> {
        let mut cases = self.previous_cases();
        cases.push(diagnosis.to_string());
        self.set(KEY_PREVIOUS_CASES, &cases)
    }

    pub fn location(&self) -> Option<LocationInfo> {
        self.get(KEY_LOCATION_INFO)
    }

    pub fn set_location(&mut self, location: &LocationInfo) -> Result<(), StoreError> {
        self.set(KEY_LOCATION_INFO, location)
    }

    pub fn onboarding_complete(&self) -> bool {
        self.get(KEY_ONBOARDING_COMPLETE).unwrap_or(false)
    }

    pub fn set_onboarding_complete(&mut self) -> Result<(), StoreError> {
        self.set(KEY_ONBOARDING_COMPLETE, &true)
    }
}

//! Workflow settings and credential storage.
//!
//! Plain settings live in the key/value store under the `"settings"` key.
//! Passwords go to the operating system's native credential storage
//! (Keychain, Credential Manager, Secret Service) via the `secrets` feature,
//! keyed by the workflow name as the service.

use std::collections::HashMap;

#[cfg(feature = "secrets")]
use keyring::Entry;
#[cfg(feature = "secrets")]
use zeroize::Zeroize;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
#[cfg(feature = "secrets")]
use crate::error::Error;
use crate::storage::SharedStorage;

/// Storage key holding the settings map.
const SETTINGS_KEY: &str = "settings";

/// Arbitrary key/value settings for a workflow, plus OS-keychain passwords.
#[derive(Debug, Clone)]
pub struct Settings {
    storage: SharedStorage,
    /// Keychain service name; usually the workflow name
    service: String,
}

impl Settings {
    /// Create settings over a shared store, using `service` as the keychain
    /// service name.
    pub fn new(storage: SharedStorage, service: impl Into<String>) -> Self {
        Self { storage, service: service.into() }
    }

    /// Store a setting.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut storage = self.storage.lock();
        let mut settings: HashMap<String, Value> = storage.get(SETTINGS_KEY).unwrap_or_default();
        settings.insert(key.to_string(), serde_json::to_value(value)?);
        storage.set(SETTINGS_KEY, &settings)
    }

    /// Retrieve a setting, `None` if absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let settings: HashMap<String, Value> = self.storage.lock().get(SETTINGS_KEY)?;
        let value = settings.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    /// Remove a setting. Removing a missing key is a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut storage = self.storage.lock();
        let mut settings: HashMap<String, Value> =
            match storage.get(SETTINGS_KEY) {
                Some(settings) => settings,
                None => return Ok(()),
            };
        if settings.remove(key).is_some() {
            storage.set(SETTINGS_KEY, &settings)?;
        }
        Ok(())
    }

    /// Delete all settings.
    pub fn clear(&self) -> Result<()> {
        self.storage.lock().remove(SETTINGS_KEY)
    }

    /// Store a password in the system keychain for `username`.
    #[cfg(feature = "secrets")]
    pub fn set_password(&self, username: &str, password: &str) -> Result<()> {
        let entry = Entry::new(&self.service, username)
            .map_err(|e| Error::Keychain(e.to_string()))?;
        entry.set_password(password).map_err(|e| Error::Keychain(e.to_string()))
    }

    /// Retrieve a password from the system keychain.
    ///
    /// The returned value zeroes its memory on drop; use
    /// [`SecretValue::expose`] sparingly and never log it.
    #[cfg(feature = "secrets")]
    pub fn get_password(&self, username: &str) -> Result<SecretValue> {
        let entry = Entry::new(&self.service, username)
            .map_err(|e| Error::Keychain(e.to_string()))?;
        let password = entry.get_password().map_err(|e| Error::Keychain(e.to_string()))?;
        Ok(SecretValue::new(password))
    }

    /// Remove a password from the system keychain.
    #[cfg(feature = "secrets")]
    pub fn remove_password(&self, username: &str) -> Result<()> {
        let entry = Entry::new(&self.service, username)
            .map_err(|e| Error::Keychain(e.to_string()))?;
        entry.delete_credential().map_err(|e| Error::Keychain(e.to_string()))
    }
}

/// A secret value that is zeroed on drop.
#[cfg(feature = "secrets")]
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue {
    value: String,
}

#[cfg(feature = "secrets")]
impl SecretValue {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// Get the secret value.
    ///
    /// Note: use sparingly and ensure the value is not logged.
    pub fn expose(&self) -> &str {
        &self.value
    }
}

// Prevent accidental logging of secrets
#[cfg(feature = "secrets")]
impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue([REDACTED])")
    }
}

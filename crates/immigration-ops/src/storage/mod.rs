//! Session-scoped key-value storage.
//!
//! Values live only as long as the store instance; there is no durability and
//! no schema versioning. Every value is JSON so that stored copies never alias
//! the caller's data.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed keys under which the session state is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKey {
    GdprConsent,
    ClientData,
    Deadlines,
    UploadedFiles,
    DemoMode,
}

impl StorageKey {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::GdprConsent,
            Self::ClientData,
            Self::Deadlines,
            Self::UploadedFiles,
            Self::DemoMode,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GdprConsent => "ukimm_gdpr_consent",
            Self::ClientData => "ukimm_client_data",
            Self::Deadlines => "ukimm_deadlines",
            Self::UploadedFiles => "ukimm_uploaded_files",
            Self::DemoMode => "ukimm_demo_mode",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to encode value for {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored value under {key} is unreadable: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage collaborator used by the tracker, reconciler, and session.
pub trait SessionStore: Send + Sync {
    fn save(&self, key: StorageKey, value: Value) -> Result<(), StorageError>;
    fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError>;
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn save(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        (**self).load(key)
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

pub fn save_json<S, T>(store: &S, key: StorageKey, value: &T) -> Result<(), StorageError>
where
    S: SessionStore + ?Sized,
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_value(value).map_err(|source| StorageError::Encode {
        key: key.as_str(),
        source,
    })?;
    store.save(key, encoded)
}

pub fn load_json<S, T>(store: &S, key: StorageKey) -> Result<Option<T>, StorageError>
where
    S: SessionStore + ?Sized,
    T: DeserializeOwned,
{
    match store.load(key)? {
        Some(Value::Null) | None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.as_str(),
                source,
            }),
    }
}

/// Process-local store; contents vanish with the instance.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    entries: Arc<Mutex<BTreeMap<StorageKey, Value>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized size of each key, in bytes.
    pub fn usage(&self) -> Result<StorageUsage, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("session store lock poisoned".to_string()))?;

        let items: Vec<KeyUsage> = StorageKey::ordered()
            .into_iter()
            .map(|key| KeyUsage {
                key: key.as_str(),
                bytes: guard
                    .get(&key)
                    .map(|value| value.to_string().len())
                    .unwrap_or(0),
            })
            .collect();
        let total_bytes = items.iter().map(|item| item.bytes).sum();

        Ok(StorageUsage { items, total_bytes })
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, key: StorageKey, value: Value) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("session store lock poisoned".to_string()))?;
        guard.insert(key, value);
        Ok(())
    }

    fn load(&self, key: StorageKey) -> Result<Option<Value>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("session store lock poisoned".to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("session store lock poisoned".to_string()))?;
        guard.remove(&key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("session store lock poisoned".to_string()))?;
        guard.clear();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyUsage {
    pub key: &'static str,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageUsage {
    pub items: Vec<KeyUsage>,
    pub total_bytes: usize,
}

impl StorageUsage {
    pub fn total_kilobytes(&self) -> f64 {
        self.total_bytes as f64 / 1024.0
    }
}

//! Session token storage
//!
//! `DynamicStorage` decides on every call whether tokens go to durable or
//! tab-scoped storage, based on the remember-me preference kept in durable
//! storage. The preference is never cached, so flipping it takes effect on
//! the next call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Durable-storage key of the remember-me preference
pub const REMEMBER_ME_KEY: &str = "remember-me-preference";

/// String key/value storage (browser `localStorage` / `sessionStorage` shape)
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap().remove(key);
    }
}

pub fn set_remember_me_preference(durable: &dyn KeyValueStorage, remember: bool) {
    durable.set_item(REMEMBER_ME_KEY, if remember { "true" } else { "false" });
}

pub fn get_remember_me_preference(durable: &dyn KeyValueStorage) -> bool {
    durable.get_item(REMEMBER_ME_KEY).as_deref() == Some("true")
}

/// Storage that routes to durable or ephemeral storage per call
#[derive(Clone)]
pub struct DynamicStorage {
    durable: Arc<dyn KeyValueStorage>,
    ephemeral: Arc<dyn KeyValueStorage>,
}

impl DynamicStorage {
    pub fn new(durable: Arc<dyn KeyValueStorage>, ephemeral: Arc<dyn KeyValueStorage>) -> Self {
        Self { durable, ephemeral }
    }

    /// Must be called before the sign-in that issues the tokens
    pub fn set_remember_me(&self, remember: bool) {
        set_remember_me_preference(self.durable.as_ref(), remember);
    }

    pub fn remember_me(&self) -> bool {
        get_remember_me_preference(self.durable.as_ref())
    }

    fn current(&self) -> &dyn KeyValueStorage {
        if self.remember_me() {
            self.durable.as_ref()
        } else {
            self.ephemeral.as_ref()
        }
    }
}

impl KeyValueStorage for DynamicStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.current().get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        self.current().set_item(key, value);
    }

    fn remove_item(&self, key: &str) {
        self.current().remove_item(key);
    }
}

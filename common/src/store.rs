use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::{
    ConfigContentProvider, ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer,
};

/// Integer key-value persistence, the only storage the game needs.
pub trait KeyValueStore: Send + 'static {
    fn get(&self, key: &str) -> Option<u32>;
    fn set(&self, key: &str, value: u32) -> Result<(), String>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBook {
    entries: BTreeMap<String, u32>,
}

impl Validate for ScoreBook {
    fn validate(&self) -> Result<(), String> {
        if self.entries.keys().any(|key| key.is_empty()) {
            return Err("Score keys must not be empty".to_string());
        }
        Ok(())
    }
}

/// Stores every key in one YAML document.
pub struct YamlFileStore<TProvider = FileContentConfigProvider>
where
    TProvider: ConfigContentProvider,
{
    manager: ConfigManager<TProvider, ScoreBook, YamlConfigSerializer>,
}

impl YamlFileStore<FileContentConfigProvider> {
    pub fn open(file_path: &str) -> Self {
        Self {
            manager: ConfigManager::from_yaml_file(file_path),
        }
    }
}

impl<TProvider> YamlFileStore<TProvider>
where
    TProvider: ConfigContentProvider,
{
    pub fn with_provider(provider: TProvider) -> Self {
        Self {
            manager: ConfigManager::new(provider, YamlConfigSerializer::new()),
        }
    }
}

impl<TProvider> KeyValueStore for YamlFileStore<TProvider>
where
    TProvider: ConfigContentProvider + Send + 'static,
{
    fn get(&self, key: &str) -> Option<u32> {
        match self.manager.get_config() {
            Ok(book) => book.entries.get(key).copied(),
            Err(e) => {
                crate::log!("Failed to read score store: {}", e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: u32) -> Result<(), String> {
        let mut book = self.manager.get_config()?;
        book.entries.insert(key.to_string(), value);
        self.manager.set_config(&book)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, u32>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: u32) -> Self {
        let store = Self::default();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value);
        }
        store
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<u32> {
        self.values.lock().ok()?.get(key).copied()
    }

    fn set(&self, key: &str, value: u32) -> Result<(), String> {
        self.values
            .lock()
            .map_err(|_| "Store lock poisoned".to_string())?
            .insert(key.to_string(), value);
        *self.writes.lock().map_err(|_| "Store lock poisoned".to_string())? += 1;
        Ok(())
    }
}

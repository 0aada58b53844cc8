//! Interface language of the application and its persisted preference.
//!
//! This is the language the UI is shown in, not the translation pair.
//! [`LocaleState`] is created once at startup from a [`PreferenceStore`] and
//! handed to whatever renders text; nothing reads it from a global.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::languages::TextDirection;

/// Key the interface language is stored under.
pub const LANGUAGE_KEY: &str = "language";

const APP_DIR_NAME: &str = "med-translate";
const PREFERENCES_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiLanguage {
    #[default]
    En,
    Ar,
}

impl UiLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            UiLanguage::En => "en",
            UiLanguage::Ar => "ar",
        }
    }

    /// Exact code match; anything else is treated as invalid.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(UiLanguage::En),
            "ar" => Some(UiLanguage::Ar),
            _ => None,
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            UiLanguage::En => TextDirection::Ltr,
            UiLanguage::Ar => TextDirection::Rtl,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            UiLanguage::En => UiLanguage::Ar,
            UiLanguage::Ar => UiLanguage::En,
        }
    }
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid preferences file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// Client-side key-value store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFilePreferenceStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::load(&path) {
            Ok(values) => values,
            Err(PreferenceError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                BTreeMap::new()
            }
            Err(err) => {
                warn!(
                    "ignoring unreadable preferences {}: {}",
                    path.to_string_lossy(),
                    err
                );
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    /// Store under the platform configuration directory.
    pub fn open_default() -> Result<Self, PreferenceError> {
        Ok(Self::open(default_preferences_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, PreferenceError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_vec_pretty(&self.values)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

pub fn default_preferences_path() -> Result<PathBuf, PreferenceError> {
    let base = dirs::config_dir().ok_or(PreferenceError::NoConfigDir)?;
    Ok(base.join(APP_DIR_NAME).join(PREFERENCES_FILE_NAME))
}

/// Active interface language plus the store it is persisted to.
#[derive(Debug)]
pub struct LocaleState<S: PreferenceStore> {
    language: UiLanguage,
    store: S,
}

impl<S: PreferenceStore> LocaleState<S> {
    /// Read the persisted language once; absent or invalid values fall back
    /// to English.
    pub fn init(store: S) -> Self {
        let language = match store.get(LANGUAGE_KEY) {
            Some(saved) => UiLanguage::from_code(&saved).unwrap_or_else(|| {
                debug!("ignoring invalid saved language '{saved}'");
                UiLanguage::default()
            }),
            None => UiLanguage::default(),
        };

        Self { language, store }
    }

    pub fn language(&self) -> UiLanguage {
        self.language
    }

    pub fn direction(&self) -> TextDirection {
        self.language.direction()
    }

    /// Switch and persist. The in-memory language changes even when
    /// persisting fails; the error is returned for the caller to surface.
    pub fn set_language(&mut self, language: UiLanguage) -> Result<(), PreferenceError> {
        self.language = language;
        self.store.set(LANGUAGE_KEY, language.code())
    }

    pub fn toggle_language(&mut self) -> Result<UiLanguage, PreferenceError> {
        let next = self.language.toggled();
        self.set_language(next)?;
        Ok(next)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_english_when_absent() {
        let locale = LocaleState::init(MemoryPreferenceStore::new());
        assert_eq!(locale.language(), UiLanguage::En);
        assert_eq!(locale.direction(), TextDirection::Ltr);
    }

    #[test]
    fn invalid_saved_value_falls_back() {
        let mut store = MemoryPreferenceStore::new();
        store.set(LANGUAGE_KEY, "fr").unwrap();
        assert_eq!(LocaleState::init(store).language(), UiLanguage::En);

        let mut store = MemoryPreferenceStore::new();
        store.set(LANGUAGE_KEY, "AR").unwrap();
        assert_eq!(LocaleState::init(store).language(), UiLanguage::En);
    }

    #[test]
    fn restores_saved_arabic() {
        let mut store = MemoryPreferenceStore::new();
        store.set(LANGUAGE_KEY, "ar").unwrap();
        let locale = LocaleState::init(store);
        assert_eq!(locale.language(), UiLanguage::Ar);
        assert_eq!(locale.direction(), TextDirection::Rtl);
    }

    #[test]
    fn toggle_persists_each_switch() {
        let mut locale = LocaleState::init(MemoryPreferenceStore::new());
        assert_eq!(locale.toggle_language().unwrap(), UiLanguage::Ar);
        assert_eq!(locale.store().get(LANGUAGE_KEY).as_deref(), Some("ar"));
        assert_eq!(locale.toggle_language().unwrap(), UiLanguage::En);
        assert_eq!(locale.store().get(LANGUAGE_KEY).as_deref(), Some("en"));
    }

    #[test]
    fn json_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(PREFERENCES_FILE_NAME);

        let mut locale = LocaleState::init(JsonFilePreferenceStore::open(&path));
        locale.set_language(UiLanguage::Ar).unwrap();
        assert!(path.exists());

        let reopened = LocaleState::init(JsonFilePreferenceStore::open(&path));
        assert_eq!(reopened.language(), UiLanguage::Ar);
    }

    #[test]
    fn corrupt_json_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFilePreferenceStore::open(&path);
        assert!(store.get(LANGUAGE_KEY).is_none());
        assert_eq!(LocaleState::init(store).language(), UiLanguage::En);
    }
}

//! # Navigation
//!
//! Site navigation passed through to every rendered page.
//! Entries are loaded per locale from `config/navigation.toml`:
//!
//! ```toml
//! [en]
//! pages = [
//!   { title = "Home", href = "/" },
//!   { title = "Shirts", href = "/categories/shirts" },
//! ]
//! ```

use crate::error::{CartError, CartResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single navigation link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

/// Navigation structure for one locale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    #[serde(default)]
    pub pages: Vec<NavLink>,
}

/// Loads navigation data for a locale at page-render time
#[async_trait]
pub trait NavigationLoader: Send + Sync {
    async fn load(&self, locale: &str) -> CartResult<Navigation>;
}

/// Navigation table read from TOML, keyed by locale
#[derive(Debug, Clone, Default)]
pub struct TomlNavigationLoader {
    locales: BTreeMap<String, Navigation>,
    fallback_locale: Option<String>,
}

impl TomlNavigationLoader {
    /// Parse a navigation table from a TOML string
    pub fn from_toml(toml_str: &str) -> CartResult<Self> {
        let locales: BTreeMap<String, Navigation> = toml::from_str(toml_str)
            .map_err(|e| CartError::Configuration(format!("Invalid navigation TOML: {}", e)))?;
        Ok(Self {
            locales,
            fallback_locale: None,
        })
    }

    /// Read a navigation table from a file
    pub fn from_path(path: impl AsRef<Path>) -> CartResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CartError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Builder: locale used when the requested one has no entry
    pub fn with_fallback_locale(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }

    /// Locales with navigation entries
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(|s| s.as_str())
    }
}

#[async_trait]
impl NavigationLoader for TomlNavigationLoader {
    async fn load(&self, locale: &str) -> CartResult<Navigation> {
        let navigation = self.locales.get(locale).or_else(|| {
            self.fallback_locale
                .as_deref()
                .and_then(|fallback| self.locales.get(fallback))
        });
        Ok(navigation.cloned().unwrap_or_default())
    }
}

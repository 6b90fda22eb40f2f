//! Client-side context management.
//!
//! Reads/writes `~/.gatehouse/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gatehouse_store::HttpStoreConfig;

/// A single context: one access-control backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "makerspace").
    pub name: String,

    /// Backend URL (e.g. "http://localhost:8080/api").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Context {
    /// Transport settings for this context.
    pub fn store_config(&self) -> anyhow::Result<HttpStoreConfig> {
        if self.endpoint.is_empty() {
            anyhow::bail!(
                "No endpoint set for context \"{}\". Run `gatehouse context set {} --endpoint <url>`.",
                self.name,
                self.name
            );
        }
        Ok(HttpStoreConfig {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
        })
    }
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// Default config file path: ~/.gatehouse/config.toml.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".gatehouse").join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Get the currently active context, if any.
    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Get a context by name, creating an empty one if needed.
    pub fn entry(&mut self, name: &str) -> &mut Context {
        let index = match self.contexts.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.contexts.push(Context {
                    name: name.to_string(),
                    endpoint: String::new(),
                    timeout_secs: None,
                });
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.current_context.is_empty());
        assert!(config.current().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.current_context = "shop".to_string();
        let ctx = config.entry("shop");
        ctx.endpoint = "http://localhost:8080/api".to_string();
        ctx.timeout_secs = Some(5);
        config.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("current-context = \"shop\""));

        let back = ClientConfig::load(&path).unwrap();
        let current = back.current().unwrap();
        assert_eq!(current.endpoint, "http://localhost:8080/api");
        assert_eq!(current.store_config().unwrap().timeout_secs, Some(5));
    }

    #[test]
    fn entry_reuses_existing_context() {
        let mut config = ClientConfig::default();
        config.entry("a").endpoint = "http://a".to_string();
        config.entry("a").timeout_secs = Some(1);
        assert_eq!(config.contexts.len(), 1);
        assert_eq!(config.contexts[0].endpoint, "http://a");
    }

    #[test]
    fn context_without_endpoint_cannot_connect() {
        let mut config = ClientConfig::default();
        let err = config.entry("empty").store_config().unwrap_err();
        assert!(err.to_string().contains("context set empty"));
    }
}

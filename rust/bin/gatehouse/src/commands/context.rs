//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::ClientConfig;

/// Create or update a context. The first context becomes current.
pub fn set(name: &str, endpoint: Option<&str>, timeout_secs: Option<u64>, config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;

    let ctx = config.entry(name);
    if let Some(endpoint) = endpoint {
        ctx.endpoint = endpoint.to_string();
    }
    if timeout_secs.is_some() {
        ctx.timeout_secs = timeout_secs;
    }
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }

    config.save(config_path)?;
    println!("Context \"{}\" updated.", name);
    Ok(())
}

/// Switch current context.
pub fn use_context(name: &str, config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;

    if config.get_mut(name).is_none() {
        anyhow::bail!(
            "Context \"{}\" not found. Run `gatehouse context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

pub fn list(config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: gatehouse context set <name> --endpoint <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:8}", "", "NAME", "ENDPOINT", "TIMEOUT");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context { "*" } else { " " };
        let endpoint = if ctx.endpoint.is_empty() { "-" } else { &ctx.endpoint };
        let timeout = ctx.timeout_secs.map_or("-".to_string(), |s| format!("{}s", s));
        println!("{:2} {:20} {:40} {:8}", marker, ctx.name, endpoint, timeout);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_context_becomes_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        set("shop", Some("http://shop"), None, &path).unwrap();
        set("lab", Some("http://lab"), Some(3), &path).unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current_context, "shop");
        assert_eq!(config.contexts.len(), 2);

        use_context("lab", &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current().unwrap().timeout_secs, Some(3));
    }

    #[test]
    fn unknown_context_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(use_context("nowhere", &path).is_err());
        assert!(!path.exists());
    }
}

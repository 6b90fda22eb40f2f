//! Details commands: `gatehouse get member 1`, `gatehouse save role -f r.json`.
//!
//! Every command prints pretty JSON on stdout.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use gatehouse_access::{AccessService, EntityId, EntityKind, Saved};
use gatehouse_store::{EntityStore, HttpStore, HttpStoreConfig, MemoryStore};

use crate::config::ClientConfig;

/// Parse a singular/plural kind name.
pub fn parse_kind(name: &str) -> Result<EntityKind> {
    EntityKind::from_name(name).ok_or_else(|| {
        anyhow::anyhow!("Unknown kind: {}. Expected member, key, role or door.", name)
    })
}

/// Build the service for this invocation.
///
/// `--memory` wins over `--endpoint`, which wins over the current context.
pub fn connect(memory: bool, endpoint: Option<&str>, config_path: &Path) -> Result<AccessService> {
    let store: Arc<dyn EntityStore> = if memory {
        info!("using in-memory demo store");
        Arc::new(MemoryStore::demo())
    } else {
        let config = ClientConfig::load(config_path)?;
        let store_config = match (endpoint, config.current()) {
            (Some(endpoint), ctx) => HttpStoreConfig {
                endpoint: endpoint.to_string(),
                timeout_secs: ctx.and_then(|c| c.timeout_secs),
            },
            (None, Some(ctx)) => ctx.store_config()?,
            (None, None) => anyhow::bail!(
                "No current context. Run `gatehouse context set <name> --endpoint <url>` or pass --endpoint."
            ),
        };
        info!("connecting to {}", store_config.endpoint);
        Arc::new(HttpStore::new(&store_config)?)
    };
    Ok(AccessService::new(store))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the re-read aggregate, then every rejected write on stderr.
fn report<D: Serialize>(saved: Saved<D>) -> Result<()> {
    print_json(&saved.details)?;
    for failure in &saved.failures {
        warn!("write failed: {}", failure);
        eprintln!("error: {}", failure);
    }
    if !saved.is_clean() {
        anyhow::bail!("{} write(s) failed", saved.failures.len());
    }
    Ok(())
}

pub async fn list(svc: &AccessService, kind: EntityKind) -> Result<()> {
    let entities = match kind {
        EntityKind::Member => svc.list_members().await?,
        EntityKind::Key => svc.list_keys().await?,
        EntityKind::Role => svc.list_roles().await?,
        EntityKind::Door => svc.list_doors().await?,
    };
    print_json(&entities)
}

pub async fn get(svc: &AccessService, kind: EntityKind, id: EntityId) -> Result<()> {
    match kind {
        EntityKind::Member => print_json(&svc.member_details(id).await?),
        EntityKind::Key => print_json(&svc.key_details(id).await?),
        EntityKind::Role => print_json(&svc.role_details(id).await?),
        EntityKind::Door => print_json(&svc.door_details(id).await?),
    }
}

/// Print an empty aggregate to fill in and pass to `create`.
pub async fn new(svc: &AccessService, kind: EntityKind) -> Result<()> {
    match kind {
        EntityKind::Member => print_json(&svc.empty_member_details().await?),
        EntityKind::Key => print_json(&svc.empty_key_details().await?),
        EntityKind::Role => print_json(&svc.empty_role_details().await?),
        EntityKind::Door => print_json(&svc.empty_door_details().await?),
    }
}

pub async fn create(svc: &AccessService, kind: EntityKind, body: &str) -> Result<()> {
    match kind {
        EntityKind::Member => report(svc.create_member(serde_json::from_str(body)?).await?),
        EntityKind::Key => report(svc.create_key(serde_json::from_str(body)?).await?),
        EntityKind::Role => report(svc.create_role(serde_json::from_str(body)?).await?),
        EntityKind::Door => report(svc.create_door(serde_json::from_str(body)?).await?),
    }
}

pub async fn save(svc: &AccessService, kind: EntityKind, body: &str) -> Result<()> {
    match kind {
        EntityKind::Member => report(svc.save_member(serde_json::from_str(body)?).await?),
        EntityKind::Key => report(svc.save_key(serde_json::from_str(body)?).await?),
        EntityKind::Role => report(svc.save_role(serde_json::from_str(body)?).await?),
        EntityKind::Door => report(svc.save_door(serde_json::from_str(body)?).await?),
    }
}

pub async fn remove(svc: &AccessService, kind: EntityKind, id: EntityId) -> Result<()> {
    match kind {
        EntityKind::Member => print_json(&svc.remove_member(id).await?),
        EntityKind::Key => print_json(&svc.remove_key(id).await?),
        EntityKind::Role => print_json(&svc.remove_role(id).await?),
        EntityKind::Door => print_json(&svc.remove_door(id).await?),
    }
}

//! Prototype Server - resolves queued requests from an asset directory
//!
//! Requests are queued by [`AssetGateway::request`] and resolved in order on
//! the next [`AssetGateway::poll`]. Decoded prototypes are cached by
//! identifier, so the basket rebuilt after every delivery is read once.

use crate::error::LoadError;
use crate::gateway::{AssetGateway, LoadCompletion, LoadTicket};
use crate::loader::GlbPrototypeLoader;
use crate::prototype::VisualPrototype;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::{Component, Path, PathBuf};

/// Prototype server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PrototypeServerConfig {
    /// Base asset directory
    pub asset_dir: PathBuf,
    /// Maximum requests resolved per poll
    pub max_loads_per_poll: usize,
}

impl Default for PrototypeServerConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            max_loads_per_poll: 8,
        }
    }
}

/// Filesystem-backed gateway
pub struct PrototypeServer {
    config: PrototypeServerConfig,
    loader: GlbPrototypeLoader,
    /// Pending load queue
    queue: VecDeque<(LoadTicket, String)>,
    /// Identifier to decoded prototype
    cache: HashMap<String, VisualPrototype>,
    next_ticket: u64,
}

impl PrototypeServer {
    /// Create a new server
    pub fn new(config: PrototypeServerConfig) -> Self {
        Self {
            config,
            loader: GlbPrototypeLoader::new(),
            queue: VecDeque::new(),
            cache: HashMap::new(),
            next_ticket: 1,
        }
    }

    /// Create a server rooted at `asset_dir`
    pub fn with_asset_dir(asset_dir: impl Into<PathBuf>) -> Self {
        Self::new(PrototypeServerConfig {
            asset_dir: asset_dir.into(),
            ..Default::default()
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &PrototypeServerConfig {
        &self.config
    }

    /// Check if an identifier has already been decoded
    pub fn is_cached(&self, identifier: &str) -> bool {
        self.cache.contains_key(identifier)
    }

    fn resolve(&mut self, identifier: &str) -> Result<VisualPrototype, LoadError> {
        if let Some(proto) = self.cache.get(identifier) {
            return Ok(proto.clone());
        }

        let path = self.checked_path(identifier)?;
        let bytes = std::fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.display().to_string())
            } else {
                LoadError::Io { path: path.clone(), source }
            }
        })?;

        let proto = self.loader.load(&bytes, identifier)?;
        self.cache.insert(identifier.to_string(), proto.clone());
        Ok(proto)
    }

    /// Identifiers are relative names; anything escaping the asset
    /// directory is refused.
    fn checked_path(&self, identifier: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(identifier);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if identifier.is_empty() || escapes {
            return Err(LoadError::Rejected {
                identifier: identifier.to_string(),
                reason: "identifier must be a relative path inside the asset directory".into(),
            });
        }

        if !GlbPrototypeLoader::supports(identifier) {
            return Err(LoadError::Rejected {
                identifier: identifier.to_string(),
                reason: "unsupported file type".into(),
            });
        }

        Ok(self.config.asset_dir.join(relative))
    }
}

impl AssetGateway for PrototypeServer {
    fn request(&mut self, identifier: &str) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.queue.push_back((ticket, identifier.to_string()));
        log::debug!("Queued {} as ticket {}", identifier, ticket.0);
        ticket
    }

    fn poll(&mut self) -> Vec<LoadCompletion> {
        let budget = self.config.max_loads_per_poll.max(1);
        let mut completions = Vec::new();

        while completions.len() < budget {
            let Some((ticket, identifier)) = self.queue.pop_front() else {
                break;
            };

            let result = self.resolve(&identifier);
            if let Err(e) = &result {
                log::warn!("Asset {} failed to load: {}", identifier, e);
            }

            completions.push(LoadCompletion {
                ticket,
                identifier,
                result,
            });
        }

        completions
    }

    fn pending_count(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_deferred() {
        let mut server = PrototypeServer::with_asset_dir("does-not-exist");
        let ticket = server.request("basket.glb");
        assert_eq!(server.pending_count(), 1);

        let done = server.poll();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].ticket, ticket);
        assert!(matches!(done[0].result, Err(LoadError::NotFound(_))));
        assert_eq!(server.pending_count(), 0);
    }

    #[test]
    fn test_escaping_identifier_rejected() {
        let mut server = PrototypeServer::with_asset_dir("assets");
        server.request("../secrets.glb");
        server.request("/etc/passwd.glb");
        server.request("apple.txt");

        for done in server.poll() {
            assert!(matches!(done.result, Err(LoadError::Rejected { .. })));
        }
    }

    #[test]
    fn test_poll_budget() {
        let mut server = PrototypeServer::new(PrototypeServerConfig {
            asset_dir: PathBuf::from("nowhere"),
            max_loads_per_poll: 2,
        });
        for _ in 0..3 {
            server.request("apple.glb");
        }
        assert_eq!(server.poll().len(), 2);
        assert_eq!(server.poll().len(), 1);
        assert!(server.poll().is_empty());
    }
}

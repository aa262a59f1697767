//! The user's currently selected server, mirrored to durable storage.

use std::sync::Arc;

use log::debug;

use crate::models::Server;
use crate::servers;
use crate::storage::{KeyValueStore, StorageError, load_json, save_json};

/// Storage key holding the serialized selection.
pub const SELECTED_SERVER_KEY: &str = "auth-service-selected-server";

/// In-memory selection backed by a [`KeyValueStore`].
///
/// Memory is authoritative: storage failures are returned to the caller but
/// never roll back the in-memory state.
pub struct SelectedServerCache {
    store: Arc<dyn KeyValueStore>,
    selected: Option<Server>,
}

impl SelectedServerCache {
    /// An empty cache; call [`restore`](Self::restore) to load a prior selection.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            selected: None,
        }
    }

    /// Load the prior selection from storage.
    ///
    /// A missing key is not an error. On any error the selection is left
    /// absent.
    pub fn restore(&mut self) -> Result<Option<&Server>, StorageError> {
        self.selected = None;
        self.selected = load_json::<Server>(self.store.as_ref(), SELECTED_SERVER_KEY)?;
        Ok(self.selected.as_ref())
    }

    pub fn selected(&self) -> Option<&Server> {
        self.selected.as_ref()
    }

    /// Replace the selection; `None` removes the stored entry.
    pub fn set(&mut self, server: Option<Server>) -> Result<(), StorageError> {
        self.selected = server;
        match &self.selected {
            Some(server) => {
                debug!("selecting server {}", server.id);
                save_json(self.store.as_ref(), SELECTED_SERVER_KEY, server)
            }
            None => self.store.remove(SELECTED_SERVER_KEY),
        }
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.set(None)
    }

    /// Resolve the active server for `path`.
    ///
    /// A path of the form `/servers/{slug}/...` naming a known server wins and
    /// is written back into the cache when it differs from the cached
    /// selection; otherwise the cached selection is used. The returned server
    /// is available even when the write-back fails; the failure comes back
    /// alongside it.
    pub fn sync_with_path(
        &mut self,
        path: &str,
        catalog: &[Server],
    ) -> (Option<Server>, Option<StorageError>) {
        let Some(from_path) = servers::server_from_path(path, catalog) else {
            return (self.selected.clone(), None);
        };

        let differs = self.selected.as_ref().map(|s| s.id.as_str()) != Some(from_path.id.as_str());
        let error = if differs {
            self.set(Some(from_path.clone())).err()
        } else {
            None
        };
        (Some(from_path.clone()), error)
    }
}

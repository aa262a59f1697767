//! Composition root: every handle a command needs, built once per run.

use std::sync::Arc;

use log::{debug, warn};
use roster_client::{
    ApiClient, ClientConfig, LogNavigator, QueryCache, RetryPolicy, RosterService,
};
use roster_core::models::Server;
use roster_core::selection::SelectedServerCache;
use roster_core::servers;
use roster_core::session::SessionStore;
use roster_core::storage::{FileStore, KeyValueStore};
use serde::Serialize;

use crate::Result;
use crate::cli::Cli;

pub struct AppContext {
    pub config: ClientConfig,
    pub service: RosterService,
    pub selection: SelectedServerCache,
    pub catalog: Vec<Server>,
    pub json: bool,
}

impl AppContext {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &cli.api_url {
            config = config.with_base_url(url);
        }
        if let Some(dir) = &cli.data_dir {
            config = config.with_data_dir(dir);
        }
        debug!("api {} / data {}", config.base_url, config.data_dir.display());

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.data_dir));
        let client = ApiClient::new(
            &config,
            SessionStore::new(store.clone()),
            Arc::new(LogNavigator),
        )?;
        let service = RosterService::new(
            client,
            Arc::new(QueryCache::new()),
            RetryPolicy::with_retries(config.query_retries),
        );

        let mut selection = SelectedServerCache::new(store);
        if let Err(e) = selection.restore() {
            warn!("ignoring stored server selection: {e}");
        }

        Ok(Self {
            config,
            service,
            selection,
            catalog: servers::catalog(),
            json: cli.json,
        })
    }

    /// Resolve the server a command should act on.
    ///
    /// An explicit slug is treated as the route `/servers/{slug}/characters`:
    /// a known slug becomes the selection, an unknown one resolves to nothing.
    /// Without a slug the remembered selection is used.
    pub fn active_server(&mut self, slug: Option<&str>) -> Option<Server> {
        let path = match slug {
            Some(slug) => {
                if servers::find_by_slug(&self.catalog, slug).is_none() {
                    warn!("unknown server '{slug}'");
                    return None;
                }
                format!("{}{slug}/characters", servers::SERVERS_PATH_PREFIX)
            }
            None => "/".to_string(),
        };

        let (active, error) = self.selection.sync_with_path(&path, &self.catalog);
        if let Some(e) = error {
            warn!("failed to remember selected server: {e}");
        }
        active
    }

    /// Print `value` as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

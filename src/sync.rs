//! Host boundary: startup state in, full config out after every change.
//!
//! The host owns durability. It hands the editor its last saved state once at
//! startup and receives the complete [`ScreenConfig`] after each mutation, to
//! be treated as a full replace rather than a diff.

use crate::assets::{Asset, AssetCatalog};
use crate::controller::EditorController;
use crate::error::SyncError;
use crate::graph::GraphStore;
use crate::model::ScreenConfig;
use crate::settings::EditorSettings;
use serde::Deserialize;
use serde_json::Value;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Services the embedding application provides.
pub trait Host {
    /// Persist or transmit the full config.
    fn commit(&self, config: &Value);

    /// Let the operator pick an asset. `filter` lists acceptable file types,
    /// comma separated. `None` means the chooser was dismissed.
    fn choose_asset(&self, _selected: Option<&str>, _filter: &str) -> Option<String> {
        None
    }
}

/// Everything the host supplies at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostState {
    #[serde(default)]
    pub assets: HashMap<String, Asset>,
    #[serde(default)]
    pub node_assets: HashMap<String, Asset>,
    /// Last saved config; absent for a fresh setup.
    #[serde(default)]
    pub config: Option<ScreenConfig>,
}

impl HostState {
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        serde_json::from_str(json).map_err(SyncError::HostState)
    }

    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        serde_json::from_value(value).map_err(SyncError::HostState)
    }

    pub fn into_store(self, settings: EditorSettings) -> GraphStore {
        let catalog = AssetCatalog::new(self.assets, self.node_assets);
        GraphStore::init_with_settings(catalog, self.config.unwrap_or_default(), settings)
    }
}

/// Wire form of the config as pushed to the host.
pub fn serialize_config(config: &ScreenConfig) -> Result<Value, SyncError> {
    serde_json::to_value(config).map_err(SyncError::Serialize)
}

/// Store listener that pushes the config to the host.
#[derive(Clone, Default)]
pub struct SyncBridge {
    pushes: Rc<Cell<usize>>,
}

impl SyncBridge {
    /// Subscribe to `store` and commit to `host` after every mutation.
    pub fn attach(store: &mut GraphStore, host: Rc<dyn Host>) -> Self {
        let bridge = SyncBridge::default();
        let pushes = bridge.pushes.clone();
        store.subscribe(move |change, config| match serialize_config(config) {
            Ok(value) => {
                debug!(?change, pages = config.pages.len(), "pushing config to host");
                host.commit(&value);
                pushes.set(pushes.get() + 1);
            }
            Err(err) => warn!(error = %err, "config not pushed to host"),
        });
        bridge
    }

    /// Number of configs handed to the host so far.
    pub fn pushes(&self) -> usize {
        self.pushes.get()
    }
}

/// Build the editor from host state and start syncing.
///
/// Initialization itself is not pushed; the first commit follows the first
/// mutation.
pub fn boot(state: HostState, host: Rc<dyn Host>, settings: EditorSettings) -> EditorController {
    let mut store = state.into_store(settings);
    SyncBridge::attach(&mut store, host);
    info!(home = %store.home_uuid(), "editor ready");
    EditorController::new(store)
}

//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use serde_json::{json, Value};
use signage_flow_editor::{Change, GraphStore, Host, ScreenConfig};
use std::cell::RefCell;
use std::rc::Rc;

/// Host double that records every commit and answers the asset chooser from a script.
#[derive(Default)]
pub struct RecordingHost {
    pub commits: RefCell<Vec<Value>>,
    /// Answers for successive `choose_asset` calls; `None` once exhausted.
    pub chooser_answers: RefCell<Vec<String>>,
    /// (selected, filter) per `choose_asset` call
    pub chooser_calls: RefCell<Vec<(Option<String>, String)>>,
}

impl RecordingHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn commit_count(&self) -> usize {
        self.commits.borrow().len()
    }

    pub fn last_commit(&self) -> Option<Value> {
        self.commits.borrow().last().cloned()
    }

    pub fn answer_chooser_with(&self, asset_id: &str) {
        self.chooser_answers.borrow_mut().push(asset_id.to_string());
    }
}

impl Host for RecordingHost {
    fn commit(&self, config: &Value) {
        self.commits.borrow_mut().push(config.clone());
    }

    fn choose_asset(&self, selected: Option<&str>, filter: &str) -> Option<String> {
        self.chooser_calls
            .borrow_mut()
            .push((selected.map(str::to_string), filter.to_string()));
        let mut answers = self.chooser_answers.borrow_mut();
        if answers.is_empty() {
            None
        } else {
            Some(answers.remove(0))
        }
    }
}

/// Records every change a store emits, with the page count at that moment.
#[derive(Default, Clone)]
pub struct ChangeTracker {
    pub changes: Rc<RefCell<Vec<Change>>>,
    pub page_counts: Rc<RefCell<Vec<usize>>>,
}

impl ChangeTracker {
    pub fn attach(store: &mut GraphStore) -> Self {
        let tracker = Self::default();
        let changes = tracker.changes.clone();
        let page_counts = tracker.page_counts.clone();
        store.subscribe(move |change: &Change, config: &ScreenConfig| {
            changes.borrow_mut().push(change.clone());
            page_counts.borrow_mut().push(config.pages.len());
        });
        tracker
    }

    pub fn len(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn clear(&self) {
        self.changes.borrow_mut().clear();
        self.page_counts.borrow_mut().clear();
    }
}

pub const HOME: &str = "p-home";
pub const MENU: &str = "p-menu";
pub const INFO: &str = "p-info";

/// Host state with three pages, an image and a video asset, and one asset id
/// present in both asset tables.
pub fn fixture_state() -> Value {
    json!({
        "assets": {
            "img1": {"id": "img1", "filename": "welcome.jpg", "filetype": "image", "thumb": "/thumb/img1", "uploaded": 1700000000.0, "metadata": {}},
            "vid1": {"id": "vid1", "filename": "promo.mp4", "filetype": "video", "thumb": "/thumb/vid1", "uploaded": 1700000100.0, "metadata": {"duration": 12.0}}
        },
        "node_assets": {
            "img1": {"id": "img1", "filename": "shadowed.jpg", "filetype": "image", "thumb": "/thumb/node-img1", "metadata": {}},
            "loading.jpg": {"id": "loading.jpg", "filename": "loading.jpg", "filetype": "image", "thumb": "/thumb/loading", "metadata": {}}
        },
        "config": {
            "resolution": [1920, 1080],
            "rotation": 0,
            "audio": false,
            "scale": false,
            "schedule": {"mode": "always"},
            "pages": [
                {
                    "uuid": HOME, "name": "Welcome", "asset": "img1", "duration": 5,
                    "links": [
                        {"target_uuid": MENU, "type": "touch", "transition": "l2r",
                         "options": {"x1": 0, "y1": 0, "x2": 960, "y2": 1080}},
                        {"target_uuid": INFO, "type": "touch", "transition": "fade",
                         "options": {"x1": 960, "y1": 0, "x2": 1920, "y2": 1080}}
                    ]
                },
                {
                    "uuid": MENU, "name": "menu", "asset": "vid1", "duration": 5,
                    "links": [
                        {"target_uuid": "back", "type": "touch", "transition": "r2l",
                         "options": {"x1": 0, "y1": 0, "x2": 200, "y2": 200}},
                        {"target_uuid": INFO, "type": "timeout", "transition": "zoom_in",
                         "options": {"timeout": 12}}
                    ]
                },
                {
                    "uuid": INFO, "name": "Info", "asset": "img1", "duration": 5,
                    "links": [
                        {"target_uuid": HOME, "type": "key", "transition": "zoom_out",
                         "options": {"key": "esc"}}
                    ]
                }
            ]
        }
    })
}

//! Test harness wiring a booted editor to recording host and bound view models.
//!
//! The preview is sized to the full screen so viewport pixels equal
//! screen-space units, which keeps gesture coordinates readable in tests.

#![allow(dead_code)]

use super::{fixture_state, RecordingHost};
use slint::{Model, SharedString, VecModel};
use signage_flow_editor::{
    boot, EditorController, EditorSettings, GraphStore, HostState, LinkListModel, PageListModel,
    PointerOutcome,
};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

pub struct EditorHarness {
    pub ctrl: EditorController,
    pub store: Rc<RefCell<GraphStore>>,
    pub host: Rc<RecordingHost>,
    pub page_rows: Rc<VecModel<SharedString>>,
    pub link_rows: Rc<VecModel<SharedString>>,
    pub page_list: PageListModel,
    pub link_list: LinkListModel,
}

impl EditorHarness {
    /// Editor booted from the three-page fixture.
    pub fn new() -> Self {
        Self::from_state(HostState::from_value(fixture_state()).unwrap())
    }

    /// Editor booted from a host that has no saved config.
    pub fn empty() -> Self {
        Self::from_state(HostState::default())
    }

    pub fn from_state(state: HostState) -> Self {
        let settings = EditorSettings {
            preview_max_width: 1920.0,
            preview_max_height: 1920.0,
            ..EditorSettings::default()
        };
        let host = RecordingHost::new();
        let ctrl = boot(state, host.clone(), settings);

        let page_rows = Rc::new(VecModel::default());
        let link_rows = Rc::new(VecModel::default());
        let mut page_list = PageListModel::new();
        page_list.bind_model(page_rows.clone(), |row| row.label());
        let mut link_list = LinkListModel::new();
        link_list.bind_model(link_rows.clone(), |view| view.label());

        let mut harness = Self {
            store: ctrl.store(),
            ctrl,
            host,
            page_rows,
            link_rows,
            page_list,
            link_list,
        };
        harness.refresh();
        harness
    }

    pub fn graph(&self) -> Ref<'_, GraphStore> {
        self.store.borrow()
    }

    /// Recompute the bound view models, as the UI does after each change.
    pub fn refresh(&mut self) {
        let store = self.store.borrow();
        self.page_list.refresh(&store);
        self.link_list.refresh(&store, &self.ctrl.current_page_uuid());
    }

    /// Press, move and release without crossing the gesture threshold.
    pub fn click(&self, x: f32, y: f32) -> PointerOutcome {
        self.ctrl.pointer_down(x, y);
        self.ctrl.pointer_up(x, y).unwrap()
    }

    /// Drag a rectangle from one corner to the other.
    pub fn drag(&self, from: (f32, f32), to: (f32, f32)) -> PointerOutcome {
        self.ctrl.pointer_down(from.0, from.1);
        self.ctrl.pointer_move(to.0, to.1);
        self.ctrl.pointer_up(to.0, to.1).unwrap()
    }

    pub fn link_labels(&self) -> Vec<String> {
        (0..self.link_rows.row_count())
            .filter_map(|i| self.link_rows.row_data(i))
            .map(|s| s.to_string())
            .collect()
    }

    pub fn page_labels(&self) -> Vec<String> {
        (0..self.page_rows.row_count())
            .filter_map(|i| self.page_rows.row_data(i))
            .map(|s| s.to_string())
            .collect()
    }
}

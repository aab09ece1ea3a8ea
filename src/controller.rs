//! Page editor controller.
//!
//! [`EditorController`] is the glue between UI events and the
//! [`GraphStore`]: it feeds pointer events through the gesture tracker, turns
//! clicks into preview navigation and areas into touch links, and offers the
//! add/edit/delete actions of the page editor.
//!
//! # Example
//!
//! ```ignore
//! use signage_flow_editor::{boot, HostState};
//!
//! let ctrl = boot(HostState::from_json(host_json)?, host.clone(), EditorSettings::default());
//! let window = EditorWindow::new()?;
//!
//! window.on_preview_pointer_down(ctrl.pointer_down_callback());
//! window.on_preview_pointer_move(ctrl.pointer_move_callback());
//! window.on_preview_pointer_up(ctrl.pointer_up_callback());
//! window.on_open_page(ctrl.open_page_callback());
//! window.on_delete_link(ctrl.delete_link_callback());
//! window.on_resize_link(ctrl.resize_link_callback());
//!
//! let (w, h) = ctrl.preview_size();
//! window.set_preview_width(w);
//! window.set_preview_height(h);
//! ```

use crate::catalog::{target_choices, timeout_choices, GpioChoice, TargetChoice, TimeoutChoice};
use crate::error::GraphError;
use crate::geometry::{preview_size, scale, Point, TouchArea};
use crate::gesture::{GestureEvent, GestureState, GestureTracker};
use crate::graph::{Change, ConfigUpdate, GraphStore, LinkUpdate, PageUpdate};
use crate::hit_test::{resolve_touch, NavAction};
use crate::links::{link_views, LinkView};
use crate::model::{LinkId, LinkType, OptionsPatch, Target, Transition, Trigger};
use crate::sync::Host;
use slint::SharedString;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Asset kinds offered when choosing a page asset.
pub const PAGE_ASSET_FILTER: &str = "image,video";

/// What a finished pointer gesture did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// No gesture in progress, or a click that hit nothing.
    Nothing,
    /// A click hit a touch link and the preview followed it.
    Navigated(NavAction),
    LinkAdded(LinkId),
    LinkResized(LinkId),
}

/// Controller for the page editor. Clone it to share it across callbacks.
#[derive(Clone)]
pub struct EditorController {
    store: Rc<RefCell<GraphStore>>,
    gesture: Rc<RefCell<GestureTracker>>,
    /// Page being edited.
    current: Rc<RefCell<String>>,
    /// Pages visited through click-preview navigation, most recent last.
    history: Rc<RefCell<Vec<String>>>,
    /// Touch link whose area the next drawn rectangle replaces.
    resize: Rc<RefCell<Option<LinkId>>>,
}

impl EditorController {
    /// Controller editing the store's default page.
    pub fn new(store: GraphStore) -> Self {
        Self::from_shared(Rc::new(RefCell::new(store)))
    }

    pub fn from_shared(store: Rc<RefCell<GraphStore>>) -> Self {
        let (threshold, current) = {
            let s = store.borrow();
            (s.settings().gesture_threshold, s.default_uuid().to_string())
        };
        Self {
            store,
            gesture: Rc::new(RefCell::new(GestureTracker::with_threshold(threshold))),
            current: Rc::new(RefCell::new(current)),
            history: Rc::new(RefCell::new(Vec::new())),
            resize: Rc::new(RefCell::new(None)),
        }
    }

    pub fn store(&self) -> Rc<RefCell<GraphStore>> {
        self.store.clone()
    }

    pub fn current_page_uuid(&self) -> String {
        self.current.borrow().clone()
    }

    /// Switch the editor to `uuid`, or to the default page for `None`.
    ///
    /// This is a direct jump: play history is left alone.
    pub fn open_page(&self, uuid: Option<&str>) {
        let uuid = match uuid {
            Some(uuid) => uuid.to_string(),
            None => self.store.borrow().default_uuid().to_string(),
        };
        debug!(page = %uuid, "page opened");
        *self.current.borrow_mut() = uuid;
        *self.resize.borrow_mut() = None;
    }

    /// Follow a link in the preview, remembering where we came from.
    pub fn navigate(&self, uuid: &str) {
        let previous = self.current.replace(uuid.to_string());
        self.history.borrow_mut().push(previous);
        *self.resize.borrow_mut() = None;
        debug!(page = %uuid, "preview navigated");
    }

    /// Return to the previously visited page. `false` if there is none.
    pub fn go_back(&self) -> bool {
        let Some(previous) = self.history.borrow_mut().pop() else {
            return false;
        };
        debug!(page = %previous, "preview went back");
        *self.current.borrow_mut() = previous;
        *self.resize.borrow_mut() = None;
        true
    }

    pub fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    /// Preview scale for the current screen.
    pub fn scale_factor(&self) -> f32 {
        let store = self.store.borrow();
        let settings = store.settings();
        scale(store.screen(), settings.preview_max_width, settings.preview_max_height)
    }

    /// Preview viewport size in pixels.
    pub fn preview_size(&self) -> (f32, f32) {
        let factor = self.scale_factor();
        preview_size(self.store.borrow().screen(), factor)
    }

    // === Pointer input ===

    pub fn pointer_down(&self, x: f32, y: f32) {
        let factor = self.scale_factor();
        self.gesture.borrow_mut().pointer_down(Point::new(x, y), factor);
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        let factor = self.scale_factor();
        self.gesture.borrow_mut().pointer_move(Point::new(x, y), factor);
    }

    pub fn pointer_up(&self, x: f32, y: f32) -> Result<PointerOutcome, GraphError> {
        let factor = self.scale_factor();
        let event = self.gesture.borrow_mut().pointer_up(Point::new(x, y), factor);
        self.dispatch(event)
    }

    pub fn pointer_leave(&self, x: f32, y: f32) -> Result<PointerOutcome, GraphError> {
        let factor = self.scale_factor();
        let event = self.gesture.borrow_mut().pointer_leave(Point::new(x, y), factor);
        self.dispatch(event)
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.borrow().state()
    }

    /// Rectangle being drawn, in screen-space.
    pub fn rubber_band(&self) -> Option<TouchArea> {
        self.gesture.borrow().preview()
    }

    fn dispatch(&self, event: Option<GestureEvent>) -> Result<PointerOutcome, GraphError> {
        match event {
            None => Ok(PointerOutcome::Nothing),
            Some(GestureEvent::Click { x, y }) => Ok(self
                .handle_click(x, y)
                .map_or(PointerOutcome::Nothing, PointerOutcome::Navigated)),
            Some(GestureEvent::Area(area)) => self.handle_area(area),
        }
    }

    /// A drawn area either resizes the link in resize mode or becomes a new
    /// touch link.
    pub fn handle_area(&self, area: TouchArea) -> Result<PointerOutcome, GraphError> {
        let page = self.current_page_uuid();
        let resizing = self.resize.borrow_mut().take();
        if let Some(id) = resizing {
            let index = self.store.borrow().link_index(&page, id);
            if let Some(index) = index {
                let patch = OptionsPatch::Touch(area.into());
                self.store
                    .borrow_mut()
                    .update_link(&page, index, LinkUpdate::Options(patch))?;
                return Ok(PointerOutcome::LinkResized(id));
            }
            debug!(page = %page, "link in resize mode is gone");
        }
        Ok(self
            .add_touch(area)?
            .map_or(PointerOutcome::Nothing, PointerOutcome::LinkAdded))
    }

    /// Click-preview: follow the touch link under the point, like the player would.
    pub fn handle_click(&self, x: i32, y: i32) -> Option<NavAction> {
        let action = {
            let store = self.store.borrow();
            let page = store.page(&self.current.borrow())?;
            resolve_touch(&page.links, x, y)?
        };
        match &action {
            NavAction::Back => {
                self.go_back();
            }
            NavAction::Goto(uuid) => self.navigate(uuid),
        }
        Some(action)
    }

    // === Adding links ===

    fn add_link(&self, trigger: Trigger) -> Result<Option<LinkId>, GraphError> {
        let page = self.current_page_uuid();
        let mut store = self.store.borrow_mut();
        let link = store.new_link(trigger);
        match store.add_link(&page, link)? {
            Change::LinkAdded { id, .. } => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    pub fn add_touch(&self, area: TouchArea) -> Result<Option<LinkId>, GraphError> {
        self.add_link(Trigger::Touch(area))
    }

    /// Touch link covering the whole screen.
    pub fn add_fullscreen(&self) -> Result<Option<LinkId>, GraphError> {
        let area = TouchArea::fullscreen(self.store.borrow().screen());
        self.add_touch(area)
    }

    /// Timeout link with the fallback duration. A page gets at most one.
    pub fn add_timeout(&self) -> Result<Option<LinkId>, GraphError> {
        if self.has_timeout() {
            debug!(page = %self.current.borrow(), "page already has a timeout link");
            return Ok(None);
        }
        let seconds = self.store.borrow().settings().fallback_timeout;
        self.add_link(Trigger::Timeout { seconds })
    }

    pub fn add_gpio(&self) -> Result<Option<LinkId>, GraphError> {
        let trigger = {
            let store = self.store.borrow();
            let settings = store.settings();
            Trigger::Gpio {
                pin: settings.default_gpio_pin,
                active_high: settings.default_gpio_active_high,
            }
        };
        self.add_link(trigger)
    }

    pub fn add_key(&self) -> Result<Option<LinkId>, GraphError> {
        let code = self.store.borrow().settings().default_key.clone();
        self.add_link(Trigger::Key { code })
    }

    pub fn has_timeout(&self) -> bool {
        let store = self.store.borrow();
        let current = self.current.borrow();
        store
            .page(&current)
            .is_some_and(|p| p.has_link_type(LinkType::Timeout))
    }

    // === Editing links ===

    /// Put the touch link at `index` into resize mode. `false` for other links.
    pub fn start_resize(&self, index: usize) -> bool {
        let id = {
            let store = self.store.borrow();
            match store.link(&self.current.borrow(), index) {
                Some(link) if link.kind() == LinkType::Touch => link.id(),
                _ => return false,
            }
        };
        *self.resize.borrow_mut() = Some(id);
        true
    }

    pub fn cancel_resize(&self) {
        *self.resize.borrow_mut() = None;
    }

    /// Current index of the link in resize mode.
    pub fn resize_target(&self) -> Option<usize> {
        let id = (*self.resize.borrow())?;
        self.store.borrow().link_index(&self.current.borrow(), id)
    }

    pub fn delete_link(&self, index: usize) -> Result<Change, GraphError> {
        let page = self.current_page_uuid();
        let change = self.store.borrow_mut().delete_link(&page, index)?;
        if let Change::LinkDeleted { id, .. } = &change {
            let mut resize = self.resize.borrow_mut();
            if *resize == Some(*id) {
                *resize = None;
            }
        }
        Ok(change)
    }

    fn update_link(&self, index: usize, update: LinkUpdate) -> Result<Change, GraphError> {
        let page = self.current_page_uuid();
        self.store.borrow_mut().update_link(&page, index, update)
    }

    pub fn set_transition(&self, index: usize, transition: Transition) -> Result<Change, GraphError> {
        self.update_link(index, LinkUpdate::Transition(transition))
    }

    pub fn set_timeout(&self, index: usize, seconds: f64) -> Result<Change, GraphError> {
        self.update_link(index, LinkUpdate::Options(OptionsPatch::Timeout { seconds }))
    }

    pub fn set_key(&self, index: usize, code: &str) -> Result<Change, GraphError> {
        let patch = OptionsPatch::Key {
            code: code.to_string(),
        };
        self.update_link(index, LinkUpdate::Options(patch))
    }

    pub fn set_gpio(&self, index: usize, choice: GpioChoice) -> Result<Change, GraphError> {
        let patch = OptionsPatch::Gpio {
            pin: Some(choice.pin),
            active_high: Some(choice.active_high),
        };
        self.update_link(index, LinkUpdate::Options(patch))
    }

    /// Point the link at `index` somewhere else.
    ///
    /// [`TargetChoice::NewPage`] creates the page first and only then retargets
    /// the link to the returned uuid. Headings change nothing.
    pub fn choose_target(&self, index: usize, choice: &TargetChoice) -> Result<Change, GraphError> {
        let target = match choice {
            TargetChoice::Heading(_) => return Ok(Change::Ignored),
            TargetChoice::Back => Target::Back,
            TargetChoice::Page { uuid, .. } => Target::page(uuid.as_str()),
            TargetChoice::NewPage => {
                let page = self.current_page_uuid();
                let id = {
                    let store = self.store.borrow();
                    let Some(link) = store.link(&page, index) else {
                        let len = store.page(&page).map_or(0, |p| p.links.len());
                        return Err(GraphError::LinkIndexOutOfRange { page, index, len });
                    };
                    link.id()
                };
                let mut store = self.store.borrow_mut();
                let name = store.settings().new_page_name.clone();
                let uuid = store.create_page(&name);
                let index = store.link_index(&page, id).unwrap_or(index);
                return store.update_link(&page, index, LinkUpdate::Target(Target::Page(uuid)));
            }
        };
        self.update_link(index, LinkUpdate::Target(target))
    }

    // === Page ===

    pub fn rename_page(&self, name: &str) -> Change {
        let page = self.current_page_uuid();
        self.store
            .borrow_mut()
            .update_page(&page, PageUpdate::Name(name.to_string()))
    }

    /// Show `asset_id` on the current page and retime its timeout links.
    ///
    /// Timeout links are set to the video's duration, or to the fallback
    /// timeout for images and videos of unknown length.
    pub fn select_asset(&self, asset_id: &str) -> Result<(), GraphError> {
        let page = self.current_page_uuid();
        let mut store = self.store.borrow_mut();
        store.update_page(&page, PageUpdate::Asset(asset_id.to_string()));

        let seconds = store
            .assets()
            .get(asset_id)
            .and_then(|a| a.video_duration())
            .unwrap_or(store.settings().fallback_timeout);
        let timeouts: Vec<usize> = store
            .page(&page)
            .map(|p| {
                p.links
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| l.kind() == LinkType::Timeout)
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default();
        for index in timeouts {
            store.update_link(&page, index, LinkUpdate::Options(OptionsPatch::Timeout { seconds }))?;
        }
        Ok(())
    }

    /// Ask the host for a new page asset. `true` if one was picked.
    pub fn browse_asset(&self, host: &dyn Host) -> Result<bool, GraphError> {
        let selected = {
            let store = self.store.borrow();
            store.page(&self.current.borrow()).map(|p| p.asset.clone())
        };
        match host.choose_asset(selected.as_deref(), PAGE_ASSET_FILTER) {
            Some(asset_id) => self.select_asset(&asset_id).map(|_| true),
            None => Ok(false),
        }
    }

    /// Delete a page. If it was being edited, the editor moves to the default page.
    pub fn delete_page(&self, uuid: &str) -> Result<Change, GraphError> {
        let change = self.store.borrow_mut().delete_page(uuid)?;
        if let Change::PageDeleted { uuid, .. } = &change {
            self.history.borrow_mut().retain(|p| p != uuid);
            if *self.current.borrow() == *uuid {
                self.open_page(None);
            }
        }
        Ok(change)
    }

    pub fn set_config(&self, update: ConfigUpdate) -> Change {
        self.store.borrow_mut().set_config(update)
    }

    // === Views ===

    pub fn link_views(&self) -> Vec<LinkView> {
        link_views(&self.store.borrow(), &self.current.borrow())
    }

    pub fn target_choices(&self) -> Vec<TargetChoice> {
        target_choices(&self.store.borrow())
    }

    /// Timeout menu for the current page's asset.
    pub fn timeout_choices(&self) -> Vec<TimeoutChoice> {
        let store = self.store.borrow();
        let asset = store
            .page(&self.current.borrow())
            .and_then(|p| store.assets().get(&p.asset));
        timeout_choices(asset)
    }

    // === Callback factories ===

    pub fn pointer_down_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |x, y| ctrl.pointer_down(x, y)
    }

    pub fn pointer_move_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |x, y| ctrl.pointer_move(x, y)
    }

    pub fn pointer_up_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |x, y| {
            if let Err(err) = ctrl.pointer_up(x, y) {
                warn!(error = %err, "gesture not applied");
            }
        }
    }

    pub fn pointer_leave_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |x, y| {
            if let Err(err) = ctrl.pointer_leave(x, y) {
                warn!(error = %err, "gesture not applied");
            }
        }
    }

    /// Callback taking a page uuid; an empty string opens the default page.
    pub fn open_page_callback(&self) -> impl Fn(SharedString) {
        let ctrl = self.clone();
        move |uuid| {
            let uuid = uuid.as_str();
            ctrl.open_page((!uuid.is_empty()).then_some(uuid));
        }
    }

    pub fn delete_link_callback(&self) -> impl Fn(i32) {
        let ctrl = self.clone();
        move |index| {
            let Ok(index) = usize::try_from(index) else {
                return;
            };
            if let Err(err) = ctrl.delete_link(index) {
                warn!(error = %err, "link not deleted");
            }
        }
    }

    pub fn resize_link_callback(&self) -> impl Fn(i32) {
        let ctrl = self.clone();
        move |index| {
            if let Ok(index) = usize::try_from(index) {
                ctrl.start_resize(index);
            }
        }
    }
}

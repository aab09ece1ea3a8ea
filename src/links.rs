//! Per-page link rows for the editor UI.
//!
//! [`link_views`] derives one [`LinkView`] per link of a page: its position,
//! palette colour and the resolved target. [`LinkListModel`] pushes those rows
//! into a Slint `VecModel` so the UI can bind to them.
//!
//! # Example
//!
//! ```ignore
//! let rows = Rc::new(VecModel::<LinkRow>::default());
//! let mut links = LinkListModel::new();
//! links.bind_model(rows.clone(), |view| LinkRow {
//!     label: view.label(),
//!     color: view.color,
//! });
//! window.set_links(ModelRc::from(rows));
//!
//! // After every store change
//! links.refresh(&store.borrow(), &current_page);
//! ```

use crate::assets::Asset;
use crate::catalog::{human_duration, key_label};
use crate::graph::GraphStore;
use crate::model::{LinkId, Target, Transition, Trigger};
use slint::{Color, Model, SharedString, VecModel};
use std::rc::Rc;

/// Link colours, picked by link index and cycling.
const PALETTE: [(u8, u8, u8); 22] = [
    (0xe6, 0x19, 0x4b),
    (0x3c, 0xb4, 0x4b),
    (0xff, 0xe1, 0x19),
    (0x43, 0x63, 0xd8),
    (0xf5, 0x82, 0x31),
    (0x91, 0x1e, 0xb4),
    (0x46, 0xf0, 0xf0),
    (0xf0, 0x32, 0xe6),
    (0xbc, 0xf6, 0x0c),
    (0xfa, 0xbe, 0xbe),
    (0x00, 0x80, 0x80),
    (0xe6, 0xbe, 0xff),
    (0x9a, 0x63, 0x24),
    (0xff, 0xfa, 0xc8),
    (0x80, 0x00, 0x00),
    (0xaa, 0xff, 0xc3),
    (0x80, 0x80, 0x00),
    (0xff, 0xd8, 0xb1),
    (0x00, 0x00, 0x75),
    (0x80, 0x80, 0x80),
    (0xff, 0xff, 0xff),
    (0x00, 0x00, 0x00),
];

/// Colour for the link at `index`.
pub fn link_color(index: usize) -> Color {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    Color::from_rgb_u8(r, g, b)
}

/// Everything the UI shows about one link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkView {
    /// Current position in the page's link list.
    pub index: usize,
    pub id: LinkId,
    pub target: Target,
    pub transition: Transition,
    pub trigger: Trigger,
    pub color: Color,
    /// Name of the target page; `None` for back links and dangling targets.
    pub target_name: Option<String>,
    /// Asset of the target page, for the thumbnail next to the link.
    pub target_asset: Option<Asset>,
}

impl LinkView {
    /// Short human description of what fires the link.
    pub fn trigger_label(&self) -> SharedString {
        let text = match &self.trigger {
            Trigger::Touch(a) => format!("Touch {}x{} at {},{}", a.width(), a.height(), a.x1, a.y1),
            Trigger::Timeout { seconds } => format!("After {}", human_duration(*seconds)),
            Trigger::Gpio { pin, active_high } => {
                let level = if *active_high { "high" } else { "low" };
                format!("GPIO {pin} (active {level})")
            }
            Trigger::Key { code } => format!("Key {}", key_label(code).unwrap_or(code.as_str())),
        };
        SharedString::from(text)
    }

    /// Name of where the link goes.
    pub fn target_label(&self) -> SharedString {
        match (&self.target, &self.target_name) {
            (Target::Back, _) => SharedString::from("Previous page"),
            (Target::Page(_), Some(name)) => SharedString::from(name.as_str()),
            (Target::Page(_), None) => SharedString::from("(missing page)"),
        }
    }

    pub fn label(&self) -> SharedString {
        SharedString::from(format!("{} → {}", self.trigger_label(), self.target_label()))
    }

    /// Touch rectangle in viewport pixels as `(x, y, width, height)`.
    pub fn viewport_rect(&self, factor: f32) -> Option<(f32, f32, f32, f32)> {
        self.trigger.touch_area().map(|a| {
            (
                a.x1 as f32 * factor,
                a.y1 as f32 * factor,
                a.width() as f32 * factor,
                a.height() as f32 * factor,
            )
        })
    }
}

/// Rows for every link of `page`, in link order. Empty for an unknown page.
pub fn link_views(store: &GraphStore, page: &str) -> Vec<LinkView> {
    let Some(page) = store.page(page) else {
        return Vec::new();
    };
    let by_uuid = store.page_by_uuid();
    page.links
        .iter()
        .enumerate()
        .map(|(index, link)| {
            let target = link.target.page_uuid().and_then(|uuid| by_uuid.get(uuid));
            LinkView {
                index,
                id: link.id(),
                target: link.target.clone(),
                transition: link.transition,
                trigger: link.trigger.clone(),
                color: link_color(index),
                target_name: target.map(|p| p.name.clone()),
                target_asset: target.and_then(|p| store.assets().get(&p.asset)).cloned(),
            }
        })
        .collect()
}

/// Only the touch links of `page`, for drawing the overlay on the preview.
pub fn touch_views(store: &GraphStore, page: &str) -> Vec<LinkView> {
    link_views(store, page)
        .into_iter()
        .filter(|v| v.trigger.touch_area().is_some())
        .collect()
}

// ============================================================================
// Slint model sync
// ============================================================================

/// Bring `model` in line with `rows`: update rows in place, push new ones and
/// drop the excess, so bound views keep their state.
pub(crate) fn sync_rows<V, P, F>(model: &VecModel<P>, rows: &[V], constructor: &F)
where
    P: Clone + 'static,
    F: Fn(&V) -> P,
{
    for (i, row) in rows.iter().enumerate() {
        let item = constructor(row);
        if i < model.row_count() {
            model.set_row_data(i, item);
        } else {
            model.push(item);
        }
    }
    while model.row_count() > rows.len() {
        model.remove(model.row_count() - 1);
    }
}

/// Type-erased binding of a row type to a Slint model.
pub(crate) trait ModelSyncer<V> {
    fn sync(&self, rows: &[V]);
}

pub(crate) struct ConcreteModelSyncer<P, F> {
    pub(crate) model: Rc<VecModel<P>>,
    pub(crate) constructor: F,
}

impl<V, P, F> ModelSyncer<V> for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(&V) -> P,
{
    fn sync(&self, rows: &[V]) {
        sync_rows(&self.model, rows, &self.constructor);
    }
}

/// Link rows of the page being edited, optionally mirrored into a Slint model.
#[derive(Default)]
pub struct LinkListModel {
    views: Vec<LinkView>,
    syncer: Option<Box<dyn ModelSyncer<LinkView>>>,
}

impl LinkListModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to a Slint model; every [`refresh`](Self::refresh) then updates it.
    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&LinkView) -> P + 'static,
    {
        let syncer = ConcreteModelSyncer { model, constructor };
        syncer.sync(&self.views);
        self.syncer = Some(Box::new(syncer));
    }

    /// Recompute rows for `page` from the store.
    pub fn refresh(&mut self, store: &GraphStore, page: &str) {
        self.views = link_views(store, page);
        if let Some(syncer) = &self.syncer {
            syncer.sync(&self.views);
        }
    }

    pub fn views(&self) -> &[LinkView] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetCatalog;
    use crate::geometry::TouchArea;
    use crate::model::{Link, ScreenConfig};
    use std::collections::HashMap;

    fn store_with_assets() -> GraphStore {
        let asset: Asset = serde_json::from_value(serde_json::json!({
            "id": "loading.jpg", "filename": "loading.jpg", "filetype": "image", "thumb": "/thumb/loading"
        }))
        .unwrap();
        let mut assets = HashMap::new();
        assets.insert(asset.id.clone(), asset);
        GraphStore::init(AssetCatalog::new(assets, HashMap::new()), ScreenConfig::default())
    }

    // ========================================================================
    // Palette
    // ========================================================================

    #[test]
    fn test_palette_cycles() {
        assert_eq!(link_color(0), Color::from_rgb_u8(0xe6, 0x19, 0x4b));
        assert_eq!(link_color(21), Color::from_rgb_u8(0, 0, 0));
        assert_eq!(link_color(22), link_color(0));
        assert_eq!(link_color(45), link_color(1));
    }

    // ========================================================================
    // link_views()
    // ========================================================================

    #[test]
    fn test_views_resolve_targets() {
        let mut store = store_with_assets();
        let home = store.home_uuid().to_string();
        let menu = store.create_page("Menu");
        store
            .add_link(&home, Link::touch(Target::page(&menu), Transition::Fade, TouchArea::new(0, 0, 80, 60)))
            .unwrap();
        store
            .add_link(&home, Link::new(Target::Back, Transition::None, Trigger::Timeout { seconds: 10.0 }))
            .unwrap();

        let views = link_views(&store, &home);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].target_name.as_deref(), Some("Menu"));
        assert_eq!(views[0].target_asset.as_ref().map(|a| a.id.as_str()), Some("loading.jpg"));
        assert_eq!(views[0].color, link_color(0));
        assert_eq!(views[0].label(), SharedString::from("Touch 80x60 at 0,0 → Menu"));
        assert_eq!(views[1].target_name, None);
        assert_eq!(views[1].label(), SharedString::from("After 10 seconds → Previous page"));
    }

    #[test]
    fn test_dangling_target_is_lookup_miss() {
        let mut store = store_with_assets();
        let home = store.home_uuid().to_string();
        store
            .add_link(&home, Link::new(Target::page("gone"), Transition::Fade, Trigger::Key { code: "esc".into() }))
            .unwrap();
        let views = link_views(&store, &home);
        assert!(views[0].target_asset.is_none());
        assert_eq!(views[0].target_label(), SharedString::from("(missing page)"));
        assert_eq!(views[0].trigger_label(), SharedString::from("Key Escape"));
    }

    #[test]
    fn test_touch_views_and_viewport_rect() {
        let mut store = store_with_assets();
        let home = store.home_uuid().to_string();
        store
            .add_link(&home, Link::new(Target::Back, Transition::Fade, Trigger::Gpio { pin: 5, active_high: false }))
            .unwrap();
        store
            .add_link(&home, Link::touch(Target::Back, Transition::Fade, TouchArea::new(100, 50, 300, 250)))
            .unwrap();

        let touches = touch_views(&store, &home);
        assert_eq!(touches.len(), 1);
        assert_eq!(touches[0].index, 1);
        assert_eq!(touches[0].viewport_rect(0.5), Some((50.0, 25.0, 100.0, 100.0)));
    }

    // ========================================================================
    // LinkListModel
    // ========================================================================

    #[test]
    fn test_bound_model_tracks_refresh() {
        let mut store = store_with_assets();
        let home = store.home_uuid().to_string();
        let model: Rc<VecModel<SharedString>> = Rc::new(VecModel::default());
        let mut list = LinkListModel::new();
        list.bind_model(model.clone(), |v| v.target_label());

        for _ in 0..3 {
            store
                .add_link(&home, Link::touch(Target::Back, Transition::Fade, TouchArea::new(0, 0, 5, 5)))
                .unwrap();
        }
        list.refresh(&store, &home);
        assert_eq!(model.row_count(), 3);

        store.delete_link(&home, 0).unwrap();
        list.refresh(&store, &home);
        assert_eq!(model.row_count(), 2);
        assert_eq!(list.len(), 2);
        assert_eq!(model.row_data(1), Some(SharedString::from("Previous page")));
    }
}

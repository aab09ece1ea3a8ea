//! The navigation graph store.
//!
//! [`GraphStore`] owns the [`ScreenConfig`] and is the only way pages and links
//! change. Every mutation returns a [`Change`] and hands it, together with the
//! updated config, to each registered listener. The host sync bridge is just
//! one such listener.
//!
//! Requests the store refuses (deleting the home page, malformed links, stale
//! link indices) return a [`GraphError`] and leave the graph and the listeners
//! untouched. Requests that address a page that does not exist are applied as
//! no-ops and still notify listeners with [`Change::Ignored`].

use crate::assets::AssetCatalog;
use crate::error::GraphError;
use crate::geometry::{Screen, TouchArea};
use crate::model::{
    generate_uuid, Link, LinkId, LinkType, OptionsPatch, Page, Resolution, Rotation, ScreenConfig,
    Target, Transition, Trigger,
};
use crate::settings::EditorSettings;
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Link Validation Framework
// ============================================================================

/// Result of link validation with optional rejection reason
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(err) => Err(err),
        }
    }
}

/// Reasons why a link is not well-formed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Touch rectangle without positive width and height
    #[error("touch area {0:?} must satisfy x1 < x2 and y1 < y2")]
    EmptyTouchArea(TouchArea),
    /// Options patch addressed to a different link type
    #[error("options for a {found} link cannot be applied to a {expected} link")]
    OptionsMismatch { expected: LinkType, found: LinkType },
    /// Timeout that is negative, zero or not a number
    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),
    /// Key link without a key code
    #[error("key link needs a key code")]
    EmptyKey,
}

/// Rule a link must satisfy before the store accepts it.
///
/// Validators see the candidate link and the links already on the page, and
/// are composed with [`CompositeValidator`].
pub trait LinkValidator {
    fn validate(&self, link: &Link, siblings: &[Link]) -> ValidationResult;
}

/// Touch links need a rectangle with positive extent.
#[derive(Clone, Copy, Debug, Default)]
pub struct TouchAreaValidator;

impl LinkValidator for TouchAreaValidator {
    fn validate(&self, link: &Link, _siblings: &[Link]) -> ValidationResult {
        match link.trigger {
            Trigger::Touch(area) if !area.is_valid() => {
                ValidationResult::Invalid(ValidationError::EmptyTouchArea(area))
            }
            _ => ValidationResult::Valid,
        }
    }
}

/// Timeout links need a positive, finite duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeoutValidator;

impl LinkValidator for TimeoutValidator {
    fn validate(&self, link: &Link, _siblings: &[Link]) -> ValidationResult {
        match link.trigger {
            Trigger::Timeout { seconds } if !(seconds.is_finite() && seconds > 0.0) => {
                ValidationResult::Invalid(ValidationError::InvalidTimeout(seconds))
            }
            _ => ValidationResult::Valid,
        }
    }
}

/// Key links need a non-empty key code.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyCodeValidator;

impl LinkValidator for KeyCodeValidator {
    fn validate(&self, link: &Link, _siblings: &[Link]) -> ValidationResult {
        match &link.trigger {
            Trigger::Key { code } if code.trim().is_empty() => {
                ValidationResult::Invalid(ValidationError::EmptyKey)
            }
            _ => ValidationResult::Valid,
        }
    }
}

/// Composite validator that combines multiple validators
///
/// All validators must return Valid for the link to be valid (AND logic).
/// Returns the first error encountered.
pub struct CompositeValidator {
    validators: Vec<Box<dyn LinkValidator>>,
}

impl Default for CompositeValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// The rules every stored link obeys.
    pub fn standard() -> Self {
        Self::new()
            .add(TouchAreaValidator)
            .add(TimeoutValidator)
            .add(KeyCodeValidator)
    }

    /// Validators are checked in the order they were added.
    pub fn add<V: LinkValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl LinkValidator for CompositeValidator {
    fn validate(&self, link: &Link, siblings: &[Link]) -> ValidationResult {
        self.validators
            .iter()
            .fold(ValidationResult::Valid, |acc, v| {
                if acc.is_valid() {
                    acc.and(v.validate(link, siblings))
                } else {
                    acc
                }
            })
    }
}

/// Convenience function to validate a link with any validator
pub fn validate_link<V: LinkValidator>(link: &Link, siblings: &[Link], validator: &V) -> ValidationResult {
    validator.validate(link, siblings)
}

// ============================================================================
// Mutations and change notifications
// ============================================================================

/// Single-field page update.
#[derive(Debug, Clone, PartialEq)]
pub enum PageUpdate {
    Name(String),
    /// Asset id; existence is not checked here.
    Asset(String),
}

/// Single-field link update.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkUpdate {
    Target(Target),
    Transition(Transition),
    /// Shallow merge into the existing options.
    Options(OptionsPatch),
}

/// Single top-level config update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigUpdate {
    Resolution(Resolution),
    Rotation(Rotation),
    Audio(bool),
    Scale(bool),
}

/// What a mutation did.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    PageCreated { uuid: String },
    PageDeleted { uuid: String, removed_links: usize },
    PageUpdated { uuid: String },
    LinkAdded { page: String, index: usize, id: LinkId },
    LinkDeleted { page: String, index: usize, id: LinkId },
    LinkUpdated { page: String, index: usize, id: LinkId },
    ConfigUpdated(ConfigUpdate),
    /// The mutation addressed a page that does not exist.
    Ignored,
}

type Listener = Box<dyn FnMut(&Change, &ScreenConfig)>;

// ============================================================================
// GraphStore
// ============================================================================

/// Canonical in-memory navigation graph.
pub struct GraphStore {
    config: ScreenConfig,
    /// Page that anchors navigation. Always present and always first in `pages`.
    home: String,
    assets: AssetCatalog,
    settings: EditorSettings,
    validator: CompositeValidator,
    listeners: Vec<Listener>,
}

impl GraphStore {
    /// Build the store from host state with default settings.
    pub fn init(assets: AssetCatalog, config: ScreenConfig) -> Self {
        Self::init_with_settings(assets, config, EditorSettings::default())
    }

    /// Build the store from host state.
    ///
    /// An empty page list gets a single page named after
    /// `settings.index_page_name`. The first page becomes the home page.
    pub fn init_with_settings(
        assets: AssetCatalog,
        mut config: ScreenConfig,
        settings: EditorSettings,
    ) -> Self {
        if config.pages.is_empty() {
            let mut page = Page::new(
                generate_uuid(),
                settings.index_page_name.clone(),
                settings.placeholder_asset.clone(),
            );
            page.duration = settings.page_duration;
            config.pages.push(page);
        }
        for page in &mut config.pages {
            for (index, link) in page.links.iter_mut().enumerate() {
                if let Trigger::Timeout { seconds } = &mut link.trigger {
                    if !(seconds.is_finite() && *seconds > 0.0) {
                        warn!(
                            page = %page.uuid,
                            index,
                            fallback = settings.fallback_timeout,
                            "timeout link without a usable duration"
                        );
                        *seconds = settings.fallback_timeout;
                    }
                }
            }
        }
        let home = config.pages[0].uuid.clone();
        info!(
            pages = config.pages.len(),
            assets = assets.len(),
            home = %home,
            "graph store initialized"
        );
        Self {
            config,
            home,
            assets,
            settings,
            validator: CompositeValidator::standard(),
            listeners: Vec::new(),
        }
    }

    /// Register a listener called after every mutation that was not refused.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Change, &ScreenConfig) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Add a rule on top of the standard link validation.
    pub fn add_validator<V: LinkValidator + 'static>(&mut self, validator: V) {
        let current = std::mem::take(&mut self.validator);
        self.validator = current.add(validator);
    }

    fn emit(&mut self, change: Change) -> Change {
        for listener in self.listeners.iter_mut() {
            listener(&change, &self.config);
        }
        change
    }

    fn page_mut(&mut self, uuid: &str) -> Option<&mut Page> {
        self.config.pages.iter_mut().find(|p| p.uuid == uuid)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetCatalog {
        &self.assets
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Effective screen, recomputed from the current resolution and rotation.
    pub fn screen(&self) -> Screen {
        self.config.screen()
    }

    pub fn home_uuid(&self) -> &str {
        &self.home
    }

    pub fn is_home(&self, uuid: &str) -> bool {
        self.home == uuid
    }

    pub fn pages(&self) -> &[Page] {
        &self.config.pages
    }

    pub fn page(&self, uuid: &str) -> Option<&Page> {
        self.config.pages.iter().find(|p| p.uuid == uuid)
    }

    /// Lookup table built from the current page list.
    pub fn page_by_uuid(&self) -> HashMap<&str, &Page> {
        self.config
            .pages
            .iter()
            .map(|p| (p.uuid.as_str(), p))
            .collect()
    }

    /// Home page first, then the rest by name, ignoring case and accents.
    ///
    /// The sort is stable, so pages with equal names keep their relative order.
    pub fn sorted_pages(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.config.pages.iter().collect();
        pages.sort_by(|a, b| {
            let a_home = a.uuid == self.home;
            let b_home = b.uuid == self.home;
            b_home
                .cmp(&a_home)
                .then_with(|| compare_names(&a.name, &b.name))
        });
        pages
    }

    /// Target for newly authored links: the first page in sorted order.
    pub fn default_uuid(&self) -> &str {
        &self.home
    }

    /// Current position of a link, if it still exists.
    pub fn link_index(&self, page: &str, id: LinkId) -> Option<usize> {
        self.page(page).and_then(|p| p.link_index(id))
    }

    pub fn link(&self, page: &str, index: usize) -> Option<&Link> {
        self.page(page).and_then(|p| p.links.get(index))
    }

    /// Link with fresh id, default target and default transition.
    pub fn new_link(&self, trigger: Trigger) -> Link {
        Link::new(
            Target::page(self.default_uuid()),
            self.settings.default_transition,
            trigger,
        )
    }

    // ------------------------------------------------------------------------
    // Page mutations
    // ------------------------------------------------------------------------

    /// Append a page with no links and the placeholder asset; returns its uuid.
    pub fn create_page(&mut self, name: &str) -> String {
        let uuid = generate_uuid();
        let mut page = Page::new(uuid.clone(), name, self.settings.placeholder_asset.clone());
        page.duration = self.settings.page_duration;
        self.config.pages.push(page);
        debug!(page = %uuid, name, "page created");
        self.emit(Change::PageCreated { uuid: uuid.clone() });
        uuid
    }

    /// Remove a page and every link elsewhere that targets it.
    pub fn delete_page(&mut self, uuid: &str) -> Result<Change, GraphError> {
        let Some(position) = self.config.pages.iter().position(|p| p.uuid == uuid) else {
            debug!(page = %uuid, "delete of unknown page ignored");
            return Ok(self.emit(Change::Ignored));
        };
        if self.config.pages.len() == 1 {
            warn!(page = %uuid, "refusing to delete the last page");
            return Err(GraphError::LastPage);
        }
        if self.is_home(uuid) {
            warn!(page = %uuid, "refusing to delete the home page");
            return Err(GraphError::HomePage(uuid.to_string()));
        }

        self.config.pages.remove(position);
        let mut removed_links = 0;
        for page in self.config.pages.iter_mut() {
            let before = page.links.len();
            page.links.retain(|l| !l.target.points_to(uuid));
            removed_links += before - page.links.len();
        }
        debug!(page = %uuid, removed_links, "page deleted");
        Ok(self.emit(Change::PageDeleted {
            uuid: uuid.to_string(),
            removed_links,
        }))
    }

    pub fn update_page(&mut self, uuid: &str, update: PageUpdate) -> Change {
        let Some(page) = self.page_mut(uuid) else {
            return self.emit(Change::Ignored);
        };
        match update {
            PageUpdate::Name(name) => {
                debug!(page = %uuid, name = %name, "page renamed");
                page.name = name;
            }
            PageUpdate::Asset(asset) => {
                debug!(page = %uuid, asset = %asset, "page asset changed");
                page.asset = asset;
            }
        }
        self.emit(Change::PageUpdated {
            uuid: uuid.to_string(),
        })
    }

    // ------------------------------------------------------------------------
    // Link mutations
    // ------------------------------------------------------------------------

    /// Append a well-formed link to a page.
    pub fn add_link(&mut self, uuid: &str, link: Link) -> Result<Change, GraphError> {
        let Some(page) = self.config.pages.iter().find(|p| p.uuid == uuid) else {
            return Ok(self.emit(Change::Ignored));
        };
        if let Err(err) = self.validator.validate(&link, &page.links).into_result() {
            warn!(page = %uuid, error = %err, "link rejected");
            return Err(err.into());
        }

        let id = link.id();
        let kind = link.kind();
        let Some(page) = self.page_mut(uuid) else {
            return Ok(Change::Ignored);
        };
        page.links.push(link);
        let index = page.links.len() - 1;
        debug!(page = %uuid, index, %kind, "link added");
        Ok(self.emit(Change::LinkAdded {
            page: uuid.to_string(),
            index,
            id,
        }))
    }

    /// Remove the link at `index`. Later links shift down by one.
    pub fn delete_link(&mut self, uuid: &str, index: usize) -> Result<Change, GraphError> {
        let Some(page) = self.page_mut(uuid) else {
            return Ok(self.emit(Change::Ignored));
        };
        if index >= page.links.len() {
            let len = page.links.len();
            warn!(page = %uuid, index, len, "stale link index");
            return Err(GraphError::LinkIndexOutOfRange {
                page: uuid.to_string(),
                index,
                len,
            });
        }
        let link = page.links.remove(index);
        debug!(page = %uuid, index, "link deleted");
        Ok(self.emit(Change::LinkDeleted {
            page: uuid.to_string(),
            index,
            id: link.id(),
        }))
    }

    /// Update one field of the link at `index`.
    ///
    /// Options are merged, not replaced. The merged link is validated before
    /// it is stored, so a refused update leaves the link as it was.
    pub fn update_link(
        &mut self,
        uuid: &str,
        index: usize,
        update: LinkUpdate,
    ) -> Result<Change, GraphError> {
        let Some(page) = self.config.pages.iter().find(|p| p.uuid == uuid) else {
            return Ok(self.emit(Change::Ignored));
        };
        let Some(current) = page.links.get(index) else {
            let len = page.links.len();
            warn!(page = %uuid, index, len, "stale link index");
            return Err(GraphError::LinkIndexOutOfRange {
                page: uuid.to_string(),
                index,
                len,
            });
        };

        let mut updated = current.clone();
        match update {
            LinkUpdate::Target(target) => updated.target = target,
            LinkUpdate::Transition(transition) => {
                debug!(page = %uuid, index, transition = %transition, "link transition set");
                updated.transition = transition
            }
            LinkUpdate::Options(patch) => updated.trigger.merge(patch)?,
        }
        if let Err(err) = self.validator.validate(&updated, &page.links).into_result() {
            warn!(page = %uuid, index, error = %err, "link update rejected");
            return Err(err.into());
        }

        let id = updated.id();
        if let Some(slot) = self.page_mut(uuid).and_then(|p| p.links.get_mut(index)) {
            *slot = updated;
        }
        debug!(page = %uuid, index, "link updated");
        Ok(self.emit(Change::LinkUpdated {
            page: uuid.to_string(),
            index,
            id,
        }))
    }

    // ------------------------------------------------------------------------
    // Config
    // ------------------------------------------------------------------------

    pub fn set_config(&mut self, update: ConfigUpdate) -> Change {
        match update {
            ConfigUpdate::Resolution(resolution) => self.config.resolution = resolution,
            ConfigUpdate::Rotation(rotation) => self.config.rotation = rotation,
            ConfigUpdate::Audio(audio) => self.config.audio = audio,
            ConfigUpdate::Scale(scale) => self.config.scale = scale,
        }
        debug!(?update, "config updated");
        self.emit(Change::ConfigUpdated(update))
    }
}

/// Base letters of `name`: decomposed, accents dropped, lowercased.
fn fold_name(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Name order that ignores accents and case.
///
/// Names with the same base letters fall back to their lowercase form. Names
/// that only differ in case compare equal so the stable sort keeps their
/// original order.
fn compare_names(a: &str, b: &str) -> Ordering {
    fold_name(a).cmp(fold_name(b)).then_with(|| {
        let a = a.chars().flat_map(char::to_lowercase);
        let b = b.chars().flat_map(char::to_lowercase);
        a.cmp(b)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TouchPatch;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn empty_store() -> GraphStore {
        GraphStore::init(AssetCatalog::default(), ScreenConfig::default())
    }

    fn touch(target: &str, x1: i32, y1: i32, x2: i32, y2: i32) -> Link {
        Link::touch(
            Target::page(target),
            Transition::ZoomIn,
            TouchArea::new(x1, y1, x2, y2),
        )
    }

    fn recorder(store: &mut GraphStore) -> Rc<RefCell<Vec<Change>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |change, _| sink.borrow_mut().push(change.clone()));
        seen
    }

    // ========================================================================
    // init
    // ========================================================================

    #[test]
    fn test_init_synthesizes_index_page() {
        let store = empty_store();
        assert_eq!(store.pages().len(), 1);
        let index = &store.pages()[0];
        assert_eq!(index.name, "Index");
        assert_eq!(index.asset, "loading.jpg");
        assert_eq!(index.duration, 5.0);
        assert!(index.links.is_empty());
        assert_eq!(store.home_uuid(), index.uuid);
    }

    #[test]
    fn test_init_keeps_host_pages() {
        let mut config = ScreenConfig::default();
        config.pages.push(Page::new("p1", "Zebra", "z.jpg"));
        config.pages.push(Page::new("p2", "Apple", "a.jpg"));
        let store = GraphStore::init(AssetCatalog::default(), config);
        assert_eq!(store.pages().len(), 2);
        assert_eq!(store.home_uuid(), "p1");
    }

    #[test]
    fn test_init_repairs_unusable_timeouts() {
        let mut config = ScreenConfig::default();
        let mut page = Page::new("p1", "Loop", "v.mp4");
        for seconds in [0.0, -3.0, f64::NAN, 7.5] {
            page.links.push(Link::new(
                Target::Back,
                Transition::None,
                Trigger::Timeout { seconds },
            ));
        }
        config.pages.push(page);
        let settings = EditorSettings {
            fallback_timeout: 20.0,
            ..EditorSettings::default()
        };
        let store = GraphStore::init_with_settings(AssetCatalog::default(), config, settings);
        let seconds: Vec<Option<f64>> = store.pages()[0]
            .links
            .iter()
            .map(|l| match l.trigger {
                Trigger::Timeout { seconds } => Some(seconds),
                _ => None,
            })
            .collect();
        assert_eq!(seconds, vec![Some(20.0), Some(20.0), Some(20.0), Some(7.5)]);
    }

    // ========================================================================
    // Pages
    // ========================================================================

    #[test]
    fn test_create_page_appends_and_returns_uuid() {
        let mut store = empty_store();
        let uuid = store.create_page("Menu");
        assert_eq!(store.pages().len(), 2);
        let page = store.page(&uuid).unwrap();
        assert_eq!(page.name, "Menu");
        assert_eq!(page.asset, "loading.jpg");
        assert_ne!(uuid, store.home_uuid());
    }

    #[test]
    fn test_delete_page_cascades_links() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        let a = store.create_page("A");
        let b = store.create_page("B");
        store.add_link(&home, touch(&a, 0, 0, 10, 10)).unwrap();
        store.add_link(&home, touch(&b, 0, 0, 10, 10)).unwrap();
        store.add_link(&b, touch(&a, 0, 0, 10, 10)).unwrap();
        store.add_link(&b, Link::touch(Target::Back, Transition::Fade, TouchArea::new(0, 0, 5, 5))).unwrap();

        let change = store.delete_page(&a).unwrap();
        assert_eq!(change, Change::PageDeleted { uuid: a.clone(), removed_links: 2 });
        assert!(store.page(&a).is_none());
        for page in store.pages() {
            assert!(page.links.iter().all(|l| !l.target.points_to(&a)));
        }
        assert_eq!(store.page(&home).unwrap().links.len(), 1);
        assert!(store.page(&b).unwrap().links[0].target.is_back());
    }

    #[test]
    fn test_delete_unknown_page_is_noop() {
        let mut store = empty_store();
        let seen = recorder(&mut store);
        assert_eq!(store.delete_page("nope").unwrap(), Change::Ignored);
        assert_eq!(store.pages().len(), 1);
        assert_eq!(*seen.borrow(), vec![Change::Ignored]);
    }

    #[test]
    fn test_delete_last_page_refused() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        let seen = recorder(&mut store);
        assert_eq!(store.delete_page(&home), Err(GraphError::LastPage));
        assert_eq!(store.pages().len(), 1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_delete_home_page_refused() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        store.create_page("Other");
        assert_eq!(store.delete_page(&home), Err(GraphError::HomePage(home.clone())));
        assert_eq!(store.pages()[0].uuid, home);
    }

    #[test]
    fn test_update_page_fields() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        store.update_page(&home, PageUpdate::Name("Start".into()));
        store.update_page(&home, PageUpdate::Asset("missing-asset".into()));
        let page = store.page(&home).unwrap();
        assert_eq!(page.name, "Start");
        assert_eq!(page.asset, "missing-asset");
        assert_eq!(store.update_page("nope", PageUpdate::Name("x".into())), Change::Ignored);
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    #[test]
    fn test_sorted_pages_pins_home_then_case_insensitive() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        store.update_page(&home, PageUpdate::Name("zzz".into()));
        store.create_page("beta");
        store.create_page("Alpha");
        store.create_page("gamma");

        let names: Vec<&str> = store.sorted_pages().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zzz", "Alpha", "beta", "gamma"]);
        assert_eq!(store.default_uuid(), home);
    }

    #[test]
    fn test_sorted_pages_ignores_accents() {
        let mut store = empty_store();
        store.create_page("Zebra");
        store.create_page("éclair");
        store.create_page("Fish");
        store.create_page("Äpfel");

        let names: Vec<&str> = store.sorted_pages().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Index", "Äpfel", "éclair", "Fish", "Zebra"]);
    }

    #[test]
    fn test_accented_names_order_after_plain_ones() {
        assert_eq!(compare_names("eclair", "éclair"), Ordering::Less);
        assert_eq!(compare_names("Eclair", "eclair"), Ordering::Equal);
        assert_eq!(compare_names("Ofen", "Öl"), Ordering::Less);
    }

    #[test]
    fn test_sorted_pages_stable_for_equal_names() {
        let mut store = empty_store();
        let first = store.create_page("Same");
        let second = store.create_page("same");
        let sorted = store.sorted_pages();
        assert_eq!(sorted[1].uuid, first);
        assert_eq!(sorted[2].uuid, second);
    }

    #[test]
    fn test_page_by_uuid_reflects_mutations() {
        let mut store = empty_store();
        let uuid = store.create_page("A");
        assert!(store.page_by_uuid().contains_key(uuid.as_str()));
        store.delete_page(&uuid).unwrap();
        assert!(!store.page_by_uuid().contains_key(uuid.as_str()));
    }

    // ========================================================================
    // Links
    // ========================================================================

    #[test]
    fn test_add_link_rejects_empty_area() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        let err = store.add_link(&home, touch(&home, 10, 0, 10, 10)).unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidLink(ValidationError::EmptyTouchArea(TouchArea::new(10, 0, 10, 10)))
        );
        assert!(store.page(&home).unwrap().links.is_empty());
    }

    #[test]
    fn test_add_link_to_missing_page_ignored() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        assert_eq!(store.add_link("nope", touch(&home, 0, 0, 1, 1)).unwrap(), Change::Ignored);
    }

    #[test]
    fn test_delete_link_shifts_indices() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        store.add_link(&home, touch(&home, 0, 0, 1, 1)).unwrap();
        store.add_link(&home, touch(&home, 0, 0, 2, 2)).unwrap();
        store.add_link(&home, touch(&home, 0, 0, 3, 3)).unwrap();
        let third = store.link(&home, 2).unwrap().id();

        store.delete_link(&home, 0).unwrap();
        assert_eq!(store.link_index(&home, third), Some(1));
        assert_eq!(
            store.delete_link(&home, 2),
            Err(GraphError::LinkIndexOutOfRange { page: home.clone(), index: 2, len: 2 })
        );
    }

    #[test]
    fn test_update_link_merges_options() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        store.add_link(&home, touch(&home, 0, 0, 10, 10)).unwrap();
        store
            .update_link(
                &home,
                0,
                LinkUpdate::Options(OptionsPatch::Touch(TouchPatch { x1: Some(5), ..Default::default() })),
            )
            .unwrap();
        assert_eq!(
            store.link(&home, 0).unwrap().trigger,
            Trigger::Touch(TouchArea::new(5, 0, 10, 10))
        );
    }

    #[test]
    fn test_update_link_rejects_inverted_merge() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        store.add_link(&home, touch(&home, 0, 0, 10, 10)).unwrap();
        let result = store.update_link(
            &home,
            0,
            LinkUpdate::Options(OptionsPatch::Touch(TouchPatch { x1: Some(20), ..Default::default() })),
        );
        assert!(matches!(result, Err(GraphError::InvalidLink(ValidationError::EmptyTouchArea(_)))));
        assert_eq!(
            store.link(&home, 0).unwrap().trigger,
            Trigger::Touch(TouchArea::new(0, 0, 10, 10))
        );
    }

    #[test]
    fn test_update_link_target_and_transition() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        store.add_link(&home, touch(&home, 0, 0, 10, 10)).unwrap();
        let id = store.link(&home, 0).unwrap().id();
        store.update_link(&home, 0, LinkUpdate::Target(Target::Back)).unwrap();
        let change = store.update_link(&home, 0, LinkUpdate::Transition(Transition::Fade)).unwrap();
        assert_eq!(change, Change::LinkUpdated { page: home.clone(), index: 0, id });
        let link = store.link(&home, 0).unwrap();
        assert!(link.target.is_back());
        assert_eq!(link.transition, Transition::Fade);
    }

    #[test]
    fn test_custom_validator_applies() {
        struct NoBack;
        impl LinkValidator for NoBack {
            fn validate(&self, link: &Link, _siblings: &[Link]) -> ValidationResult {
                if link.target.is_back() {
                    ValidationResult::Invalid(ValidationError::EmptyKey)
                } else {
                    ValidationResult::Valid
                }
            }
        }
        let mut store = empty_store();
        store.add_validator(NoBack);
        let home = store.home_uuid().to_string();
        let link = Link::new(Target::Back, Transition::None, Trigger::Key { code: "a".into() });
        assert!(store.add_link(&home, link).is_err());
    }

    #[test]
    fn test_validation_result_and() {
        let invalid = ValidationResult::Invalid(ValidationError::EmptyKey);
        assert_eq!(ValidationResult::Valid.and(invalid.clone()), invalid);
        assert!(ValidationResult::Valid.and(ValidationResult::Valid).is_valid());
        assert_eq!(invalid.clone().into_result(), Err(ValidationError::EmptyKey));
    }

    #[test]
    fn test_composite_reports_first_failure() {
        let validator = CompositeValidator::standard();
        let link = Link::new(Target::Back, Transition::None, Trigger::Timeout { seconds: -1.0 });
        assert_eq!(
            validator.validate(&link, &[]),
            ValidationResult::Invalid(ValidationError::InvalidTimeout(-1.0))
        );
        let ok = Link::new(Target::Back, Transition::None, Trigger::Key { code: "a".into() });
        assert!(validator.validate(&ok, &[]).into_result().is_ok());
    }

    #[test]
    fn test_timeout_validator() {
        let link = Link::new(Target::Back, Transition::None, Trigger::Timeout { seconds: 0.0 });
        assert_eq!(
            validate_link(&link, &[], &TimeoutValidator),
            ValidationResult::Invalid(ValidationError::InvalidTimeout(0.0))
        );
    }

    // ========================================================================
    // Config + notifications
    // ========================================================================

    #[test]
    fn test_set_config_rotation_idempotent() {
        let mut store = empty_store();
        store.set_config(ConfigUpdate::Rotation(Rotation::Cw90));
        let once = store.config().clone();
        store.set_config(ConfigUpdate::Rotation(Rotation::Cw90));
        assert_eq!(*store.config(), once);
        assert_eq!(store.screen(), Screen { w: 1080, h: 1920, is_portrait: true });
    }

    #[test]
    fn test_every_mutation_notifies_once() {
        let mut store = empty_store();
        let home = store.home_uuid().to_string();
        let seen = recorder(&mut store);

        let page = store.create_page("A");
        store.add_link(&home, touch(&page, 0, 0, 5, 5)).unwrap();
        store.set_config(ConfigUpdate::Audio(true));
        store.delete_page(&page).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], Change::PageCreated { uuid: page.clone() });
        assert!(matches!(seen[1], Change::LinkAdded { index: 0, .. }));
        assert_eq!(seen[2], Change::ConfigUpdated(ConfigUpdate::Audio(true)));
        assert_eq!(seen[3], Change::PageDeleted { uuid: page, removed_links: 1 });
    }

    #[test]
    fn test_listener_sees_updated_config() {
        let mut store = empty_store();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        store.subscribe(move |_, config| *sink.borrow_mut() = Some(config.scale));
        store.set_config(ConfigUpdate::Scale(true));
        assert_eq!(*seen.borrow(), Some(true));
    }
}

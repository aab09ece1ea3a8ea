//! # Signage Flow Editor
//!
//! Editor core for the navigation flow of a digital-signage player: full-screen
//! pages, each showing an image or video asset, connected by links that fire on
//! touch, timeout, GPIO pulse or key press.
//!
//! ## Features
//!
//! - **Navigation graph store** - pages, links and screen settings behind an
//!   event-emitting store that keeps the graph consistent (cascading page
//!   deletes, validated links, a pinned home page)
//! - **Touch area drawing** - pointer gestures on a scaled screen preview become
//!   clicks or screen-space rectangles
//! - **Player-exact hit testing** - the later link wins on overlap, edges inclusive
//! - **Host sync** - the full config is pushed to the host after every change
//! - **Slint-ready view models** - page and link rows synced into `VecModel`s
//!
//! ## Quick Start
//!
//! ```ignore
//! use signage_flow_editor::{boot, EditorSettings, Host, HostState};
//!
//! let state = HostState::from_json(&host_json)?;
//! let ctrl = boot(state, host.clone(), EditorSettings::default());
//!
//! window.on_preview_pointer_down(ctrl.pointer_down_callback());
//! window.on_preview_pointer_move(ctrl.pointer_move_callback());
//! window.on_preview_pointer_up(ctrl.pointer_up_callback());
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - viewport to screen-space conversion and touch rectangles
//! - [`gesture`] - click vs. drag disambiguation
//! - [`graph`] - [`GraphStore`], mutations, change notifications, link validation
//! - [`hit_test`] - touch resolution
//! - [`controller`] - [`EditorController`], the page editor logic
//! - [`sync`] - [`Host`] boundary and [`SyncBridge`]
//! - [`links`], [`page_list`] - view rows for the UI
//! - [`catalog`] - option menus and labels

pub mod assets;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod graph;
pub mod links;
pub mod model;
pub mod page_list;
pub mod settings;
pub mod sync;

pub use assets::{Asset, AssetCatalog, FileType};
pub use catalog::{target_choices, timeout_choices, GpioChoice, TargetChoice, TimeoutChoice};
pub use controller::{EditorController, PointerOutcome};
pub use error::{GraphError, SyncError};
pub use geometry::{scale, to_screen_space, Point, Screen, TouchArea};
pub use gesture::{GestureEvent, GestureState, GestureTracker};
pub use graph::{
    Change, ConfigUpdate, GraphStore, LinkUpdate, PageUpdate,
    // Link validation framework
    CompositeValidator, LinkValidator, TimeoutValidator, TouchAreaValidator, ValidationError,
    ValidationResult, validate_link,
};
pub use hit_test::{find_touch_link_at, resolve_touch, NavAction, TouchGeometry};
pub use links::{link_color, link_views, LinkListModel, LinkView};
pub use model::{
    Link, LinkId, LinkType, OptionsPatch, Page, Resolution, Rotation, ScreenConfig, Target,
    TouchPatch, Transition, Trigger,
};
pub use page_list::{page_rows, PageListModel, PageRow};
pub use settings::EditorSettings;
pub use sync::{boot, Host, HostState, SyncBridge};

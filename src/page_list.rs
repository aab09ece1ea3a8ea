//! The page overview: one row per page in sorted order.

use crate::graph::GraphStore;
use crate::links::{ConcreteModelSyncer, ModelSyncer};
use slint::{SharedString, VecModel};
use std::rc::Rc;

/// One line of the page overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    pub uuid: String,
    pub name: String,
    pub is_home: bool,
    pub link_count: usize,
    /// The home page cannot be deleted.
    pub deletable: bool,
    /// Thumbnail of the page's asset, if the asset is known.
    pub thumb: Option<String>,
}

impl PageRow {
    pub fn label(&self) -> SharedString {
        if self.is_home {
            SharedString::from(format!("{} - Home/Start page", self.name))
        } else {
            SharedString::from(self.name.as_str())
        }
    }

    pub fn link_summary(&self) -> SharedString {
        SharedString::from(format!("{} links", self.link_count))
    }
}

/// Rows for every page, home page first.
pub fn page_rows(store: &GraphStore) -> Vec<PageRow> {
    let thumb_size = store.settings().thumb_size;
    store
        .sorted_pages()
        .into_iter()
        .map(|page| {
            let is_home = store.is_home(&page.uuid);
            PageRow {
                uuid: page.uuid.clone(),
                name: page.name.clone(),
                is_home,
                link_count: page.links.len(),
                deletable: !is_home,
                thumb: store.assets().get(&page.asset).map(|a| a.thumb_url(thumb_size)),
            }
        })
        .collect()
}

/// Page overview rows, optionally mirrored into a Slint model.
#[derive(Default)]
pub struct PageListModel {
    rows: Vec<PageRow>,
    syncer: Option<Box<dyn ModelSyncer<PageRow>>>,
}

impl PageListModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_model<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&PageRow) -> P + 'static,
    {
        let syncer = ConcreteModelSyncer { model, constructor };
        syncer.sync(&self.rows);
        self.syncer = Some(Box::new(syncer));
    }

    pub fn refresh(&mut self, store: &GraphStore) {
        self.rows = page_rows(store);
        if let Some(syncer) = &self.syncer {
            syncer.sync(&self.rows);
        }
    }

    pub fn rows(&self) -> &[PageRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

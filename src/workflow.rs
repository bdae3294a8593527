//! Result collection, ranking, and response serialization.
//!
//! A `Workflow` accumulates the items a handler wants to show, ranks them by
//! how often the user has selected each title before, and emits the final
//! `{"items":[...]}` document on stdout - the single value the host reads
//! from the process.

use std::cmp::Reverse;

use serde::Serialize;

use crate::error::Result;
use crate::item::{Item, ItemOutput};
use crate::item_data::ItemDataStore;
use crate::settings::Settings;
use crate::storage::SharedStorage;
use crate::usage::UsageTracker;

/// Default workflow name, used as the keychain service key until overridden.
const DEFAULT_NAME: &str = "barkit-workflow";

/// Severity icons used by the one-shot status responses.
const ICON_INFO: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/ToolbarInfo.icns";
const ICON_WARNING: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/AlertCautionIcon.icns";
const ICON_ERROR: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/AlertStopIcon.icns";

#[derive(Debug, Serialize)]
struct Response {
    items: Vec<ItemOutput>,
}

/// Collects result items for the current invocation and produces the
/// serialized response, most-selected titles first.
pub struct Workflow {
    /// Workflow name, used as a service/namespace key by collaborators
    name: String,
    /// Accumulated items, in insertion order
    items: Vec<Item>,
    /// Selection counters driving the ranking
    usage: UsageTracker,
    /// Per-title auxiliary data written through from added items
    item_data: ItemDataStore,
    /// Shared store handle, kept for collaborators created on demand
    storage: SharedStorage,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("items", &self.items.len())
            .finish()
    }
}

impl Workflow {
    /// Create a workflow over a shared store.
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            items: Vec::new(),
            usage: UsageTracker::new(storage.clone()),
            item_data: ItemDataStore::new(storage.clone()),
            storage,
        }
    }

    /// Set the workflow name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get the workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a handle to the usage tracker backing this workflow.
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Get a handle to the item data store backing this workflow.
    pub fn item_data(&self) -> &ItemDataStore {
        &self.item_data
    }

    /// Create a settings collaborator namespaced by this workflow's name.
    pub fn settings(&self) -> Settings {
        Settings::new(self.storage.clone(), self.name.clone())
    }

    /// Add an item to the current result set.
    ///
    /// The item's auxiliary payload, if any, is written through to the item
    /// data store so a later menu-item-selection dispatch can retrieve it.
    /// Items with sub-items get their autocomplete text derived from the
    /// title, overwriting any caller-supplied value.
    pub fn add_item(&mut self, mut item: Item) -> Result<()> {
        if let Some(data) = &item.data {
            self.item_data.put(&item.title, data)?;
        }
        if item.has_sub_items {
            item.autocomplete = Some(crate::item::sub_item_autocomplete(&item.title));
        }
        self.items.push(item);
        Ok(())
    }

    /// Number of accumulated items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empty the result set and delete all stored auxiliary data.
    ///
    /// A new response invalidates old item associations, so the auxiliary
    /// mapping is kept in sync with what was shown most recently.
    pub fn clear_items(&mut self) -> Result<()> {
        self.items.clear();
        self.item_data.clear()
    }

    /// Rank, serialize, and emit the accumulated items.
    ///
    /// Items are ordered by descending selection count; titles with equal
    /// counts keep their insertion order. The serialized document is written
    /// to stdout (the host reads it as the sole process output) and also
    /// returned. Safe to call more than once: ranking is recomputed from the
    /// same accumulated items each time.
    pub fn feedback(&self) -> Result<String> {
        let counts = self.usage.counts();

        let mut order: Vec<usize> = (0..self.items.len()).collect();
        // sort_by_key is stable, so equal counts preserve insertion order
        order.sort_by_key(|&i| Reverse(counts.get(&self.items[i].title).copied().unwrap_or(0)));

        let response = Response {
            items: order.iter().map(|&i| self.items[i].to_output()).collect(),
        };
        let output = serde_json::to_string(&response)?;

        tracing::debug!(items = self.items.len(), "Emitting feedback");
        println!("{output}");
        Ok(output)
    }

    /// Replace the result set with a single informational entry and emit it.
    pub fn info(&mut self, title: &str, subtitle: Option<&str>) -> Result<String> {
        self.status_response(title, subtitle, ICON_INFO)
    }

    /// Replace the result set with a single warning entry and emit it.
    pub fn warning(&mut self, title: &str, subtitle: Option<&str>) -> Result<String> {
        self.status_response(title, subtitle, ICON_WARNING)
    }

    /// Replace the result set with a single error entry and emit it.
    pub fn error(&mut self, title: &str, subtitle: Option<&str>) -> Result<String> {
        self.status_response(title, subtitle, ICON_ERROR)
    }

    fn status_response(&mut self, title: &str, subtitle: Option<&str>, icon: &str) -> Result<String> {
        self.clear_items()?;
        let mut item = Item::new(title).with_icon(icon);
        if let Some(subtitle) = subtitle {
            item = item.with_subtitle(subtitle);
        }
        self.add_item(item)?;
        self.feedback()
    }
}

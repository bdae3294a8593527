//! Action dispatch for host invocations.
//!
//! The host spawns the workflow process with `(action, query)`. When the
//! query contains the reserved separator, the user has picked a previously
//! shown result and is optionally refining it; otherwise it is a plain
//! top-level action. `ActionHandler` routes each invocation to the handlers
//! registered for the action name.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::item_data::ItemDataStore;
use crate::storage::SharedStorage;
use crate::usage::UsageTracker;
use crate::SEPARATOR;

/// Callback for a top-level action; receives the query, absent when the
/// host sent none.
pub type ActionCallback = Box<dyn Fn(Option<&str>)>;

/// Callback for a menu-item selection; receives the refinement query, the
/// selected title, and the auxiliary data stored for that title.
pub type MenuCallback = Box<dyn Fn(&str, &str, Option<Value>)>;

/// Routes `(action, query)` pairs to registered handlers.
///
/// Multiple handlers may be registered for the same action name; all of them
/// fire, in registration order. Dispatching an action nobody registered for
/// is a silent no-op: the host may send actions this workflow does not care
/// about.
pub struct ActionHandler {
    /// Top-level action handlers by action name
    actions: HashMap<String, Vec<ActionCallback>>,
    /// Menu-item-selection handlers by action name
    menu_selections: HashMap<String, Vec<MenuCallback>>,
    /// Selection counter updated as a dispatch side effect
    usage: UsageTracker,
    /// Auxiliary data looked up for menu-item dispatches
    item_data: ItemDataStore,
}

impl std::fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHandler")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("menu_selections", &self.menu_selections.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionHandler {
    /// Create a handler over a shared store.
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            actions: HashMap::new(),
            menu_selections: HashMap::new(),
            usage: UsageTracker::new(storage.clone()),
            item_data: ItemDataStore::new(storage),
        }
    }

    /// Register a handler for a top-level action.
    pub fn on_action(&mut self, action: &str, handler: impl Fn(Option<&str>) + 'static) {
        self.actions.entry(action.to_string()).or_default().push(Box::new(handler));
    }

    /// Register a handler for a menu-item selection under an action.
    pub fn on_menu_item_selected(
        &mut self,
        action: &str,
        handler: impl Fn(&str, &str, Option<Value>) + 'static,
    ) {
        self.menu_selections.entry(action.to_string()).or_default().push(Box::new(handler));
    }

    /// Dispatch one host invocation.
    ///
    /// A query containing [`SEPARATOR`] is split on its first occurrence into
    /// a selected title and a refinement query (both trimmed); the selection
    /// is recorded, the stored auxiliary data for the title is looked up, and
    /// the menu-item handlers fire. Any other query fires the top-level
    /// action handlers as-is.
    pub fn handle(&self, action: &str, query: Option<&str>) -> Result<()> {
        match query.and_then(|q| q.split_once(SEPARATOR)) {
            Some((title_part, refinement_part)) => {
                let selected_title = title_part.trim();
                let refinement_query = refinement_part.trim();
                tracing::debug!(action, selected_title, refinement_query, "Menu-item dispatch");

                // Usage side effect happens before the handlers run and
                // regardless of whether any handler is registered.
                self.usage.record_selection(refinement_query, selected_title)?;
                let data = self.item_data.get(selected_title);

                match self.menu_selections.get(action) {
                    Some(handlers) => {
                        for handler in handlers {
                            handler(refinement_query, selected_title, data.clone());
                        }
                    }
                    None => {
                        tracing::debug!(action, "No menu-item handler registered");
                    }
                }
            }
            None => {
                tracing::debug!(action, query = ?query, "Top-level dispatch");
                match self.actions.get(action) {
                    Some(handlers) => {
                        for handler in handlers {
                            handler(query);
                        }
                    }
                    None => {
                        tracing::debug!(action, "No action handler registered");
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove all registered handlers for both event kinds.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.menu_selections.clear();
    }

    /// Entrypoint: read `(action, query)` from the process arguments and
    /// dispatch. An absent query is treated as a top-level dispatch with no
    /// query.
    pub fn run(&self) -> Result<()> {
        let mut args = std::env::args().skip(1);
        let action = args.next().unwrap_or_default();
        let query = args.next();
        self.handle(&action, query.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn test_handler(dir: &tempfile::TempDir) -> ActionHandler {
        let storage = Storage::with_path(dir.path().join("storage.json")).unwrap();
        ActionHandler::new(storage.into_shared())
    }

    #[test]
    fn test_top_level_dispatch() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        handler.on_action("a", move |query| {
            seen2.borrow_mut().push(query.map(str::to_string));
        });
        let menu_fired = Rc::new(RefCell::new(false));
        let menu_fired2 = menu_fired.clone();
        handler.on_menu_item_selected("a", move |_, _, _| {
            *menu_fired2.borrow_mut() = true;
        });

        handler.handle("a", Some("q")).unwrap();

        assert_eq!(*seen.borrow(), vec![Some("q".to_string())]);
        assert!(!*menu_fired.borrow());
    }

    #[test]
    fn test_absent_query_is_top_level() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        handler.on_action("a", move |query| {
            seen2.borrow_mut().push(query.map(str::to_string));
        });

        handler.handle("a", None).unwrap();
        assert_eq!(*seen.borrow(), vec![None]);
    }

    #[test]
    fn test_separator_dispatch_splits_and_trims() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        handler.on_menu_item_selected("a", move |refinement, title, _| {
            seen2.borrow_mut().push((refinement.to_string(), title.to_string()));
        });

        handler.handle("a", Some("abc $> xyz")).unwrap();
        assert_eq!(*seen.borrow(), vec![("xyz".to_string(), "abc".to_string())]);
    }

    #[test]
    fn test_separator_splits_on_first_occurrence() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        handler.on_menu_item_selected("a", move |refinement, title, _| {
            seen2.borrow_mut().push((refinement.to_string(), title.to_string()));
        });

        handler.handle("a", Some("abc $> x $> y")).unwrap();
        assert_eq!(*seen.borrow(), vec![("x $> y".to_string(), "abc".to_string())]);
    }

    #[test]
    fn test_empty_title_segment_still_dispatches() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        handler.on_menu_item_selected("a", move |refinement, title, _| {
            seen2.borrow_mut().push((refinement.to_string(), title.to_string()));
        });

        handler.handle("a", Some("   $> xyz")).unwrap();
        assert_eq!(*seen.borrow(), vec![("xyz".to_string(), String::new())]);
    }

    #[test]
    fn test_usage_increments_only_on_empty_refinement() {
        let dir = tempdir().unwrap();
        let handler = test_handler(&dir);

        handler.handle("a", Some("Alex $> ")).unwrap();
        handler.handle("a", Some("Alex $> ")).unwrap();
        handler.handle("a", Some("Alex $> ")).unwrap();
        assert_eq!(handler.usage.count("Alex"), 3);

        handler.handle("a", Some("Alex $> something")).unwrap();
        assert_eq!(handler.usage.count("Alex"), 3);
    }

    #[test]
    fn test_menu_dispatch_carries_stored_data() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);
        handler.item_data.put("Alex", &json!({"age": 20})).unwrap();

        let seen = Rc::new(RefCell::new(None));
        let seen2 = seen.clone();
        handler.on_menu_item_selected("a", move |_, _, data| {
            *seen2.borrow_mut() = data;
        });

        handler.handle("a", Some("Alex $> ")).unwrap();
        assert_eq!(*seen.borrow(), Some(json!({"age": 20})));
    }

    #[test]
    fn test_unregistered_action_is_noop() {
        let dir = tempdir().unwrap();
        let handler = test_handler(&dir);

        handler.handle("unknown", Some("q")).unwrap();
        handler.handle("unknown", Some("a $> b")).unwrap();
    }

    #[test]
    fn test_fan_out_in_registration_order() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);

        let order = Rc::new(RefCell::new(Vec::new()));
        let order1 = order.clone();
        let order2 = order.clone();
        handler.on_action("a", move |_| order1.borrow_mut().push(1));
        handler.on_action("a", move |_| order2.borrow_mut().push(2));

        handler.handle("a", Some("q")).unwrap();
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_clear_removes_all_handlers() {
        let dir = tempdir().unwrap();
        let mut handler = test_handler(&dir);

        let fired = Rc::new(RefCell::new(false));
        let fired2 = fired.clone();
        handler.on_action("a", move |_| *fired2.borrow_mut() = true);
        handler.clear();

        handler.handle("a", Some("q")).unwrap();
        assert!(!*fired.borrow());
    }
}

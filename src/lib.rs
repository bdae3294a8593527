//! # Barkit
//!
//! Helper library for building launcher search-bar workflow plugins.
//!
//! A host launcher spawns the plugin process with an `(action, query)` pair
//! and reads one JSON document from stdout describing the selectable results.
//! Barkit handles the plumbing around that contract:
//!
//! - **Dispatch**: route each invocation to a registered callback, with a
//!   second dispatch mode for "a menu entry was picked, refine with
//!   sub-query" (marked by the [`SEPARATOR`] token in the query)
//! - **Results**: collect [`Item`]s and serialize them in the host's wire
//!   format, ranked by how often the user selected each title before
//! - **Persistence**: settings, per-item side data, and usage counters
//!   survive across invocations of the otherwise stateless process
//! - **Fuzzy Search**: filter candidates against the query (powered by
//!   nucleo)
//!
//! ## Quick Start
//!
//! ```no_run
//! use barkit::{ActionHandler, Item, Storage, Workflow};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! fn main() -> barkit::Result<()> {
//!     let storage = Storage::new()?.into_shared();
//!     let workflow = Rc::new(RefCell::new(Workflow::new(storage.clone())));
//!     let mut handler = ActionHandler::new(storage);
//!
//!     let wf = workflow.clone();
//!     handler.on_action("search", move |query| {
//!         let names = ["Alex", "David", "Kat"];
//!         let matches = barkit::filter(query.unwrap_or(""), &names, |n| n.to_string());
//!         let mut wf = wf.borrow_mut();
//!         for name in matches {
//!             let _ = wf.add_item(Item::new(name).with_sub_items(true));
//!         }
//!         let _ = wf.feedback();
//!     });
//!
//!     handler.run()
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::return_self_not_must_use)]

mod error;
mod filter;
mod handler;
mod item;
mod item_data;
mod settings;
mod storage;
mod usage;
mod workflow;

pub use error::{Error, Result};
pub use filter::filter;
pub use handler::{ActionCallback, ActionHandler, MenuCallback};
pub use item::{Argument, Item};
pub use item_data::ItemDataStore;
#[cfg(feature = "secrets")]
pub use settings::SecretValue;
pub use settings::Settings;
pub use storage::{SharedStorage, Storage};
pub use usage::UsageTracker;
pub use workflow::Workflow;

/// Reserved substring separating a selected title from its refinement query
/// in a dispatched query string.
///
/// The split happens on the first occurrence only: a title that itself
/// contains this token mis-splits. Well-formed workflows keep the token out
/// of their titles.
pub const SEPARATOR: &str = " $>";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Result item data structures.
//!
//! Defines the `Item` struct that represents one selectable result sent back
//! to the host, plus the `Argument` encoding for structured arguments.

use serde::Serialize;
use serde_json::Value;

use crate::SEPARATOR;

/// A candidate result returned to the host.
///
/// `title` doubles as the natural key: usage counters and auxiliary data are
/// both looked up by title, so two items sharing a title collide
/// (last write wins).
#[derive(Debug, Clone, Default)]
pub struct Item {
    /// Primary display text, required, used as the natural key
    pub title: String,

    /// Secondary display text
    pub subtitle: Option<String>,

    /// Stable identifier the host uses for its own ordering heuristics
    pub uid: Option<String>,

    /// Argument passed to the next stage when the item is actioned
    pub arg: Option<Argument>,

    /// Whether the item can be actioned directly
    pub valid: bool,

    /// Text the host inserts into the search bar on autocomplete
    pub autocomplete: Option<String>,

    /// Icon path
    pub icon: Option<String>,

    /// Display type hint for the host
    pub item_type: Option<String>,

    /// URL shown in the host's preview panel
    pub quicklook_url: Option<String>,

    /// Alternate text for copy/large-type display
    pub text: Option<String>,

    /// Modifier-key overrides
    pub mods: Option<Value>,

    /// Opaque payload persisted for later menu-item-selection dispatch;
    /// never serialized to the host
    pub data: Option<Value>,

    /// Whether this item has sub-items; when set, the autocomplete text is
    /// derived as `title + SEPARATOR` so selecting it re-enters the workflow
    /// in menu-item mode
    pub has_sub_items: bool,
}

impl Item {
    /// Create a new item with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    /// Set the subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set the uid.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Set the argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<Argument>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    /// Mark the item as directly actionable.
    #[must_use]
    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    /// Set the autocomplete text.
    ///
    /// Overridden with the derived `title + SEPARATOR` value when the item
    /// has sub-items.
    #[must_use]
    pub fn with_autocomplete(mut self, autocomplete: impl Into<String>) -> Self {
        self.autocomplete = Some(autocomplete.into());
        self
    }

    /// Set the icon path.
    #[must_use]
    pub fn with_icon(mut self, path: impl Into<String>) -> Self {
        self.icon = Some(path.into());
        self
    }

    /// Set the display type.
    #[must_use]
    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    /// Set the quicklook URL.
    #[must_use]
    pub fn with_quicklook_url(mut self, url: impl Into<String>) -> Self {
        self.quicklook_url = Some(url.into());
        self
    }

    /// Set the display text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set modifier-key overrides.
    #[must_use]
    pub fn with_mods(mut self, mods: Value) -> Self {
        self.mods = Some(mods);
        self
    }

    /// Attach an auxiliary payload, persisted when the item is added.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Mark the item as having sub-items.
    #[must_use]
    pub fn with_sub_items(mut self, has_sub_items: bool) -> Self {
        self.has_sub_items = has_sub_items;
        self
    }

    /// Build the host-visible projection of this item.
    ///
    /// The optional fields considered for serialization are exactly the ones
    /// listed here; absent and empty values are left out of the document
    /// entirely, including nested objects that end up empty.
    pub(crate) fn to_output(&self) -> ItemOutput {
        ItemOutput {
            title: self.title.clone(),
            subtitle: non_empty(self.subtitle.as_deref()),
            valid: self.valid,
            uid: non_empty(self.uid.as_deref()),
            arg: self.arg.as_ref().map(Argument::encode),
            autocomplete: non_empty(self.autocomplete.as_deref()),
            icon: self
                .icon
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| IconOutput { path: p.to_string() }),
            item_type: non_empty(self.item_type.as_deref()),
            quicklook_url: non_empty(self.quicklook_url.as_deref()),
            text: non_empty(self.text.as_deref()),
            mods: self.mods.clone().filter(|m| !is_empty_value(m)),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(arr) => arr.is_empty(),
        _ => false,
    }
}

/// The serialized form of an item, with absent fields omitted.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ItemOutput {
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtitle: Option<String>,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<IconOutput>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    item_type: Option<String>,
    #[serde(rename = "quicklookurl", skip_serializing_if = "Option::is_none")]
    quicklook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mods: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct IconOutput {
    path: String,
}

/// The argument an item hands to the next workflow stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A plain string, passed through unchanged.
    Plain(String),

    /// A structured value, encoded as a JSON string of the form
    /// `{"hostworkflow":{"arg":<value>,"variables":<variables>}}` with
    /// absent parts omitted.
    Structured {
        value: Option<Value>,
        variables: Option<Value>,
    },
}

impl Argument {
    /// Encode the argument into its wire form.
    pub fn encode(&self) -> String {
        match self {
            Self::Plain(s) => s.clone(),
            Self::Structured { value, variables } => {
                let mut inner = serde_json::Map::new();
                if let Some(v) = value {
                    inner.insert("arg".to_string(), v.clone());
                }
                if let Some(v) = variables {
                    inner.insert("variables".to_string(), v.clone());
                }
                let mut outer = serde_json::Map::new();
                outer.insert("hostworkflow".to_string(), Value::Object(inner));
                Value::Object(outer).to_string()
            }
        }
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Self::Plain(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Self::Plain(s)
    }
}

/// Derive the autocomplete text for an item with sub-items.
pub(crate) fn sub_item_autocomplete(title: &str) -> String {
    format!("{title}{SEPARATOR}")
}

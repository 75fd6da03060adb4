use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use vc_path::{Path, PathParser};

use crate::Value;

// -----------------------------------------------------------------------------
// PropertySource

/// A flat source of string properties keyed by full path, such as
/// environment variables or a `.properties` file.
pub trait PropertySource: Send + Sync {
    /// A name for diagnostics.
    fn name(&self) -> &str;

    /// The value stored under the full key, e.g. `server.port`.
    fn property(&self, key: &str) -> Option<String>;

    /// Every key, in a stable order.
    fn property_names(&self) -> Vec<String>;
}

/// A [`PropertySource`] over an in-memory map.
///
/// # Examples
///
/// ```
/// use vc_access::{MapPropertySource, PropertySource};
///
/// let source = MapPropertySource::new("test", [("server.port", "8080")]);
/// assert_eq!(source.property("server.port").as_deref(), Some("8080"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapPropertySource {
    name: String,
    entries: IndexMap<String, String>,
}

impl MapPropertySource {
    pub fn new<K: Into<String>, V: Into<String>>(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            name: name.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl PropertySource for MapPropertySource {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn property(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    #[inline]
    fn property_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// -----------------------------------------------------------------------------
// PropertiesView

/// The part of a [`PropertySource`] below a prefix, seen as a tree.
///
/// `server.port=8080` makes the root view contain a `server` view that
/// contains the leaf `"8080"`. Nothing is copied until
/// [`to_value`](Self::to_value) is called.
#[derive(Clone)]
pub struct PropertiesView {
    source: Arc<dyn PropertySource>,
    prefix: Path,
}

/// A child of a view, see [`PropertiesView::children`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Name(String),
    Index(usize),
}

impl PropertiesView {
    /// The view of the whole source.
    #[inline]
    pub fn new(source: Arc<dyn PropertySource>) -> Self {
        Self {
            source,
            prefix: Path::root(),
        }
    }

    #[inline]
    pub fn source(&self) -> &Arc<dyn PropertySource> {
        &self.source
    }

    #[inline]
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    #[inline]
    fn with_prefix(&self, prefix: Path) -> Self {
        Self {
            source: self.source.clone(),
            prefix,
        }
    }

    /// The property stored exactly at the prefix.
    pub fn leaf(&self) -> Option<String> {
        if self.prefix.is_root() {
            return None;
        }
        self.source.property(&self.prefix.to_string())
    }

    /// Direct children, in first-seen order.
    pub fn children(&self) -> Vec<PropertyKey> {
        let parser = PathParser::new(self.prefix.separator());
        let depth = self.prefix.len();
        let mut children = IndexSet::new();
        for name in self.source.property_names() {
            let entries = parser.parse(&name);
            if entries.len() <= depth || entries.limit(depth) != *self.prefix.entries() {
                continue;
            }
            let Some(segment) = entries.segment(depth) else {
                continue;
            };
            let key = match (segment.is_indexed(), segment.index()) {
                (true, Some(index)) => PropertyKey::Index(index),
                _ => PropertyKey::Name(segment.content().to_owned()),
            };
            children.insert(key);
        }
        children.into_iter().collect()
    }

    /// The view one level down, by name.
    #[inline]
    pub fn child(&self, name: &str) -> Self {
        self.with_prefix(self.prefix.append_key(name))
    }

    /// The view one level down, by index.
    #[inline]
    pub fn child_index(&self, index: usize) -> Self {
        self.with_prefix(self.prefix.append_index(index))
    }

    /// What this view holds: the leaf string if there is one, else the view
    /// itself if anything is below it, else nothing.
    pub fn resolve(&self) -> Option<Value> {
        if let Some(leaf) = self.leaf() {
            return Some(Value::Str(leaf));
        }
        (!self.children().is_empty()).then(|| Value::Properties(self.clone()))
    }

    /// Copies the view into plain values.
    ///
    /// Children that are all indices become a `List`, anything else a `Map`
    /// with string keys.
    pub fn to_value(&self) -> Value {
        if let Some(leaf) = self.leaf() {
            return Value::Str(leaf);
        }
        let children = self.children();
        if !children.is_empty() && children.iter().all(|c| matches!(c, PropertyKey::Index(_))) {
            let mut indices: Vec<usize> = children
                .iter()
                .filter_map(|c| match c {
                    PropertyKey::Index(i) => Some(*i),
                    PropertyKey::Name(_) => None,
                })
                .collect();
            indices.sort_unstable();
            return Value::list(indices.into_iter().map(|i| self.child_index(i).to_value()));
        }
        Value::map(children.into_iter().map(|key| match key {
            PropertyKey::Name(name) => {
                let value = self.child(&name).to_value();
                (Value::Str(name), value)
            }
            PropertyKey::Index(index) => (
                Value::Str(index.to_string()),
                self.child_index(index).to_value(),
            ),
        }))
    }
}

impl PartialEq for PropertiesView {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Arc::as_ptr(&self.source), Arc::as_ptr(&other.source))
            && self.prefix == other.prefix
    }
}

impl Eq for PropertiesView {}

impl Hash for PropertiesView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.source) as *const () as usize).hash(state);
        self.prefix.hash(state);
    }
}

impl fmt::Debug for PropertiesView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertiesView")
            .field("source", &self.source.name())
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl fmt::Display for PropertiesView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.name(), self.prefix)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{MapPropertySource, PropertiesView, PropertyKey, Value};

    fn view() -> PropertiesView {
        PropertiesView::new(Arc::new(MapPropertySource::new(
            "test",
            [
                ("server.port", "8080"),
                ("server.hosts[0]", "a"),
                ("server.hosts[1]", "b"),
                ("name", "demo"),
            ],
        )))
    }

    #[test]
    fn children_and_leaves() {
        let root = view();
        assert_eq!(
            root.children(),
            [PropertyKey::Name("server".into()), PropertyKey::Name("name".into())]
        );
        let server = root.child("server");
        assert_eq!(server.child("port").leaf().as_deref(), Some("8080"));
        assert_eq!(
            server.child("hosts").children(),
            [PropertyKey::Index(0), PropertyKey::Index(1)]
        );
        assert_eq!(server.child("missing").resolve(), None);
        assert!(matches!(server.resolve(), Some(Value::Properties(_))));
    }

    #[test]
    fn materialise() {
        let value = view().to_value();
        assert_eq!(
            value,
            Value::map([
                (
                    "server",
                    Value::map([
                        ("port", Value::from("8080")),
                        ("hosts", Value::list(["a", "b"])),
                    ]),
                ),
                ("name", Value::from("demo")),
            ])
        );
    }

    #[test]
    fn identity() {
        let root = view();
        assert_eq!(root.child("server"), root.child("server"));
        assert_ne!(root.child("server"), view().child("server"));
    }
}

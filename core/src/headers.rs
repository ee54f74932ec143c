//! Header values and the shared header map held by a configuration.
//!
//! # Design
//! `Headers` is a handle: cloning it does not copy the map, it hands out
//! another reference to the same one. A configuration snapshot therefore
//! returns the live map, and a mutation made through the snapshot is seen by
//! the configuration and by every request built afterwards. Use
//! [`Headers::detached`] for an independent copy.
//!
//! Entries keep insertion order so they are sent (and serialized) in the
//! order they were added.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single header value: text, an ordered list of text, or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
    Absent,
}

impl HeaderValue {
    /// Text sent on the wire, or `None` when the header should be left out.
    pub fn to_wire(&self) -> Option<String> {
        match self {
            HeaderValue::Single(value) => Some(value.clone()),
            HeaderValue::Multiple(values) => Some(values.join(", ")),
            HeaderValue::Absent => None,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::Multiple(values)
    }
}

impl From<Option<String>> for HeaderValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(HeaderValue::Absent, HeaderValue::Single)
    }
}

/// Shared, insertion-ordered header map.
#[derive(Clone, Default)]
pub struct Headers {
    inner: Arc<RwLock<Vec<(String, HeaderValue)>>>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Common defaults for a JSON API: `Content-Type: application/json` and
    /// `Accept-Language: en-US, en`. Add credentials separately.
    pub fn json_defaults() -> Self {
        let headers = Headers::new();
        headers.insert("Content-Type", "application/json");
        headers.insert(
            "Accept-Language",
            HeaderValue::Multiple(vec!["en-US".to_string(), "en".to_string()]),
        );
        headers
    }

    /// Set `name` to `value`. An existing entry keeps its position.
    pub fn insert(&self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        let name = name.into();
        let value = value.into();
        let mut entries = self.inner.write();
        match entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<HeaderValue> {
        self.inner
            .read()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.clone())
    }

    pub fn remove(&self, name: &str) -> Option<HeaderValue> {
        let mut entries = self.inner.write();
        let index = entries.iter().position(|(existing, _)| existing == name)?;
        Some(entries.remove(index).1)
    }

    /// Ordered copy of the current entries.
    pub fn entries(&self) -> Vec<(String, HeaderValue)> {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// True when both handles point at the same underlying map.
    pub fn same_map(&self, other: &Headers) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Independent copy with its own identity.
    pub fn detached(&self) -> Headers {
        Headers {
            inner: Arc::new(RwLock::new(self.entries())),
        }
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.read().iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// Compares contents, not identity. See [`Headers::same_map`].
impl PartialEq for Headers {
    fn eq(&self, other: &Self) -> bool {
        self.same_map(other) || *self.inner.read() == *other.inner.read()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<HeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.inner.read();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (name, value) in entries.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to a string, a list of strings, or null")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let headers = Headers::new();
                while let Some((name, value)) = access.next_entry::<String, HeaderValue>()? {
                    headers.insert(name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

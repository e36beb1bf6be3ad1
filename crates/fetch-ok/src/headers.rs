//! Canonical header mapping
//!
//! Callers hand headers over in whatever shape they have at hand: pairs,
//! hash maps or a `reqwest` [`HeaderMap`]. Every shape is normalized into
//! [`Headers`], an insertion-ordered mapping, before any other processing.

use std::collections::{BTreeMap, HashMap};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::Error;

/// Ordered header mapping
///
/// Lookups by [`Headers::get`] are exact, so `accept` and `Accept` are
/// different keys. [`Headers::strip`] ignores ASCII case, as header names do
/// on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under exactly `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether exactly `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether `name` is present in any letter case
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Set `name` to `value`, replacing an existing entry in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Remove exactly `name`, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Remove every entry named `name` in any letter case, returning how many
    /// were removed
    pub fn strip(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    /// Add entries of `defaults` whose names are not present in any case
    pub fn fill_from(&mut self, defaults: &Headers) {
        for (name, value) in defaults.iter() {
            if !self.contains_ignore_case(name) {
                self.entries.push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Iterate over entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into a `reqwest` header map for sending
    pub fn to_header_map(&self) -> Result<HeaderMap, Error> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Build(format!("Invalid header name {name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::Build(format!("Invalid value for header {name}: {e}")))?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

impl<K, V> From<Vec<(K, V)>> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    /// Hash maps have no order of their own, so entries are sorted by name.
    fn from(map: HashMap<K, V, S>) -> Self {
        let mut pairs: Vec<(String, String)> = map
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.into_iter().collect()
    }
}

impl<K, V> From<BTreeMap<K, V>> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl From<&HeaderMap> for Headers {
    /// Repeated names are joined with `", "`. Values that are not valid
    /// UTF-8 are skipped.
    fn from(map: &HeaderMap) -> Self {
        let mut headers = Headers::new();
        for name in map.keys() {
            let values: Vec<&str> = map
                .get_all(name)
                .iter()
                .filter_map(|value| match value.to_str() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::debug!("Skipping non UTF-8 value for header {}", name);
                        None
                    }
                })
                .collect();
            if !values.is_empty() {
                headers.set(name.as_str(), values.join(", "));
            }
        }
        headers
    }
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Headers::from(&map)
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
